use std::path::PathBuf;

use catalog_query::ListingKind;
use catalog_query::limits::DEFAULT_MAX_SEARCH_LEN;
use serde::{Deserialize, Serialize};

/// Kind of storage backend a listing is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Relational,
    Document,
}

/// Where one listing type lives and its paging overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListingBinding {
    pub backend: BackendKind,
    /// Name of the backend under `database.relational` or `database.document`.
    pub store: String,
    #[serde(default)]
    pub default_limit: Option<u64>,
    #[serde(default)]
    pub max_limit: Option<u64>,
}

impl ListingBinding {
    fn relational(store: &str) -> Self {
        Self {
            backend: BackendKind::Relational,
            store: store.to_owned(),
            default_limit: None,
            max_limit: None,
        }
    }

    fn document(store: &str) -> Self {
        Self {
            backend: BackendKind::Document,
            ..Self::relational(store)
        }
    }
}

/// Local media storage for inline admin uploads. Uploads are rejected when
/// absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    pub dir: PathBuf,
    /// Public prefix the stored file name is appended to.
    #[serde(default = "default_media_base_url")]
    pub base_url: String,
}

/// Configuration for the listings module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListingsConfig {
    #[serde(default = "default_courses")]
    pub courses: ListingBinding,
    #[serde(default = "default_jobs")]
    pub jobs: ListingBinding,
    #[serde(default = "default_scholarships")]
    pub scholarships: ListingBinding,
    #[serde(default = "default_resources")]
    pub resources: ListingBinding,
    #[serde(default = "default_max_search_len")]
    pub max_search_len: usize,
    #[serde(default)]
    pub media: Option<MediaConfig>,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            courses: default_courses(),
            jobs: default_jobs(),
            scholarships: default_scholarships(),
            resources: default_resources(),
            max_search_len: default_max_search_len(),
            media: None,
        }
    }
}

impl ListingsConfig {
    #[must_use]
    pub fn binding(&self, kind: ListingKind) -> &ListingBinding {
        match kind {
            ListingKind::Courses => &self.courses,
            ListingKind::Jobs => &self.jobs,
            ListingKind::Scholarships => &self.scholarships,
            ListingKind::Resources => &self.resources,
        }
    }
}

fn default_courses() -> ListingBinding {
    ListingBinding::relational("main")
}

fn default_jobs() -> ListingBinding {
    ListingBinding::relational("main")
}

fn default_scholarships() -> ListingBinding {
    ListingBinding::document("content")
}

fn default_resources() -> ListingBinding {
    ListingBinding::document("content")
}

fn default_max_search_len() -> usize {
    DEFAULT_MAX_SEARCH_LEN
}

fn default_media_base_url() -> String {
    "/media".to_owned()
}
