use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::ListingSchema;

/// The four content types the catalog lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Courses,
    Jobs,
    Scholarships,
    Resources,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown listing kind: {0}")]
pub struct UnknownListingKind(pub String);

impl ListingKind {
    pub const ALL: &'static [ListingKind] = &[
        ListingKind::Courses,
        ListingKind::Jobs,
        ListingKind::Scholarships,
        ListingKind::Resources,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ListingKind::Courses => "courses",
            ListingKind::Jobs => "jobs",
            ListingKind::Scholarships => "scholarships",
            ListingKind::Resources => "resources",
        }
    }

    #[must_use]
    pub fn schema(self) -> &'static ListingSchema {
        match self {
            ListingKind::Courses => &crate::domains::course::SCHEMA,
            ListingKind::Jobs => &crate::domains::job::SCHEMA,
            ListingKind::Scholarships => &crate::domains::scholarship::SCHEMA,
            ListingKind::Resources => &crate::domains::resource::SCHEMA,
        }
    }
}

impl FromStr for ListingKind {
    type Err = UnknownListingKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownListingKind(s.to_owned()))
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
