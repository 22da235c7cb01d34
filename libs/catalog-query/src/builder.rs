//! Raw request input → [`FilterSpecification`].
//!
//! Building never fails. Every unusable input degrades to a default:
//! - `page`/`limit` absent, non-numeric or `<= 0` → 1 / the domain default
//! - `limit` above the cap → the cap
//! - `page` whose offset would pass [`MAX_OFFSET`] → the last page that fits
//! - blank `search` → no search; long `search` → truncated
//! - facet set empty or containing the `all` sentinel → facet omitted
//! - unknown or unsupported `sort` → the domain's default sort

use std::collections::{BTreeMap, BTreeSet};

use crate::domains::{CourseFacet, JobFacet, ResourceFacet, ScholarshipFacet};
use crate::field::FacetField;
use crate::filter::{FilterSpecification, ListingFilter, MAX_OFFSET, Visibility};
use crate::kind::ListingKind;
use crate::limits::QueryLimits;
use crate::raw::RawParams;
use crate::sort::SortKey;

pub const PAGE_PARAM: &str = "page";
pub const LIMIT_PARAM: &str = "limit";
pub const SEARCH_PARAM: &str = "search";
pub const SORT_PARAM: &str = "sort";
/// Facet value meaning "no constraint".
pub const ALL_SENTINEL: &str = "all";

fn positive(raw: Option<&str>) -> Option<u64> {
    raw?.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .and_then(|n| u64::try_from(n).ok())
}

fn search_needle(raw: Option<&str>, max_chars: usize) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || max_chars == 0 {
        return None;
    }
    let truncated: String = trimmed.chars().take(max_chars).collect();
    Some(truncated)
}

fn facet_values(values: &[String]) -> Option<BTreeSet<String>> {
    let mut set = BTreeSet::new();
    for v in values {
        let v = v.trim();
        if v.is_empty() {
            continue;
        }
        if v.eq_ignore_ascii_case(ALL_SENTINEL) {
            return None;
        }
        set.insert(v.to_owned());
    }
    (!set.is_empty()).then_some(set)
}

impl<F: FacetField> FilterSpecification<F> {
    #[must_use]
    pub fn build(raw: &RawParams, visibility: Visibility, limits: &QueryLimits) -> Self {
        let schema = F::KIND.schema();

        let limit = positive(raw.first(LIMIT_PARAM))
            .map_or_else(|| limits.effective_default(), |l| l.min(limits.effective_max()))
            .max(1);
        let page = positive(raw.first(PAGE_PARAM))
            .unwrap_or(1)
            .min(MAX_OFFSET / limit + 1);

        let mut facets = BTreeMap::new();
        for field in F::FIELDS {
            if let Some(values) = facet_values(raw.all(field.name())) {
                facets.insert(*field, values);
            }
        }

        let sort = raw
            .first(SORT_PARAM)
            .and_then(SortKey::parse)
            .filter(|k| schema.supports_sort(*k))
            .unwrap_or_else(|| schema.default_sort());

        let spec = Self {
            page,
            limit,
            search: search_needle(raw.first(SEARCH_PARAM), limits.max_search_len),
            facets,
            sort,
            visibility,
        };
        tracing::debug!(
            kind = %F::KIND,
            page = spec.page,
            limit = spec.limit,
            facets = spec.facets.len(),
            sort = %spec.sort,
            "built filter specification"
        );
        spec
    }
}

impl ListingFilter {
    /// The only entry point that accepts untyped input.
    #[must_use]
    pub fn build(kind: ListingKind, raw: &RawParams, visibility: Visibility, limits: &QueryLimits) -> Self {
        match kind {
            ListingKind::Courses => {
                ListingFilter::Course(FilterSpecification::<CourseFacet>::build(raw, visibility, limits))
            }
            ListingKind::Jobs => ListingFilter::Job(FilterSpecification::<JobFacet>::build(raw, visibility, limits)),
            ListingKind::Scholarships => ListingFilter::Scholarship(
                FilterSpecification::<ScholarshipFacet>::build(raw, visibility, limits),
            ),
            ListingKind::Resources => {
                ListingFilter::Resource(FilterSpecification::<ResourceFacet>::build(raw, visibility, limits))
            }
        }
    }
}
