use std::collections::{BTreeMap, BTreeSet};

use crate::domains::{CourseFacet, JobFacet, ResourceFacet, ScholarshipFacet};
use crate::field::FacetField;
use crate::kind::ListingKind;
use crate::schema::ListingSchema;
use crate::sort::{SortKey, SortOrder};

/// Largest row offset any backend accepts (a signed 64-bit bind parameter).
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Which records a listing may see. Chosen by the endpoint, never by the
/// request parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Only records whose `visibility` column is `public`.
    Public,
    /// Admin view, no visibility predicate.
    Any,
}

/// Canonical, backend-agnostic listing query for one domain.
///
/// Only [`FilterSpecification::build`] creates one, so every instance is
/// already defaulted and clamped: `page >= 1`, `1 <= limit <= max`,
/// `offset <= MAX_OFFSET`, no empty facet sets, and a sort key the domain
/// supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpecification<F: FacetField> {
    pub(crate) page: u64,
    pub(crate) limit: u64,
    pub(crate) search: Option<String>,
    pub(crate) facets: BTreeMap<F, BTreeSet<String>>,
    pub(crate) sort: SortKey,
    pub(crate) visibility: Visibility,
}

impl<F: FacetField> FilterSpecification<F> {
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(MAX_OFFSET)
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    #[must_use]
    pub fn facet(&self, field: F) -> Option<&BTreeSet<String>> {
        self.facets.get(&field)
    }

    pub fn facets(&self) -> impl Iterator<Item = (F, &BTreeSet<String>)> {
        self.facets.iter().map(|(f, v)| (*f, v))
    }

    #[must_use]
    pub fn sort(&self) -> SortKey {
        self.sort
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[must_use]
    pub fn schema(&self) -> &'static ListingSchema {
        F::KIND.schema()
    }

    #[must_use]
    pub fn order(&self) -> SortOrder {
        self.schema().order_for(self.sort)
    }

    /// Type-erased view consumed by the query compilers.
    #[must_use]
    pub fn view(&self) -> SpecView<'_> {
        SpecView {
            schema: self.schema(),
            page: self.page,
            limit: self.limit,
            search: self.search(),
            facets: self
                .facets
                .iter()
                .map(|(f, values)| FacetConstraint {
                    column: f.column(),
                    values: values.iter().map(String::as_str).collect(),
                })
                .collect(),
            order: self.order(),
            visibility: self.visibility,
        }
    }
}

/// One `column IN (values)` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetConstraint<'a> {
    pub column: &'static str,
    pub values: Vec<&'a str>,
}

/// A [`FilterSpecification`] with the facet type erased and the ordering
/// resolved against the schema's sort table.
#[derive(Debug, Clone)]
pub struct SpecView<'a> {
    pub schema: &'static ListingSchema,
    pub page: u64,
    pub limit: u64,
    pub search: Option<&'a str>,
    pub facets: Vec<FacetConstraint<'a>>,
    pub order: SortOrder,
    pub visibility: Visibility,
}

impl SpecView<'_> {
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit).min(MAX_OFFSET)
    }
}

/// Closed sum over the four listing domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingFilter {
    Course(FilterSpecification<CourseFacet>),
    Job(FilterSpecification<JobFacet>),
    Scholarship(FilterSpecification<ScholarshipFacet>),
    Resource(FilterSpecification<ResourceFacet>),
}

impl ListingFilter {
    #[must_use]
    pub fn kind(&self) -> ListingKind {
        match self {
            ListingFilter::Course(_) => ListingKind::Courses,
            ListingFilter::Job(_) => ListingKind::Jobs,
            ListingFilter::Scholarship(_) => ListingKind::Scholarships,
            ListingFilter::Resource(_) => ListingKind::Resources,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &'static ListingSchema {
        self.kind().schema()
    }

    #[must_use]
    pub fn view(&self) -> SpecView<'_> {
        match self {
            ListingFilter::Course(s) => s.view(),
            ListingFilter::Job(s) => s.view(),
            ListingFilter::Scholarship(s) => s.view(),
            ListingFilter::Resource(s) => s.view(),
        }
    }

    #[must_use]
    pub fn page(&self) -> u64 {
        match self {
            ListingFilter::Course(s) => s.page(),
            ListingFilter::Job(s) => s.page(),
            ListingFilter::Scholarship(s) => s.page(),
            ListingFilter::Resource(s) => s.page(),
        }
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        match self {
            ListingFilter::Course(s) => s.limit(),
            ListingFilter::Job(s) => s.limit(),
            ListingFilter::Scholarship(s) => s.limit(),
            ListingFilter::Resource(s) => s.limit(),
        }
    }
}
