//! Backend-agnostic listing queries for the content catalog.
//!
//! - [`schema`] and [`domains`]: the closed description of each listing type
//! - [`builder`]: untyped request input → [`FilterSpecification`]
//! - [`normalize`]: composite attribute codec
//! - [`search`]: the folded text free-text search matches against
//! - [`page`]: the result envelope both backends feed into
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod builder;
pub mod domains;
pub mod field;
pub mod filter;
pub mod kind;
pub mod limits;
pub mod normalize;
pub mod page;
pub mod raw;
pub mod schema;
pub mod search;
pub mod sort;

pub use domains::{CourseFacet, JobFacet, ResourceFacet, ScholarshipFacet};
pub use field::{CompositeKind, FacetField, FieldAccess, FieldDef, FieldKind};
pub use filter::{FacetConstraint, FilterSpecification, ListingFilter, MAX_OFFSET, SpecView, Visibility};
pub use kind::{ListingKind, UnknownListingKind};
pub use limits::QueryLimits;
pub use normalize::{Composite, NormalizeError, StorageForm, deflate, inflate, try_inflate};
pub use page::{Page, PageInfo, RawPage, Record, paginate, record_from_row, total_pages};
pub use raw::RawParams;
pub use schema::{ListingSchema, PUBLIC_VISIBILITY, TIEBREAKER, VISIBILITY_COLUMN};
pub use search::{SEARCH_COLUMN, fold, search_text, touches_search};
pub use sort::{OrderKey, SortDir, SortKey, SortOrder, SortRule};
