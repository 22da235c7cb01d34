//! Per-domain schemas and facet enums.

pub mod course;
pub mod job;
pub mod resource;
pub mod scholarship;

pub use course::CourseFacet;
pub use job::JobFacet;
pub use resource::ResourceFacet;
pub use scholarship::ScholarshipFacet;
