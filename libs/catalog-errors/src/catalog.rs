//! Static error catalog.
//!
//! Each entry fixes the status, title and stable code of one error class so
//! that every layer renders the same Problem for the same failure.

use crate::problem::Problem;
use http::StatusCode;

#[derive(Debug, Clone, Copy)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    #[inline]
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Problem::new(status, self.title, detail.into())
            .with_code(self.code)
            .with_type(self.type_url)
    }

    /// Problem with request context attached.
    pub fn with_context(
        &self,
        detail: impl Into<String>,
        instance: &str,
        trace_id: Option<String>,
    ) -> Problem {
        crate::finalize(self.as_problem(detail), instance, trace_id)
    }
}

pub const VALIDATION: ErrDef = ErrDef {
    status: 400,
    title: "Validation Failed",
    code: "CATALOG_VALIDATION",
    type_url: "urn:catalog:errors:validation",
};

pub const MALFORMED_BODY: ErrDef = ErrDef {
    status: 400,
    title: "Malformed Request Body",
    code: "CATALOG_MALFORMED_BODY",
    type_url: "urn:catalog:errors:malformed-body",
};

pub const OVERSIZED_FIELD: ErrDef = ErrDef {
    status: 400,
    title: "Field Too Large",
    code: "CATALOG_OVERSIZED_FIELD",
    type_url: "urn:catalog:errors:oversized-field",
};

pub const NOT_FOUND: ErrDef = ErrDef {
    status: 404,
    title: "Not Found",
    code: "CATALOG_NOT_FOUND",
    type_url: "urn:catalog:errors:not-found",
};

pub const UNKNOWN_LISTING: ErrDef = ErrDef {
    status: 404,
    title: "Unknown Listing",
    code: "CATALOG_UNKNOWN_LISTING",
    type_url: "urn:catalog:errors:unknown-listing",
};

pub const CONFLICT: ErrDef = ErrDef {
    status: 409,
    title: "Conflict",
    code: "CATALOG_CONFLICT",
    type_url: "urn:catalog:errors:conflict",
};

pub const CONFIGURATION: ErrDef = ErrDef {
    status: 500,
    title: "Backend Not Configured",
    code: "CATALOG_CONFIGURATION",
    type_url: "urn:catalog:errors:configuration",
};

pub const UPSTREAM_ASSET: ErrDef = ErrDef {
    status: 500,
    title: "Asset Upload Failed",
    code: "CATALOG_UPSTREAM_ASSET",
    type_url: "urn:catalog:errors:upstream-asset",
};

pub const STORAGE: ErrDef = ErrDef {
    status: 500,
    title: "Storage Failure",
    code: "CATALOG_STORAGE",
    type_url: "urn:catalog:errors:storage",
};

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn entries_render_their_status_and_code() {
        let problem = CONFLICT.as_problem("slug 'rust-101' already exists");
        assert_eq!(problem.status, StatusCode::CONFLICT);
        assert_eq!(problem.code, "CATALOG_CONFLICT");
        assert_eq!(problem.type_url, "urn:catalog:errors:conflict");
        assert_eq!(problem.detail, "slug 'rust-101' already exists");
    }

    #[test]
    fn context_is_attached() {
        let problem = NOT_FOUND.with_context("no such course", "/api/admin/courses/x", Some("t-1".to_owned()));
        assert_eq!(problem.instance, "/api/admin/courses/x");
        assert_eq!(problem.trace_id.as_deref(), Some("t-1"));
    }

    #[test]
    fn four_hundreds_stay_four_hundreds() {
        for def in [VALIDATION, MALFORMED_BODY, OVERSIZED_FIELD] {
            assert_eq!(def.as_problem("x").status, StatusCode::BAD_REQUEST);
        }
        for def in [CONFIGURATION, UPSTREAM_ASSET, STORAGE] {
            assert_eq!(def.as_problem("x").status, StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
