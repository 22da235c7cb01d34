//! Error data types shared by the catalog crates.
//!
//! Pure data, no HTTP framework required unless the `axum` feature is on:
//! - RFC 9457 Problem Details (`Problem`)
//! - The static error catalog (`ErrDef` and the entries in [`catalog`])
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod problem;

pub use catalog::ErrDef;
pub use problem::{APPLICATION_PROBLEM_JSON, FieldViolation, Problem};

/// Attach the request path and optional trace id to a Problem.
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    p = p.with_instance(instance);
    if let Some(tid) = trace_id {
        p = p.with_trace_id(tid);
    }
    p
}
