//! Listings module
//!
//! Public and admin access to the catalog's four listing types, backed by
//! whichever relational or document store each type is bound to.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod module;
pub use module::ListingsModule;

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use config::ListingsConfig;
pub use domain::error::DomainError;
pub use domain::service::ListingService;
