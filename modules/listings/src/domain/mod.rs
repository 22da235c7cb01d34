pub mod error;
pub mod media;
pub mod repo;
pub mod service;
pub mod upsert;

#[cfg(test)]
mod service_test;
