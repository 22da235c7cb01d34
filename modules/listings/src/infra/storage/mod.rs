pub mod document_repo;
pub mod relational_repo;

pub use document_repo::DocumentListingRepository;
pub use relational_repo::RelationalListingRepository;
