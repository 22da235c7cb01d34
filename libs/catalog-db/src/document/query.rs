//! [`ListingFilter`] → document filter.
//!
//! The dialect is the familiar operator-object one:
//!
//! | construct | meaning |
//! |---|---|
//! | `{"$and": [..]}` / `{"$or": [..]}` | conjunction / disjunction |
//! | `{"col": {"$in": [..]}}` | membership; array fields match on any element |
//! | `{"col": "v"}` | equality |
//! | `{"col": {"$regex": ".."}}` | substring |
//!
//! Search matches the folded [`SEARCH_COLUMN`] with a needle folded the same
//! way, regex-escaped so it always matches literally.

use catalog_query::{
    ListingFilter, ListingSchema, PUBLIC_VISIBILITY, SEARCH_COLUMN, SortDir, SpecView, VISIBILITY_COLUMN, Visibility,
    fold,
};
use serde_json::{Value, json};

/// Compiled document listing query.
#[derive(Debug, Clone)]
pub struct DocumentQuery {
    pub schema: &'static ListingSchema,
    pub filter: Value,
    pub sort: Vec<(String, SortDir)>,
    pub skip: u64,
    pub limit: u64,
}

impl DocumentQuery {
    #[must_use]
    pub fn compile(filter: &ListingFilter) -> Self {
        Self::from_view(&filter.view())
    }

    #[must_use]
    pub fn from_view(view: &SpecView<'_>) -> Self {
        let mut clauses = Vec::new();

        if view.visibility == Visibility::Public {
            clauses.push(json!({ VISIBILITY_COLUMN: PUBLIC_VISIBILITY }));
        }

        for facet in &view.facets {
            clauses.push(json!({ facet.column: { "$in": facet.values } }));
        }

        if let Some(search) = view.search {
            clauses.push(json!({ SEARCH_COLUMN: { "$regex": regex::escape(&fold(search)) } }));
        }

        let filter = if clauses.is_empty() {
            json!({})
        } else {
            json!({ "$and": clauses })
        };

        Self {
            schema: view.schema,
            filter,
            sort: view
                .order
                .keys()
                .map(|k| (k.column.to_owned(), k.dir))
                .collect(),
            skip: view.offset(),
            limit: view.limit,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &'static str {
        self.schema.collection
    }
}
