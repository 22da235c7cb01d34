//! Static description of one listing domain.
//!
//! A schema is the closed enumeration every other layer compiles from: the
//! write whitelist, the searchable columns, the sort table and the paging
//! constants. Nothing in a compiled query comes from anywhere else.

use crate::field::{FieldDef, FieldKind};
use crate::kind::ListingKind;
use crate::sort::{SortDir, SortKey, SortOrder, SortRule};

/// Column every ordering ends with.
pub const TIEBREAKER: &str = "id";
pub const VISIBILITY_COLUMN: &str = "visibility";
pub const PUBLIC_VISIBILITY: &str = "public";

#[derive(Debug)]
pub struct ListingSchema {
    pub kind: ListingKind,
    /// Table or collection name.
    pub collection: &'static str,
    pub fields: &'static [FieldDef],
    /// Columns matched by free-text search, OR-combined.
    pub search: &'static [&'static str],
    /// First entry is the default.
    pub sorts: &'static [SortRule],
    pub default_limit: u64,
    pub max_limit: u64,
    /// Field that may carry an inline `data:` asset.
    pub asset_field: Option<&'static str>,
    /// Columns backed by a unique index.
    pub unique: &'static [&'static str],
}

impl ListingSchema {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn field_by_column(&self, column: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.column == column)
    }

    pub fn writable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_writable())
    }

    pub fn composite_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Composite(_)))
    }

    #[must_use]
    pub fn supports_sort(&self, key: SortKey) -> bool {
        self.sorts.iter().any(|r| r.key == key)
    }

    #[must_use]
    pub fn default_sort(&self) -> SortKey {
        self.sorts.first().map_or(SortKey::Newest, |r| r.key)
    }

    /// Deterministic ordering for `key`, falling back to the default rule.
    pub fn order_for(&self, key: SortKey) -> SortOrder {
        let rule = self
            .sorts
            .iter()
            .find(|r| r.key == key)
            .or_else(|| self.sorts.first());
        rule.map_or_else(SortOrder::default, SortOrder::from_rule)
            .ensure_tiebreaker(TIEBREAKER, SortDir::Desc)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::field::FieldAccess;

    #[test]
    fn every_schema_has_system_columns_and_a_default_sort() {
        for kind in ListingKind::ALL {
            let schema = kind.schema();
            assert_eq!(schema.kind, *kind);
            assert_eq!(schema.collection, kind.as_str());
            for system in ["id", "createdAt", "updatedAt"] {
                let f = schema.field(system).unwrap();
                assert_eq!(f.access, FieldAccess::System, "{kind}.{system}");
            }
            assert!(schema.field("visibility").is_some());
            assert!(!schema.sorts.is_empty());
            assert!(schema.default_limit <= schema.max_limit);
        }
    }

    #[test]
    fn search_and_sort_columns_are_declared_fields() {
        for kind in ListingKind::ALL {
            let schema = kind.schema();
            for col in schema.search {
                assert!(schema.field_by_column(col).is_some(), "{kind}: search {col}");
            }
            for rule in schema.sorts {
                for key in rule.order {
                    assert!(schema.field_by_column(key.column).is_some(), "{kind}: sort {}", key.column);
                }
            }
            for col in schema.unique {
                assert!(schema.field_by_column(col).is_some());
            }
        }
    }

    #[test]
    fn unknown_sort_falls_back_to_default_rule() {
        let schema = ListingKind::Jobs.schema();
        assert!(!schema.supports_sort(SortKey::PriceLow));
        assert_eq!(schema.order_for(SortKey::PriceLow), schema.order_for(schema.default_sort()));
    }

    #[test]
    fn orderings_end_with_tiebreaker() {
        for kind in ListingKind::ALL {
            let schema = kind.schema();
            for rule in schema.sorts {
                let order = schema.order_for(rule.key);
                assert_eq!(order.0.last().map(|k| k.column), Some(TIEBREAKER));
            }
        }
    }
}
