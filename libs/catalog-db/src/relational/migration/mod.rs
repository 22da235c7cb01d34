//! Listing tables, one per domain, derived from the schema field lists.

use catalog_query::{FieldAccess, FieldDef, FieldKind, ListingSchema, SEARCH_COLUMN, TIEBREAKER, VISIBILITY_COLUMN};
use sea_orm_migration::prelude::*;

/// Strings longer than this are stored as unbounded text.
const VARCHAR_LIMIT: usize = 2048;
/// RFC 3339 with millisecond precision fits comfortably.
const TIMESTAMP_LEN: u32 = 40;

mod m20250101_000001_listing_tables;
mod m20250601_000002_search_text;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_listing_tables::Migration),
            Box::new(m20250601_000002_search_text::Migration),
        ]
    }
}

fn column_def(field: &FieldDef) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(field.column));
    match field.kind {
        FieldKind::String => match field.max_len {
            Some(len) if len <= VARCHAR_LIMIT => {
                def.string_len(<u32 as TryFrom<usize>>::try_from(len).unwrap_or(u32::MAX));
            }
            _ => {
                def.text();
            }
        },
        FieldKind::I64 => {
            def.big_integer().default(0);
        }
        FieldKind::F64 => {
            def.double().default(0.0);
        }
        FieldKind::Bool => {
            def.boolean().default(false);
        }
        FieldKind::DateTimeUtc => {
            def.string_len(TIMESTAMP_LEN);
        }
        FieldKind::Composite(_) => {
            def.text();
        }
    }
    if field.column == TIEBREAKER {
        def.not_null().primary_key();
    } else if field.required || field.access == FieldAccess::System {
        def.not_null();
    } else {
        def.null();
    }
    def
}

/// `CREATE TABLE IF NOT EXISTS` for one listing domain.
#[must_use]
pub fn create_table(schema: &ListingSchema) -> TableCreateStatement {
    let mut table = Table::create();
    table.table(Alias::new(schema.collection)).if_not_exists();
    for field in schema.fields {
        table.col(column_def(field));
    }
    table.to_owned()
}

/// Nullable text column holding the folded search material.
#[must_use]
pub fn add_search_column(schema: &ListingSchema) -> TableAlterStatement {
    Table::alter()
        .table(Alias::new(schema.collection))
        .add_column(ColumnDef::new(Alias::new(SEARCH_COLUMN)).text().null())
        .to_owned()
}

/// Unique indexes plus the visibility index public listings filter on.
#[must_use]
pub fn create_indexes(schema: &ListingSchema) -> Vec<IndexCreateStatement> {
    let mut out: Vec<IndexCreateStatement> = schema
        .unique
        .iter()
        .map(|col| {
            Index::create()
                .name(format!("idx_{}_{col}", schema.collection))
                .table(Alias::new(schema.collection))
                .col(Alias::new(*col))
                .unique()
                .if_not_exists()
                .to_owned()
        })
        .collect();
    out.push(
        Index::create()
            .name(format!("idx_{}_{VISIBILITY_COLUMN}", schema.collection))
            .table(Alias::new(schema.collection))
            .col(Alias::new(VISIBILITY_COLUMN))
            .if_not_exists()
            .to_owned(),
    );
    out
}
