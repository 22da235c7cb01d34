use catalog_query::{ListingKind, SEARCH_COLUMN};
use sea_orm_migration::prelude::*;

use super::add_search_column;
use crate::relational::exec::backfill_search_text;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for kind in ListingKind::ALL {
            let schema = kind.schema();
            if !manager.has_column(schema.collection, SEARCH_COLUMN).await? {
                manager.alter_table(add_search_column(schema)).await?;
            }
            backfill_search_text(manager.get_connection(), schema).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for kind in ListingKind::ALL {
            manager
                .alter_table(
                    Table::alter()
                        .table(Alias::new(kind.schema().collection))
                        .drop_column(Alias::new(SEARCH_COLUMN))
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}
