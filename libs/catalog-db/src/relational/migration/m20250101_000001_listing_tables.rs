use catalog_query::ListingKind;
use sea_orm_migration::prelude::*;

use super::{create_indexes, create_table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for kind in ListingKind::ALL {
            let schema = kind.schema();
            manager.create_table(create_table(schema)).await?;
            for index in create_indexes(schema) {
                manager.create_index(index).await?;
            }
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for kind in ListingKind::ALL {
            manager
                .drop_table(
                    Table::drop()
                        .table(Alias::new(kind.schema().collection))
                        .if_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}
