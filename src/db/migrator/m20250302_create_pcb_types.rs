use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(PcbTypes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Search filters on name; the list view orders by id (already the PK).
        manager
            .create_index(
                Index::create()
                    .name("idx_pcb_types_name")
                    .table(PcbTypes)
                    .col(crate::entities::pcb_types::Column::Name)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PcbTypes).to_owned())
            .await?;

        Ok(())
    }
}
