use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PathType::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PathType::Vendor).string_len(64).not_null())
                    .col(ColumnDef::new(PathType::Plugin).string_len(64).not_null())
                    .col(ColumnDef::new(PathType::Path).string_len(191).not_null())
                    .col(ColumnDef::new(PathType::StorageType).string_len(10).not_null())
                    .col(
                        ColumnDef::new(PathType::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(PathType::Vendor)
                            .col(PathType::Plugin)
                            .col(PathType::Path),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PathType::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PathType {
    #[sea_orm(iden = "scoped_settings_path_type")]
    Table,
    Vendor,
    Plugin,
    Path,
    StorageType,
    UpdatedAt,
}
