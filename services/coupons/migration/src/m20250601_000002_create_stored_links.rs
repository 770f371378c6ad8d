use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StoredLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StoredLinks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StoredLinks::Link).text().not_null())
                    .col(
                        ColumnDef::new(StoredLinks::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(StoredLinks::UsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(StoredLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StoredLinks::CreatedBy).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Pool reservation scans the owner's unused links in import order.
        manager
            .create_index(
                Index::create()
                    .table(StoredLinks::Table)
                    .col(StoredLinks::CreatedBy)
                    .col(StoredLinks::IsUsed)
                    .col(StoredLinks::CreatedAt)
                    .name("idx_stored_links_created_by_is_used")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StoredLinks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StoredLinks {
    Table,
    Id,
    Link,
    IsUsed,
    UsedAt,
    CreatedAt,
    CreatedBy,
}
