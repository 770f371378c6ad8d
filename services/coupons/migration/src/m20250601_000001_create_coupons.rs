use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Coupons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Coupons::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Coupons::Code)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Coupons::ClaimLink).text().not_null())
                    .col(
                        ColumnDef::new(Coupons::Name)
                            .string()
                            .not_null()
                            .default("general"),
                    )
                    .col(
                        ColumnDef::new(Coupons::IsClaimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Coupons::ClaimedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Coupons::ClaimedIp).string())
                    .col(ColumnDef::new(Coupons::ClaimedUserAgent).text())
                    .col(
                        ColumnDef::new(Coupons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Coupons::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Coupons::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Coupons::Source)
                            .string_len(16)
                            .not_null()
                            .default("added"),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing and analytics filter by owner and sort by creation time.
        manager
            .create_index(
                Index::create()
                    .table(Coupons::Table)
                    .col(Coupons::CreatedBy)
                    .col(Coupons::CreatedAt)
                    .name("idx_coupons_created_by_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Coupons::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Coupons {
    Table,
    Id,
    Code,
    ClaimLink,
    Name,
    IsClaimed,
    ClaimedAt,
    ClaimedIp,
    ClaimedUserAgent,
    CreatedAt,
    ExpiresAt,
    CreatedBy,
    Source,
}
