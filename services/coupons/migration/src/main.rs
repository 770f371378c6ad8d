use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(linkdrop_coupons_migration::Migrator).await;
}
