use sea_orm::entity::prelude::*;

/// Single-use coupon code bound to a claim link.
/// `code` is unique; the claim fields are written once by the conditional claim update.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_type = "Text")]
    pub claim_link: String,
    pub name: String,
    pub is_claimed: bool,
    pub claimed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub claimed_ip: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub claimed_user_agent: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_by: String,
    /// `added` | `imported` | `generated`
    pub source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
