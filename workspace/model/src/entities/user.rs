use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role assigned to an account at creation time. Normal flows never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "store_owner")]
    StoreOwner,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// Wire name of the role, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::StoreOwner => "store_owner",
            UserRole::Admin => "admin",
        }
    }
}

/// A registered account: customer, store owner, or admin.
///
/// Store-owner-only fields (`store_name`, `store_description`, `store_logo`,
/// `industry_id`) stay `None` for the other roles.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub phone_number: Option<String>,
    #[sea_orm(unique)]
    pub email: Option<String>,
    /// Ten-digit national identity code, when provided at signup.
    #[sea_orm(unique)]
    pub national_code: Option<String>,
    /// Argon2id hash, never the raw password.
    pub password_hash: String,
    pub role: UserRole,
    /// Inactive accounts fail token resolution.
    #[sea_orm(default_value = "true")]
    pub active: bool,
    pub store_name: Option<String>,
    pub store_description: Option<String>,
    /// Media-store path of the uploaded logo.
    pub store_logo: Option<String>,
    pub industry_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Store owners list products under their own account.
    #[sea_orm(has_many = "super::product::Entity")]
    Product,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    /// At most one cart per user, created lazily.
    #[sea_orm(has_one = "super::cart::Entity")]
    Cart,
    #[sea_orm(
        belongs_to = "super::industry::Entity",
        from = "Column::IndustryId",
        to = "super::industry::Column::Id"
    )]
    Industry,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl Related<super::industry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Industry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
