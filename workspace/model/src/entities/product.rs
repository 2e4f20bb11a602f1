use rust_decimal::Decimal;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Discriminant for the two product kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ProductType {
    #[sea_orm(string_value = "Physical")]
    Physical,
    #[sea_orm(string_value = "Digital")]
    Digital,
}

/// The kind-specific attribute group of a product.
///
/// Storage keeps the two groups as nullable columns, but rows are only ever
/// built from this enum (`new_row`), so a product cannot carry both physical
/// dimensions and a digital file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAttributes {
    Physical {
        length: i32,
        width: i32,
        weight: i32,
        color_id: i32,
    },
    Digital {
        size: i32,
        file_type_id: i32,
    },
}

impl ProductAttributes {
    pub fn product_type(&self) -> ProductType {
        match self {
            ProductAttributes::Physical { .. } => ProductType::Physical,
            ProductAttributes::Digital { .. } => ProductType::Digital,
        }
    }
}

/// A catalog product owned by exactly one store owner.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub industry_id: Option<i32>,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: Decimal,
    pub product_type: ProductType,
    /// Hidden from public listings when false; the owner still sees it.
    #[sea_orm(default_value = "true")]
    pub active: bool,
    pub length: Option<i32>,
    pub width: Option<i32>,
    pub weight: Option<i32>,
    pub color_id: Option<i32>,
    pub size: Option<i32>,
    pub file_type_id: Option<i32>,
}

impl Model {
    /// Reconstructs the attribute group from the stored columns.
    ///
    /// Returns `None` for a row whose kind columns are incomplete, which
    /// cannot happen for rows created through `new_row`.
    pub fn attributes(&self) -> Option<ProductAttributes> {
        match self.product_type {
            ProductType::Physical => Some(ProductAttributes::Physical {
                length: self.length?,
                width: self.width?,
                weight: self.weight?,
                color_id: self.color_id?,
            }),
            ProductType::Digital => Some(ProductAttributes::Digital {
                size: self.size?,
                file_type_id: self.file_type_id?,
            }),
        }
    }
}

/// Builds a new product row from the common fields and one attribute group.
pub fn new_row(
    owner_id: i32,
    industry_id: Option<i32>,
    title: String,
    description: String,
    price: Decimal,
    attributes: ProductAttributes,
) -> ActiveModel {
    let mut row = ActiveModel {
        owner_id: Set(owner_id),
        industry_id: Set(industry_id),
        title: Set(title),
        description: Set(description),
        price: Set(price),
        product_type: Set(attributes.product_type()),
        active: Set(true),
        length: Set(None),
        width: Set(None),
        weight: Set(None),
        color_id: Set(None),
        size: Set(None),
        file_type_id: Set(None),
        ..Default::default()
    };
    match attributes {
        ProductAttributes::Physical {
            length,
            width,
            weight,
            color_id,
        } => {
            row.length = Set(Some(length));
            row.width = Set(Some(width));
            row.weight = Set(Some(weight));
            row.color_id = Set(Some(color_id));
        }
        ProductAttributes::Digital { size, file_type_id } => {
            row.size = Set(Some(size));
            row.file_type_id = Set(Some(file_type_id));
        }
    }
    row
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::industry::Entity",
        from = "Column::IndustryId",
        to = "super::industry::Column::Id"
    )]
    Industry,
    #[sea_orm(
        belongs_to = "super::product_color::Entity",
        from = "Column::ColorId",
        to = "super::product_color::Column::Id"
    )]
    Color,
    #[sea_orm(
        belongs_to = "super::file_type::Entity",
        from = "Column::FileTypeId",
        to = "super::file_type::Column::Id"
    )]
    FileType,
    #[sea_orm(has_many = "super::product_image::Entity")]
    ProductImage,
    #[sea_orm(has_one = "super::main_image::Entity")]
    MainImage,
    #[sea_orm(has_many = "super::blog::Entity")]
    Blog,
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItem,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::industry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Industry.def()
    }
}

impl Related<super::product_color::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Color.def()
    }
}

impl Related<super::file_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileType.def()
    }
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductImage.def()
    }
}

impl Related<super::main_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MainImage.def()
    }
}

impl Related<super::blog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blog.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
