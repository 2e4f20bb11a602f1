//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the marketplace backend here: identity,
//! catalog, content, and cart tables.

pub mod blog;
pub mod cart;
pub mod cart_item;
pub mod comment;
pub mod file_type;
pub mod industry;
pub mod main_image;
pub mod product;
pub mod product_color;
pub mod product_image;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::blog::Entity as Blog;
    pub use super::cart::Entity as Cart;
    pub use super::cart_item::Entity as CartItem;
    pub use super::comment::Entity as Comment;
    pub use super::file_type::Entity as FileType;
    pub use super::industry::Entity as Industry;
    pub use super::main_image::Entity as MainImage;
    pub use super::product::Entity as Product;
    pub use super::product_color::Entity as ProductColor;
    pub use super::product_image::Entity as ProductImage;
    pub use super::user::Entity as User;
}
