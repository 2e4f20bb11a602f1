pub mod auth;
pub mod blogs;
pub mod cart;
pub mod comments;
pub mod health;
pub mod industries;
pub mod products;
