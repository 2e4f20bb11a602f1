use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use model::entities::{blog, cart_item, comment};

use crate::cache::ResponseCache;
use crate::config::AuthConfig;
use crate::media::MediaStore;
use crate::services::sms::CredentialNotifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for the hot list reads
    pub cache: ResponseCache,
    /// Token signing configuration
    pub auth: AuthConfig,
    /// Where uploaded files are written
    pub media: MediaStore,
    /// Out-of-band delivery channel for temporary credentials
    pub notifier: Arc<dyn CredentialNotifier>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// A blog post as returned by every blog listing and detail response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BlogResponse {
    pub id: i32,
    #[serde(rename = "product")]
    pub product_id: i32,
    pub title: String,
    pub description: String,
    pub content: String,
    pub active: bool,
}

impl From<blog::Model> for BlogResponse {
    fn from(model: blog::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            title: model.title,
            description: model.description,
            content: model.content,
            active: model.active,
        }
    }
}

/// A comment as returned by the per-blog comment listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    #[serde(rename = "blog")]
    pub blog_id: i32,
    #[serde(rename = "user")]
    pub user_id: i32,
    pub content: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            blog_id: model.blog_id,
            user_id: model.user_id,
            content: model.content,
        }
    }
}

/// A cart line item.
///
/// The wire names `card` and `order_time` predate this implementation and are
/// part of the public contract, so they are kept as serde renames.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: i32,
    #[serde(rename = "card")]
    pub cart_id: i32,
    #[serde(rename = "product")]
    pub product_id: i32,
    #[serde(rename = "order_time")]
    pub quantity: i32,
}

impl From<cart_item::Model> for CartItemResponse {
    fn from(model: cart_item::Model) -> Self {
        Self {
            id: model.id,
            cart_id: model.cart_id,
            product_id: model.product_id,
            quantity: model.quantity,
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::auth::verify_token,
        crate::handlers::auth::user_information,
        crate::handlers::auth::create_admin,
        crate::handlers::industries::list_industries,
        crate::handlers::products::search_products,
        crate::handlers::products::product_detail,
        crate::handlers::products::create_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::store_products,
        crate::handlers::blogs::all_blogs,
        crate::handlers::blogs::product_blogs,
        crate::handlers::blogs::create_blog,
        crate::handlers::blogs::update_blog,
        crate::handlers::blogs::delete_blog,
        crate::handlers::comments::blog_comments,
        crate::handlers::comments::create_comment,
        crate::handlers::comments::delete_comment,
        crate::handlers::cart::get_cart,
        crate::handlers::cart::add_to_cart,
        crate::handlers::cart::remove_from_cart,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            BlogResponse,
            CommentResponse,
            CartItemResponse,
            crate::auth::token::TokenPair,
            crate::handlers::health::HealthResponse,
            crate::handlers::auth::SignupRequest,
            crate::handlers::auth::SignupResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::VerifyResponse,
            crate::handlers::auth::UserInformationResponse,
            crate::handlers::auth::CreateAdminRequest,
            crate::handlers::auth::CreateAdminResponse,
            crate::handlers::auth::UserResponse,
            crate::handlers::auth::UserBrief,
            crate::handlers::industries::IndustryResponse,
            crate::handlers::industries::IndustriesResponse,
            crate::handlers::products::ProductSummaryResponse,
            crate::handlers::products::ProductDetailResponse,
            crate::handlers::products::ProductsResponse,
            crate::handlers::products::ProductDetailEnvelope,
            crate::handlers::blogs::BlogsListResponse,
            crate::handlers::blogs::ProductBlogsResponse,
            crate::handlers::comments::CommentsResponse,
            crate::handlers::comments::CreateCommentRequest,
            crate::handlers::cart::CartResponse,
            crate::handlers::cart::AddToCartRequest,
            crate::handlers::cart::RemoveFromCartRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Signup, login, and token endpoints"),
        (name = "catalog", description = "Industries and product endpoints"),
        (name = "content", description = "Blog and comment endpoints"),
        (name = "cart", description = "Shopping cart endpoints"),
    ),
    info(
        title = "Souk API",
        description = "Multi-tenant marketplace backend: identity, catalog, blog content, and carts",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
