use crate::handlers::{
    auth::{create_admin, login, signup, user_information, verify_token},
    blogs::{all_blogs, create_blog, delete_blog, product_blogs, update_blog},
    cart::{add_to_cart, get_cart, remove_from_cart},
    comments::{blog_comments, create_comment, delete_comment},
    health::health_check,
    industries::list_industries,
    products::{create_product, delete_product, product_detail, search_products, store_products},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Auth routes
        .route("/api/v1/auth/signup", post(signup))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/verify", post(verify_token))
        .route("/api/v1/auth/me", get(user_information))
        .route("/api/v1/auth/admins", post(create_admin))
        // Catalog routes
        .route("/api/v1/industries", get(list_industries))
        .route("/api/v1/products/search", get(search_products))
        .route("/api/v1/products", post(create_product))
        .route("/api/v1/products/:product_id", get(product_detail))
        .route("/api/v1/products/:product_id", delete(delete_product))
        .route("/api/v1/stores/:store_id/products", get(store_products))
        // Blog and comment routes
        .route("/api/v1/blogs", get(all_blogs))
        .route("/api/v1/blogs", post(create_blog))
        .route("/api/v1/blogs/:blog_id", put(update_blog))
        .route("/api/v1/blogs/:blog_id", delete(delete_blog))
        .route("/api/v1/products/:product_id/blogs", get(product_blogs))
        .route("/api/v1/blogs/:blog_id/comments", get(blog_comments))
        .route("/api/v1/comments", post(create_comment))
        .route("/api/v1/comments/:comment_id", delete(delete_comment))
        // Cart routes
        .route("/api/v1/cart", get(get_cart))
        .route("/api/v1/cart/add", post(add_to_cart))
        .route("/api/v1/cart/remove", delete(remove_from_cart))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Multipart product uploads carry a few images at up to 2 MiB each
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
