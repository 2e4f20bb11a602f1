use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use model::entities::{blog, product, user};

use crate::auth::AuthUser;
use crate::cache::{CacheKey, CachedData};
use crate::content::sanitize_html_upload;
use crate::schemas::{AppState, BlogResponse, ErrorResponse, MessageResponse};

/// Response wrapper for the all-blogs listing
#[derive(Debug, Serialize, ToSchema)]
pub struct BlogsListResponse {
    pub blogs_list: Vec<BlogResponse>,
}

/// Response wrapper for the per-product blog listing
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductBlogsResponse {
    pub product_blogs: Vec<BlogResponse>,
}

/// Get all active blogs (cached)
#[utoipa::path(
    get,
    path = "/api/v1/blogs",
    tag = "content",
    responses(
        (status = 200, description = "All active blogs", body = BlogsListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn all_blogs(
    State(state): State<AppState>,
) -> Result<Json<BlogsListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let cache_key = CacheKey::AllBlogs.key();

    if let Some(CachedData::Blogs(blogs)) = state.cache.get(&cache_key).await {
        debug!("All-blogs listing served from cache");
        return Ok(Json(BlogsListResponse { blogs_list: blogs }));
    }

    let blogs = match blog::Entity::find()
        .filter(blog::Column::Active.eq(true))
        .all(&state.db)
        .await
    {
        Ok(blogs) => blogs
            .into_iter()
            .map(BlogResponse::from)
            .collect::<Vec<_>>(),
        Err(e) => {
            error!("Failed to fetch blogs: {}", e);
            return Err(listing_failed());
        }
    };

    state
        .cache
        .insert(cache_key, CachedData::Blogs(blogs.clone()))
        .await;

    info!("All-blogs listing recomputed with {} rows", blogs.len());
    Ok(Json(BlogsListResponse { blogs_list: blogs }))
}

/// Get all blogs of one product (cached)
#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}/blogs",
    tag = "content",
    params(
        ("product_id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "The product's blogs", body = ProductBlogsResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn product_blogs(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ProductBlogsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let cache_key = CacheKey::ProductBlogs(product_id).key();

    if let Some(CachedData::Blogs(blogs)) = state.cache.get(&cache_key).await {
        debug!("Product {} blogs served from cache", product_id);
        return Ok(Json(ProductBlogsResponse {
            product_blogs: blogs,
        }));
    }

    match product::Entity::find_by_id(product_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Product with ID {} not found", product_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Product does not exist".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch product: {}", e);
            return Err(listing_failed());
        }
    }

    let blogs = match blog::Entity::find()
        .filter(blog::Column::ProductId.eq(product_id))
        .all(&state.db)
        .await
    {
        Ok(blogs) => blogs
            .into_iter()
            .map(BlogResponse::from)
            .collect::<Vec<_>>(),
        Err(e) => {
            error!("Failed to fetch product blogs: {}", e);
            return Err(listing_failed());
        }
    };

    state
        .cache
        .insert(cache_key, CachedData::Blogs(blogs.clone()))
        .await;

    info!(
        "Product {} blog listing recomputed with {} rows",
        product_id,
        blogs.len()
    );
    Ok(Json(ProductBlogsResponse {
        product_blogs: blogs,
    }))
}

fn listing_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to fetch blogs".to_string(),
        }),
    )
}

/// Parsed multipart payload shared by blog create and update
#[derive(Default)]
struct BlogForm {
    product_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    active: Option<String>,
    content_file: Option<(Option<String>, Vec<u8>)>,
}

async fn read_blog_form(
    multipart: &mut Multipart,
) -> Result<BlogForm, (StatusCode, Json<ErrorResponse>)> {
    let mut form = BlogForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read multipart field: {}", e);
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "Invalid form data".to_string(),
                    }),
                ));
            }
        };

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "content_file" {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| {
                warn!("Failed to read content file: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "Invalid form data".to_string(),
                    }),
                )
            })?;
            form.content_file = Some((content_type, bytes.to_vec()));
            continue;
        }

        let value = field.text().await.map_err(|e| {
            warn!("Failed to read multipart field '{}': {}", name, e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Invalid form data".to_string(),
                }),
            )
        })?;

        match name.as_str() {
            "product_id" => form.product_id = Some(value),
            "title" => form.title = Some(value),
            "description" => form.description = Some(value),
            "active" => form.active = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

fn sanitize_upload(
    content_file: (Option<String>, Vec<u8>),
) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    let (content_type, bytes) = content_file;
    sanitize_html_upload(content_type.as_deref(), &bytes).map_err(|e| {
        warn!("Rejected blog content upload: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })
}

/// Create a blog post for a product (store owners only)
///
/// Multipart form: `product_id`, `title`, `description`, and a `content_file`
/// HTML upload that is sanitized before it is stored.
#[utoipa::path(
    post,
    path = "/api/v1/blogs",
    tag = "content",
    responses(
        (status = 201, description = "Blog created", body = BlogResponse),
        (status = 400, description = "Missing fields or invalid content file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not a store owner", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, multipart))]
pub async fn create_blog(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BlogResponse>), (StatusCode, Json<ErrorResponse>)> {
    if caller.role != user::UserRole::StoreOwner {
        warn!("User {} attempted to create a blog", caller.id);
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only store owners can create blogs".to_string(),
            }),
        ));
    }

    let form = read_blog_form(&mut multipart).await?;

    let (Some(product_id), Some(title), Some(description), Some(content_file)) = (
        form.product_id,
        form.title,
        form.description,
        form.content_file,
    ) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "product_id, title, description, and content_file are required".to_string(),
            }),
        ));
    };

    let product_id = product_id.trim().parse::<i32>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "product_id must be a whole number".to_string(),
            }),
        )
    })?;

    let content = sanitize_upload(content_file)?;

    match product::Entity::find_by_id(product_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Product with ID {} not found", product_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Product does not exist".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch product: {}", e);
            return Err(blog_write_failed());
        }
    }

    let row = blog::ActiveModel {
        product_id: Set(product_id),
        title: Set(title),
        description: Set(description),
        content: Set(content),
        active: Set(true),
        ..Default::default()
    };

    let created = match row.insert(&state.db).await {
        Ok(created) => created,
        Err(e) => {
            error!("Failed to create blog: {}", e);
            return Err(blog_write_failed());
        }
    };

    CacheKey::AllBlogs.invalidate(&state.cache).await;
    CacheKey::ProductBlogs(product_id)
        .invalidate(&state.cache)
        .await;

    info!("Blog created with ID: {}", created.id);
    Ok((StatusCode::CREATED, Json(BlogResponse::from(created))))
}

/// Update a blog post (store owners only)
#[utoipa::path(
    put,
    path = "/api/v1/blogs/{blog_id}",
    tag = "content",
    params(
        ("blog_id" = i32, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog updated", body = BlogResponse),
        (status = 400, description = "Missing fields or invalid content file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not a store owner", body = ErrorResponse),
        (status = 404, description = "Blog not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, multipart))]
pub async fn update_blog(
    Path(blog_id): Path<i32>,
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<BlogResponse>, (StatusCode, Json<ErrorResponse>)> {
    if caller.role != user::UserRole::StoreOwner {
        warn!("User {} attempted to update a blog", caller.id);
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only store owners can update blogs".to_string(),
            }),
        ));
    }

    let form = read_blog_form(&mut multipart).await?;

    let (Some(title), Some(description), Some(content_file)) =
        (form.title, form.description, form.content_file)
    else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "title, description, and content_file are required".to_string(),
            }),
        ));
    };

    let active = match form.active.as_deref() {
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "active must be true or false".to_string(),
                }),
            ));
        }
        None => None,
    };

    let content = sanitize_upload(content_file)?;

    let existing = match blog::Entity::find_by_id(blog_id).one(&state.db).await {
        Ok(Some(blog)) => blog,
        Ok(None) => {
            warn!("Blog with ID {} not found", blog_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Blog not found".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch blog: {}", e);
            return Err(blog_write_failed());
        }
    };

    let product_id = existing.product_id;
    let mut row: blog::ActiveModel = existing.into();
    row.title = Set(title);
    row.description = Set(description);
    row.content = Set(content);
    if let Some(active) = active {
        row.active = Set(active);
    }

    let updated = match row.update(&state.db).await {
        Ok(updated) => updated,
        Err(e) => {
            error!("Failed to update blog: {}", e);
            return Err(blog_write_failed());
        }
    };

    CacheKey::AllBlogs.invalidate(&state.cache).await;
    CacheKey::ProductBlogs(product_id)
        .invalidate(&state.cache)
        .await;

    info!("Blog {} updated", blog_id);
    Ok(Json(BlogResponse::from(updated)))
}

/// Delete a blog post (store owners and admins)
#[utoipa::path(
    delete,
    path = "/api/v1/blogs/{blog_id}",
    tag = "content",
    params(
        ("blog_id" = i32, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is neither store owner nor admin", body = ErrorResponse),
        (status = 404, description = "Blog not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn delete_blog(
    Path(blog_id): Path<i32>,
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    // Deny only when the caller holds neither qualifying role
    if caller.role != user::UserRole::StoreOwner && caller.role != user::UserRole::Admin {
        warn!("User {} attempted to delete blog {}", caller.id, blog_id);
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only store owners and admins can delete blogs".to_string(),
            }),
        ));
    }

    let existing = match blog::Entity::find_by_id(blog_id).one(&state.db).await {
        Ok(Some(blog)) => blog,
        Ok(None) => {
            warn!("Blog with ID {} not found", blog_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Blog not found".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch blog: {}", e);
            return Err(blog_write_failed());
        }
    };

    let product_id = existing.product_id;
    if let Err(e) = blog::Entity::delete_by_id(blog_id).exec(&state.db).await {
        error!("Failed to delete blog {}: {}", blog_id, e);
        return Err(blog_write_failed());
    }

    // Comments cascade with the blog, so their listing goes too
    CacheKey::AllBlogs.invalidate(&state.cache).await;
    CacheKey::ProductBlogs(product_id)
        .invalidate(&state.cache)
        .await;
    CacheKey::BlogComments(blog_id)
        .invalidate(&state.cache)
        .await;

    info!("Blog {} deleted by user {}", blog_id, caller.id);
    Ok(Json(MessageResponse {
        message: "Blog deleted".to_string(),
    }))
}

fn blog_write_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to write blog".to_string(),
        }),
    )
}
