use std::str::FromStr;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use model::entities::{
    blog, cart, cart_item, file_type, main_image, product, product_color, product_image, user,
};

use crate::auth::{AuthUser, resolve_bearer};
use crate::cache::CacheKey;
use crate::schemas::{AppState, ErrorResponse, MessageResponse};

/// Summarized product row for listings
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummaryResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    #[serde(rename = "industry")]
    pub industry_id: Option<i32>,
    #[schema(value_type = String)]
    pub product_type: product::ProductType,
    #[serde(rename = "type_of_file")]
    pub file_type_id: Option<i32>,
    pub size: Option<i32>,
}

impl From<product::Model> for ProductSummaryResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            industry_id: model.industry_id,
            product_type: model.product_type,
            file_type_id: model.file_type_id,
            size: model.size,
        }
    }
}

/// Full product payload with lookup names resolved and the image gallery
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailResponse {
    pub id: i32,
    #[serde(rename = "owner")]
    pub owner_id: i32,
    #[serde(rename = "industry")]
    pub industry_id: Option<i32>,
    pub title: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub product_type: product::ProductType,
    pub active: bool,
    pub length: Option<i32>,
    pub width: Option<i32>,
    pub weight: Option<i32>,
    pub color: Option<String>,
    pub size: Option<i32>,
    pub type_of_file: Option<String>,
    pub images: Vec<String>,
    pub main_image: Option<String>,
}

/// Response wrapper for product listings
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductsResponse {
    pub products: Vec<ProductSummaryResponse>,
}

/// Response wrapper for the product detail endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailEnvelope {
    pub product_detail: ProductDetailResponse,
}

/// Query parameters for the public product search
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ProductSearchQuery {
    /// "physical" or "digital" (case-insensitive)
    pub product_type: Option<String>,
    /// Industry id
    pub industry: Option<i32>,
    /// Case-insensitive title substring
    pub title: Option<String>,
    /// Digital products only: file type name
    pub type_of_file: Option<String>,
}

/// Search active products by kind, industry, and title
#[utoipa::path(
    get,
    path = "/api/v1/products/search",
    tag = "catalog",
    params(ProductSearchQuery),
    responses(
        (status = 200, description = "Filtered list of active products", body = ProductsResponse),
        (status = 400, description = "Missing or invalid filter parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn search_products(
    Query(query): Query<ProductSearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (Some(product_type), Some(industry_id)) = (query.product_type.as_deref(), query.industry)
    else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "'product_type' and 'industry' are required parameters.".to_string(),
            }),
        ));
    };

    let kind = if product_type.eq_ignore_ascii_case("physical") {
        product::ProductType::Physical
    } else if product_type.eq_ignore_ascii_case("digital") {
        product::ProductType::Digital
    } else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid 'product_type' provided. Must be 'Physical' or 'Digital'."
                    .to_string(),
            }),
        ));
    };

    let mut finder = product::Entity::find()
        .filter(product::Column::Active.eq(true))
        .filter(product::Column::ProductType.eq(kind))
        .filter(product::Column::IndustryId.eq(industry_id));

    // File-type filtering only applies to digital products
    if kind == product::ProductType::Digital {
        if let Some(type_of_file) = query.type_of_file.as_deref() {
            let file_type = match file_type::Entity::find()
                .filter(file_type::Column::Name.eq(type_of_file))
                .one(&state.db)
                .await
            {
                Ok(Some(file_type)) => file_type,
                Ok(None) => {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse {
                            error: "Invalid file type".to_string(),
                        }),
                    ));
                }
                Err(e) => {
                    error!("Failed to resolve file type filter: {}", e);
                    return Err(search_failed());
                }
            };
            finder = finder.filter(product::Column::FileTypeId.eq(file_type.id));
        }
    }

    if let Some(title) = query.title.as_deref() {
        finder = finder.filter(
            Expr::expr(Func::lower(Expr::col(product::Column::Title)))
                .like(format!("%{}%", title.to_lowercase())),
        );
    }

    match finder.all(&state.db).await {
        Ok(products) => {
            info!("Product search returned {} rows", products.len());
            Ok(Json(ProductsResponse {
                products: products
                    .into_iter()
                    .map(ProductSummaryResponse::from)
                    .collect(),
            }))
        }
        Err(e) => {
            error!("Product search failed: {}", e);
            Err(search_failed())
        }
    }
}

fn search_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to search products".to_string(),
        }),
    )
}

/// Get full details of one product
#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}",
    tag = "catalog",
    params(
        ("product_id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product details", body = ProductDetailEnvelope),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn product_detail(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ProductDetailEnvelope>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Fetching product with ID: {}", product_id);

    let product = match product::Entity::find_by_id(product_id).one(&state.db).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            warn!("Product with ID {} not found", product_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Product not found".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch product: {}", e);
            return Err(detail_failed());
        }
    };

    match product_detail_payload(&state.db, product).await {
        Ok(detail) => Ok(Json(ProductDetailEnvelope {
            product_detail: detail,
        })),
        Err(e) => {
            error!("Failed to assemble product detail: {}", e);
            Err(detail_failed())
        }
    }
}

fn detail_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to fetch product".to_string(),
        }),
    )
}

/// One parsed multipart upload
struct UploadedImage {
    name: String,
    bytes: Vec<u8>,
}

/// Text fields and image files of the product creation form
#[derive(Default)]
struct ProductForm {
    product_title: Option<String>,
    product_price: Option<String>,
    description: Option<String>,
    product_type: Option<String>,
    industry: Option<String>,
    length: Option<String>,
    width: Option<String>,
    weight: Option<String>,
    color: Option<String>,
    size: Option<String>,
    type_of_file: Option<String>,
    images: Vec<UploadedImage>,
}

async fn read_product_form(
    multipart: &mut Multipart,
) -> Result<ProductForm, (StatusCode, Json<ErrorResponse>)> {
    let mut form = ProductForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read multipart field: {}", e);
                return Err(invalid_form_data());
            }
        };

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "images" {
            let file_name = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| "image".to_string());
            let bytes = field.bytes().await.map_err(|e| {
                warn!("Failed to read image upload: {}", e);
                invalid_form_data()
            })?;
            form.images.push(UploadedImage {
                name: file_name,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await.map_err(|e| {
            warn!("Failed to read multipart field '{}': {}", name, e);
            invalid_form_data()
        })?;

        match name.as_str() {
            "product_title" => form.product_title = Some(value),
            "product_price" => form.product_price = Some(value),
            "description" => form.description = Some(value),
            "product_type" => form.product_type = Some(value),
            "industry" => form.industry = Some(value),
            "length" => form.length = Some(value),
            "width" => form.width = Some(value),
            "weight" => form.weight = Some(value),
            "color" => form.color = Some(value),
            "size" => form.size = Some(value),
            "type_of_file" => form.type_of_file = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

fn invalid_form_data() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Invalid form data".to_string(),
        }),
    )
}

fn parse_whole_number(value: &str) -> Result<i32, (StatusCode, Json<ErrorResponse>)> {
    value.trim().parse::<i32>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "length, width, weight, and size must be whole numbers".to_string(),
            }),
        )
    })
}

/// Create a product (store owners only)
///
/// Multipart form with the common fields (`product_title`, `product_price`,
/// `product_type`), the kind-specific fields, and one or more `images`
/// files. The first uploaded image becomes the product's main image.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "catalog",
    responses(
        (status = 201, description = "Product created", body = ProductDetailResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not a store owner", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, owner, multipart))]
pub async fn create_product(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProductDetailResponse>), (StatusCode, Json<ErrorResponse>)> {
    if owner.role != user::UserRole::StoreOwner {
        warn!("User {} attempted to create a product", owner.id);
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only store owners can create products".to_string(),
            }),
        ));
    }

    let form = read_product_form(&mut multipart).await?;

    let (Some(title), Some(price), Some(product_type)) = (
        form.product_title.clone(),
        form.product_price.clone(),
        form.product_type.clone(),
    ) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "product_title, product_price, and product_type are required".to_string(),
            }),
        ));
    };

    let price = Decimal::from_str(price.trim()).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "product_price must be a number".to_string(),
            }),
        )
    })?;

    // Each kind validates its own field group before anything is written
    let (description, attributes) = if product_type.eq_ignore_ascii_case("physical") {
        let (Some(description), Some(length), Some(width), Some(weight), Some(color)) = (
            form.description.clone(),
            form.length.clone(),
            form.width.clone(),
            form.weight.clone(),
            form.color.clone(),
        ) else {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "description, length, width, weight, color are required for physical products"
                        .to_string(),
                }),
            ));
        };

        let color = match product_color::Entity::find()
            .filter(product_color::Column::Name.eq(color.as_str()))
            .one(&state.db)
            .await
        {
            Ok(Some(color)) => color,
            Ok(None) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "Invalid color".to_string(),
                    }),
                ));
            }
            Err(e) => {
                error!("Failed to resolve color: {}", e);
                return Err(creation_failed());
            }
        };

        (
            description,
            product::ProductAttributes::Physical {
                length: parse_whole_number(&length)?,
                width: parse_whole_number(&width)?,
                weight: parse_whole_number(&weight)?,
                color_id: color.id,
            },
        )
    } else if product_type.eq_ignore_ascii_case("digital") {
        let (Some(size), Some(type_of_file)) = (form.size.clone(), form.type_of_file.clone())
        else {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "size and type_of_file are required for digital products".to_string(),
                }),
            ));
        };

        let file_type = match file_type::Entity::find()
            .filter(file_type::Column::Name.eq(type_of_file.as_str()))
            .one(&state.db)
            .await
        {
            Ok(Some(file_type)) => file_type,
            Ok(None) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "Invalid file type".to_string(),
                    }),
                ));
            }
            Err(e) => {
                error!("Failed to resolve file type: {}", e);
                return Err(creation_failed());
            }
        };

        (
            form.description.clone().unwrap_or_default(),
            product::ProductAttributes::Digital {
                size: parse_whole_number(&size)?,
                file_type_id: file_type.id,
            },
        )
    } else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid product type".to_string(),
            }),
        ));
    };

    if form.images.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "At least one image is required".to_string(),
            }),
        ));
    }

    let industry_id = match form.industry.as_deref() {
        Some(raw) => Some(raw.trim().parse::<i32>().map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "industry must be a whole number".to_string(),
                }),
            )
        })?),
        None => None,
    };

    let created = match product::new_row(
        owner.id,
        industry_id,
        title,
        description,
        price,
        attributes,
    )
    .insert(&state.db)
    .await
    {
        Ok(created) => created,
        Err(e) => {
            error!("Failed to create product: {}", e);
            return Err(creation_failed());
        }
    };

    // Persist the gallery; the first stored image is designated the cover
    let mut first_image_id = None;
    for upload in &form.images {
        let path = match state
            .media
            .store_image("product_images", &upload.name, &upload.bytes)
            .await
        {
            Ok(path) => path,
            Err(e) => {
                warn!("Rejected product image upload: {}", e);
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: e.to_string(),
                    }),
                ));
            }
        };

        let image_row = product_image::ActiveModel {
            product_id: Set(created.id),
            image: Set(path),
            ..Default::default()
        };
        match image_row.insert(&state.db).await {
            Ok(row) => {
                if first_image_id.is_none() {
                    first_image_id = Some(row.id);
                }
            }
            Err(e) => {
                error!("Failed to record product image: {}", e);
                return Err(creation_failed());
            }
        }
    }

    if let Some(image_id) = first_image_id {
        let main_row = main_image::ActiveModel {
            product_id: Set(created.id),
            product_image_id: Set(image_id),
            ..Default::default()
        };
        if let Err(e) = main_row.insert(&state.db).await {
            error!("Failed to designate main image: {}", e);
            return Err(creation_failed());
        }
    }

    info!("Product created with ID: {}", created.id);
    match product_detail_payload(&state.db, created).await {
        Ok(detail) => Ok((StatusCode::CREATED, Json(detail))),
        Err(e) => {
            error!("Failed to assemble created product: {}", e);
            Err(creation_failed())
        }
    }
}

fn creation_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to create product".to_string(),
        }),
    )
}

/// Delete a product (owning store owner or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/products/{product_id}",
    tag = "catalog",
    params(
        ("product_id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller may not delete this product", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn delete_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    let product = match product::Entity::find_by_id(product_id).one(&state.db).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            warn!("Product with ID {} not found", product_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Product not found".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch product: {}", e);
            return Err(deletion_failed());
        }
    };

    let is_owner = caller.role == user::UserRole::StoreOwner && product.owner_id == caller.id;
    if !is_owner && caller.role != user::UserRole::Admin {
        warn!(
            "User {} attempted to delete product {} without permission",
            caller.id, product_id
        );
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only the owning store owner or an admin can delete products".to_string(),
            }),
        ));
    }

    // Collect everything this delete will cascade through before it happens,
    // so the affected cache entries can be dropped afterwards.
    let blog_ids: Vec<i32> = match blog::Entity::find()
        .filter(blog::Column::ProductId.eq(product_id))
        .all(&state.db)
        .await
    {
        Ok(blogs) => blogs.into_iter().map(|b| b.id).collect(),
        Err(e) => {
            error!("Failed to list blogs of product {}: {}", product_id, e);
            return Err(deletion_failed());
        }
    };

    let cart_user_ids = match cart_users_holding_product(&state.db, product_id).await {
        Ok(user_ids) => user_ids,
        Err(e) => {
            error!("Failed to list carts holding product {}: {}", product_id, e);
            return Err(deletion_failed());
        }
    };

    if let Err(e) = product::Entity::delete_by_id(product_id)
        .exec(&state.db)
        .await
    {
        error!("Failed to delete product {}: {}", product_id, e);
        return Err(deletion_failed());
    }

    CacheKey::AllBlogs.invalidate(&state.cache).await;
    CacheKey::ProductBlogs(product_id)
        .invalidate(&state.cache)
        .await;
    for blog_id in blog_ids {
        CacheKey::BlogComments(blog_id)
            .invalidate(&state.cache)
            .await;
    }
    for user_id in cart_user_ids {
        CacheKey::UserCart(user_id).invalidate(&state.cache).await;
    }

    info!("Product {} deleted by user {}", product_id, caller.id);
    Ok(Json(MessageResponse {
        message: "Product deleted".to_string(),
    }))
}

fn deletion_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to delete product".to_string(),
        }),
    )
}

/// Users whose cart contains the product; their cached carts go stale on delete.
async fn cart_users_holding_product(
    db: &DatabaseConnection,
    product_id: i32,
) -> Result<Vec<i32>, DbErr> {
    let cart_ids: Vec<i32> = cart_item::Entity::find()
        .filter(cart_item::Column::ProductId.eq(product_id))
        .all(db)
        .await?
        .into_iter()
        .map(|item| item.cart_id)
        .collect();

    if cart_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(cart::Entity::find()
        .filter(cart::Column::Id.is_in(cart_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|cart| cart.user_id)
        .collect())
}

/// List one store's products
///
/// Public callers see active products; the owner viewing their own store
/// also sees inactive rows.
#[utoipa::path(
    get,
    path = "/api/v1/stores/{store_id}/products",
    tag = "catalog",
    params(
        ("store_id" = i32, Path, description = "Store owner's user ID")
    ),
    responses(
        (status = 200, description = "The store's products", body = ProductsResponse),
        (status = 404, description = "Store not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, headers))]
pub async fn store_products(
    Path(store_id): Path<i32>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProductsResponse>, (StatusCode, Json<ErrorResponse>)> {
    match user::Entity::find_by_id(store_id).one(&state.db).await {
        Ok(Some(store)) if store.role == user::UserRole::StoreOwner => {}
        Ok(_) => {
            warn!("Store {} not found", store_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Store not found".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch store {}: {}", store_id, e);
            return Err(store_listing_failed());
        }
    }

    // The listing is public; a bad token just means an anonymous view
    let viewer = resolve_bearer(&state, &headers).await.ok();
    let sees_inactive = viewer.is_some_and(|viewer| viewer.id == store_id);

    let mut finder = product::Entity::find().filter(product::Column::OwnerId.eq(store_id));
    if !sees_inactive {
        finder = finder.filter(product::Column::Active.eq(true));
    }

    match finder.all(&state.db).await {
        Ok(products) => {
            info!("Store {} listing returned {} rows", store_id, products.len());
            Ok(Json(ProductsResponse {
                products: products
                    .into_iter()
                    .map(ProductSummaryResponse::from)
                    .collect(),
            }))
        }
        Err(e) => {
            error!("Failed to list store {} products: {}", store_id, e);
            Err(store_listing_failed())
        }
    }
}

fn store_listing_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to list store products".to_string(),
        }),
    )
}

// Helper functions

/// Resolves lookup names and the gallery for one product row.
pub async fn product_detail_payload(
    db: &DatabaseConnection,
    product: product::Model,
) -> Result<ProductDetailResponse, DbErr> {
    let color = match product.color_id {
        Some(color_id) => product_color::Entity::find_by_id(color_id)
            .one(db)
            .await?
            .map(|color| color.name),
        None => None,
    };

    let type_of_file = match product.file_type_id {
        Some(file_type_id) => file_type::Entity::find_by_id(file_type_id)
            .one(db)
            .await?
            .map(|file_type| file_type.name),
        None => None,
    };

    let gallery = product_image::Entity::find()
        .filter(product_image::Column::ProductId.eq(product.id))
        .all(db)
        .await?;

    let main_image = main_image::Entity::find()
        .filter(main_image::Column::ProductId.eq(product.id))
        .one(db)
        .await?
        .and_then(|main| {
            gallery
                .iter()
                .find(|image| image.id == main.product_image_id)
                .map(|image| image.image.clone())
        });

    Ok(ProductDetailResponse {
        id: product.id,
        owner_id: product.owner_id,
        industry_id: product.industry_id,
        title: product.title,
        description: product.description,
        price: product.price,
        product_type: product.product_type,
        active: product.active,
        length: product.length,
        width: product.width,
        weight: product.weight,
        color,
        size: product.size,
        type_of_file,
        images: gallery.into_iter().map(|image| image.image).collect(),
        main_image,
    })
}
