use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum_valid::Valid;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use model::entities::{cart, cart_item, product};

use crate::auth::AuthUser;
use crate::cache::{CacheKey, CachedData};
use crate::schemas::{AppState, CartItemResponse, ErrorResponse, MessageResponse};

/// Response wrapper for the cart listing
#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub cart: Vec<CartItemResponse>,
}

/// Get the authenticated user's cart (cached)
///
/// A user who never added anything has no cart row and gets a 404; an
/// existing cart always has at least one line item, because a decrement
/// that reaches zero deletes the row.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    tag = "cart",
    responses(
        (status = 200, description = "The cart's line items", body = CartResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Cart not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn get_cart(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<CartResponse>, (StatusCode, Json<ErrorResponse>)> {
    let cache_key = CacheKey::UserCart(caller.id).key();

    if let Some(CachedData::CartItems(items)) = state.cache.get(&cache_key).await {
        debug!("Cart of user {} served from cache", caller.id);
        return Ok(Json(CartResponse { cart: items }));
    }

    let cart = match cart::Entity::find()
        .filter(cart::Column::UserId.eq(caller.id))
        .one(&state.db)
        .await
    {
        Ok(Some(cart)) => cart,
        Ok(None) => {
            debug!("User {} has no cart", caller.id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Cart not found".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch cart: {}", e);
            return Err(cart_failed());
        }
    };

    let items = match cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .all(&state.db)
        .await
    {
        Ok(items) => items
            .into_iter()
            .map(CartItemResponse::from)
            .collect::<Vec<_>>(),
        Err(e) => {
            error!("Failed to fetch cart items: {}", e);
            return Err(cart_failed());
        }
    };

    state
        .cache
        .insert(cache_key, CachedData::CartItems(items.clone()))
        .await;

    info!(
        "Cart of user {} recomputed with {} line items",
        caller.id,
        items.len()
    );
    Ok(Json(CartResponse { cart: items }))
}

/// Request structure for adding a product to the cart
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddToCartRequest {
    pub product_id: Option<i32>,
    /// Quantity to add (default 1)
    #[validate(range(min = 1))]
    pub order_time: Option<i32>,
}

/// Add a product to the cart, or bump its quantity
///
/// The increment amount is arbitrary, while removal always steps by one;
/// that asymmetry is part of the cart contract.
#[utoipa::path(
    post,
    path = "/api/v1/cart/add",
    tag = "cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Product added or quantity updated", body = MessageResponse),
        (status = 400, description = "Missing product_id or invalid quantity", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, request))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Valid(Json(request)): Valid<Json<AddToCartRequest>>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(product_id) = request.product_id else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "product_id is required".to_string(),
            }),
        ));
    };
    let quantity = request.order_time.unwrap_or(1);

    // The product check comes first; an unknown product must not leave an
    // empty cart row behind.
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
            return Err(cart_failed());
        }
    }

    let cart = find_or_create_cart(&state, caller.id).await?;

    // Atomic increment; the read-then-write version of this loses updates
    // under concurrent adds.
    let bumped = match cart_item::Entity::update_many()
        .col_expr(
            cart_item::Column::Quantity,
            Expr::col(cart_item::Column::Quantity).add(quantity),
        )
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .exec(&state.db)
        .await
    {
        Ok(result) => result.rows_affected > 0,
        Err(e) => {
            error!("Failed to update cart item quantity: {}", e);
            return Err(cart_failed());
        }
    };

    let message = if bumped {
        "Product quantity updated in the cart."
    } else {
        // No row yet. A concurrent add may insert between the update above
        // and this insert, so the insert folds into an increment on conflict.
        let row = cart_item::ActiveModel {
            cart_id: Set(cart.id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            ..Default::default()
        };
        let insert = cart_item::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([cart_item::Column::CartId, cart_item::Column::ProductId])
                    .value(
                        cart_item::Column::Quantity,
                        Expr::col(cart_item::Column::Quantity).add(quantity),
                    )
                    .to_owned(),
            )
            .exec(&state.db)
            .await;
        if let Err(e) = insert {
            error!("Failed to insert cart item: {}", e);
            return Err(cart_failed());
        }
        "Product added to the cart."
    };

    CacheKey::UserCart(caller.id).invalidate(&state.cache).await;

    info!(
        "User {} added product {} (quantity {}) to cart {}",
        caller.id, product_id, quantity, cart.id
    );
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

/// Request structure for removing a product from the cart
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveFromCartRequest {
    pub product_id: Option<i32>,
}

/// Step a product's quantity down by one, removing it at zero
#[utoipa::path(
    delete,
    path = "/api/v1/cart/remove",
    tag = "cart",
    request_body = RemoveFromCartRequest,
    responses(
        (status = 200, description = "Quantity decreased or product removed", body = MessageResponse),
        (status = 400, description = "Missing product_id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Product, cart, or line item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, request))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(product_id) = request.product_id else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "product_id is required".to_string(),
            }),
        ));
    };

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
            return Err(cart_failed());
        }
    }

    let cart = match cart::Entity::find()
        .filter(cart::Column::UserId.eq(caller.id))
        .one(&state.db)
        .await
    {
        Ok(Some(cart)) => cart,
        Ok(None) => {
            warn!("User {} has no cart", caller.id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Cart not found".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch cart: {}", e);
            return Err(cart_failed());
        }
    };

    // Decrement only above one; at exactly one the row is deleted instead.
    // Both statements are single atomic writes, so concurrent removals
    // cannot drive the quantity below one.
    let decremented = match cart_item::Entity::update_many()
        .col_expr(
            cart_item::Column::Quantity,
            Expr::col(cart_item::Column::Quantity).sub(1),
        )
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .filter(cart_item::Column::Quantity.gt(1))
        .exec(&state.db)
        .await
    {
        Ok(result) => result.rows_affected > 0,
        Err(e) => {
            error!("Failed to decrement cart item: {}", e);
            return Err(cart_failed());
        }
    };

    let message = if decremented {
        "Product quantity decreased in the cart."
    } else {
        let deleted = match cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&state.db)
            .await
        {
            Ok(result) => result.rows_affected > 0,
            Err(e) => {
                error!("Failed to delete cart item: {}", e);
                return Err(cart_failed());
            }
        };

        if !deleted {
            warn!(
                "Product {} not in cart of user {}",
                product_id, caller.id
            );
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Product not found in the cart".to_string(),
                }),
            ));
        }
        "Product removed from the cart."
    };

    CacheKey::UserCart(caller.id).invalidate(&state.cache).await;

    info!(
        "User {} removed product {} from cart {}",
        caller.id, product_id, cart.id
    );
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

// Helper functions

fn cart_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to update cart".to_string(),
        }),
    )
}

/// Finds the user's cart, creating it on first use. A concurrent creation
/// race resolves by re-reading the row the winner inserted.
async fn find_or_create_cart(
    state: &AppState,
    user_id: i32,
) -> Result<cart::Model, (StatusCode, Json<ErrorResponse>)> {
    match cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(&state.db)
        .await
    {
        Ok(Some(cart)) => return Ok(cart),
        Ok(None) => {}
        Err(e) => {
            error!("Failed to fetch cart: {}", e);
            return Err(cart_failed());
        }
    }

    let row = cart::ActiveModel {
        user_id: Set(user_id),
        ..Default::default()
    };
    match row.insert(&state.db).await {
        Ok(cart) => Ok(cart),
        Err(e) if is_unique_violation(&e) => {
            debug!("Lost cart creation race for user {}", user_id);
            match cart::Entity::find()
                .filter(cart::Column::UserId.eq(user_id))
                .one(&state.db)
                .await
            {
                Ok(Some(cart)) => Ok(cart),
                Ok(None) => {
                    error!("Cart for user {} vanished after creation race", user_id);
                    Err(cart_failed())
                }
                Err(e) => {
                    error!("Failed to re-fetch cart: {}", e);
                    Err(cart_failed())
                }
            }
        }
        Err(e) => {
            error!("Failed to create cart: {}", e);
            Err(cart_failed())
        }
    }
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
        || err.to_string().contains("duplicate key value")
}
