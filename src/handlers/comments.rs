use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use model::entities::{blog, comment, user};

use crate::auth::AuthUser;
use crate::cache::{CacheKey, CachedData};
use crate::schemas::{AppState, CommentResponse, ErrorResponse, MessageResponse};

/// Response wrapper for the per-blog comment listing
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentsResponse {
    pub comments: Vec<CommentResponse>,
}

/// Get all comments of one active blog (cached)
#[utoipa::path(
    get,
    path = "/api/v1/blogs/{blog_id}/comments",
    tag = "content",
    params(
        ("blog_id" = i32, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "The blog's comments", body = CommentsResponse),
        (status = 404, description = "Blog not found or inactive", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn blog_comments(
    Path(blog_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<CommentsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let cache_key = CacheKey::BlogComments(blog_id).key();

    if let Some(CachedData::Comments(comments)) = state.cache.get(&cache_key).await {
        debug!("Blog {} comments served from cache", blog_id);
        return Ok(Json(CommentsResponse { comments }));
    }

    // Only active blogs expose their comment thread
    match blog::Entity::find_by_id(blog_id)
        .filter(blog::Column::Active.eq(true))
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Blog with ID {} not found or inactive", blog_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Blog does not exist".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch blog: {}", e);
            return Err(comments_failed());
        }
    }

    let comments = match comment::Entity::find()
        .filter(comment::Column::BlogId.eq(blog_id))
        .all(&state.db)
        .await
    {
        Ok(comments) => comments
            .into_iter()
            .map(CommentResponse::from)
            .collect::<Vec<_>>(),
        Err(e) => {
            error!("Failed to fetch comments: {}", e);
            return Err(comments_failed());
        }
    };

    state
        .cache
        .insert(cache_key, CachedData::Comments(comments.clone()))
        .await;

    info!(
        "Blog {} comment listing recomputed with {} rows",
        blog_id,
        comments.len()
    );
    Ok(Json(CommentsResponse { comments }))
}

fn comments_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to fetch comments".to_string(),
        }),
    )
}

/// Request structure for creating a comment
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub blog_id: Option<i32>,
    pub content: Option<String>,
}

/// Comment on a blog post (any authenticated user)
#[utoipa::path(
    post,
    path = "/api/v1/comments",
    tag = "content",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = MessageResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Blog not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, request))]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, Json<ErrorResponse>)> {
    let (Some(blog_id), Some(content)) = (request.blog_id, request.content) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "blog_id and content are required".to_string(),
            }),
        ));
    };

    match blog::Entity::find_by_id(blog_id).one(&state.db).await {
        Ok(Some(_)) => {}
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
            return Err(comment_write_failed());
        }
    }

    let row = comment::ActiveModel {
        blog_id: Set(blog_id),
        user_id: Set(caller.id),
        content: Set(content),
        ..Default::default()
    };

    if let Err(e) = row.insert(&state.db).await {
        error!("Failed to create comment: {}", e);
        return Err(comment_write_failed());
    }

    CacheKey::BlogComments(blog_id)
        .invalidate(&state.cache)
        .await;

    info!("User {} commented on blog {}", caller.id, blog_id);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Comment created".to_string(),
        }),
    ))
}

/// Delete a comment (author or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/comments/{comment_id}",
    tag = "content",
    params(
        ("comment_id" = i32, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is neither the author nor an admin", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn delete_comment(
    Path(comment_id): Path<i32>,
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    let existing = match comment::Entity::find_by_id(comment_id).one(&state.db).await {
        Ok(Some(comment)) => comment,
        Ok(None) => {
            warn!("Comment with ID {} not found", comment_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Comment not found".to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to fetch comment: {}", e);
            return Err(comment_write_failed());
        }
    };

    if existing.user_id != caller.id && caller.role != user::UserRole::Admin {
        warn!(
            "User {} attempted to delete comment {} without permission",
            caller.id, comment_id
        );
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "You do not have permission to delete this comment".to_string(),
            }),
        ));
    }

    let blog_id = existing.blog_id;
    if let Err(e) = comment::Entity::delete_by_id(comment_id)
        .exec(&state.db)
        .await
    {
        error!("Failed to delete comment {}: {}", comment_id, e);
        return Err(comment_write_failed());
    }

    CacheKey::BlogComments(blog_id)
        .invalidate(&state.cache)
        .await;

    info!("Comment {} deleted by user {}", comment_id, caller.id);
    Ok(Json(MessageResponse {
        message: "Comment deleted".to_string(),
    }))
}

fn comment_write_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to write comment".to_string(),
        }),
    )
}
