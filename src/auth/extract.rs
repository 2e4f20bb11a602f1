use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header};
use sea_orm::EntityTrait;
use tracing::warn;

use model::entities::user;

use crate::schemas::{AppState, ErrorResponse};

use super::token::decode_access_token;

/// Why a bearer credential failed to resolve to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    Invalid,
}

/// Resolves the `Authorization` header to an active user.
///
/// Anything that goes wrong after a header is present (bad signature,
/// expiry, unknown or deactivated user) collapses to `Invalid`; the response
/// never says which.
pub async fn resolve_bearer(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<user::Model, AuthFailure> {
    let Some(raw) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return Err(AuthFailure::MissingToken);
    };

    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    let claims = decode_access_token(token, &state.auth).map_err(|_| AuthFailure::Invalid)?;

    let user = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await
        .map_err(|e| {
            warn!("user lookup failed during token resolution: {}", e);
            AuthFailure::Invalid
        })?
        .ok_or(AuthFailure::Invalid)?;

    if !user.active {
        return Err(AuthFailure::Invalid);
    }

    Ok(user)
}

/// Extractor for handlers that require an authenticated caller.
pub struct AuthUser(pub user::Model);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_bearer(state, &parts.headers).await {
            Ok(user) => Ok(AuthUser(user)),
            Err(AuthFailure::MissingToken) => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Authentication token is required".to_string(),
                }),
            )),
            Err(AuthFailure::Invalid) => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid or expired token".to_string(),
                }),
            )),
        }
    }
}
