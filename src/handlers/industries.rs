use axum::{extract::State, http::StatusCode, response::Json};
use sea_orm::EntityTrait;
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use model::entities::industry;

use crate::schemas::AppState;

/// One industry row from the lookup table
#[derive(Debug, Serialize, ToSchema)]
pub struct IndustryResponse {
    pub id: i32,
    pub name: String,
}

impl From<industry::Model> for IndustryResponse {
    fn from(model: industry::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Response wrapper for the industries listing
#[derive(Debug, Serialize, ToSchema)]
pub struct IndustriesResponse {
    pub industries: Vec<IndustryResponse>,
}

/// Get all industries
#[utoipa::path(
    get,
    path = "/api/v1/industries",
    tag = "catalog",
    responses(
        (status = 200, description = "List of all industries", body = IndustriesResponse),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(state))]
pub async fn list_industries(
    State(state): State<AppState>,
) -> Result<Json<IndustriesResponse>, StatusCode> {
    debug!("Fetching all industries");

    match industry::Entity::find().all(&state.db).await {
        Ok(industries) => {
            let industries: Vec<IndustryResponse> =
                industries.into_iter().map(IndustryResponse::from).collect();
            info!("Successfully fetched {} industries", industries.len());
            Ok(Json(IndustriesResponse { industries }))
        }
        Err(e) => {
            error!("Failed to fetch industries: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
