use axum::{extract::State, http::HeaderMap, http::StatusCode, response::Json};
use axum_valid::Valid;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use model::entities::{industry, user};

use crate::auth::password::{generate_temporary_password, hash_password, verify_password};
use crate::auth::token::{TokenPair, issue_token_pair};
use crate::auth::{AuthUser, resolve_bearer};
use crate::schemas::{AppState, ErrorResponse};

/// Full user payload, returned at customer signup and from `/auth/me`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub national_code: Option<String>,
    #[serde(rename = "user_type")]
    #[schema(value_type = String)]
    pub role: user::UserRole,
    pub active: bool,
    pub store_name: Option<String>,
    pub store_description: Option<String>,
    pub store_logo: Option<String>,
    #[serde(rename = "industry")]
    pub industry_id: Option<i32>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            username: model.username,
            phone_number: model.phone_number,
            email: model.email,
            national_code: model.national_code,
            role: model.role,
            active: model.active,
            store_name: model.store_name,
            store_description: model.store_description,
            store_logo: model.store_logo,
            industry_id: model.industry_id,
        }
    }
}

/// Short user payload, returned at login and store-owner signup.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserBrief {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "user_type")]
    #[schema(value_type = String)]
    pub role: user::UserRole,
}

impl From<&user::Model> for UserBrief {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name.clone(),
            last_name: model.last_name.clone(),
            role: model.role,
        }
    }
}

/// Request structure for signup; the required set depends on `user_type`
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// "customer" or "store_owner"
    pub user_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Store owners only
    pub store_name: Option<String>,
    /// Store owners only: industry id
    pub industry: Option<i32>,
}

/// Response for a successful signup
#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub success: String,
    pub tokens: TokenPair,
    pub user: UserResponse,
}

/// Register a new customer or store owner
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Missing fields, invalid user type, or username taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), (StatusCode, Json<ErrorResponse>)> {
    let Some(user_type) = request.user_type.as_deref() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "user_type is required".to_string(),
            }),
        ));
    };

    match user_type {
        "customer" => {
            let (Some(username), Some(password), Some(first_name), Some(last_name)) = (
                request.username,
                request.password,
                request.first_name,
                request.last_name,
            ) else {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "All fields are required".to_string(),
                    }),
                ));
            };

            debug!("Creating customer account for username: {}", username);
            let row = user::ActiveModel {
                first_name: Set(first_name),
                last_name: Set(last_name),
                username: Set(username.clone()),
                password_hash: Set(hash_secret(&password)?),
                role: Set(user::UserRole::Customer),
                active: Set(true),
                ..Default::default()
            };

            let created = insert_user(&state, row, &username).await?;
            let tokens = issue_tokens(&state, &created)?;

            info!("Customer account created with ID: {}", created.id);
            Ok((
                StatusCode::CREATED,
                Json(SignupResponse {
                    success: "Customer created successfully".to_string(),
                    tokens,
                    user: UserResponse::from(created),
                }),
            ))
        }
        "store_owner" => {
            let (
                Some(username),
                Some(password),
                Some(first_name),
                Some(last_name),
                Some(store_name),
                Some(industry_id),
            ) = (
                request.username,
                request.password,
                request.first_name,
                request.last_name,
                request.store_name,
                request.industry,
            )
            else {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "All fields are required".to_string(),
                    }),
                ));
            };

            // The declared industry has to exist before the account is created
            match industry::Entity::find_by_id(industry_id).one(&state.db).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    warn!("Industry {} not found during signup", industry_id);
                    return Err((
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse {
                            error: "Invalid industry".to_string(),
                        }),
                    ));
                }
                Err(e) => {
                    error!("Database error while checking industry: {}", e);
                    return Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse {
                            error: "Failed to validate industry".to_string(),
                        }),
                    ));
                }
            }

            debug!("Creating store owner account for username: {}", username);
            let row = user::ActiveModel {
                first_name: Set(first_name),
                last_name: Set(last_name),
                username: Set(username.clone()),
                password_hash: Set(hash_secret(&password)?),
                role: Set(user::UserRole::StoreOwner),
                active: Set(true),
                store_name: Set(Some(store_name)),
                industry_id: Set(Some(industry_id)),
                ..Default::default()
            };

            let created = insert_user(&state, row, &username).await?;
            let tokens = issue_tokens(&state, &created)?;

            info!("Store owner account created with ID: {}", created.id);
            Ok((
                StatusCode::CREATED,
                Json(SignupResponse {
                    success: "Store owner created successfully".to_string(),
                    tokens,
                    user: UserResponse::from(created),
                }),
            ))
        }
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid user type".to_string(),
            }),
        )),
    }
}

/// Request structure for manual login
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Response for a successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: String,
    pub tokens: TokenPair,
    pub user: UserBrief,
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Unknown user or wrong password", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "All fields are required".to_string(),
            }),
        ));
    };

    let user = match user::Entity::find()
        .filter(user::Column::Username.eq(username.as_str()))
        .one(&state.db)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("Login attempt for unknown username");
            return Err(bad_credentials());
        }
        Err(e) => {
            error!("Failed to look up user during login: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to log in".to_string(),
                }),
            ));
        }
    };

    if !user.active || !verify_password(&password, &user.password_hash) {
        warn!("Failed login attempt for user ID: {}", user.id);
        return Err(bad_credentials());
    }

    let tokens = issue_tokens(&state, &user)?;
    info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        success: "Login was successful".to_string(),
        tokens,
        user: UserBrief::from(&user),
    }))
}

/// Response for token verification
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub value: bool,
}

/// Check whether the presented bearer token resolves to a user
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify",
    tag = "auth",
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Token is missing or invalid", body = VerifyResponse)
    )
)]
#[instrument(skip(state, headers))]
pub async fn verify_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<VerifyResponse>) {
    match resolve_bearer(&state, &headers).await {
        Ok(_) => (StatusCode::OK, Json(VerifyResponse { value: true })),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse { value: false }),
        ),
    }
}

/// Response wrapper for the authenticated user's profile
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInformationResponse {
    pub user_data: UserResponse,
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserInformationResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn user_information(AuthUser(user): AuthUser) -> Json<UserInformationResponse> {
    Json(UserInformationResponse {
        user_data: UserResponse::from(user),
    })
}

/// Request structure for creating an admin account
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAdminRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    /// Delivery target for the temporary password
    pub phone_number: String,
    pub national_code: Option<String>,
}

/// Response for a successful admin creation
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateAdminResponse {
    pub success: String,
    pub user: UserBrief,
}

/// Create an admin account with an auto-generated temporary password
///
/// The password is never returned over the API; it goes out through the
/// configured credential notifier to the given phone number.
#[utoipa::path(
    post,
    path = "/api/v1/auth/admins",
    tag = "auth",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created; temporary password sent out-of-band", body = CreateAdminResponse),
        (status = 400, description = "Invalid fields or username taken", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, request))]
pub async fn create_admin(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Valid(Json(request)): Valid<Json<CreateAdminRequest>>,
) -> Result<(StatusCode, Json<CreateAdminResponse>), (StatusCode, Json<ErrorResponse>)> {
    if caller.role != user::UserRole::Admin {
        warn!("User {} attempted to create an admin account", caller.id);
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only admins can create admin accounts".to_string(),
            }),
        ));
    }

    if !is_valid_phone_number(&request.phone_number) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Phone number must start with +98 and be followed by 9 digits."
                    .to_string(),
            }),
        ));
    }

    if let Some(national_code) = &request.national_code {
        if national_code.len() != 10 || !national_code.chars().all(|c| c.is_ascii_digit()) {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "National code must be exactly 10 digits and contain only numbers."
                        .to_string(),
                }),
            ));
        }
    }

    let temporary_password = generate_temporary_password();

    debug!("Creating admin account for username: {}", request.username);
    let row = user::ActiveModel {
        first_name: Set(request.first_name),
        last_name: Set(request.last_name),
        username: Set(request.username.clone()),
        phone_number: Set(Some(request.phone_number.clone())),
        national_code: Set(request.national_code),
        password_hash: Set(hash_secret(&temporary_password)?),
        role: Set(user::UserRole::Admin),
        active: Set(true),
        ..Default::default()
    };

    let created = insert_user(&state, row, &request.username).await?;

    // Delivery failure must not roll back the account; the password can be
    // reissued, and the failure is visible in the logs.
    if let Err(e) = state
        .notifier
        .send_temporary_credential(&request.phone_number, &temporary_password)
        .await
    {
        error!(
            "Failed to deliver temporary credential for admin {}: {}",
            created.id, e
        );
    }

    info!("Admin account created with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(CreateAdminResponse {
            success: "Admin created successfully".to_string(),
            user: UserBrief::from(&created),
        }),
    ))
}

// Helper functions

fn is_valid_phone_number(value: &str) -> bool {
    value
        .strip_prefix("+98")
        .is_some_and(|rest| rest.len() == 9 && rest.chars().all(|c| c.is_ascii_digit()))
}

fn bad_credentials() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "user is not exist".to_string(),
        }),
    )
}

fn hash_secret(password: &str) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    hash_password(password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to create user".to_string(),
            }),
        )
    })
}

fn issue_tokens(
    state: &AppState,
    user: &user::Model,
) -> Result<TokenPair, (StatusCode, Json<ErrorResponse>)> {
    issue_token_pair(user.id, &state.auth).map_err(|e| {
        error!("Failed to issue tokens for user {}: {}", user.id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to issue tokens".to_string(),
            }),
        )
    })
}

/// Inserts a user row, surfacing a duplicate username as a 400 with the
/// "already taken" message.
async fn insert_user(
    state: &AppState,
    row: user::ActiveModel,
    username: &str,
) -> Result<user::Model, (StatusCode, Json<ErrorResponse>)> {
    // Pre-check for a friendlier error; the unique index still backstops races
    match user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => {
            warn!("Username '{}' already taken", username);
            return Err(username_taken(username));
        }
        Ok(None) => {}
        Err(e) => {
            error!("Failed to check username uniqueness: {}", e);
            return Err(user_creation_failed());
        }
    }

    match row.insert(&state.db).await {
        Ok(created) => Ok(created),
        Err(e) if is_unique_violation(&e) => {
            warn!("Username '{}' already taken (lost creation race)", username);
            Err(username_taken(username))
        }
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(user_creation_failed())
        }
    }
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
        || err.to_string().contains("duplicate key value")
}

fn username_taken(username: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: format!("The 'username' {username} is already taken."),
        }),
    )
}

fn user_creation_failed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to create user".to_string(),
        }),
    )
}
