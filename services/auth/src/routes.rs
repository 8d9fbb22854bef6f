//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use common::{
    Identity,
    guard::require,
    models::EmployeeStatus,
    rate_limit::enforce_rate_limit,
    response::ApiResponse,
    roles::effective_permissions,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AuthError, AuthResult},
    middleware::auth_middleware,
    password::{hash_password, verify_password},
    state::AppState,
    validation::{validate_email, validate_password},
};

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Signed-in user returned with the token
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: Uuid,
    pub employee_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub permissions: Vec<String>,
}

/// Response for user login
#[derive(Serialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub new_password: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/auth/change-password", post(change_password))
        .route("/api/auth/reset-password/:employee_id", post(reset_password))
        .route("/api/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(login))
        .merge(protected_routes)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            enforce_rate_limit,
        ))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure("Route not found")),
    )
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AuthError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }
    info!("Login attempt for: {}", payload.email);

    let invalid = || AuthError::Unauthorized("Invalid credentials".to_string());

    // No account can be registered under a malformed address
    if validate_email(&payload.email).is_err() {
        return Err(invalid());
    }

    let credential = state
        .credentials
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &credential.password_hash)? {
        warn!("Wrong password for user {}", credential.user_id);
        return Err(invalid());
    }

    if !credential.is_active {
        return Err(AuthError::Unauthorized(
            "Account is deactivated".to_string(),
        ));
    }

    if credential.employee_status != EmployeeStatus::Active {
        return Err(AuthError::Unauthorized(
            "Employee account is not active".to_string(),
        ));
    }

    let permissions = effective_permissions(state.roles.as_ref(), &credential.role_id).await?;

    state.credentials.touch_last_login(credential.user_id).await?;
    let token = state.jwt_service.generate_access_token(&credential)?;

    info!("User {} logged in", credential.user_id);

    let response = LoginResponse {
        user: LoginUser {
            id: credential.user_id,
            employee_id: credential.employee_id,
            email: credential.email,
            first_name: credential.first_name,
            last_name: credential.last_name,
            role: credential.role_id,
            permissions: permissions.into_iter().collect(),
        },
        token,
    };

    Ok(Json(ApiResponse::ok(response)))
}

/// Change the signed-in user's password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ChangePasswordRequest>,
) -> AuthResult<impl IntoResponse> {
    if payload.old_password.is_empty() || payload.new_password.is_empty() {
        return Err(AuthError::BadRequest(
            "Old password and new password are required".to_string(),
        ));
    }
    validate_password(&payload.new_password).map_err(AuthError::BadRequest)?;

    let credential = state
        .credentials
        .find_by_id(identity.id)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    if !verify_password(&payload.old_password, &credential.password_hash)? {
        return Err(AuthError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.new_password)?;
    state
        .credentials
        .update_password(identity.id, &password_hash)
        .await?;

    Ok(Json(ApiResponse::message("Password changed successfully")))
}

/// Reset the password of another employee's account
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(employee_id): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AuthResult<impl IntoResponse> {
    require(Some(&identity), &["users.manage"])?;

    if payload.new_password.is_empty() {
        return Err(AuthError::BadRequest(
            "New password is required".to_string(),
        ));
    }
    validate_password(&payload.new_password).map_err(AuthError::BadRequest)?;

    let password_hash = hash_password(&payload.new_password)?;
    let updated = state
        .credentials
        .reset_password_for_employee(&employee_id, &password_hash)
        .await?;

    if !updated {
        return Err(AuthError::NotFound("Employee not found".to_string()));
    }

    info!("User {} reset password of employee {}", identity.id, employee_id);
    Ok(Json(ApiResponse::message("Password reset successfully")))
}

/// Current user profile
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AuthResult<impl IntoResponse> {
    let profile = state
        .credentials
        .profile(identity.id)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::ok(profile)))
}
