//! Authentication handlers
//!
//! Signup, login, and the current-user profile.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserCreate, UserProfile};
use crate::db::repository::user as user_repo;
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// POST /api/auth/signup - create a customer account
///
/// New accounts always start as customers with zero credit. Staff and
/// owner status is granted later through the owner endpoints.
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<AuthResponse>> {
    payload.validate()?;

    let password_hash = User::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    let user = user_repo::create(
        &state.pool,
        payload.name.trim(),
        payload.email.trim(),
        payload.phone_number.as_deref(),
        &password_hash,
        payload.institute.as_deref(),
    )
    .await?;

    let token = state
        .jwt
        .generate_token(&user.id, &user.email, user.role().is_owner())
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = %user.id, email = %user.email, "New account created");

    Ok(Json(AuthResponse {
        user: UserProfile::from(&user),
        token,
    }))
}

/// POST /api/auth/login
///
/// Unified error message and a fixed delay keep failed lookups and failed
/// password checks indistinguishable from the outside.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = user_repo::find_by_email(&state.pool, req.email.trim()).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(u) => {
            let password_valid = u
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

            if !password_valid {
                tracing::warn!(email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            u
        }
        None => {
            tracing::warn!(email = %req.email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let token = state
        .jwt
        .generate_token(&user.id, &user.email, user.role().is_owner())
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        user: UserProfile::from(&user),
        token,
    }))
}

/// GET /api/auth/me - fresh profile for the bearer of the token
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let user = user_repo::find_by_id(&state.pool, &current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", current_user.id)))?;

    Ok(Json(UserProfile::from(&user)))
}
