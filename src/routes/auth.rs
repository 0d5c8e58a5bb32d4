//! Authentication routes: registration, login, logout.
//!
//! Tourists self-register here; business accounts register through
//! `POST /business/register`, which also creates the business profile.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::response::{DataResponse, NoContent};
use crate::app::AppState;
use crate::auth::{password, RequireAuth};
use crate::domain::accounts::{
    normalize_email, AuthResponse, LoginRequest, RegisterRequest, User, UserResponse, UserRole,
};
use crate::error::{ApiError, ApiResult};

/// POST /auth/register
///
/// Register a tourist account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = normalize_email(&req.email);
    if !email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    if req.password.len() < password::MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters long",
        ));
    }

    let hash = password::hash_password(&req.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, contact, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(&hash)
    .bind(req.first_name.trim())
    .bind(req.last_name.trim())
    .bind(&req.contact)
    .bind(UserRole::Tourist)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if ApiError::is_unique_violation(&e, "users_email_key") {
            ApiError::conflict("This email is already registered.")
        } else {
            ApiError::Database(e)
        }
    })?;

    tracing::info!(user_id = %user.id, "Tourist account registered");

    let (token, expires_at) = state.tokens.issue(user.id, &user.email, user.role)?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(AuthResponse {
            access_token: token,
            expires_at,
            user: user.into(),
            verification_pending: false,
        })),
    ))
}

/// POST /auth/login
///
/// Log in with email and password. Business accounts additionally report
/// whether their profile is still pending admin verification.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = normalize_email(&req.email);

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    // Unknown email and wrong password return the same message
    let Some(user) = user else {
        return Err(ApiError::unauthorized("Invalid email or password."));
    };

    if !password::verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password."));
    }

    if !user.is_active {
        return Err(ApiError::unauthorized("This account is inactive."));
    }

    let verification_pending = if user.role.is_business() {
        let verified: Option<bool> = sqlx::query_scalar(
            "SELECT is_verified FROM business_profiles WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_optional(&state.db)
        .await?;
        !verified.unwrap_or(false)
    } else {
        false
    };

    let (token, expires_at) = state.tokens.issue(user.id, &user.email, user.role)?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User logged in");

    Ok(Json(DataResponse::new(AuthResponse {
        access_token: token,
        expires_at,
        user: UserResponse::from(user),
        verification_pending,
    })))
}

/// POST /auth/logout
///
/// Tokens are stateless; logout exists for client symmetry.
pub async fn logout(_auth: RequireAuth) -> NoContent {
    NoContent
}
