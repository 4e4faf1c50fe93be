use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, RegisterResponse, TokenResponse},
        password::CredentialManager,
    },
    error::{ApiError, StoreError},
    state::AppState,
    users::repo_types::NewAccount,
};

/// Whitespace-only input counts as missing.
fn is_blank(v: &str) -> bool {
    v.trim().is_empty()
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(payload) = payload?;

    if is_blank(&payload.first_name)
        || is_blank(&payload.last_name)
        || is_blank(&payload.email)
        || payload.password.is_empty()
    {
        return Err(ApiError::validation(
            "Missing required fields: first_name, last_name, email, password",
        ));
    }

    // Ensure email is not taken
    match state.accounts.find_by_email(&payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::Conflict("Email already registered".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::internal("Failed to create user"));
        }
    }

    let salt = CredentialManager::generate_salt();
    let passhash = state
        .passwords
        .hash_password_blocking(payload.password, salt.clone())
        .await
        .map_err(|e| {
            error!(error = %e, "hash_password failed");
            ApiError::internal("Failed to hash password")
        })?;

    let new_account = NewAccount {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        passhash,
        salt,
        phone_number: payload.phone_number.filter(|p| !p.is_empty()),
    };

    let account = match state.accounts.create(&new_account).await {
        Ok(a) => a,
        Err(StoreError::Conflict) => {
            warn!(email = %new_account.email, "email already registered");
            return Err(ApiError::Conflict("Email already registered".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(ApiError::internal("Failed to create user"));
        }
    };

    let token = state.jwt.sign(&account.email).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::internal("Failed to create token")
    })?;

    info!(user_id = account.id, email = %account.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: account.into(),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload?;

    if is_blank(&payload.email) || payload.password.is_empty() {
        return Err(ApiError::validation(
            "Missing required fields: email, password",
        ));
    }

    let account = match state.accounts.find_by_email(&payload.email).await {
        Ok(Some(a)) => a,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::validation("User not found"));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::internal("Failed to load user"));
        }
    };

    let ok = state
        .passwords
        .verify_password_blocking(payload.password, account.salt.clone(), account.passhash.clone())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = account.id, "verify_password failed");
            ApiError::internal("Invalid password hash")
        })?;

    if !ok {
        warn!(user_id = account.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid password".into()));
    }

    let token = state.jwt.sign(&account.email).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::internal("Failed to create token")
    })?;

    info!(user_id = account.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}
