use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{DeleteUserResponse, UpdateUserRequest, UserResponse},
    services::{delete_account, load_account, update_account},
};
use crate::{
    error::{parse_id, ApiError},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users/:id",
        get(get_user).put(update_user).delete(delete_user),
    )
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id)?;
    let account = load_account(&state, id).await?;
    Ok(Json(account.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let account = update_account(&state, id, req).await?;
    Ok(Json(account.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let id = parse_id(&id)?;
    delete_account(&state, id).await?;
    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully".into(),
        id,
    }))
}
