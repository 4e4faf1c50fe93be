use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::{
    dto::{CreateLinkRequest, CreateLinkResponse},
    services::{create_link, resolve_link, LinkError},
};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

pub fn link_routes() -> Router<AppState> {
    Router::new().route("/link/", post(create))
}

pub fn redirect_routes() -> Router<AppState> {
    Router::new().route("/:source", get(redirect))
}

#[instrument(skip(state, user, payload))]
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), ApiError> {
    let Json(req) = payload?;

    let source = create_link(state.links.as_ref(), &req.destination)
        .await
        .map_err(|e| match e {
            err @ (LinkError::EmptyDestination | LinkError::InvalidDestination) => {
                ApiError::validation(err.to_string())
            }
            other => {
                error!(error = %other, "create link failed");
                ApiError::validation("failed creating link")
            }
        })?;

    info!(%source, owner = %user.0, "link created");
    Ok((StatusCode::CREATED, Json(CreateLinkResponse { source })))
}

#[instrument(skip(state))]
pub async fn redirect(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> Result<Response, ApiError> {
    if source.is_empty() {
        return Err(ApiError::validation("Invalid source"));
    }

    match resolve_link(state.links.as_ref(), &source).await {
        Ok(destination) => {
            let location = HeaderValue::try_from(destination).map_err(|e| {
                error!(error = %e, %source, "stored destination is not a valid header");
                ApiError::internal("Error fetching link")
            })?;
            Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
        }
        Err(LinkError::NotFound) => {
            warn!(%source, "unknown short code");
            Err(ApiError::validation("Error fetching link"))
        }
        Err(e) => {
            error!(error = %e, %source, "resolve link failed");
            Err(ApiError::internal("Error fetching link"))
        }
    }
}
