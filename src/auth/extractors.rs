use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::error::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Verified token subject (account email), placed in request extensions by
/// [`require_bearer`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Pulls the raw token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".into()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid authorization header format".into()))?;

    header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header format".into()))
}

/// Gate for the protected prefix. Rejects with 401 before the inner service runs.
pub async fn require_bearer(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let subject = match keys.verify(token) {
        Ok(sub) => sub,
        Err(e) => {
            warn!(error = %e, "rejected bearer token");
            return Err(ApiError::Unauthorized("Invalid token".into()));
        }
    };

    req.extensions_mut().insert(AuthUser(subject));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m.contains("Missing")));
    }

    #[test]
    fn wrong_scheme_is_unauthorized() {
        for value in ["Basic abc", "Bearer", "bearer abc", "Token x"] {
            let err = bearer_token(&headers_with(value)).unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized(_)), "{value} accepted");
        }
    }

    #[test]
    fn strips_prefix() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")).unwrap(), "abc.def");
    }
}
