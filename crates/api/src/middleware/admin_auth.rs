use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Shared secret guarding the admin routes. Only its digest is kept.
#[derive(Clone)]
pub struct AdminAuthState {
    token_hash: Option<Arc<[u8; 32]>>,
}

impl AdminAuthState {
    /// `None` (or a blank token) locks the admin routes entirely
    pub fn new(token: Option<&str>) -> Self {
        let token_hash = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Arc::new(hash_token(t)));
        Self { token_hash }
    }

    pub fn is_configured(&self) -> bool {
        self.token_hash.is_some()
    }

    fn accepts(&self, token: &str) -> bool {
        self.token_hash
            .as_deref()
            .is_some_and(|expected| hash_token(token) == *expected)
    }
}

fn hash_token(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

fn extract_bearer_token(request: &Request) -> Result<&str, ApiError> {
    let auth_value = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("No authorization header found");
            ApiError::missing_auth_header()
        })?;

    auth_value.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Authorization header does not start with 'Bearer '");
        ApiError::invalid_auth_header()
    })
}

/// Admin authentication middleware - requires the configured admin bearer token
pub async fn admin_auth_middleware(
    State(state): State<AdminAuthState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    tracing::info!("Admin auth middleware invoked for {} {}", method, path);

    let token = extract_bearer_token(&request).map_err(|e| e.into_response())?;

    if !state.accepts(token) {
        tracing::warn!("Admin access denied on {} {}", method, path);
        return Err(ApiError::unauthorized("Invalid admin token").into_response());
    }

    tracing::info!("Admin access granted on {} {}", method, path);
    Ok(next.run(request).await)
}
