use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use khata_auth::{Hs256SessionSigner, Principal};

use crate::context::{CustomerContext, OwnerContext};

#[derive(Clone)]
pub struct AuthState {
    pub signer: Arc<Hs256SessionSigner>,
}

/// Guard for owner-facing routes: owner tokens only.
pub async fn owner_auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let claims = state
        .signer
        .verify(token, Utc::now())
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    // A customer token never opens owner routes, valid or not.
    let Principal::Owner { owner_id } = claims.principal else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    req.extensions_mut().insert(OwnerContext::new(owner_id));
    Ok(next.run(req).await)
}

/// Guard for customer-facing routes: customer tokens only.
pub async fn customer_auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let claims = state
        .signer
        .verify(token, Utc::now())
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    let Principal::Customer {
        customer_id,
        owner_id,
    } = claims.principal
    else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    req.extensions_mut()
        .insert(CustomerContext::new(customer_id, owner_id));
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
