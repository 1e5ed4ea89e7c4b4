//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/notifier/signer wiring and the application flows
//! - `routes/`: HTTP routes + handlers (one file per surface)
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        signer: services.signer(),
    };

    let owner = routes::owner::public_router().merge(
        routes::owner::protected_router().layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::owner_auth_middleware,
        )),
    );

    let customer = routes::customer::public_router().merge(
        routes::customer::protected_router().layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::customer_auth_middleware,
        )),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/admin", routes::admin::router())
        .nest("/owner", owner)
        .nest("/customer", customer)
        .layer(Extension(services))
}
