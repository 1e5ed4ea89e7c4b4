use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::OwnerContext;

/// Login endpoints: reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/login", post(request_login))
        .route("/verify", post(verify_login))
}

/// Everything behind the owner bearer guard.
pub fn protected_router() -> Router {
    Router::new()
        .route("/info", get(info))
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/:code/transactions", get(customer_statement))
        .route("/transactions", post(post_transaction))
}

pub async fn request_login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::OwnerLoginRequest>,
) -> axum::response::Response {
    if let Err(e) = services.request_owner_login(&body.email).await {
        return errors::store_error_to_response(e);
    }
    // The code travels out of band; the response only acknowledges dispatch.
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "otp_sent" })),
    )
        .into_response()
}

pub async fn verify_login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::OwnerVerifyRequest>,
) -> axum::response::Response {
    match services.verify_owner_login(&body.email, &body.otp).await {
        Ok(token) => (StatusCode::OK, Json(serde_json::json!({ "token": token }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn info(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
) -> axum::response::Response {
    match services.owner_info(owner.owner_id()).await {
        Ok(o) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "email": o.email,
                "shop_code": o.shop_code.as_str(),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
) -> axum::response::Response {
    match services.list_customers(owner.owner_id()).await {
        Ok(items) => {
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> axum::response::Response {
    match services
        .create_customer(owner.owner_id(), &body.name, &body.password)
        .await
    {
        Ok(c) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "customer_code": c.customer_code.as_str(),
                "name": c.name,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn post_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Json(body): Json<dto::PostTransactionRequest>,
) -> axum::response::Response {
    match services
        .post_transaction(owner.owner_id(), &body.customer_code, body.amount, body.note)
        .await
    {
        Ok(entry) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": entry.id,
                "amount": entry.amount.units(),
                "created_at": entry.created_at,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn customer_statement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Path(code): Path<String>,
) -> axum::response::Response {
    match services.owner_statement(owner.owner_id(), &code).await {
        Ok(statement) => (StatusCode::OK, Json(statement)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
