use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CustomerContext;

pub fn public_router() -> Router {
    Router::new().route("/login", post(login))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/data", get(data))
        .route("/change-password", post(change_password))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CustomerLoginRequest>,
) -> axum::response::Response {
    match services
        .customer_login(&body.shop_code, &body.customer_code, &body.password)
        .await
    {
        Ok(token) => (StatusCode::OK, Json(serde_json::json!({ "token": token }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn data(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(customer): Extension<CustomerContext>,
) -> axum::response::Response {
    match services.customer_data(customer).await {
        Ok((shop_code, statement)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "name": statement.customer_name,
                "customer_code": statement.customer_code.as_str(),
                "shop_code": shop_code.as_str(),
                "balance": statement.balance,
                "transactions": statement.entries,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(customer): Extension<CustomerContext>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> axum::response::Response {
    match services
        .change_password(customer, &body.current_password, &body.new_password)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "password_changed" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
