//! Owner bootstrap, gated by the shared admin password carried in the body.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/owners", post(create_owner))
}

pub async fn create_owner(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateOwnerRequest>,
) -> axum::response::Response {
    let owner = match services
        .create_owner(&body.admin_password, &body.email, &body.shop_code)
        .await
    {
        Ok(o) => o,
        Err(e) => return errors::store_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": owner.id.to_string(),
            "email": owner.email,
            "shop_code": owner.shop_code.as_str(),
        })),
    )
        .into_response()
}
