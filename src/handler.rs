use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::{HealthResponse, success};
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

pub async fn healthcheck(State(state): State<AppState>) -> Response {
    tracing::debug!("got healthcheck request");
    match state.db.connection().query("SELECT 1", ()).await {
        Ok(_) => success(HealthResponse::new("ok")),
        Err(e) => {
            tracing::error!("healthcheck failed. db_error: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse::new("unavailable"))).into_response()
        }
    }
}
