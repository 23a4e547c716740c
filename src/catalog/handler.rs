//! HTTP handlers shared by every catalog resource

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{Catalog, CatalogResource};
use crate::api::{JsonBody, created, success};
use crate::error::ApiError;
use crate::handler::AppState;

pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route")
}

pub async fn index<R: CatalogResource>(State(state): State<AppState>) -> Result<Response, ApiError> {
    let catalog = Catalog::new(state.db.connection());
    let records = R::list(&catalog).await?;
    Ok(success(records))
}

pub async fn store<R: CatalogResource>(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<R::Input>,
) -> Result<Response, ApiError> {
    R::validate_store(&payload).into_result()?;

    let catalog = Catalog::new(state.db.connection());
    let record = R::create(&catalog, payload).await?;
    tracing::info!(resource = R::LABEL, "created");
    Ok(created(record))
}

pub async fn show<R: CatalogResource>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let catalog = Catalog::new(state.db.connection());
    match R::find(&catalog, id).await? {
        Some(record) => Ok(success(record)),
        None => Err(ApiError::NotFound(R::LABEL)),
    }
}

pub async fn update<R: CatalogResource>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<R::Input>,
) -> Result<Response, ApiError> {
    let catalog = Catalog::new(state.db.connection());
    if !R::exists(&catalog, id).await? {
        return Err(ApiError::NotFound(R::LABEL));
    }
    R::validate_update(&payload).into_result()?;

    match R::update(&catalog, id, payload).await? {
        Some(record) => {
            tracing::info!(resource = R::LABEL, id, "updated");
            Ok(success(record))
        }
        None => Err(ApiError::NotFound(R::LABEL)),
    }
}

pub async fn destroy<R: CatalogResource>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let catalog = Catalog::new(state.db.connection());
    if R::delete(&catalog, id).await? {
        tracing::info!(resource = R::LABEL, id, "deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(ApiError::NotFound(R::LABEL))
    }
}
