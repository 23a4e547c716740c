use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name to the messages collected for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// The first message, used as the summary line of the response.
    pub fn summary(&self) -> String {
        self.0
            .values()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_else(|| "The given data was invalid.".to_string())
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() { Ok(()) } else { Err(ApiError::Validation(self)) }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {}", .0.summary())]
    Validation(ValidationErrors),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{1}")]
    Rejected(StatusCode, String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

const BODY_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Body errors that reached a field become validation errors on that field.
/// Malformed JSON and a missing content type keep axum's status.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                let text = e.body_text();
                let detail = text.strip_prefix(BODY_PREFIX).unwrap_or(&text);
                let (field, message) = match detail.split_once(": ") {
                    Some((path, message)) if is_field_path(path) => (path, message),
                    _ => ("body", detail),
                };

                let mut errors = ValidationErrors::new();
                errors.add(field, format!("The {field} field is invalid: {message}"));
                ApiError::Validation(errors)
            }
            other => ApiError::Rejected(other.status(), other.body_text()),
        }
    }
}

fn is_field_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '[' || c == ']')
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    message: errors.summary(),
                    errors: Some(errors),
                },
            ),
            ApiError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    message: format!("{entity} not found"),
                    errors: None,
                },
            ),
            ApiError::Rejected(status, message) => (status, ErrorResponse { message, errors: None }),
            ApiError::Internal(e) => {
                tracing::error!("request failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        message: "Server Error".to_string(),
                        errors: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// SQLite reports every foreign key failure with the same message and no column.
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|e| e.to_string().contains("FOREIGN KEY constraint failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_maps_to_422() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "The name field is required.");
        let response = ApiError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = ApiError::NotFound("Author").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_rejected_body_keeps_status() {
        let response = ApiError::Rejected(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected json".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_field_paths() {
        assert!(is_field_path("author_id"));
        assert!(is_field_path("books[0].title"));
        assert!(!is_field_path("expected value at line 1 column 1"));
        assert!(!is_field_path(""));
    }

    #[test]
    fn test_internal_error_maps_to_500() {
        let response = ApiError::Internal(anyhow::anyhow!("disk on fire")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_empty_errors_pass() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_summary_uses_first_message() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "The title field is required.");
        errors.add("title", "The title must be text.");
        assert_eq!(errors.summary(), "The title field is required.");
        assert_eq!(errors.get("title").map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_foreign_key_detection() {
        let err = anyhow::anyhow!("SQLite failure: `FOREIGN KEY constraint failed`");
        assert!(is_foreign_key_violation(&err));
        assert!(!is_foreign_key_violation(&anyhow::anyhow!("no such table: books")));
    }
}
