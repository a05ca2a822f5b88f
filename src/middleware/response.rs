use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that automatically adds success envelope.
///
/// Object payloads are merged next to `"success": true` so clients read
/// `body.questions` directly; anything else is nested under `"data"`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

/// Build the envelope body for a serialized payload
pub fn envelope(data: Value) -> Value {
    match data {
        Value::Object(mut fields) => {
            fields.insert("success".to_string(), Value::Bool(true));
            Value::Object(fields)
        }
        other => json!({
            "success": true,
            "data": other
        }),
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": true,
                        "message": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        (status, Json(envelope(data_value))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_are_flattened_beside_success() {
        let body = envelope(json!({ "questions": [1, 2] }));
        assert_eq!(body, json!({ "success": true, "questions": [1, 2] }));
    }

    #[test]
    fn non_objects_nest_under_data() {
        assert_eq!(envelope(json!([1, 2])), json!({ "success": true, "data": [1, 2] }));
        assert_eq!(envelope(Value::Null), json!({ "success": true, "data": null }));
    }

    #[test]
    fn created_sets_status() {
        let response = ApiResponse::created(json!({ "message": "ok" })).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
