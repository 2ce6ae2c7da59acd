/// The JSON success envelope
///
/// Every successful response is `{ "success": true, "data": ..., "message"?:
/// ..., "count"?: ... }`; `count` is set on collection responses. The
/// matching failure envelope lives in [`crate::error`].
///
/// # Example
///
/// ```
/// use sitedesk_api::response::ApiResponse;
///
/// async fn handler() -> ApiResponse<Vec<String>> {
///     ApiResponse::list(vec!["a".to_string(), "b".to_string()])
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Wrapper adding the success envelope to handler return values
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    data: T,
    message: Option<String>,
    count: Option<usize>,
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with data
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
            count: None,
            status: StatusCode::OK,
        }
    }

    /// 201 Created with data
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::success(data)
        }
    }

    /// Attaches a human-readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// 200 OK with a collection; `count` is the collection length
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            count: Some(count),
            ..Self::success(data)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "internal_error",
                        "message": "An internal error occurred"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({
            "success": true,
            "data": data,
        });
        if let Some(message) = self.message {
            envelope["message"] = json!(message);
        }
        if let Some(count) = self.count {
            envelope["count"] = json!(count);
        }

        (self.status, Json(envelope)).into_response()
    }
}
