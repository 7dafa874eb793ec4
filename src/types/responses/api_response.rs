use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            message: message.into(),
            error: None,
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>, error: ErrorDetails) -> Self {
        ApiResponse {
            message: message.into(),
            error: Some(error),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_omits_error_block() {
        let body = serde_json::to_value(ApiResponse::success("ok", 3)).unwrap();
        assert_eq!(body, json!({ "message": "ok", "data": 3 }));
    }

    #[test]
    fn error_without_details_keeps_empty_error_object() {
        let body = serde_json::to_value(ApiResponse::<()>::error(
            "nope",
            ErrorDetails { details: None },
        ))
        .unwrap();
        assert_eq!(body, json!({ "message": "nope", "error": {} }));
    }
}
