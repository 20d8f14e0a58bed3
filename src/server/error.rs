// JSON envelopes for API responses

use axum::{
    extract::rejection::BytesRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::chat::RequestError;

pub const MSG_METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const MSG_MALFORMED_REQUEST: &str = "不正なリクエストです。";
pub const MSG_BODY_TOO_LARGE: &str = "リクエストが大きすぎます。";
pub const MSG_MISSING_FIELDS: &str = "教科・単元・質問は必須です。";
pub const MSG_CONTENT_UNAVAILABLE: &str = "教材データの読み込みに失敗しました。";
pub const MSG_MATERIAL_NOT_FOUND: &str = "指定された教材が見つかりません。";
pub const MSG_SUBJECT_NOT_FOUND: &str = "指定された教科が見つかりませんでした。";
pub const MSG_UNIT_NOT_FOUND: &str = "指定された単元が見つかりませんでした。";
pub const MSG_TUTOR_FAILED: &str = "家庭教師からの返信に失敗しました。";
pub const MSG_ROUTE_NOT_FOUND: &str = "Not found";

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// JSON body with an explicit status and `application/json; charset=utf-8`.
///
/// serde_json leaves non-ASCII characters and `/` unescaped.
pub struct JsonResponse<T>(pub StatusCode, pub T);

impl<T: Serialize> JsonResponse<T> {
    pub fn ok(body: T) -> Self {
        Self(StatusCode::OK, body)
    }
}

impl<T: Serialize> IntoResponse for JsonResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.1) {
            Ok(bytes) => {
                let mut response = (self.0, bytes).into_response();
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
                response
            }
            Err(e) => {
                tracing::error!("Failed to serialize response body: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Error envelope: `{"error": ..., "details"?: ...}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Client-facing failure of an API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    MethodNotAllowed,
    BadRequest(&'static str),
    PayloadTooLarge,
    NotFound(&'static str),
    /// Content store or gateway failure. `details` is only filled when the
    /// server is configured to expose diagnostics.
    Internal {
        message: &'static str,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn content_unavailable() -> Self {
        ApiError::Internal {
            message: MSG_CONTENT_UNAVAILABLE,
            details: None,
        }
    }

    fn into_body(self) -> ErrorBody {
        let (error, details) = match self {
            ApiError::MethodNotAllowed => (MSG_METHOD_NOT_ALLOWED, None),
            ApiError::PayloadTooLarge => (MSG_BODY_TOO_LARGE, None),
            ApiError::BadRequest(message) | ApiError::NotFound(message) => (message, None),
            ApiError::Internal { message, details } => (message, details),
        };
        ErrorBody {
            error: error.to_string(),
            details,
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        match e {
            RequestError::Malformed => ApiError::BadRequest(MSG_MALFORMED_REQUEST),
            RequestError::MissingFields => ApiError::BadRequest(MSG_MISSING_FIELDS),
        }
    }
}

/// Body could not be buffered: over the size limit or a broken stream.
impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(MSG_MALFORMED_REQUEST)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        JsonResponse(status, self.into_body()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ApiError::from(RequestError::MissingFields).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound(MSG_MATERIAL_NOT_FOUND).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::content_unavailable().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_details_only_when_present() {
        let body = serde_json::to_value(ApiError::content_unavailable().into_body()).unwrap();
        assert_eq!(body, serde_json::json!({"error": MSG_CONTENT_UNAVAILABLE}));

        let body = serde_json::to_value(
            ApiError::Internal {
                message: MSG_TUTOR_FAILED,
                details: Some("EmptyAnswerError: none".into()),
            }
            .into_body(),
        )
        .unwrap();
        assert_eq!(body["details"], "EmptyAnswerError: none");
    }

    #[test]
    fn test_content_type_has_charset() {
        let response = ApiError::MethodNotAllowed.into_response();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
    }
}
