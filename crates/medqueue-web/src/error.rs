//! HTTP 错误映射

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medqueue_core::MedQueueError;
use serde_json::json;

/// 处理器错误，包装领域错误并映射为 HTTP 状态码
#[derive(Debug)]
pub struct ApiError(pub MedQueueError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<MedQueueError> for ApiError {
    fn from(err: MedQueueError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            MedQueueError::Validation(_) | MedQueueError::InvalidStateTransition { .. } => {
                StatusCode::BAD_REQUEST
            }
            MedQueueError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            MedQueueError::Permission(_) => StatusCode::FORBIDDEN,
            MedQueueError::NotFound(_) => StatusCode::NOT_FOUND,
            MedQueueError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match &self.0 {
            MedQueueError::Validation(_) => "validation_error",
            MedQueueError::InvalidStateTransition { .. } => "invalid_transition",
            MedQueueError::Unauthenticated(_) => "unauthenticated",
            MedQueueError::Permission(_) => "forbidden",
            MedQueueError::NotFound(_) => "not_found",
            MedQueueError::Storage(_) => "storage_unavailable",
            _ => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 服务端错误不向客户端暴露内部细节
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
            match status {
                StatusCode::SERVICE_UNAVAILABLE => "Storage is temporarily unavailable".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.0.to_string()
        };

        let body = json!({
            "error": self.code(),
            "message": message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (MedQueueError::Validation("age".into()), StatusCode::BAD_REQUEST),
            (
                MedQueueError::InvalidStateTransition {
                    from: "completed".into(),
                    to: "waiting".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (MedQueueError::Permission("role".into()), StatusCode::FORBIDDEN),
            (MedQueueError::Unauthenticated("token".into()), StatusCode::UNAUTHORIZED),
            (MedQueueError::NotFound("patient".into()), StatusCode::NOT_FOUND),
            (MedQueueError::Storage("pool".into()), StatusCode::SERVICE_UNAVAILABLE),
            (MedQueueError::Internal("bug".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status_code(), expected);
        }
    }

    #[test]
    fn test_storage_details_hidden() {
        let response = ApiError(MedQueueError::Storage("password=hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
