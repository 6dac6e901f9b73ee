//! 请求体提取

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use medqueue_core::MedQueueError;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON 请求体，解析失败时按校验错误返回统一的错误响应
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(MedQueueError::Validation(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use medqueue_core::Severity;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Triage {
        severity: Severity,
    }

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(value) = content_type {
            builder = builder.header(header::CONTENT_TYPE, value);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_body_parsed() {
        let ApiJson(triage) = ApiJson::<Triage>::from_request(
            request(Some("application/json"), r#"{"severity":"high"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(triage.severity, Severity::High);
    }

    #[tokio::test]
    async fn test_rejections_become_validation_errors() {
        let cases = [
            (Some("application/json"), r#"{"severity":"urgent"}"#),
            (Some("application/json"), "{not json"),
            (None, r#"{"severity":"high"}"#),
        ];

        for (content_type, body) in cases {
            let err = ApiJson::<Triage>::from_request(request(content_type, body), &())
                .await
                .unwrap_err();
            assert!(matches!(err.0, MedQueueError::Validation(_)), "{:?}", err);
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
    }
}
