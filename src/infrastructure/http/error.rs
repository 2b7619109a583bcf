//! HTTP Error Handling
//!
//! 错误分类到状态码的映射。响应体只带对外信息，
//! 完整信息放在 [`ErrorContext`] 扩展里交给错误边界中间件记录。

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ErrorResponse;
use crate::application::{ApplicationError, RepositoryError};

/// 未分类错误对外统一的信息
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// 内部错误，消息不会返回给调用方
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给调用方的信息
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => msg,
            ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

/// 附加在错误响应上的诊断信息
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub status: StatusCode,
    pub public_message: String,
    pub message: String,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let context = ErrorContext {
            status,
            public_message: self.public_message().to_string(),
            message: self.message().to_string(),
            detail: format!("{:?}", self),
        };

        let mut response =
            (status, Json(ErrorResponse::new(context.public_message.clone()))).into_response();
        response.extensions_mut().insert(context);
        response
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound(msg) => ApiError::NotFound(msg),
            ApplicationError::Conflict(msg) => ApiError::Conflict(msg),
            other @ ApplicationError::Repository(_) => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        ApplicationError::from(e).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(_)
            | JsonRejection::JsonDataError(_)
            | JsonRejection::MissingJsonContentType(_) => {
                ApiError::BadRequest(rejection.body_text())
            }
            // 读取请求体失败等与校验无关的问题
            other => ApiError::Internal(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_message_is_not_leaked() {
        let err = ApiError::Internal("Repository error: disk I/O error".into());
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);

        let response = err.into_response();
        let context = response.extensions().get::<ErrorContext>().unwrap();
        assert_eq!(context.public_message, INTERNAL_ERROR_MESSAGE);
        assert_eq!(context.message, "Repository error: disk I/O error");
        assert!(context.detail.contains("disk I/O error"));
    }

    #[test]
    fn test_application_errors_map_to_taxonomy() {
        let err: ApiError = ApplicationError::not_found("Author not found").into();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Author not found"));

        let err: ApiError = ApplicationError::conflict("Email already in use").into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = RepositoryError::DatabaseError("locked".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
