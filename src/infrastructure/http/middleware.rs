//! HTTP Middleware
//!
//! - 错误边界：统一记录错误响应，开发模式下附加调试信息
//! - 安全响应头
//! - panic 捕获
//! - 限流占位

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json, Router,
};
use std::any::Any;
use tower_http::set_header::SetResponseHeaderLayer;

use super::dto::ErrorResponse;
use super::error::{ApiError, ErrorContext};

/// 未匹配路由的统一响应
pub const ROUTE_NOT_FOUND: &str = "Route not found";

// ============================================================================
// Error boundary
// ============================================================================

/// 错误边界配置
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorBoundary {
    /// 是否在响应中附带 `stack`
    pub expose_details: bool,
}

/// 错误边界中间件
///
/// [`ApiError`] 产生的响应带有 [`ErrorContext`]，在这里按
/// `status_code / message / stack / path / method` 记录。
/// 其余 4xx/5xx 只记录状态码。
pub async fn error_boundary(
    State(boundary): State<ErrorBoundary>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let status = response.status();

    let Some(context) = response.extensions_mut().remove::<ErrorContext>() else {
        if status == StatusCode::METHOD_NOT_ALLOWED {
            tracing::warn!(method = %method, path = %path, "Method not allowed");
            return route_not_found().await.into_response();
        }
        if status.is_server_error() {
            tracing::error!(
                method = %method,
                path = %path,
                status = %status.as_u16(),
                "HTTP server error"
            );
        } else if status.is_client_error() {
            tracing::warn!(
                method = %method,
                path = %path,
                status = %status.as_u16(),
                "HTTP client error"
            );
        }
        return response;
    };

    if context.status.is_server_error() {
        tracing::error!(
            status_code = context.status.as_u16(),
            message = %context.message,
            stack = %context.detail,
            path = %path,
            method = %method,
            "Request failed"
        );
    } else {
        tracing::warn!(
            status_code = context.status.as_u16(),
            message = %context.message,
            stack = %context.detail,
            path = %path,
            method = %method,
            "Request rejected"
        );
    }

    if boundary.expose_details {
        let body = ErrorResponse::new(context.public_message).with_stack(context.detail);
        return (context.status, Json(body)).into_response();
    }

    response
}

/// 未匹配路由
pub async fn route_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(ROUTE_NOT_FOUND)))
}

// ============================================================================
// Panic
// ============================================================================

/// 把 handler 中的 panic 转为 500
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    ApiError::Internal(format!("Handler panicked: {}", detail)).into_response()
}

// ============================================================================
// Security headers
// ============================================================================

const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-permitted-cross-domain-policies", "none"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
];

/// 为所有响应加上安全相关的响应头（已存在则不覆盖）
pub fn apply_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SECURITY_HEADERS.iter().fold(router, |router, &(name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

// ============================================================================
// Rate limiting
// ============================================================================

/// 限流占位，目前直接放行
pub async fn rate_limiter(request: Request, next: Next) -> Response {
    next.run(request).await
}
