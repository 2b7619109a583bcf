//! HTTP Server
//!
//! Axum HTTP 服务器启动和中间件装配

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::extract::Request;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower::Layer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::{
    apply_security_headers, error_boundary, handle_panic, rate_limiter, ErrorBoundary,
};
use super::routes::create_routes;
use super::state::AppState;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许的跨域来源，逗号分隔；`*` 表示任意来源（此时不允许携带凭据）
    pub cors_origin: String,
    /// 错误响应是否附带调试信息（开发模式）
    pub expose_error_details: bool,
    /// 请求体大小上限
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: "http://localhost:3000".to_string(),
            expose_error_details: false,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 去掉末尾斜杠后再路由的应用
pub type App = NormalizePath<Router>;

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 构建应用
    ///
    /// 由外到内：路径规整 → CORS → 安全头 → 压缩 → 请求追踪 → 错误边界 → panic 捕获 → 限流 → 路由
    pub fn build_router(&self) -> App {
        let router = create_routes()
            .layer(from_fn(rate_limiter))
            .layer(DefaultBodyLimit::max(self.config.body_limit_bytes))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(from_fn_with_state(
                ErrorBoundary {
                    expose_details: self.config.expose_error_details,
                },
                error_boundary,
            ))
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        let router = apply_security_headers(router)
            .layer(cors_layer(&self.config.cors_origin))
            .with_state(self.state.clone());

        // 包在 Router 外面才能在路由匹配前生效
        NormalizePathLayer::trim_trailing_slash().layer(router)
    }

    /// 启动服务器（带优雅关闭）
    ///
    /// `shutdown_signal` 完成后停止接受新连接，等待进行中的请求结束
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.build_router();
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, axum::ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

/// CORS 配置
fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    if origin.trim() == "*" {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origin
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::Request;
    use tower::util::ServiceExt;

    use crate::infrastructure::persistence::sqlite::{
        test_pool, SqliteHealthProbe, SqlitePostRepository, SqliteUserRepository,
    };

    async fn test_server(config: ServerConfig) -> HttpServer {
        let pool = test_pool().await;
        let state = AppState::new(
            Arc::new(SqliteUserRepository::new(pool.clone())),
            Arc::new(SqlitePostRepository::new(pool.clone())),
            Arc::new(SqliteHealthProbe::new(pool)),
        );
        HttpServer::new(config, state)
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert!(!config.expose_error_details);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_with_credentials() {
        let server = test_server(ServerConfig::default()).await;
        let request = Request::builder()
            .uri("/api/health")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let response = server.build_router().oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers["access-control-allow-origin"],
            "http://localhost:3000"
        );
        assert_eq!(headers["access-control-allow-credentials"], "true");
        assert_eq!(headers["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let server = test_server(ServerConfig::default()).await;
        let request = Request::builder()
            .uri("/api/health")
            .header("origin", "http://evil.example")
            .body(Body::empty())
            .unwrap();

        let response = server.build_router().oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }

    #[tokio::test]
    async fn test_wildcard_origin() {
        let config = ServerConfig {
            cors_origin: "*".to_string(),
            ..ServerConfig::default()
        };
        let server = test_server(config).await;
        let request = Request::builder()
            .uri("/api/health")
            .header("origin", "http://anywhere.example")
            .body(Body::empty())
            .unwrap();

        let response = server.build_router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let config = ServerConfig {
            body_limit_bytes: 16,
            ..ServerConfig::default()
        };
        let server = test_server(config).await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/users")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"email":"a@x.com","password":"secret1","name":"a long enough name"}"#,
            ))
            .unwrap();

        let response = server.build_router().oneshot(request).await.unwrap();
        assert!(!response.status().is_success());
    }
}
