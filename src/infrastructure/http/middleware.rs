//! HTTP Middleware
//!
//! HTTP 状态码错误日志与慢请求日志

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};

/// 超过该耗时的请求记录警告（大纲生成与导出分页通常较慢）
const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(30);

/// HTTP 状态码错误日志中间件
///
/// 状态码为 4xx / 5xx 时记录日志。业务错误（errno != 0）的响应状态码为 200，
/// 在 ApiError::into_response() 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed = started.elapsed();
    let elapsed_ms = elapsed.as_millis() as u64;

    if response.status().is_server_error() {
        tracing::error!(method = %method, uri = %uri, status, elapsed_ms, "HTTP server error");
    } else if response.status().is_client_error() {
        tracing::warn!(method = %method, uri = %uri, status, elapsed_ms, "HTTP client error");
    } else if elapsed > SLOW_REQUEST_THRESHOLD {
        tracing::warn!(method = %method, uri = %uri, status, elapsed_ms, "Slow HTTP request");
    }

    response
}
