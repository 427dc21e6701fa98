use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

// 错误日志中间件
pub async fn log_errors(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    if response.status().is_client_error() || response.status().is_server_error() {
        warn!(%method, %uri, status = response.status().as_u16(), "request failed");
    }

    response
}
