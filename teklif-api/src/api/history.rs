use std::sync::Arc;

use axum::{body::Bytes, extract::State, routing::get, Json, Router};
use pricing::{HistoryDocument, HistoryRecord};
use tracing::warn;

use crate::api::response::ApiResponse;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/history", get(list_history).post(append_history))
}

/// 读取失败时返回 `{ history: [] }`
async fn list_history(State(state): State<Arc<AppState>>) -> Json<HistoryDocument> {
    Json(state.history.list().await)
}

/// 请求体为单条记录，插入到最前面
async fn append_history(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResponse<()> {
    let record: HistoryRecord = match serde_json::from_slice(&body) {
        Ok(record) => record,
        Err(err) => {
            warn!(error = %err, "rejected history record");
            return ApiResponse::failure(err.to_string());
        }
    };

    match state.history.record(record).await {
        Ok(()) => ApiResponse::ok(),
        Err(err) => {
            warn!(error = %err, "failed to save history record");
            ApiResponse::failure(err.to_string())
        }
    }
}
