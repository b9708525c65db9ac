//! 引擎就绪状态

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::translation::EngineStatus;
use crate::web::types::AppState;

/// `GET /status`，供前端轮询 `{ready, remaining}`
pub async fn engine_status(State(state): State<Arc<AppState>>) -> Json<EngineStatus> {
    Json(state.pipeline.engine().status())
}
