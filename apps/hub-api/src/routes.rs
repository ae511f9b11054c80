//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 指标：/metrics
//! - 意图查询：/intents, /intents/{id}
//! - 空间编排：/spaces/{id}/{lighting|climate|covers|media}/intents
//! - 空间状态：/spaces/{id}/{lighting|climate|covers|media}/state
//! - 意图历史：/spaces/{id}/history
//! - 撤销：/spaces/{id}/undo

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// 创建 API 路由（挂载在 /api 前缀下）
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/intents", get(list_active_intents))
        .route("/intents/:intent_id", get(get_intent))
        .route(
            "/spaces/:space_id/lighting/intents",
            post(post_lighting_intent),
        )
        .route("/spaces/:space_id/lighting/state", get(get_lighting_state))
        .route(
            "/spaces/:space_id/climate/intents",
            post(post_climate_intent),
        )
        .route("/spaces/:space_id/climate/state", get(get_climate_state))
        .route("/spaces/:space_id/covers/intents", post(post_covers_intent))
        .route("/spaces/:space_id/covers/state", get(get_covers_state))
        .route("/spaces/:space_id/media/intents", post(post_media_intent))
        .route("/spaces/:space_id/media/state", get(get_media_state))
        .route("/spaces/:space_id/history", get(get_space_history))
        .route("/spaces/:space_id/undo", post(trigger_undo).get(peek_undo))
}
