//! 中枢 HTTP API：空间编排、状态聚合、意图查询与撤销入口。

mod handlers;
mod routes;
mod seed;
mod utils;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use hub_catalog::{InMemoryCatalog, SpaceCatalog};
use hub_config::HubConfig;
use hub_intents::{IntentRegistry, RegistryConfig};
use hub_orchestration::{
    ClimateOrchestrator, CoversOrchestrator, LightingOrchestrator, MediaOrchestrator,
};
use hub_platform::{MqttPlatform, MqttPlatformConfig, NoopPlatform, PlatformRegistry};
use hub_state::{
    ClimateStateService, CoversStateService, LightingStateService, MediaStateService, StateBus,
};
use hub_telemetry::{init_tracing, new_request_ids};
use hub_timeseries::{HistoryStore, InMemoryHistoryStore};
use hub_undo::{UndoConfig, UndoExecutor, UndoManager};
use std::sync::Arc;
use tracing::{info, Instrument};

/// 进程级共享状态（全部为句柄，Clone 廉价）。
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn SpaceCatalog>,
    pub intents: Arc<IntentRegistry>,
    pub history: Arc<dyn HistoryStore>,
    pub undo: Arc<UndoManager>,
    pub undo_executor: Arc<UndoExecutor>,
    pub lighting_state: Arc<LightingStateService>,
    pub climate_state: Arc<ClimateStateService>,
    pub covers_state: Arc<CoversStateService>,
    pub media_state: Arc<MediaStateService>,
    pub lighting: Arc<LightingOrchestrator>,
    pub climate: Arc<ClimateOrchestrator>,
    pub covers: Arc<CoversOrchestrator>,
    pub media: Arc<MediaOrchestrator>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = HubConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 目录（内存实现；HUB_SEED_DEMO=1 时注入演示空间）
    let catalog = Arc::new(InMemoryCatalog::new());
    if config.seed_demo {
        seed::seed_demo(&catalog)?;
        info!(target: "hub.api", "demo_space_seeded");
    }
    let catalog: Arc<dyn SpaceCatalog> = catalog;

    // 意图注册表 + TTL 清理
    let intents = Arc::new(IntentRegistry::new(RegistryConfig {
        default_ttl_device_ms: config.intent_ttl_device_ms,
        default_ttl_space_ms: config.intent_ttl_space_ms,
        sweep_interval_ms: config.intent_sweep_interval_ms,
    }));
    intents.start();

    // 撤销栈 + 过期清理
    let undo = Arc::new(UndoManager::new(UndoConfig {
        max_entries_per_space: config.undo_max_entries_per_space,
        entry_ttl_ms: config.undo_entry_ttl_ms,
        sweep_interval_ms: config.undo_sweep_interval_ms,
    }));
    undo.start();

    // 平台注册表：演示驱动常驻，MQTT 按配置接入
    let platforms = Arc::new(PlatformRegistry::new());
    platforms.register("demo", Arc::new(NoopPlatform));
    let mut mqtt_task = None;
    if config.mqtt_enabled {
        let (mqtt, task) = MqttPlatform::connect(MqttPlatformConfig {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            command_topic_prefix: config.mqtt_command_topic_prefix.clone(),
            qos: config.mqtt_command_qos,
        })?;
        platforms.register("mqtt", Arc::new(mqtt));
        mqtt_task = Some(task);
        info!(target: "hub.api", host = %config.mqtt_host, port = config.mqtt_port, "mqtt_platform_enabled");
    }

    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
    let bus = StateBus::default();

    // 状态聚合服务
    let lighting_state = Arc::new(LightingStateService::new(
        catalog.clone(),
        history.clone(),
        config.tolerances,
    ));
    let climate_state = Arc::new(ClimateStateService::new(catalog.clone(), config.tolerances));
    let covers_state = Arc::new(CoversStateService::new(
        catalog.clone(),
        history.clone(),
        config.tolerances,
    ));
    let media_state = Arc::new(MediaStateService::new(
        catalog.clone(),
        history.clone(),
        config.tolerances,
    ));

    // 域编排器
    let lighting = Arc::new(LightingOrchestrator::new(
        catalog.clone(),
        intents.clone(),
        platforms.clone(),
        history.clone(),
        undo.clone(),
        bus.clone(),
    ));
    let climate = Arc::new(ClimateOrchestrator::new(
        catalog.clone(),
        intents.clone(),
        platforms.clone(),
        history.clone(),
        undo.clone(),
        bus.clone(),
        climate_state.clone(),
    ));
    let covers = Arc::new(CoversOrchestrator::new(
        catalog.clone(),
        intents.clone(),
        platforms.clone(),
        history.clone(),
        undo.clone(),
        bus.clone(),
    ));
    let media = Arc::new(MediaOrchestrator::new(
        catalog.clone(),
        intents.clone(),
        platforms.clone(),
        history.clone(),
        undo.clone(),
        bus,
    ));

    let undo_executor = Arc::new(UndoExecutor::new(undo.clone(), platforms));

    let state = AppState {
        catalog,
        intents,
        history,
        undo,
        undo_executor,
        lighting_state,
        climate_state,
        covers_state,
        media_state,
        lighting,
        climate,
        covers,
        media,
    };

    let app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", routes::create_api_router())
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context));

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "hub.api", addr = %config.http_addr, "http_listening");
    axum::serve(listener, app).await?;

    if let Some(task) = mqtt_task {
        task.abort();
    }
    Ok(())
}

async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    // 生成 request_id 与 trace_id，并注入请求扩展与日志
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
