//! 追踪与请求 ID 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub intents_created: u64,
    pub intents_completed: u64,
    pub intents_expired: u64,
    pub orchestrations_executed: u64,
    pub devices_commanded: u64,
    pub devices_failed: u64,
    pub devices_skipped_offline: u64,
    pub undo_snapshots_pushed: u64,
    pub undo_executed: u64,
    pub history_write_success: u64,
    pub history_write_failure: u64,
}

/// 基础指标。
pub struct TelemetryMetrics {
    intents_created: AtomicU64,
    intents_completed: AtomicU64,
    intents_expired: AtomicU64,
    orchestrations_executed: AtomicU64,
    devices_commanded: AtomicU64,
    devices_failed: AtomicU64,
    devices_skipped_offline: AtomicU64,
    undo_snapshots_pushed: AtomicU64,
    undo_executed: AtomicU64,
    history_write_success: AtomicU64,
    history_write_failure: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            intents_created: AtomicU64::new(0),
            intents_completed: AtomicU64::new(0),
            intents_expired: AtomicU64::new(0),
            orchestrations_executed: AtomicU64::new(0),
            devices_commanded: AtomicU64::new(0),
            devices_failed: AtomicU64::new(0),
            devices_skipped_offline: AtomicU64::new(0),
            undo_snapshots_pushed: AtomicU64::new(0),
            undo_executed: AtomicU64::new(0),
            history_write_success: AtomicU64::new(0),
            history_write_failure: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            intents_created: self.intents_created.load(Ordering::Relaxed),
            intents_completed: self.intents_completed.load(Ordering::Relaxed),
            intents_expired: self.intents_expired.load(Ordering::Relaxed),
            orchestrations_executed: self.orchestrations_executed.load(Ordering::Relaxed),
            devices_commanded: self.devices_commanded.load(Ordering::Relaxed),
            devices_failed: self.devices_failed.load(Ordering::Relaxed),
            devices_skipped_offline: self.devices_skipped_offline.load(Ordering::Relaxed),
            undo_snapshots_pushed: self.undo_snapshots_pushed.load(Ordering::Relaxed),
            undo_executed: self.undo_executed.load(Ordering::Relaxed),
            history_write_success: self.history_write_success.load(Ordering::Relaxed),
            history_write_failure: self.history_write_failure.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录意图创建次数。
pub fn record_intent_created() {
    metrics().intents_created.fetch_add(1, Ordering::Relaxed);
}

/// 记录意图完成次数（任意终态，不含过期）。
pub fn record_intent_completed() {
    metrics().intents_completed.fetch_add(1, Ordering::Relaxed);
}

/// 记录意图过期次数（TTL 清理）。
pub fn record_intent_expired() {
    metrics().intents_expired.fetch_add(1, Ordering::Relaxed);
}

/// 记录编排执行次数。
pub fn record_orchestration_executed() {
    metrics()
        .orchestrations_executed
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录命令下发成功的设备数。
pub fn record_devices_commanded(count: u64) {
    metrics()
        .devices_commanded
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录命令下发失败的设备数。
pub fn record_devices_failed(count: u64) {
    metrics().devices_failed.fetch_add(count, Ordering::Relaxed);
}

/// 记录因离线被跳过的设备数。
pub fn record_devices_skipped_offline(count: u64) {
    metrics()
        .devices_skipped_offline
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录撤销快照入栈次数。
pub fn record_undo_snapshot_pushed() {
    metrics()
        .undo_snapshots_pushed
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录撤销执行次数。
pub fn record_undo_executed() {
    metrics().undo_executed.fetch_add(1, Ordering::Relaxed);
}

/// 记录历史存储写入成功次数。
pub fn record_history_write_success() {
    metrics()
        .history_write_success
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录历史存储写入失败次数。
pub fn record_history_write_failure() {
    metrics()
        .history_write_failure
        .fetch_add(1, Ordering::Relaxed);
}
