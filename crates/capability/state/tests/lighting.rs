use domain::{
    ChannelCategory, ChannelView, ConnectionState, DeviceCategory, DeviceView, LightingMode,
    LightingRole, PropertyCategory, PropertyValue, PropertyView, Space,
};
use hub_catalog::{InMemoryCatalog, RoleAssignment};
use hub_config::ConsensusTolerances;
use hub_state::{LightingStateService, ModeConfidence};
use hub_timeseries::{HistoryStore, InMemoryHistoryStore, SpaceIntentPoint};
use std::sync::Arc;

const SPACE_ID: &str = "7b6a4f9e-3c1d-4e2a-9f00-1234567890ab";

fn light(id: &str, on: bool, brightness: f64) -> DeviceView {
    let mut on_prop = PropertyView::new("on", PropertyCategory::On);
    on_prop.value = Some(PropertyValue::Bool(on));
    let mut brightness_prop = PropertyView::new("brightness", PropertyCategory::Brightness);
    brightness_prop.value = Some(PropertyValue::F64(brightness));
    brightness_prop.min = Some(0.0);
    brightness_prop.max = Some(100.0);
    DeviceView {
        id: id.to_string(),
        name: format!("Light {}", id),
        driver: "demo".to_string(),
        category: DeviceCategory::Lighting,
        online: true,
        connection: ConnectionState::Connected,
        channels: vec![ChannelView {
            id: "ch1".to_string(),
            category: ChannelCategory::Light,
            properties: vec![on_prop, brightness_prop],
        }],
    }
}

fn setup() -> (Arc<InMemoryCatalog>, Arc<InMemoryHistoryStore>, LightingStateService) {
    let catalog = Arc::new(InMemoryCatalog::new());
    let history = Arc::new(InMemoryHistoryStore::new());
    catalog
        .upsert_space(Space::new(SPACE_ID, "Living Room"))
        .expect("space");
    let service = LightingStateService::new(
        catalog.clone(),
        history.clone(),
        ConsensusTolerances::default(),
    );
    (catalog, history, service)
}

fn assign(catalog: &InMemoryCatalog, device_id: &str, role: LightingRole) {
    catalog
        .assign_lighting_role(RoleAssignment {
            space_id: SPACE_ID.to_string(),
            device_id: device_id.to_string(),
            channel_id: "ch1".to_string(),
            role,
            priority: 0,
        })
        .expect("role");
}

#[tokio::test]
async fn missing_space_is_none() {
    let (_, _, service) = setup();
    let state = service.get_state("unknown").await.expect("state");
    assert!(state.is_none());
}

#[tokio::test]
async fn aggregates_on_count_and_brightness() {
    let (catalog, _, service) = setup();
    catalog.upsert_device(SPACE_ID, light("l1", true, 80.0)).expect("device");
    catalog.upsert_device(SPACE_ID, light("l2", true, 84.0)).expect("device");
    catalog.upsert_device(SPACE_ID, light("l3", false, 0.0)).expect("device");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert_eq!(state.total_count, 3);
    assert_eq!(state.on_count, 2);
    assert!(state.any_on);
    assert!(!state.all_on);
    // 两亮一灭 → 开关状态混合。
    assert!(state.is_on_mixed);
    assert_eq!(state.brightness, Some(82.0));
    assert!(!state.brightness_mixed);
}

#[tokio::test]
async fn uniform_on_state_is_not_on_mixed() {
    let (catalog, _, service) = setup();
    catalog.upsert_device(SPACE_ID, light("l1", true, 80.0)).expect("device");
    catalog.upsert_device(SPACE_ID, light("l2", true, 80.0)).expect("device");
    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert!(!state.is_on_mixed);

    catalog.upsert_device(SPACE_ID, light("l1", false, 0.0)).expect("device");
    catalog.upsert_device(SPACE_ID, light("l2", false, 0.0)).expect("device");
    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert!(!state.is_on_mixed);
    assert!(!state.any_on);
}

#[tokio::test]
async fn spread_beyond_tolerance_is_mixed() {
    let (catalog, _, service) = setup();
    catalog.upsert_device(SPACE_ID, light("l1", true, 20.0)).expect("device");
    catalog.upsert_device(SPACE_ID, light("l2", true, 90.0)).expect("device");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert!(state.brightness_mixed);
    // 混合状态下不报任意平均值。
    assert_eq!(state.brightness, None);
}

#[tokio::test]
async fn disconnected_devices_are_excluded_but_unknown_participate() {
    let (catalog, _, service) = setup();
    let mut offline = light("l1", true, 100.0);
    offline.online = false;
    offline.connection = ConnectionState::Disconnected;
    catalog.upsert_device(SPACE_ID, offline).expect("device");
    // 连接状态未知的设备按可能在线处理。
    let mut unknown = light("l2", true, 50.0);
    unknown.online = false;
    unknown.connection = ConnectionState::Unknown;
    catalog.upsert_device(SPACE_ID, unknown).expect("device");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert_eq!(state.total_count, 1);
    assert_eq!(state.brightness, Some(50.0));
}

#[tokio::test]
async fn hidden_role_is_excluded() {
    let (catalog, _, service) = setup();
    catalog.upsert_device(SPACE_ID, light("l1", true, 100.0)).expect("device");
    catalog.upsert_device(SPACE_ID, light("l2", true, 10.0)).expect("device");
    assign(&catalog, "l2", LightingRole::Hidden);

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert_eq!(state.total_count, 1);
    assert_eq!(state.brightness, Some(100.0));
}

#[tokio::test]
async fn detects_work_mode_exactly() {
    let (catalog, _, service) = setup();
    catalog.upsert_device(SPACE_ID, light("l1", true, 100.0)).expect("device");
    catalog.upsert_device(SPACE_ID, light("l2", true, 82.0)).expect("device");
    assign(&catalog, "l1", LightingRole::Main);
    assign(&catalog, "l2", LightingRole::Ambient);

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert_eq!(state.detected_mode, Some(LightingMode::Work));
    assert_eq!(state.mode_confidence, Some(ModeConfidence::Exact));
}

#[tokio::test]
async fn loose_brightness_gives_approximate_confidence() {
    let (catalog, _, service) = setup();
    catalog.upsert_device(SPACE_ID, light("l1", true, 90.0)).expect("device");
    assign(&catalog, "l1", LightingRole::Main);

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert_eq!(state.detected_mode, Some(LightingMode::Work));
    assert_eq!(state.mode_confidence, Some(ModeConfidence::Approximate));
}

#[tokio::test]
async fn ambiguous_detection_prefers_last_applied_mode() {
    let (catalog, history, service) = setup();
    // 氛围灯 70%：work 期望 80、relax 期望 60，两者都在放宽容差内。
    catalog.upsert_device(SPACE_ID, light("l1", true, 70.0)).expect("device");
    assign(&catalog, "l1", LightingRole::Ambient);
    history
        .write_point(SpaceIntentPoint {
            space_id: SPACE_ID.to_string(),
            intent_type: "lighting.setMode".to_string(),
            status: "completed_success".to_string(),
            intent_id: "intent-1".to_string(),
            mode: Some("relax".to_string()),
            targets_count: 1,
            success_count: 1,
            failed_count: 0,
            ts_ms: 1_000,
        })
        .await
        .expect("write");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert_eq!(state.detected_mode, Some(LightingMode::Relax));
    assert_eq!(state.mode_confidence, Some(ModeConfidence::Approximate));
}

#[tokio::test]
async fn no_roles_means_no_detection() {
    let (catalog, _, service) = setup();
    catalog.upsert_device(SPACE_ID, light("l1", true, 100.0)).expect("device");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert!(state.detected_mode.is_none());
    assert!(state.mode_confidence.is_none());
}
