use domain::{
    ChannelCategory, ChannelView, ClimateMode, ConnectionState, DeviceCategory, DeviceView,
    PropertyCategory, PropertyValue, PropertyView, Space,
};
use hub_catalog::InMemoryCatalog;
use hub_config::ConsensusTolerances;
use hub_state::ClimateStateService;
use std::sync::Arc;

const SPACE_ID: &str = "7b6a4f9e-3c1d-4e2a-9f00-1234567890ab";

fn thermostat(id: &str, setpoint: f64, min: f64, max: f64, mode: Option<&str>) -> DeviceView {
    let mut setpoint_prop = PropertyView::new("target", PropertyCategory::Temperature);
    setpoint_prop.value = Some(PropertyValue::F64(setpoint));
    setpoint_prop.min = Some(min);
    setpoint_prop.max = Some(max);
    let mut properties = vec![setpoint_prop];
    if let Some(mode) = mode {
        let mut mode_prop = PropertyView::new("mode", PropertyCategory::Mode);
        mode_prop.value = Some(PropertyValue::String(mode.to_string()));
        properties.push(mode_prop);
    }
    DeviceView {
        id: id.to_string(),
        name: format!("Thermostat {}", id),
        driver: "demo".to_string(),
        category: DeviceCategory::Thermostat,
        online: true,
        connection: ConnectionState::Connected,
        channels: vec![ChannelView {
            id: "ch1".to_string(),
            category: ChannelCategory::Thermostat,
            properties,
        }],
    }
}

fn actuator(id: &str, category: ChannelCategory, on: bool) -> DeviceView {
    let mut on_prop = PropertyView::new("on", PropertyCategory::On);
    on_prop.value = Some(PropertyValue::Bool(on));
    let device_category = match category {
        ChannelCategory::Heater => DeviceCategory::Heater,
        _ => DeviceCategory::Cooler,
    };
    DeviceView {
        id: id.to_string(),
        name: format!("Actuator {}", id),
        driver: "demo".to_string(),
        category: device_category,
        online: true,
        connection: ConnectionState::Connected,
        channels: vec![ChannelView {
            id: "ch1".to_string(),
            category,
            properties: vec![on_prop],
        }],
    }
}

fn sensor(id: &str, temperature: f64) -> DeviceView {
    let mut temp_prop = PropertyView::new("temperature", PropertyCategory::Temperature);
    temp_prop.value = Some(PropertyValue::F64(temperature));
    DeviceView {
        id: id.to_string(),
        name: format!("Sensor {}", id),
        driver: "demo".to_string(),
        category: DeviceCategory::Sensor,
        online: true,
        connection: ConnectionState::Connected,
        channels: vec![ChannelView {
            id: "ch1".to_string(),
            category: ChannelCategory::Temperature,
            properties: vec![temp_prop],
        }],
    }
}

fn setup() -> (Arc<InMemoryCatalog>, ClimateStateService) {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .upsert_space(Space::new(SPACE_ID, "Bedroom"))
        .expect("space");
    let service = ClimateStateService::new(catalog.clone(), ConsensusTolerances::default());
    (catalog, service)
}

#[tokio::test]
async fn thermostat_auto_mode_short_circuits() {
    let (catalog, service) = setup();
    catalog
        .upsert_device(SPACE_ID, thermostat("t1", 21.0, 10.0, 30.0, Some("auto")))
        .expect("device");
    catalog
        .upsert_device(SPACE_ID, actuator("h1", ChannelCategory::Heater, false))
        .expect("device");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert_eq!(state.mode, Some(ClimateMode::Auto));
}

#[tokio::test]
async fn heater_and_cooler_both_on_is_auto() {
    let (catalog, service) = setup();
    catalog
        .upsert_device(SPACE_ID, actuator("h1", ChannelCategory::Heater, true))
        .expect("device");
    catalog
        .upsert_device(SPACE_ID, actuator("c1", ChannelCategory::Cooler, true))
        .expect("device");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert_eq!(state.mode, Some(ClimateMode::Auto));
}

#[tokio::test]
async fn heater_only_is_heat_and_none_on_is_off() {
    let (catalog, service) = setup();
    catalog
        .upsert_device(SPACE_ID, actuator("h1", ChannelCategory::Heater, true))
        .expect("device");
    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert_eq!(state.mode, Some(ClimateMode::Heat));

    catalog
        .upsert_device(SPACE_ID, actuator("h1", ChannelCategory::Heater, false))
        .expect("device");
    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert_eq!(state.mode, Some(ClimateMode::Off));
}

#[tokio::test]
async fn setpoint_range_is_intersection() {
    let (catalog, service) = setup();
    catalog
        .upsert_device(SPACE_ID, thermostat("t1", 21.0, 10.0, 25.0, None))
        .expect("device");
    catalog
        .upsert_device(SPACE_ID, thermostat("t2", 21.0, 18.0, 30.0, None))
        .expect("device");

    let range = service.space_setpoint_range(SPACE_ID).await.expect("range");
    assert_eq!(range.min, 18.0);
    assert_eq!(range.max, 25.0);
}

#[tokio::test]
async fn disjoint_ranges_fall_back_to_union() {
    let (catalog, service) = setup();
    catalog
        .upsert_device(SPACE_ID, thermostat("t1", 12.0, 10.0, 15.0, None))
        .expect("device");
    catalog
        .upsert_device(SPACE_ID, thermostat("t2", 22.0, 20.0, 30.0, None))
        .expect("device");

    let range = service.space_setpoint_range(SPACE_ID).await.expect("range");
    assert_eq!(range.min, 10.0);
    assert_eq!(range.max, 30.0);
}

#[tokio::test]
async fn temperature_consensus_uses_sensor_readings() {
    let (catalog, service) = setup();
    catalog.upsert_device(SPACE_ID, sensor("s1", 22.0)).expect("device");
    catalog.upsert_device(SPACE_ID, sensor("s2", 22.3)).expect("device");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert!(!state.temperature_mixed);
    let temperature = state.current_temperature.expect("temperature");
    assert!((temperature - 22.15).abs() < 1e-9);
}

#[tokio::test]
async fn mixed_sensor_readings_are_flagged() {
    let (catalog, service) = setup();
    catalog.upsert_device(SPACE_ID, sensor("s1", 22.0)).expect("device");
    catalog.upsert_device(SPACE_ID, sensor("s2", 23.0)).expect("device");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert!(state.temperature_mixed);
    // 混合状态下不报任意平均值。
    assert_eq!(state.current_temperature, None);
}

#[tokio::test]
async fn mixed_setpoints_report_null_value() {
    let (catalog, service) = setup();
    catalog
        .upsert_device(SPACE_ID, thermostat("t1", 22.0, 10.0, 30.0, None))
        .expect("device");
    catalog
        .upsert_device(SPACE_ID, thermostat("t2", 23.0, 10.0, 30.0, None))
        .expect("device");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert!(state.setpoint_mixed);
    assert_eq!(state.setpoint, None);
}

#[tokio::test]
async fn unknown_connection_is_treated_as_offline() {
    let (catalog, service) = setup();
    // 温控域采用 fail-closed 语义：不在线一律排除。
    let mut device = thermostat("t1", 21.0, 10.0, 30.0, None);
    device.online = false;
    device.connection = ConnectionState::Unknown;
    catalog.upsert_device(SPACE_ID, device).expect("device");

    let state = service.get_state(SPACE_ID).await.expect("state").expect("some");
    assert!(state.setpoint.is_none());
    assert!(state.mode.is_none());
}
