use domain::{
    ChannelCategory, ChannelView, ClimateMode, ClimateRole, ConnectionState, DeviceCategory,
    DeviceView, PropertyCategory, PropertyValue, PropertyView, Space,
};
use hub_catalog::{InMemoryCatalog, RoleAssignment};
use hub_config::ConsensusTolerances;
use hub_intents::{IntentRegistry, RegistryConfig};
use hub_orchestration::{ClimateIntent, ClimateOrchestrator};
use hub_platform::{PlatformRegistry, PropertyCommand, RecordingPlatform};
use hub_state::{ClimateStateService, StateBus};
use hub_timeseries::InMemoryHistoryStore;
use hub_undo::{UndoConfig, UndoManager};
use std::sync::Arc;

const SPACE_ID: &str = "4c0d2f61-8a5e-4b7f-9c3d-aabbccddeeff";

struct Harness {
    catalog: Arc<InMemoryCatalog>,
    recording: Arc<RecordingPlatform>,
    orchestrator: ClimateOrchestrator,
}

fn harness() -> Harness {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .upsert_space(Space::new(SPACE_ID, "Bedroom"))
        .expect("space");
    let intents = Arc::new(IntentRegistry::new(RegistryConfig::default()));
    let platforms = Arc::new(PlatformRegistry::new());
    let recording = Arc::new(RecordingPlatform::new());
    platforms.register("demo", recording.clone());
    let history = Arc::new(InMemoryHistoryStore::new());
    let state = Arc::new(ClimateStateService::new(
        catalog.clone(),
        ConsensusTolerances::default(),
    ));
    let orchestrator = ClimateOrchestrator::new(
        catalog.clone(),
        intents,
        platforms,
        history,
        Arc::new(UndoManager::new(UndoConfig::default())),
        StateBus::default(),
        state,
    );
    Harness {
        catalog,
        recording,
        orchestrator,
    }
}

fn thermostat(id: &str, setpoint: f64, min: f64, max: f64) -> DeviceView {
    let mut mode = PropertyView::new("mode", PropertyCategory::Mode);
    mode.value = Some(PropertyValue::String("off".to_string()));
    let mut temp = PropertyView::new("setpoint", PropertyCategory::Temperature);
    temp.value = Some(PropertyValue::F64(setpoint));
    temp.min = Some(min);
    temp.max = Some(max);
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
            properties: vec![mode, temp],
        }],
    }
}

fn switch_unit(id: &str, category: ChannelCategory, on: bool) -> DeviceView {
    let mut on_prop = PropertyView::new("on", PropertyCategory::On);
    on_prop.value = Some(PropertyValue::Bool(on));
    let device_category = match category {
        ChannelCategory::Cooler => DeviceCategory::Cooler,
        _ => DeviceCategory::Heater,
    };
    DeviceView {
        id: id.to_string(),
        name: format!("Unit {}", id),
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

fn commands_for<'a>(
    batches: &'a [Vec<PropertyCommand>],
    device_id: &str,
) -> Vec<&'a PropertyCommand> {
    batches
        .iter()
        .flatten()
        .filter(|c| c.device_id == device_id)
        .collect()
}

#[tokio::test]
async fn set_mode_heat_drives_heater_cooler_and_thermostat() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, switch_unit("heater", ChannelCategory::Heater, false))
        .expect("device");
    h.catalog
        .upsert_device(SPACE_ID, switch_unit("cooler", ChannelCategory::Cooler, true))
        .expect("device");
    h.catalog
        .upsert_device(SPACE_ID, thermostat("thermo", 21.0, 10.0, 30.0))
        .expect("device");

    let result = h
        .orchestrator
        .execute(
            SPACE_ID,
            ClimateIntent::SetMode {
                mode: ClimateMode::Heat,
            },
        )
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);
    assert_eq!(result.affected_devices, 3);

    let batches = h.recording.batches();
    let heater = commands_for(&batches, "heater");
    assert!(heater.iter().any(|c| c.value == PropertyValue::Bool(true)));
    let cooler = commands_for(&batches, "cooler");
    assert!(cooler.iter().any(|c| c.value == PropertyValue::Bool(false)));
    let thermo = commands_for(&batches, "thermo");
    assert!(
        thermo
            .iter()
            .any(|c| c.value == PropertyValue::String("heat".to_string()))
    );
}

#[tokio::test]
async fn setpoint_set_rounds_to_half_degree_within_range() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, thermostat("thermo", 20.0, 10.0, 30.0))
        .expect("device");

    let result = h
        .orchestrator
        .execute(SPACE_ID, ClimateIntent::SetpointSet { setpoint: 21.3 })
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);

    let batches = h.recording.batches();
    let thermo = commands_for(&batches, "thermo");
    assert!(
        thermo
            .iter()
            .any(|c| c.property_id == "setpoint" && c.value == PropertyValue::F64(21.5))
    );
}

#[tokio::test]
async fn setpoint_set_clamps_to_space_range() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, thermostat("thermo", 20.0, 16.0, 26.0))
        .expect("device");

    h.orchestrator
        .execute(SPACE_ID, ClimateIntent::SetpointSet { setpoint: 40.0 })
        .await
        .expect("execute")
        .expect("result");

    let batches = h.recording.batches();
    let thermo = commands_for(&batches, "thermo");
    assert!(
        thermo
            .iter()
            .any(|c| c.property_id == "setpoint" && c.value == PropertyValue::F64(26.0))
    );
}

#[tokio::test]
async fn setpoint_delta_steps_from_current_value() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, thermostat("thermo", 21.0, 10.0, 30.0))
        .expect("device");

    let result = h
        .orchestrator
        .execute(SPACE_ID, ClimateIntent::SetpointDelta { steps: 2 })
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);

    let batches = h.recording.batches();
    let thermo = commands_for(&batches, "thermo");
    assert!(
        thermo
            .iter()
            .any(|c| c.property_id == "setpoint" && c.value == PropertyValue::F64(22.0))
    );
}

fn assign_heating_only(h: &Harness, device_id: &str) {
    h.catalog
        .assign_climate_role(RoleAssignment {
            space_id: SPACE_ID.to_string(),
            device_id: device_id.to_string(),
            channel_id: "ch1".to_string(),
            role: ClimateRole::HeatingOnly,
            priority: 0,
        })
        .expect("role");
}

#[tokio::test]
async fn heating_only_thermostat_writes_off_for_cool_mode() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, thermostat("thermo", 21.0, 10.0, 30.0))
        .expect("device");
    assign_heating_only(&h, "thermo");

    h.orchestrator
        .execute(
            SPACE_ID,
            ClimateIntent::SetMode {
                mode: ClimateMode::Cool,
            },
        )
        .await
        .expect("execute")
        .expect("result");

    let batches = h.recording.batches();
    let thermo = commands_for(&batches, "thermo");
    // 单向制热设备不接受制冷模式，写 off。
    assert!(
        thermo
            .iter()
            .any(|c| c.value == PropertyValue::String("off".to_string()))
    );
    assert!(
        !thermo
            .iter()
            .any(|c| c.value == PropertyValue::String("cool".to_string()))
    );
}

#[tokio::test]
async fn heating_only_thermostat_degrades_auto_to_heat() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, thermostat("thermo", 21.0, 10.0, 30.0))
        .expect("device");
    assign_heating_only(&h, "thermo");

    h.orchestrator
        .execute(
            SPACE_ID,
            ClimateIntent::SetMode {
                mode: ClimateMode::Auto,
            },
        )
        .await
        .expect("execute")
        .expect("result");

    let batches = h.recording.batches();
    let thermo = commands_for(&batches, "thermo");
    assert!(
        thermo
            .iter()
            .any(|c| c.value == PropertyValue::String("heat".to_string()))
    );
}

#[tokio::test]
async fn unknown_connection_is_skipped_as_offline() {
    let h = harness();
    // 温控域 fail-closed：连接状态未知的设备不接受写入。
    let mut unknown = thermostat("thermo", 21.0, 10.0, 30.0);
    unknown.online = false;
    unknown.connection = ConnectionState::Unknown;
    h.catalog.upsert_device(SPACE_ID, unknown).expect("device");

    let result = h
        .orchestrator
        .execute(SPACE_ID, ClimateIntent::SetpointSet { setpoint: 22.0 })
        .await
        .expect("execute")
        .expect("result");
    assert!(!result.success);
    assert_eq!(result.offline_device_ids, vec!["thermo".to_string()]);
    assert!(h.recording.batches().is_empty());
}

#[tokio::test]
async fn sensors_are_never_commanded() {
    let h = harness();
    let mut sensor = DeviceView {
        id: "sensor".to_string(),
        name: "Sensor".to_string(),
        driver: "demo".to_string(),
        category: DeviceCategory::Sensor,
        online: true,
        connection: ConnectionState::Connected,
        channels: vec![ChannelView {
            id: "ch1".to_string(),
            category: ChannelCategory::Temperature,
            properties: vec![PropertyView::new("temperature", PropertyCategory::Temperature)],
        }],
    };
    sensor.channels[0].properties[0].value = Some(PropertyValue::F64(22.0));
    h.catalog.upsert_device(SPACE_ID, sensor).expect("device");
    h.catalog
        .upsert_device(SPACE_ID, switch_unit("heater", ChannelCategory::Heater, false))
        .expect("device");

    let result = h
        .orchestrator
        .execute(
            SPACE_ID,
            ClimateIntent::SetMode {
                mode: ClimateMode::Heat,
            },
        )
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);
    assert!(commands_for(&h.recording.batches(), "sensor").is_empty());
}

#[tokio::test]
async fn invalid_setpoint_is_rejected_before_any_intent() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, thermostat("thermo", 21.0, 10.0, 30.0))
        .expect("device");

    let error = h
        .orchestrator
        .execute(SPACE_ID, ClimateIntent::SetpointSet { setpoint: 99.0 })
        .await;
    assert!(error.is_err());
    assert!(h.recording.batches().is_empty());
}
