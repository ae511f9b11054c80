use domain::{
    ChannelCategory, ChannelView, ConnectionState, CoversMode, CoversRole, DeviceCategory,
    DeviceView, MediaMode, MediaRole, PropertyCategory, PropertyValue, PropertyView, Space,
};
use hub_catalog::{InMemoryCatalog, RoleAssignment};
use hub_intents::{IntentRegistry, RegistryConfig};
use hub_orchestration::{CoversIntent, CoversOrchestrator, MediaIntent, MediaOrchestrator};
use hub_platform::{PlatformRegistry, PropertyCommand, RecordingPlatform};
use hub_state::StateBus;
use hub_timeseries::InMemoryHistoryStore;
use hub_undo::{UndoConfig, UndoManager};
use std::sync::Arc;

const SPACE_ID: &str = "9e8d7c6b-5a4f-4e3d-8c2b-112233445566";

struct Harness {
    catalog: Arc<InMemoryCatalog>,
    recording: Arc<RecordingPlatform>,
    covers: CoversOrchestrator,
    media: MediaOrchestrator,
}

fn harness() -> Harness {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .upsert_space(Space::new(SPACE_ID, "Office"))
        .expect("space");
    let intents = Arc::new(IntentRegistry::new(RegistryConfig::default()));
    let platforms = Arc::new(PlatformRegistry::new());
    let recording = Arc::new(RecordingPlatform::new());
    platforms.register("demo", recording.clone());
    let history: Arc<InMemoryHistoryStore> = Arc::new(InMemoryHistoryStore::new());
    let undo = Arc::new(UndoManager::new(UndoConfig::default()));
    let covers = CoversOrchestrator::new(
        catalog.clone(),
        intents.clone(),
        platforms.clone(),
        history.clone(),
        undo.clone(),
        StateBus::default(),
    );
    let media = MediaOrchestrator::new(
        catalog.clone(),
        intents,
        platforms,
        history,
        undo,
        StateBus::default(),
    );
    Harness {
        catalog,
        recording,
        covers,
        media,
    }
}

fn positional_cover(id: &str, position: f64) -> DeviceView {
    let mut prop = PropertyView::new("position", PropertyCategory::Position);
    prop.value = Some(PropertyValue::F64(position));
    prop.min = Some(0.0);
    prop.max = Some(100.0);
    DeviceView {
        id: id.to_string(),
        name: format!("Cover {}", id),
        driver: "demo".to_string(),
        category: DeviceCategory::WindowCovering,
        online: true,
        connection: ConnectionState::Connected,
        channels: vec![ChannelView {
            id: "ch1".to_string(),
            category: ChannelCategory::WindowCovering,
            properties: vec![prop],
        }],
    }
}

fn command_only_cover(id: &str) -> DeviceView {
    DeviceView {
        id: id.to_string(),
        name: format!("Cover {}", id),
        driver: "demo".to_string(),
        category: DeviceCategory::WindowCovering,
        online: true,
        connection: ConnectionState::Connected,
        channels: vec![ChannelView {
            id: "ch1".to_string(),
            category: ChannelCategory::WindowCovering,
            properties: vec![PropertyView::new("command", PropertyCategory::Command)],
        }],
    }
}

fn player(id: &str, on: bool, volume: f64) -> DeviceView {
    let mut on_prop = PropertyView::new("on", PropertyCategory::On);
    on_prop.value = Some(PropertyValue::Bool(on));
    let mut volume_prop = PropertyView::new("volume", PropertyCategory::Volume);
    volume_prop.value = Some(PropertyValue::F64(volume));
    volume_prop.min = Some(0.0);
    volume_prop.max = Some(100.0);
    DeviceView {
        id: id.to_string(),
        name: format!("Player {}", id),
        driver: "demo".to_string(),
        category: DeviceCategory::Media,
        online: true,
        connection: ConnectionState::Connected,
        channels: vec![ChannelView {
            id: "ch1".to_string(),
            category: ChannelCategory::MediaPlayback,
            properties: vec![on_prop, volume_prop],
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
async fn open_prefers_position_and_falls_back_to_command() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, positional_cover("c1", 0.0))
        .expect("device");
    h.catalog
        .upsert_device(SPACE_ID, command_only_cover("c2"))
        .expect("device");

    let result = h
        .covers
        .execute(SPACE_ID, CoversIntent::Open)
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);
    assert_eq!(result.affected_devices, 2);

    let batches = h.recording.batches();
    let c1 = commands_for(&batches, "c1");
    assert!(
        c1.iter()
            .any(|c| c.property_id == "position" && c.value == PropertyValue::F64(100.0))
    );
    let c2 = commands_for(&batches, "c2");
    assert!(
        c2.iter()
            .any(|c| c.property_id == "command"
                && c.value == PropertyValue::String("open".to_string()))
    );
}

#[tokio::test]
async fn privacy_mode_follows_role_table() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, positional_cover("blackout", 100.0))
        .expect("device");
    h.catalog
        .upsert_device(SPACE_ID, positional_cover("sheer", 100.0))
        .expect("device");
    h.catalog
        .assign_covers_role(RoleAssignment {
            space_id: SPACE_ID.to_string(),
            device_id: "blackout".to_string(),
            channel_id: "ch1".to_string(),
            role: CoversRole::Blackout,
            priority: 0,
        })
        .expect("role");
    h.catalog
        .assign_covers_role(RoleAssignment {
            space_id: SPACE_ID.to_string(),
            device_id: "sheer".to_string(),
            channel_id: "ch1".to_string(),
            role: CoversRole::Secondary,
            priority: 0,
        })
        .expect("role");

    let result = h
        .covers
        .execute(
            SPACE_ID,
            CoversIntent::SetMode {
                mode: CoversMode::Privacy,
            },
        )
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);

    let batches = h.recording.batches();
    let blackout = commands_for(&batches, "blackout");
    assert!(blackout.iter().any(|c| c.value == PropertyValue::F64(0.0)));
    let sheer = commands_for(&batches, "sheer");
    assert!(sheer.iter().any(|c| c.value == PropertyValue::F64(30.0)));
}

#[tokio::test]
async fn position_delta_defaults_to_quarter_step() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, positional_cover("c1", 50.0))
        .expect("device");

    let result = h
        .covers
        .execute(SPACE_ID, CoversIntent::PositionDelta { delta: None })
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);

    let batches = h.recording.batches();
    let c1 = commands_for(&batches, "c1");
    assert!(c1.iter().any(|c| c.value == PropertyValue::F64(75.0)));
}

#[tokio::test]
async fn covers_offline_fail_closed_on_unknown_connection() {
    let h = harness();
    let mut unknown = positional_cover("c1", 50.0);
    unknown.online = false;
    unknown.connection = ConnectionState::Unknown;
    h.catalog.upsert_device(SPACE_ID, unknown).expect("device");

    let result = h
        .covers
        .execute(SPACE_ID, CoversIntent::Close)
        .await
        .expect("execute")
        .expect("result");
    assert!(!result.success);
    assert_eq!(result.offline_device_ids, vec!["c1".to_string()]);
    assert!(h.recording.batches().is_empty());
}

#[tokio::test]
async fn party_mode_without_roles_falls_back_to_secondary() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, player("p1", false, 20.0))
        .expect("device");

    let result = h
        .media
        .execute(
            SPACE_ID,
            MediaIntent::SetMode {
                mode: MediaMode::Party,
            },
        )
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);
    assert!(result.triggered_fallback);

    let batches = h.recording.batches();
    let p1 = commands_for(&batches, "p1");
    assert!(p1.iter().any(|c| c.property_id == "on" && c.value == PropertyValue::Bool(true)));
    assert!(
        p1.iter()
            .any(|c| c.property_id == "volume" && c.value == PropertyValue::F64(40.0))
    );
}

#[tokio::test]
async fn party_mode_with_roles_uses_role_volumes() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, player("p1", false, 20.0))
        .expect("device");
    h.catalog
        .upsert_device(SPACE_ID, player("p2", false, 20.0))
        .expect("device");
    h.catalog
        .assign_media_role(RoleAssignment {
            space_id: SPACE_ID.to_string(),
            device_id: "p1".to_string(),
            channel_id: "ch1".to_string(),
            role: MediaRole::Primary,
            priority: 0,
        })
        .expect("role");
    h.catalog
        .assign_media_role(RoleAssignment {
            space_id: SPACE_ID.to_string(),
            device_id: "p2".to_string(),
            channel_id: "ch1".to_string(),
            role: MediaRole::Secondary,
            priority: 0,
        })
        .expect("role");

    let result = h
        .media
        .execute(
            SPACE_ID,
            MediaIntent::SetMode {
                mode: MediaMode::Party,
            },
        )
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);
    assert!(!result.triggered_fallback);

    let batches = h.recording.batches();
    let p1 = commands_for(&batches, "p1");
    assert!(
        p1.iter()
            .any(|c| c.property_id == "volume" && c.value == PropertyValue::F64(60.0))
    );
    let p2 = commands_for(&batches, "p2");
    assert!(
        p2.iter()
            .any(|c| c.property_id == "volume" && c.value == PropertyValue::F64(40.0))
    );
}

#[tokio::test]
async fn volume_set_clamps_to_property_bounds() {
    let h = harness();
    let mut capped = player("p1", true, 20.0);
    capped.channels[0].properties[1].max = Some(80.0);
    h.catalog.upsert_device(SPACE_ID, capped).expect("device");

    let result = h
        .media
        .execute(SPACE_ID, MediaIntent::VolumeSet { volume: 95.0 })
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);

    let batches = h.recording.batches();
    let p1 = commands_for(&batches, "p1");
    assert!(
        p1.iter()
            .any(|c| c.property_id == "volume" && c.value == PropertyValue::F64(80.0))
    );
}

#[tokio::test]
async fn quiet_mode_turns_everything_off() {
    let h = harness();
    h.catalog
        .upsert_device(SPACE_ID, player("p1", true, 60.0))
        .expect("device");

    let result = h
        .media
        .execute(
            SPACE_ID,
            MediaIntent::SetMode {
                mode: MediaMode::Quiet,
            },
        )
        .await
        .expect("execute")
        .expect("result");
    assert!(result.success);

    let batches = h.recording.batches();
    let p1 = commands_for(&batches, "p1");
    assert!(p1.iter().any(|c| c.property_id == "on" && c.value == PropertyValue::Bool(false)));
    assert!(p1.iter().all(|c| c.property_id != "volume"));
}
