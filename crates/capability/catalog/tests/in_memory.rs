use domain::{
    ChannelCategory, ChannelView, ConnectionState, DeviceCategory, DeviceView, LightingRole,
    PropertyCategory, PropertyView, Space,
};
use hub_catalog::{InMemoryCatalog, RoleAssignment, SpaceCatalog, role_key};

fn light_device(id: &str) -> DeviceView {
    DeviceView {
        id: id.to_string(),
        name: id.to_string(),
        driver: "noop".to_string(),
        category: DeviceCategory::Lighting,
        online: true,
        connection: ConnectionState::Connected,
        channels: vec![ChannelView {
            id: format!("{}-ch", id),
            category: ChannelCategory::Light,
            properties: vec![PropertyView::new("p-on", PropertyCategory::On)],
        }],
    }
}

#[tokio::test]
async fn space_lookup_and_devices() {
    let catalog = InMemoryCatalog::new();
    catalog
        .upsert_space(Space::new("space-1", "Living room"))
        .expect("space");
    catalog
        .upsert_device("space-1", light_device("light-1"))
        .expect("device");

    let space = catalog.find_space("space-1").await.expect("query");
    assert_eq!(space.expect("found").name, "Living room");
    assert!(catalog.find_space("space-2").await.expect("query").is_none());

    let devices = catalog.devices_in_space("space-1").await.expect("devices");
    assert_eq!(devices.len(), 1);
    assert!(catalog
        .devices_in_space("space-2")
        .await
        .expect("devices")
        .is_empty());
}

#[tokio::test]
async fn device_upsert_replaces_by_id() {
    let catalog = InMemoryCatalog::new();
    catalog
        .upsert_device("space-1", light_device("light-1"))
        .expect("device");
    let mut replacement = light_device("light-1");
    replacement.online = false;
    catalog
        .upsert_device("space-1", replacement)
        .expect("device");

    let devices = catalog.devices_in_space("space-1").await.expect("devices");
    assert_eq!(devices.len(), 1);
    assert!(!devices[0].online);
}

#[tokio::test]
async fn role_assignment_keyed_by_device_and_channel() {
    let catalog = InMemoryCatalog::new();
    catalog
        .assign_lighting_role(RoleAssignment {
            space_id: "space-1".to_string(),
            device_id: "light-1".to_string(),
            channel_id: "light-1-ch".to_string(),
            role: LightingRole::Main,
            priority: 0,
        })
        .expect("assign");
    catalog
        .assign_lighting_role(RoleAssignment {
            space_id: "space-1".to_string(),
            device_id: "light-1".to_string(),
            channel_id: "light-1-ch".to_string(),
            role: LightingRole::Night,
            priority: 0,
        })
        .expect("reassign");

    let roles = catalog.lighting_roles("space-1").await.expect("roles");
    assert_eq!(roles.len(), 1);
    assert_eq!(
        roles.get(&role_key("light-1", "light-1-ch")),
        Some(&LightingRole::Night)
    );
}
