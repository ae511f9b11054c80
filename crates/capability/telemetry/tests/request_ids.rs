use hub_telemetry::new_request_ids;

#[test]
fn request_ids_non_empty() {
    let ids = new_request_ids();
    assert!(!ids.request_id.is_empty());
    assert!(!ids.trace_id.is_empty());
}

#[test]
fn metrics_counters_accumulate() {
    let before = hub_telemetry::metrics().snapshot();
    hub_telemetry::record_intent_created();
    hub_telemetry::record_devices_commanded(3);
    let after = hub_telemetry::metrics().snapshot();
    assert_eq!(after.intents_created, before.intents_created + 1);
    assert_eq!(after.devices_commanded, before.devices_commanded + 3);
}
