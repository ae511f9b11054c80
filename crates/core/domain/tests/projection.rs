use domain::{
    ChannelCategory, ChannelView, PropertyCategory, PropertyValue, PropertyView,
};

#[test]
fn property_value_numeric_views() {
    assert_eq!(PropertyValue::I64(42).as_f64(), Some(42.0));
    assert_eq!(PropertyValue::F64(21.5).as_f64(), Some(21.5));
    assert_eq!(PropertyValue::Bool(true).as_f64(), None);
    assert_eq!(PropertyValue::Bool(true).as_bool(), Some(true));
    assert_eq!(PropertyValue::String("auto".to_string()).as_str(), Some("auto"));
}

#[test]
fn property_clamps_to_declared_range() {
    let mut property = PropertyView::new("p-1", PropertyCategory::Position);
    property.min = Some(0.0);
    property.max = Some(100.0);

    assert_eq!(property.clamp(150.0), 100.0);
    assert_eq!(property.clamp(-10.0), 0.0);
    assert_eq!(property.clamp(55.0), 55.0);
}

#[test]
fn channel_finds_property_by_category() {
    let mut brightness = PropertyView::new("p-brightness", PropertyCategory::Brightness);
    brightness.value = Some(PropertyValue::F64(80.0));
    let channel = ChannelView {
        id: "ch-1".to_string(),
        category: ChannelCategory::Light,
        properties: vec![
            PropertyView::new("p-on", PropertyCategory::On),
            brightness,
        ],
    };

    let found = channel.property(PropertyCategory::Brightness).expect("brightness");
    assert_eq!(found.number_value(), Some(80.0));
    assert!(channel.property(PropertyCategory::Volume).is_none());
}
