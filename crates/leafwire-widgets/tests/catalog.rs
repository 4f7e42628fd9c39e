//! Catalog behavior through the public API: config files, factory,
//! inherited fields and group membership.

use std::io::Write;

use leafwire_state::{CommEvent, Envelope, RecordingTransport, Widget, WidgetRegistry};
use leafwire_widgets::{ConfigError, Heatmap, LayerGroup, Polyline, WidgetConfig, WidgetFactory};
use serde_json::json;

#[test]
fn config_file_roundtrip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"(model_module: "leaflet-lab", comm_target: "lab.widget")"#).unwrap();

    let config = WidgetConfig::load(file.path()).unwrap();
    assert_eq!(config.model_module, "leaflet-lab");
    assert_eq!(config.comm_target, "lab.widget");
    assert_eq!(config.view_module, WidgetConfig::default().view_module);
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = WidgetConfig::load(dir.path().join("absent.ron")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn heatmap_full_roundtrip_is_idempotent() {
    let transport = RecordingTransport::new();
    let factory = WidgetFactory::new(transport.clone(), WidgetConfig::default());
    let mut heatmap: Heatmap = factory.create_with(|h: &mut Heatmap| {
        h.locations.set(vec![[45.5, -73.6, 0.8], [45.6, -73.5, 0.3]]);
        h.blur.set(20.0);
        h.visible.set(false);
    });
    transport.take();

    let before = heatmap.serialize_state();
    let report = heatmap.apply_patch(&before);
    assert!(report.is_clean());
    assert!(report.unknown.is_empty());
    assert_eq!(report.applied.len(), heatmap.fields().len());
    assert_eq!(heatmap.serialize_state(), before);
    assert!(transport.is_empty());
}

#[test]
fn partial_patch_changes_only_named_fields() {
    let factory = WidgetFactory::new(RecordingTransport::new(), WidgetConfig::default());
    let mut line = factory.polyline();
    let before = line.serialize_state();

    let patch = Envelope::from_json(json!({"weight": 3, "no_clip": true}), Vec::new()).unwrap();
    line.apply_patch(&patch);
    let after = line.serialize_state();

    for name in line.fields() {
        if name == "weight" || name == "no_clip" {
            assert_ne!(after.get(name), before.get(name), "{name} should change");
        } else {
            assert_eq!(after.get(name), before.get(name), "{name} should not change");
        }
    }
}

#[test]
fn hold_sync_batches_inherited_and_own_fields() {
    let transport = RecordingTransport::new();
    let factory = WidgetFactory::new(transport.clone(), WidgetConfig::default());
    let mut heatmap = factory.heatmap();
    transport.take();

    heatmap.hold_sync(|h| {
        h.radius.set(30.0);
        h.opacity.set(0.7);
        h.add_point([1.0, 2.0, 0.5]);
    });

    let patches = transport.patches();
    assert_eq!(patches.len(), 1);
    let names: Vec<_> = patches[0].1.field_names().collect();
    assert_eq!(names, vec!["opacity", "locations", "radius"]);
}

#[test]
fn layer_group_scenario() {
    let transport = RecordingTransport::new();
    let factory = WidgetFactory::new(transport.clone(), WidgetConfig::default());
    let mut registry = WidgetRegistry::new();
    let mut group: LayerGroup = factory.layer_group();

    let heat = factory.heatmap();
    let shared_line = factory.create_shared::<Polyline>(&mut registry);
    let a = group.add_layer(heat);
    let b = group.add_shared_layer(&shared_line);
    assert_eq!(
        transport.last_patch().map(|p| p.to_json()),
        Some(json!({"layers": [a.to_model_ref(), b.to_model_ref()]}))
    );

    group.remove_layer_id(a);
    assert_eq!(
        transport.last_patch().map(|p| p.to_json()),
        Some(json!({"layers": [b.to_model_ref()]}))
    );
    assert!(transport.events().contains(&CommEvent::Close { id: a }));

    let state = group.layers.get()[0].serialize_state(&registry);
    assert!(state.is_some_and(|s| s.get("_model_name") == Some(&json!("LeafletPolylineModel"))));
}
