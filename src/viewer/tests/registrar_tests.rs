//! Tests for layer registration and event wiring.

use ndarray::Array2;

use super::{image_data, recording_viewer};
use crate::config::ViewerConfig;
use crate::layers::{ImageParams, Layer, PointsParams};
use crate::viewer::{SUBSCRIPTIONS, Viewer};

#[test]
fn test_reset_view_only_for_first_layer() {
    let (mut viewer, handlers) = recording_viewer();

    let first = viewer
        .add_image(Some(image_data(&[4, 5])), ImageParams::default())
        .unwrap();
    assert_eq!(handlers.resets.get(), 1);

    let second = viewer
        .add_image(Some(image_data(&[4, 5])), ImageParams::default())
        .unwrap();
    assert_eq!(handlers.resets.get(), 1);

    let mut expected = first.into_ids();
    expected.extend(second.into_ids());
    assert_eq!(*handlers.updated.borrow(), expected);
    assert_eq!(viewer.layers().ids(), expected);
}

#[test]
fn test_every_subscription_connected_once() {
    let (mut viewer, _) = recording_viewer();
    let id = viewer.add_points(None, PointsParams::default()).unwrap();
    let layer = viewer.layer(id).unwrap();
    for (channel, _) in SUBSCRIPTIONS {
        assert_eq!(layer.emitter(channel).len(), 1, "channel {}", channel.name());
    }
}

#[test]
fn test_layer_events_reach_handlers() {
    let (mut viewer, handlers) = recording_viewer();
    let id = viewer.add_points(None, PointsParams::default()).unwrap();
    handlers.clear();

    let layer = viewer.layer_mut(id).unwrap();
    let base = layer.base_mut();
    base.deselect();
    base.select();
    base.set_status("hovering");
    base.set_help("click to add");
    base.set_interactive(false);
    base.set_cursor("crosshair");
    base.set_cursor_size(4.0);

    assert_eq!(
        handlers.calls(),
        vec![
            "active_layer:deselect",
            "active_layer:select",
            "status:status",
            "help:help",
            "interactive:interactive",
            "cursor:cursor",
            "cursor_size:cursor_size",
        ]
    );
}

#[test]
fn test_data_and_dims_events_mean_layers_changed() {
    let (mut viewer, handlers) = recording_viewer();
    let id = viewer
        .add_points(Some(Array2::zeros((2, 3))), PointsParams::default())
        .unwrap();
    handlers.clear();

    let Some(Layer::Points(points)) = viewer.layer_mut(id) else {
        panic!("expected a points layer");
    };
    points.set_data(Array2::ones((4, 3)));

    let dims = viewer.layer_mut(id).unwrap().base_mut().dims_mut();
    dims.set_ndisplay(3);
    dims.set_order(vec![2, 0, 1]);

    let calls = handlers.calls();
    assert!(calls.contains(&"layers_change:data".to_string()));
    assert!(calls.contains(&"layers_change:range".to_string()));
    assert!(calls.contains(&"layers_change:ndisplay".to_string()));
    assert!(calls.contains(&"layers_change:order".to_string()));
    assert!(calls.iter().all(|call| call.starts_with("layers_change:")));
}

#[test]
fn test_registration_emits_no_layer_events() {
    let (mut viewer, handlers) = recording_viewer();
    viewer
        .add_image(Some(image_data(&[3, 3])), ImageParams::default())
        .unwrap();
    assert!(handlers.calls().is_empty());
    assert_eq!(handlers.resets.get(), 1);
}

#[test]
fn test_viewer_ndim_and_range() {
    let mut viewer = Viewer::new();
    assert_eq!(viewer.ndim(), 2);
    assert_eq!(viewer.range(), vec![(0.0, 2.0, 1.0); 2]);

    viewer
        .add_image(Some(image_data(&[6, 4, 5])), ImageParams::default())
        .unwrap();
    viewer
        .add_image(Some(image_data(&[8, 2])), ImageParams::default())
        .unwrap();
    assert_eq!(viewer.ndim(), 3);
    assert_eq!(
        viewer.range(),
        vec![(0.0, 6.0, 1.0), (0.0, 8.0, 1.0), (0.0, 5.0, 1.0)]
    );
}

#[test]
fn test_config_default_ndim() {
    let mut config = ViewerConfig::new();
    config.default_ndim = 4;
    let mut viewer = Viewer::with_config(config);
    assert_eq!(viewer.ndim(), 4);

    let id = viewer.add_points(None, PointsParams::default()).unwrap();
    let points = viewer.layer(id).and_then(Layer::as_points).unwrap();
    assert_eq!(points.data().dim(), (0, 4));
}
