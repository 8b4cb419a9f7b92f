//! Cross-module tests for the viewer: constructors, registration, dispatch
//! and path resolution.

mod path_tests;
mod registrar_tests;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ndarray::{ArrayD, IxDyn};

use crate::data::{ArrayData, ImageData};
use crate::layers::{LayerEvent, LayerId};
use crate::viewer::{Viewer, ViewerHandlers};

/// Handlers that record every call by name.
#[derive(Default)]
pub(super) struct RecordingHandlers {
    pub calls: RefCell<Vec<String>>,
    pub updated: RefCell<Vec<LayerId>>,
    pub resets: Cell<usize>,
}

impl RecordingHandlers {
    fn record(&self, name: &str, event: &LayerEvent) {
        self.calls
            .borrow_mut()
            .push(format!("{}:{}", name, event.kind.channel().name()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl ViewerHandlers for RecordingHandlers {
    fn update_active_layer(&self, event: &LayerEvent) {
        self.record("active_layer", event);
    }

    fn update_status(&self, event: &LayerEvent) {
        self.record("status", event);
    }

    fn update_help(&self, event: &LayerEvent) {
        self.record("help", event);
    }

    fn update_interactive(&self, event: &LayerEvent) {
        self.record("interactive", event);
    }

    fn update_cursor(&self, event: &LayerEvent) {
        self.record("cursor", event);
    }

    fn update_cursor_size(&self, event: &LayerEvent) {
        self.record("cursor_size", event);
    }

    fn on_layers_change(&self, event: &LayerEvent) {
        self.record("layers_change", event);
    }

    fn update_layers(&self, layers: &[LayerId]) {
        self.updated.borrow_mut().extend_from_slice(layers);
    }

    fn reset_view(&self) {
        self.resets.set(self.resets.get() + 1);
    }
}

/// A viewer reporting to fresh recording handlers.
pub(super) fn recording_viewer() -> (Viewer, Rc<RecordingHandlers>) {
    let handlers = Rc::new(RecordingHandlers::default());
    let viewer = Viewer::new().with_handlers(handlers.clone());
    (viewer, handlers)
}

/// `f64` array whose values equal their index along `axis`.
pub(super) fn indexed(shape: &[usize], axis: usize) -> ArrayD<f64> {
    ArrayD::from_shape_fn(IxDyn(shape), |index| index[axis] as f64)
}

pub(super) fn image_data(shape: &[usize]) -> ImageData {
    ImageData::Single(ArrayData::from(ArrayD::<f32>::zeros(IxDyn(shape))))
}
