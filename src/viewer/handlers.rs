//! Viewer-side observers of layer events.

use crate::layers::{Channel, LayerEvent, LayerId};

/// Callbacks the viewer runs when its layers change.
///
/// Every method defaults to a no-op, so implementors only override what they
/// care about. Handlers are shared with every registered layer and run
/// synchronously from inside the emitting call.
pub trait ViewerHandlers {
    /// A layer was selected or deselected.
    fn update_active_layer(&self, _event: &LayerEvent) {}

    fn update_status(&self, _event: &LayerEvent) {}

    fn update_help(&self, _event: &LayerEvent) {}

    fn update_interactive(&self, _event: &LayerEvent) {}

    fn update_cursor(&self, _event: &LayerEvent) {}

    fn update_cursor_size(&self, _event: &LayerEvent) {}

    /// A layer's data or dims changed.
    fn on_layers_change(&self, _event: &LayerEvent) {}

    /// Layers were added and their derived viewer state needs refreshing.
    fn update_layers(&self, _layers: &[LayerId]) {}

    /// The first layer arrived; fit the camera to it.
    fn reset_view(&self) {}
}

/// Handlers that ignore every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandlers;

impl ViewerHandlers for NoopHandlers {}

/// One of the event-driven [`ViewerHandlers`] methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    ActiveLayer,
    Status,
    Help,
    Interactive,
    Cursor,
    CursorSize,
    LayersChange,
}

impl Handler {
    pub(crate) fn invoke(self, handlers: &dyn ViewerHandlers, event: &LayerEvent) {
        match self {
            Handler::ActiveLayer => handlers.update_active_layer(event),
            Handler::Status => handlers.update_status(event),
            Handler::Help => handlers.update_help(event),
            Handler::Interactive => handlers.update_interactive(event),
            Handler::Cursor => handlers.update_cursor(event),
            Handler::CursorSize => handlers.update_cursor_size(event),
            Handler::LayersChange => handlers.on_layers_change(event),
        }
    }
}

/// Connections made for every layer on registration.
pub const SUBSCRIPTIONS: [(Channel, Handler); 11] = [
    (Channel::Select, Handler::ActiveLayer),
    (Channel::Deselect, Handler::ActiveLayer),
    (Channel::Status, Handler::Status),
    (Channel::Help, Handler::Help),
    (Channel::Interactive, Handler::Interactive),
    (Channel::Cursor, Handler::Cursor),
    (Channel::CursorSize, Handler::CursorSize),
    (Channel::Data, Handler::LayersChange),
    (Channel::Ndisplay, Handler::LayersChange),
    (Channel::Order, Handler::LayersChange),
    (Channel::Range, Handler::LayersChange),
];
