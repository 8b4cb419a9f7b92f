//! Observer channels that layers expose to the viewer.
//!
//! Each layer owns one [`EventEmitter`] per [`Channel`]. The viewer connects
//! its handlers when the layer is registered; emission is synchronous and runs
//! the connected callbacks in connection order.

use std::fmt;

use crate::layers::LayerId;

/// Identifies one event channel of a layer or of its dims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Select,
    Deselect,
    Status,
    Help,
    Interactive,
    Cursor,
    CursorSize,
    Data,
    /// Number of displayed dimensions changed (layer dims).
    Ndisplay,
    /// Dimension order changed (layer dims).
    Order,
    /// Dimension range changed (layer dims).
    Range,
}

impl Channel {
    /// All channels, layer channels first then dims channels.
    pub const ALL: [Channel; 11] = [
        Channel::Select,
        Channel::Deselect,
        Channel::Status,
        Channel::Help,
        Channel::Interactive,
        Channel::Cursor,
        Channel::CursorSize,
        Channel::Data,
        Channel::Ndisplay,
        Channel::Order,
        Channel::Range,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Select => "select",
            Channel::Deselect => "deselect",
            Channel::Status => "status",
            Channel::Help => "help",
            Channel::Interactive => "interactive",
            Channel::Cursor => "cursor",
            Channel::CursorSize => "cursor_size",
            Channel::Data => "data",
            Channel::Ndisplay => "ndisplay",
            Channel::Order => "order",
            Channel::Range => "range",
        }
    }

    /// Whether the channel belongs to the layer's dims rather than the layer.
    pub fn is_dims(&self) -> bool {
        matches!(self, Channel::Ndisplay | Channel::Order | Channel::Range)
    }
}

/// Payload of a layer event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Select,
    Deselect,
    Status(String),
    Help(String),
    Interactive(bool),
    Cursor(String),
    CursorSize(f64),
    Data,
    Ndisplay(usize),
    Order(Vec<usize>),
    Range,
}

impl EventKind {
    /// The channel this payload is emitted on.
    pub fn channel(&self) -> Channel {
        match self {
            EventKind::Select => Channel::Select,
            EventKind::Deselect => Channel::Deselect,
            EventKind::Status(_) => Channel::Status,
            EventKind::Help(_) => Channel::Help,
            EventKind::Interactive(_) => Channel::Interactive,
            EventKind::Cursor(_) => Channel::Cursor,
            EventKind::CursorSize(_) => Channel::CursorSize,
            EventKind::Data => Channel::Data,
            EventKind::Ndisplay(_) => Channel::Ndisplay,
            EventKind::Order(_) => Channel::Order,
            EventKind::Range => Channel::Range,
        }
    }
}

/// An event emitted by a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEvent {
    /// Layer that emitted the event.
    pub source: LayerId,
    pub kind: EventKind,
}

impl LayerEvent {
    pub fn new(source: LayerId, kind: EventKind) -> Self {
        Self { source, kind }
    }
}

/// A list of callbacks invoked on every emission.
#[derive(Default)]
pub struct EventEmitter {
    callbacks: Vec<Box<dyn Fn(&LayerEvent)>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback; it runs after the ones already connected.
    pub fn connect<F>(&mut self, callback: F)
    where
        F: Fn(&LayerEvent) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    pub fn emit(&self, event: &LayerEvent) {
        for callback in &self.callbacks {
            callback(event);
        }
    }

    /// Number of connected callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Event channels owned by the layer itself.
#[derive(Debug, Default)]
pub struct LayerEvents {
    pub select: EventEmitter,
    pub deselect: EventEmitter,
    pub status: EventEmitter,
    pub help: EventEmitter,
    pub interactive: EventEmitter,
    pub cursor: EventEmitter,
    pub cursor_size: EventEmitter,
    pub data: EventEmitter,
}

impl LayerEvents {
    /// Emitter for a layer channel, `None` for dims channels.
    pub fn get(&self, channel: Channel) -> Option<&EventEmitter> {
        match channel {
            Channel::Select => Some(&self.select),
            Channel::Deselect => Some(&self.deselect),
            Channel::Status => Some(&self.status),
            Channel::Help => Some(&self.help),
            Channel::Interactive => Some(&self.interactive),
            Channel::Cursor => Some(&self.cursor),
            Channel::CursorSize => Some(&self.cursor_size),
            Channel::Data => Some(&self.data),
            Channel::Ndisplay | Channel::Order | Channel::Range => None,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> Option<&mut EventEmitter> {
        match channel {
            Channel::Select => Some(&mut self.select),
            Channel::Deselect => Some(&mut self.deselect),
            Channel::Status => Some(&mut self.status),
            Channel::Help => Some(&mut self.help),
            Channel::Interactive => Some(&mut self.interactive),
            Channel::Cursor => Some(&mut self.cursor),
            Channel::CursorSize => Some(&mut self.cursor_size),
            Channel::Data => Some(&mut self.data),
            Channel::Ndisplay | Channel::Order | Channel::Range => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_runs_callbacks_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = EventEmitter::new();

        let first = Rc::clone(&seen);
        emitter.connect(move |_| first.borrow_mut().push(1));
        let second = Rc::clone(&seen);
        emitter.connect(move |_| second.borrow_mut().push(2));

        emitter.emit(&LayerEvent::new(LayerId::next(), EventKind::Data));
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(emitter.len(), 2);
    }

    #[test]
    fn test_event_kind_channel() {
        for (kind, channel) in [
            (EventKind::Status("x".into()), Channel::Status),
            (EventKind::CursorSize(4.0), Channel::CursorSize),
            (EventKind::Order(vec![1, 0]), Channel::Order),
        ] {
            assert_eq!(kind.channel(), channel);
        }
        assert!(Channel::Range.is_dims());
        assert!(!Channel::Data.is_dims());
    }

    #[test]
    fn test_layer_events_has_no_dims_channels() {
        let events = LayerEvents::default();
        assert!(events.get(Channel::Ndisplay).is_none());
        assert!(events.get(Channel::CursorSize).is_some());
    }
}
