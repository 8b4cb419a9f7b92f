//! Per-layer dimension state.

use crate::layers::LayerId;
use crate::layers::events::{EventEmitter, EventKind, LayerEvent};

/// Range of one dimension as `(min, max, step)`.
pub type DimRange = (f64, f64, f64);

/// Dimensionality, display count, order and range of a layer.
#[derive(Debug)]
pub struct Dims {
    owner: LayerId,
    ndim: usize,
    ndisplay: usize,
    order: Vec<usize>,
    range: Vec<DimRange>,
    pub(crate) ndisplay_events: EventEmitter,
    pub(crate) order_events: EventEmitter,
    pub(crate) range_events: EventEmitter,
}

impl Dims {
    pub(crate) fn new(owner: LayerId, range: Vec<DimRange>) -> Self {
        let ndim = range.len();
        Self {
            owner,
            ndim,
            ndisplay: 2,
            order: (0..ndim).collect(),
            range,
            ndisplay_events: EventEmitter::new(),
            order_events: EventEmitter::new(),
            range_events: EventEmitter::new(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn ndisplay(&self) -> usize {
        self.ndisplay
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn range(&self) -> &[DimRange] {
        &self.range
    }

    /// Set the number of displayed dimensions (2 or 3).
    pub fn set_ndisplay(&mut self, ndisplay: usize) {
        let ndisplay = ndisplay.clamp(2, 3);
        if ndisplay == self.ndisplay {
            return;
        }
        self.ndisplay = ndisplay;
        self.ndisplay_events
            .emit(&LayerEvent::new(self.owner, EventKind::Ndisplay(ndisplay)));
    }

    /// Set the dimension order. Ignored unless `order` is a permutation of `0..ndim`.
    pub fn set_order(&mut self, order: Vec<usize>) {
        let mut sorted = order.clone();
        sorted.sort_unstable();
        if sorted != (0..self.ndim).collect::<Vec<_>>() {
            log::warn!("Ignoring invalid dims order {:?} for {} dims", order, self.ndim);
            return;
        }
        if order == self.order {
            return;
        }
        self.order = order.clone();
        self.order_events
            .emit(&LayerEvent::new(self.owner, EventKind::Order(order)));
    }

    /// Replace the ranges, growing or shrinking the dimensionality.
    pub fn set_range(&mut self, range: Vec<DimRange>) {
        if range == self.range {
            return;
        }
        if range.len() != self.ndim {
            self.ndim = range.len();
            self.order = (0..self.ndim).collect();
        }
        self.range = range;
        self.range_events
            .emit(&LayerEvent::new(self.owner, EventKind::Range));
    }
}
