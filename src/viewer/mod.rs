//! The viewer: owns the layer collection and turns data, paths and plugin
//! results into registered layers.
//!
//! Every layer enters through [`Viewer::add_layer`], which wires the layer's
//! event channels to the viewer's [`ViewerHandlers`] using the fixed
//! [`SUBSCRIPTIONS`] table before appending it.

mod add_layers;
mod dispatch;
mod handlers;
mod layer_list;
mod normalize;

#[cfg(test)]
mod tests;

use std::fmt;
use std::rc::Rc;

use crate::config::ViewerConfig;
use crate::io::{MagicImread, PathReader};
use crate::layers::{DimRange, Layer, LayerId};
use crate::plugins::{PluginManager, ReaderChain};

pub use add_layers::Added;
pub use dispatch::{DispatchTable, LayerFactory, PathInput};
pub use handlers::{Handler, NoopHandlers, SUBSCRIPTIONS, ViewerHandlers};
pub use layer_list::LayerList;

/// Range of a dimension no layer covers.
const EMPTY_RANGE: DimRange = (0.0, 2.0, 1.0);

/// Layer collection plus the collaborators used to fill it.
pub struct Viewer {
    layers: LayerList,
    handlers: Rc<dyn ViewerHandlers>,
    reader_chain: Box<dyn ReaderChain>,
    path_reader: Box<dyn PathReader>,
    dispatch: DispatchTable,
    config: ViewerConfig,
}

impl Viewer {
    /// Viewer with the default configuration, the built-in readers and no-op handlers.
    pub fn new() -> Self {
        Self::with_config(ViewerConfig::default())
    }

    pub fn with_config(config: ViewerConfig) -> Self {
        Self {
            layers: LayerList::default(),
            handlers: Rc::new(NoopHandlers),
            reader_chain: Box::new(PluginManager::from_config(&config)),
            path_reader: Box::new(MagicImread::new()),
            dispatch: DispatchTable::new(),
            config,
        }
    }

    /// Replace the handlers. Layers added earlier stay wired to the old ones.
    pub fn with_handlers(mut self, handlers: Rc<dyn ViewerHandlers>) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn with_reader_chain(mut self, chain: impl ReaderChain + 'static) -> Self {
        self.reader_chain = Box::new(chain);
        self
    }

    pub fn with_path_reader(mut self, reader: impl PathReader + 'static) -> Self {
        self.path_reader = Box::new(reader);
        self
    }

    pub fn with_dispatch_table(mut self, dispatch: DispatchTable) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn layers(&self) -> &LayerList {
        &self.layers
    }

    /// Mutable access to existing layers. Adding goes through [`Viewer::add_layer`].
    pub fn layers_mut(&mut self) -> &mut LayerList {
        &mut self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id)
    }

    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.dispatch
    }

    pub fn dispatch_table_mut(&mut self) -> &mut DispatchTable {
        &mut self.dispatch
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Dimensionality of the viewer: the largest layer's, at least `config.default_ndim`.
    pub fn ndim(&self) -> usize {
        self.layers
            .iter()
            .map(Layer::ndim)
            .max()
            .unwrap_or(0)
            .max(self.config.default_ndim)
    }

    /// Union of the layer ranges, aligned on trailing dimensions.
    pub fn range(&self) -> Vec<DimRange> {
        let ndim = self.ndim();
        let mut range: Vec<Option<DimRange>> = vec![None; ndim];
        for layer in &self.layers {
            let layer_range = layer.base().dims().range();
            let offset = ndim - layer_range.len();
            for (slot, &(min, max, step)) in range[offset..].iter_mut().zip(layer_range) {
                *slot = Some(match *slot {
                    Some((lo, hi, s)) => (lo.min(min), hi.max(max), s.min(step)),
                    None => (min, max, step),
                });
            }
        }
        range
            .into_iter()
            .map(|r| r.unwrap_or(EMPTY_RANGE))
            .collect()
    }

    /// Register a constructed layer.
    ///
    /// Connects every [`SUBSCRIPTIONS`] entry, appends the layer, refreshes
    /// viewer state for it and resets the view when it is the first layer.
    pub fn add_layer(&mut self, layer: impl Into<Layer>) -> LayerId {
        let mut layer = layer.into();
        for (channel, handler) in SUBSCRIPTIONS {
            let handlers = Rc::clone(&self.handlers);
            layer
                .emitter_mut(channel)
                .connect(move |event| handler.invoke(handlers.as_ref(), event));
        }

        log::info!(
            "Adding {} layer '{}' ({})",
            layer.kind(),
            layer.name(),
            layer.id()
        );
        let id = self.layers.append(layer);

        self.handlers.update_layers(&[id]);
        if self.layers.len() == 1 {
            self.handlers.reset_view();
        }
        id
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("layers", &self.layers)
            .field("dispatch", &self.dispatch)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
