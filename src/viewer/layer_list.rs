//! Ordered collection of the viewer's layers.

use crate::layers::{Layer, LayerId};

/// Layers in insertion order. Ids are unique, names need not be.
#[derive(Debug, Default)]
pub struct LayerList {
    layers: Vec<Layer>,
}

impl LayerList {
    /// Only the registrar appends, so every stored layer is wired to the viewer.
    pub(crate) fn append(&mut self, layer: Layer) -> LayerId {
        let id = layer.id();
        self.layers.push(layer);
        id
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(Layer::id).collect()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id() == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id() == id)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id() == id)
    }

    pub fn last(&self) -> Option<&Layer> {
        self.layers.last()
    }
}

impl std::ops::Index<usize> for LayerList {
    type Output = Layer;

    fn index(&self, index: usize) -> &Layer {
        &self.layers[index]
    }
}

impl<'a> IntoIterator for &'a LayerList {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}
