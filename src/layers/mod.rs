//! Layer types displayed by the viewer.
//!
//! Every layer kind has a parameter struct (`ImageParams`, `PointsParams`, ...)
//! holding its documented keyword parameters and a constructor that validates
//! data and parameters together. Parameter structs deserialize from plugin
//! metadata; a kind accepts the keys in [`CommonParams::FIELDS`] plus its own
//! [`LayerParams::FIELDS`].

mod base;
mod dims;
pub mod events;
mod image;
mod labels;
mod points;
mod shapes;
mod surface;
mod vectors;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use base::{Blending, CommonParams, LayerBase};
pub use dims::{DimRange, Dims};
pub use events::{Channel, EventEmitter, EventKind, LayerEvent, LayerEvents};
pub use image::{ContrastLimits, Image, ImageParams, Interpolation, Rendering};
pub use labels::{Labels, LabelsParams};
pub use points::{ColorSpec, Points, PointsParams, Symbol};
pub use shapes::{Shape, ShapeType, Shapes, ShapesParams};
pub use surface::{Surface, SurfaceParams};
pub use vectors::{Vectors, VectorsParams};

/// Unique identity of a layer within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of layer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Image,
    Labels,
    Points,
    Shapes,
    Surface,
    Vectors,
}

impl LayerKind {
    /// All kinds, in the order they are listed in error messages.
    pub const ALL: [LayerKind; 6] = [
        LayerKind::Image,
        LayerKind::Labels,
        LayerKind::Points,
        LayerKind::Shapes,
        LayerKind::Surface,
        LayerKind::Vectors,
    ];

    /// Type tag used by plugins.
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Image => "image",
            LayerKind::Labels => "labels",
            LayerKind::Points => "points",
            LayerKind::Shapes => "shapes",
            LayerKind::Surface => "surface",
            LayerKind::Vectors => "vectors",
        }
    }

    /// Default layer name.
    pub fn display_name(&self) -> &'static str {
        match self {
            LayerKind::Image => "Image",
            LayerKind::Labels => "Labels",
            LayerKind::Points => "Points",
            LayerKind::Shapes => "Shapes",
            LayerKind::Surface => "Surface",
            LayerKind::Vectors => "Vectors",
        }
    }

    /// Comma separated list of every type tag.
    pub fn known_names() -> String {
        Self::ALL
            .iter()
            .map(LayerKind::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Errors raised by layer constructors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    /// Data has the wrong number of dimensions or incompatible axis sizes
    #[error("Invalid shape: {message}")]
    InvalidShape {
        /// Description of the shape problem
        message: String,
    },

    /// Data cannot be used for this kind of layer
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Description of the data problem
        message: String,
    },

    /// Element type not supported by this kind of layer
    #[error("Invalid dtype {found} for {kind} layer: expected {expected}")]
    InvalidDtype {
        kind: LayerKind,
        expected: String,
        found: String,
    },

    /// Parameter value outside its allowed domain
    #[error("Invalid value for '{name}': {message}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Description of the allowed values
        message: String,
    },

    /// Per-item parameter whose length does not match the item count
    #[error("'{name}' has {found} entries but the layer has {expected} items")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

impl LayerError {
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape {
            message: message.into(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Typed parameter set of one layer kind.
pub trait LayerParams: DeserializeOwned + Default {
    /// Kind these parameters construct.
    const KIND: LayerKind;

    /// Keys accepted in plugin metadata besides [`CommonParams::FIELDS`].
    const FIELDS: &'static [&'static str];

    /// Whether `key` names a parameter of this kind.
    fn accepts(key: &str) -> bool {
        Self::FIELDS.contains(&key) || CommonParams::FIELDS.contains(&key)
    }
}

/// A layer of any kind.
#[derive(Debug)]
pub enum Layer {
    Image(Image),
    Labels(Labels),
    Points(Points),
    Shapes(Shapes),
    Surface(Surface),
    Vectors(Vectors),
}

impl Layer {
    pub fn base(&self) -> &LayerBase {
        match self {
            Layer::Image(layer) => &layer.base,
            Layer::Labels(layer) => &layer.base,
            Layer::Points(layer) => &layer.base,
            Layer::Shapes(layer) => &layer.base,
            Layer::Surface(layer) => &layer.base,
            Layer::Vectors(layer) => &layer.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut LayerBase {
        match self {
            Layer::Image(layer) => &mut layer.base,
            Layer::Labels(layer) => &mut layer.base,
            Layer::Points(layer) => &mut layer.base,
            Layer::Shapes(layer) => &mut layer.base,
            Layer::Surface(layer) => &mut layer.base,
            Layer::Vectors(layer) => &mut layer.base,
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Image(_) => LayerKind::Image,
            Layer::Labels(_) => LayerKind::Labels,
            Layer::Points(_) => LayerKind::Points,
            Layer::Shapes(_) => LayerKind::Shapes,
            Layer::Surface(_) => LayerKind::Surface,
            Layer::Vectors(_) => LayerKind::Vectors,
        }
    }

    pub fn id(&self) -> LayerId {
        self.base().id()
    }

    pub fn name(&self) -> &str {
        self.base().name()
    }

    pub fn ndim(&self) -> usize {
        self.base().dims().ndim()
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Layer::Image(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_labels(&self) -> Option<&Labels> {
        match self {
            Layer::Labels(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_points(&self) -> Option<&Points> {
        match self {
            Layer::Points(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_shapes(&self) -> Option<&Shapes> {
        match self {
            Layer::Shapes(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_surface(&self) -> Option<&Surface> {
        match self {
            Layer::Surface(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_vectors(&self) -> Option<&Vectors> {
        match self {
            Layer::Vectors(layer) => Some(layer),
            _ => None,
        }
    }

    /// Emitter for any channel, layer or dims.
    pub fn emitter(&self, channel: Channel) -> &EventEmitter {
        self.base().emitter(channel)
    }

    pub(crate) fn emitter_mut(&mut self, channel: Channel) -> &mut EventEmitter {
        self.base_mut().emitter_mut(channel)
    }
}

macro_rules! impl_from_layer {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Layer {
                fn from(layer: $variant) -> Self {
                    Layer::$variant(layer)
                }
            }
        )*
    };
}

impl_from_layer!(Image, Labels, Points, Shapes, Surface, Vectors);

/// Accepts a single value or a sequence in parameters that may vary per item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone + 'static> OneOrMany<T> {
    /// Repeat a single value forever, or yield each item of a sequence once.
    pub fn into_iter_repeating(self) -> Box<dyn Iterator<Item = T>> {
        match self {
            OneOrMany::One(value) => Box::new(std::iter::repeat(value)),
            OneOrMany::Many(values) => Box::new(values.into_iter()),
        }
    }

    /// Expand to exactly `n` values; a sequence must have length `n`.
    pub fn expand(self, name: &str, n: usize) -> Result<Vec<T>, LayerError> {
        match self {
            OneOrMany::One(value) => Ok(vec![value; n]),
            OneOrMany::Many(values) if values.len() == n => Ok(values),
            OneOrMany::Many(values) => Err(LayerError::LengthMismatch {
                name: name.to_string(),
                expected: n,
                found: values.len(),
            }),
        }
    }

    /// The single value, or `None` for a sequence.
    pub fn single(self) -> Option<T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(_) => None,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        OneOrMany::One(value)
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}
