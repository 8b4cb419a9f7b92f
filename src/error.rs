//! Error types for viewer operations.

use thiserror::Error;

use crate::io::ReadError;
use crate::layers::LayerError;

/// Errors raised while adding layers to a [`Viewer`](crate::Viewer).
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Missing, conflicting or malformed arguments
    #[error("{0}")]
    InvalidArgument(String),

    /// Layer type tag that matches no known layer kind
    #[error("Unrecognized layer_type: '{layer_type}'. Must be one of: {known}.")]
    UnrecognizedLayerType {
        /// The tag as received (lower-cased)
        layer_type: String,
        /// Comma separated list of known kinds
        known: String,
    },

    /// Known layer kind without a factory entry on this viewer
    #[error(
        "Sorry! {layer_type} is a valid layer type, but there is no viewer.add_{layer_type} available yet."
    )]
    NotImplemented {
        /// The layer kind name
        layer_type: String,
    },

    /// Plugin metadata contained a parameter the layer kind does not accept
    #[error(
        "add_layer_from_data received an unexpected keyword argument ('{key}') for layer type {layer_type}"
    )]
    UnexpectedKeyword {
        /// The offending metadata key
        key: String,
        /// The layer kind the metadata was meant for
        layer_type: String,
    },

    /// Plugin metadata had an accepted key with a value of the wrong shape
    #[error("Invalid metadata for layer type {layer_type}: {source}")]
    InvalidMetadata {
        /// The layer kind the metadata was meant for
        layer_type: String,
        /// Underlying deserialization error
        source: serde_json::Error,
    },

    /// Error raised by a layer constructor
    #[error(transparent)]
    Layer(#[from] LayerError),

    /// Error raised while reading data from disk
    #[error(transparent)]
    Read(#[from] ReadError),
}

impl ViewerError {
    /// Create an invalid argument error with a message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether this error belongs to the invalid-argument family.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::UnrecognizedLayerType { .. }
        )
    }
}

/// Result alias for viewer operations.
pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
