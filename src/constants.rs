//! Global constants for layer construction

/// Colormap of single-channel image layers
pub const DEFAULT_COLORMAP: &str = "gray";

/// Colormaps for splitting fewer than three channels
pub const MAGENTA_GREEN: [&str; 2] = ["magenta", "green"];

/// Colormaps cycled when splitting three or more channels
pub const CYMRGB: [&str; 6] = ["cyan", "yellow", "magenta", "red", "green", "blue"];

/// Default iso-surface threshold for image layers
pub const DEFAULT_ISO_THRESHOLD: f64 = 0.5;

/// Default attenuation for attenuated MIP rendering
pub const DEFAULT_ATTENUATION: f64 = 0.5;

/// Smallest dimensionality of empty points and shapes layers
pub const MIN_LAYER_NDIM: usize = 2;

/// Opacity of label, shape and vector layers when unset
pub const OVERLAY_OPACITY: f64 = 0.7;
