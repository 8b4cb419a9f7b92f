//! Image layers.

use serde::Deserialize;

use crate::constants::{DEFAULT_COLORMAP, DEFAULT_ISO_THRESHOLD, DEFAULT_ATTENUATION};
use crate::data::{DType, ImageData};
use crate::io::ImagePath;
use crate::layers::base::{Blending, CommonParams, LayerBase, shape_extent};
use crate::layers::{LayerError, LayerKind, LayerParams, OneOrMany};

/// Interpolation used when sampling the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Bessel,
    Bicubic,
    Bilinear,
    Blackman,
    Catrom,
    Gaussian,
    Hamming,
    Hanning,
    Hermite,
    Kaiser,
    Lanczos,
    Mitchell,
    #[default]
    Nearest,
    Spline16,
    Spline36,
}

/// Volume rendering mode for 3D display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rendering {
    Translucent,
    Additive,
    Iso,
    #[default]
    Mip,
    AttenuatedMip,
}

/// Contrast limits as one shared pair or one pair per channel.
///
/// A flat `[lo, hi]` is a shared pair; a list of pairs is per channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ContrastLimits {
    Shared([f64; 2]),
    PerChannel(Vec<[f64; 2]>),
}

impl From<[f64; 2]> for ContrastLimits {
    fn from(pair: [f64; 2]) -> Self {
        ContrastLimits::Shared(pair)
    }
}

/// Parameters of [`Viewer::add_image`](crate::Viewer::add_image).
///
/// `name`, `colormap`, `contrast_limits` and `gamma` may be given per channel
/// when `channel_axis` is set; otherwise they must be single values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageParams {
    /// Axis to split into one layer per channel (negative counts from the end)
    pub channel_axis: Option<isize>,
    /// Whether the trailing axis holds RGB(A) channels, guessed when unset
    pub rgb: Option<bool>,
    /// Whether the data is a pyramid, guessed from the data when unset
    pub is_pyramid: Option<bool>,
    pub colormap: Option<OneOrMany<String>>,
    pub contrast_limits: Option<ContrastLimits>,
    pub gamma: Option<OneOrMany<f64>>,
    pub interpolation: Option<Interpolation>,
    pub rendering: Option<Rendering>,
    /// Threshold for iso-surface rendering
    pub iso_threshold: Option<f64>,
    /// Attenuation for attenuated maximum intensity projection
    pub attenuation: Option<f64>,
    pub name: Option<OneOrMany<String>>,
    #[serde(flatten)]
    pub common: CommonParams,
    /// Read the data from this path instead of passing it directly
    pub path: Option<ImagePath>,
}

impl ImageParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_axis(mut self, axis: isize) -> Self {
        self.channel_axis = Some(axis);
        self
    }

    pub fn name(mut self, name: impl Into<OneOrMany<String>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn colormap(mut self, colormap: impl Into<OneOrMany<String>>) -> Self {
        self.colormap = Some(colormap.into());
        self
    }

    pub fn contrast_limits(mut self, limits: impl Into<ContrastLimits>) -> Self {
        self.contrast_limits = Some(limits.into());
        self
    }

    pub fn gamma(mut self, gamma: impl Into<OneOrMany<f64>>) -> Self {
        self.gamma = Some(gamma.into());
        self
    }

    pub fn rgb(mut self, rgb: bool) -> Self {
        self.rgb = Some(rgb);
        self
    }

    pub fn path(mut self, path: impl Into<ImagePath>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn common(mut self, common: CommonParams) -> Self {
        self.common = common;
        self
    }
}

impl LayerParams for ImageParams {
    const KIND: LayerKind = LayerKind::Image;
    const FIELDS: &'static [&'static str] = &[
        "channel_axis",
        "rgb",
        "is_pyramid",
        "colormap",
        "contrast_limits",
        "gamma",
        "interpolation",
        "rendering",
        "iso_threshold",
        "attenuation",
        "name",
        "path",
    ];
}

/// An image or image pyramid.
#[derive(Debug)]
pub struct Image {
    pub(crate) base: LayerBase,
    data: ImageData,
    rgb: bool,
    colormap: String,
    contrast_limits: [f64; 2],
    gamma: f64,
    interpolation: Interpolation,
    rendering: Rendering,
    iso_threshold: f64,
    attenuation: f64,
}

impl Image {
    /// Build an image layer. Per-channel parameters and `path` are rejected here;
    /// channel splitting and path reading happen in the viewer.
    pub fn new(data: ImageData, params: ImageParams) -> Result<Self, LayerError> {
        check_pyramid(&data, params.is_pyramid)?;

        let shape = data.shape().to_vec();
        let rgb = match params.rgb {
            Some(true) if !guess_rgb(&shape) => {
                return Err(LayerError::invalid_parameter(
                    "rgb",
                    format!("last axis of shape {:?} must have 3 or 4 entries", shape),
                ));
            }
            Some(rgb) => rgb,
            None => guess_rgb(&shape),
        };
        let ndim = if rgb { shape.len() - 1 } else { shape.len() };

        let colormap = single(params.colormap, "colormap")?
            .unwrap_or_else(|| DEFAULT_COLORMAP.to_string());
        let gamma = single(params.gamma, "gamma")?.unwrap_or(1.0);
        if !(gamma > 0.0 && gamma.is_finite()) {
            return Err(LayerError::invalid_parameter("gamma", "must be positive"));
        }
        let contrast_limits = match params.contrast_limits {
            Some(ContrastLimits::Shared(limits)) => check_limits("contrast_limits", limits)?,
            Some(ContrastLimits::PerChannel(_)) => {
                return Err(LayerError::invalid_parameter(
                    "contrast_limits",
                    "expected one [min, max] pair unless channel_axis is set",
                ));
            }
            None => default_contrast_limits(&data, rgb),
        };
        let name = single(params.name, "name")?;

        let base = LayerBase::new(
            LayerKind::Image,
            name,
            params.common,
            1.0,
            Blending::Translucent,
            &shape_extent(&shape[..ndim]),
        )?;

        Ok(Self {
            base,
            data,
            rgb,
            colormap,
            contrast_limits,
            gamma,
            interpolation: params.interpolation.unwrap_or_default(),
            rendering: params.rendering.unwrap_or_default(),
            iso_threshold: params.iso_threshold.unwrap_or(DEFAULT_ISO_THRESHOLD),
            attenuation: params.attenuation.unwrap_or(DEFAULT_ATTENUATION),
        })
    }

    pub fn base(&self) -> &LayerBase {
        &self.base
    }

    pub fn data(&self) -> &ImageData {
        &self.data
    }

    /// Replace the data; dimensionality may change.
    pub fn set_data(&mut self, data: ImageData) -> Result<(), LayerError> {
        check_pyramid(&data, None)?;
        let shape = data.shape();
        let ndim = if self.rgb && guess_rgb(shape) {
            shape.len() - 1
        } else {
            shape.len()
        };
        let extent = shape_extent(&shape[..ndim]);
        self.data = data;
        self.base.data_changed(&extent);
        Ok(())
    }

    pub fn rgb(&self) -> bool {
        self.rgb
    }

    pub fn is_pyramid(&self) -> bool {
        self.data.is_pyramid()
    }

    pub fn colormap(&self) -> &str {
        &self.colormap
    }

    pub fn contrast_limits(&self) -> [f64; 2] {
        self.contrast_limits
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn rendering(&self) -> Rendering {
        self.rendering
    }

    pub fn iso_threshold(&self) -> f64 {
        self.iso_threshold
    }

    pub fn attenuation(&self) -> f64 {
        self.attenuation
    }
}

/// Trailing axis of 3 or 4 on an array with more than two dimensions.
pub(crate) fn guess_rgb(shape: &[usize]) -> bool {
    shape.len() > 2 && matches!(shape.last().copied(), Some(3 | 4))
}

/// Validate pyramid levels against an explicit `is_pyramid` flag.
pub(crate) fn check_pyramid(data: &ImageData, is_pyramid: Option<bool>) -> Result<(), LayerError> {
    match (data, is_pyramid) {
        (ImageData::Single(_), Some(true)) => Err(LayerError::invalid_parameter(
            "is_pyramid",
            "pyramid requested but a single array was given",
        )),
        (ImageData::Pyramid(_), Some(false)) => Err(LayerError::invalid_parameter(
            "is_pyramid",
            "a list of arrays was given but is_pyramid is false",
        )),
        (ImageData::Pyramid(levels), _) if levels.is_empty() => {
            Err(LayerError::invalid_data("pyramid has no levels"))
        }
        (ImageData::Pyramid(levels), _) => {
            let ndim = levels[0].ndim();
            match levels.iter().find(|level| level.ndim() != ndim) {
                Some(level) => Err(LayerError::invalid_shape(format!(
                    "pyramid levels must share dimensionality: {:?} vs {:?}",
                    levels[0].shape(),
                    level.shape()
                ))),
                None => Ok(()),
            }
        }
        (ImageData::Single(_), _) => Ok(()),
    }
}

fn single<T: Clone + 'static>(
    value: Option<OneOrMany<T>>,
    name: &str,
) -> Result<Option<T>, LayerError> {
    match value {
        None => Ok(None),
        Some(value) => value.single().map(Some).ok_or_else(|| {
            LayerError::invalid_parameter(
                name,
                "expected a single value unless channel_axis is set",
            )
        }),
    }
}

pub(crate) fn check_limits(name: &str, limits: [f64; 2]) -> Result<[f64; 2], LayerError> {
    if limits[0] < limits[1] {
        Ok(limits)
    } else {
        Err(LayerError::invalid_parameter(
            name,
            format!("min {} must be below max {}", limits[0], limits[1]),
        ))
    }
}

fn default_contrast_limits(data: &ImageData, rgb: bool) -> [f64; 2] {
    let Some(array) = data.coarsest() else {
        return [0.0, 1.0];
    };
    if rgb && array.dtype() == DType::U8 {
        return [0.0, 255.0];
    }
    match array.min_max() {
        Some((lo, hi)) if lo < hi => [lo, hi],
        Some((lo, _)) => [lo, lo + 1.0],
        None => [0.0, 1.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ArrayData;
    use ndarray::{Array2, Array3};

    fn gray(h: usize, w: usize) -> ImageData {
        let array = Array2::from_shape_fn((h, w), |(y, x)| (y * w + x) as f32);
        ImageData::from(array.into_dyn())
    }

    #[test]
    fn test_defaults() {
        let image = Image::new(gray(4, 5), ImageParams::default()).unwrap();
        assert_eq!(image.colormap(), "gray");
        assert_eq!(image.base().blending(), Blending::Translucent);
        assert_eq!(image.contrast_limits(), [0.0, 19.0]);
        assert_eq!(image.interpolation(), Interpolation::Nearest);
        assert_eq!(image.rendering(), Rendering::Mip);
        assert_eq!(image.base().dims().ndim(), 2);
        assert!(!image.rgb());
    }

    #[test]
    fn test_rgb_is_guessed() {
        let data = ImageData::from(Array3::<u8>::zeros((8, 8, 3)).into_dyn());
        let image = Image::new(data, ImageParams::default()).unwrap();
        assert!(image.rgb());
        assert_eq!(image.base().dims().ndim(), 2);
        assert_eq!(image.contrast_limits(), [0.0, 255.0]);
    }

    #[test]
    fn test_rgb_forced_on_wrong_shape() {
        let err = Image::new(gray(4, 4), ImageParams::default().rgb(true)).unwrap_err();
        assert!(matches!(err, LayerError::InvalidParameter { ref name, .. } if name == "rgb"));
    }

    #[test]
    fn test_pyramid_levels() {
        let levels = vec![
            ArrayData::from(Array2::<u16>::zeros((16, 16)).into_dyn()),
            ArrayData::from(Array2::<u16>::ones((8, 8)).into_dyn()),
        ];
        let image = Image::new(ImageData::Pyramid(levels), ImageParams::default()).unwrap();
        assert!(image.is_pyramid());
        assert_eq!(image.base().dims().range()[0], (0.0, 16.0, 1.0));
        // constant coarsest level still gives a usable range
        assert_eq!(image.contrast_limits(), [1.0, 2.0]);
    }

    #[test]
    fn test_per_channel_values_rejected_without_split() {
        let params = ImageParams::default().colormap(OneOrMany::Many(vec!["red".into()]));
        assert!(Image::new(gray(2, 2), params).is_err());

        let params = ImageParams::default()
            .contrast_limits(ContrastLimits::PerChannel(vec![[0.0, 1.0]]));
        assert!(Image::new(gray(2, 2), params).is_err());
    }

    #[test]
    fn test_contrast_limits_deserialize() {
        let shared: ContrastLimits = serde_json::from_str("[0, 10]").unwrap();
        assert_eq!(shared, ContrastLimits::Shared([0.0, 10.0]));
        let per: ContrastLimits = serde_json::from_str("[[0, 1], [0, 2]]").unwrap();
        assert_eq!(per, ContrastLimits::PerChannel(vec![[0.0, 1.0], [0.0, 2.0]]));
    }

    #[test]
    fn test_set_data_emits_data_event() {
        use crate::layers::Channel;
        use std::cell::Cell;
        use std::rc::Rc;

        let mut image = Image::new(gray(2, 2), ImageParams::default()).unwrap();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        image.base.emitter_mut(Channel::Data).connect(move |_| flag.set(true));

        image.set_data(gray(3, 5)).unwrap();
        assert!(fired.get());
        assert_eq!(image.base().dims().range()[1], (0.0, 5.0, 1.0));
    }
}
