//! Label layers: integer masks where each value names a segment.

use serde::Deserialize;

use crate::constants::OVERLAY_OPACITY;
use crate::data::ImageData;
use crate::io::ImagePath;
use crate::layers::base::{Blending, CommonParams, LayerBase, shape_extent};
use crate::layers::image::check_pyramid;
use crate::layers::{LayerError, LayerKind, LayerParams};

/// Parameters of [`Viewer::add_labels`](crate::Viewer::add_labels).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LabelsParams {
    pub is_pyramid: Option<bool>,
    /// Number of distinct colours in the label colormap
    pub num_colors: u32,
    /// Seed of the colour shuffle, in `[0, 1]`
    pub seed: f64,
    pub name: Option<String>,
    #[serde(flatten)]
    pub common: CommonParams,
    pub path: Option<ImagePath>,
}

impl Default for LabelsParams {
    fn default() -> Self {
        Self {
            is_pyramid: None,
            num_colors: 50,
            seed: 0.5,
            name: None,
            common: CommonParams::default(),
            path: None,
        }
    }
}

impl LabelsParams {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn num_colors(mut self, num_colors: u32) -> Self {
        self.num_colors = num_colors;
        self
    }

    pub fn path(mut self, path: impl Into<ImagePath>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl LayerParams for LabelsParams {
    const KIND: LayerKind = LayerKind::Labels;
    const FIELDS: &'static [&'static str] = &[
        "is_pyramid",
        "num_colors",
        "seed",
        "name",
        "path",
    ];
}

/// An integer label image or pyramid.
///
/// Painting tools edit the backing array in place; this type only builds it.
#[derive(Debug)]
pub struct Labels {
    pub(crate) base: LayerBase,
    data: ImageData,
    num_colors: u32,
    seed: f64,
}

impl Labels {
    pub fn new(data: ImageData, params: LabelsParams) -> Result<Self, LayerError> {
        check_pyramid(&data, params.is_pyramid)?;
        if let Some(level) = data.levels().iter().find(|level| !level.dtype().is_integer()) {
            return Err(LayerError::InvalidDtype {
                kind: LayerKind::Labels,
                expected: "an integer type".to_string(),
                found: level.dtype().to_string(),
            });
        }
        if params.num_colors == 0 {
            return Err(LayerError::invalid_parameter("num_colors", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&params.seed) {
            return Err(LayerError::invalid_parameter("seed", "must lie in [0, 1]"));
        }

        let base = LayerBase::new(
            LayerKind::Labels,
            params.name,
            params.common,
            OVERLAY_OPACITY,
            Blending::Translucent,
            &shape_extent(data.shape()),
        )?;

        Ok(Self {
            base,
            data,
            num_colors: params.num_colors,
            seed: params.seed,
        })
    }

    pub fn base(&self) -> &LayerBase {
        &self.base
    }

    pub fn data(&self) -> &ImageData {
        &self.data
    }

    pub fn is_pyramid(&self) -> bool {
        self.data.is_pyramid()
    }

    pub fn num_colors(&self) -> u32 {
        self.num_colors
    }

    pub fn seed(&self) -> f64 {
        self.seed
    }
}
