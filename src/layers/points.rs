//! Point layers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Axis};
use serde::Deserialize;
use serde_json::Value;

use crate::constants::CYMRGB;
use crate::layers::base::{Blending, CommonParams, LayerBase};
use crate::layers::image::check_limits;
use crate::layers::{LayerError, LayerKind, LayerParams, OneOrMany};

/// Marker symbol of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Symbol {
    Arrow,
    Clobber,
    Cross,
    Diamond,
    #[default]
    Disc,
    Hbar,
    Ring,
    Square,
    Star,
    TailedArrow,
    TriangleDown,
    TriangleUp,
    Vbar,
    X,
}

impl Symbol {
    pub fn name(&self) -> &'static str {
        match self {
            Symbol::Arrow => "arrow",
            Symbol::Clobber => "clobber",
            Symbol::Cross => "cross",
            Symbol::Diamond => "diamond",
            Symbol::Disc => "disc",
            Symbol::Hbar => "hbar",
            Symbol::Ring => "ring",
            Symbol::Square => "square",
            Symbol::Star => "star",
            Symbol::TailedArrow => "tailed_arrow",
            Symbol::TriangleDown => "triangle_down",
            Symbol::TriangleUp => "triangle_up",
            Symbol::Vbar => "vbar",
            Symbol::X => "x",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = match s {
            "arrow" | ">" => Symbol::Arrow,
            "clobber" => Symbol::Clobber,
            "cross" | "+" => Symbol::Cross,
            "diamond" => Symbol::Diamond,
            "disc" | "o" => Symbol::Disc,
            "hbar" | "-" => Symbol::Hbar,
            "ring" => Symbol::Ring,
            "square" | "s" => Symbol::Square,
            "star" | "*" => Symbol::Star,
            "tailed_arrow" | "->" => Symbol::TailedArrow,
            "triangle_down" | "v" => Symbol::TriangleDown,
            "triangle_up" | "^" => Symbol::TriangleUp,
            "vbar" | "|" => Symbol::Vbar,
            "x" => Symbol::X,
            other => return Err(format!("unknown point symbol '{}'", other)),
        };
        Ok(symbol)
    }
}

impl TryFrom<String> for Symbol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parameters of [`Viewer::add_points`](crate::Viewer::add_points).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PointsParams {
    /// Per-point values keyed by property name
    pub properties: Option<BTreeMap<String, Vec<Value>>>,
    pub symbol: Symbol,
    /// One size for every point or one per point
    pub size: OneOrMany<f64>,
    pub edge_width: f64,
    /// A colour name, or a property name to colour by
    pub edge_color: String,
    pub edge_color_cycle: Option<Vec<String>>,
    pub edge_colormap: String,
    pub edge_contrast_limits: Option<[f64; 2]>,
    /// A colour name, or a property name to colour by
    pub face_color: String,
    pub face_color_cycle: Option<Vec<String>>,
    pub face_colormap: String,
    pub face_contrast_limits: Option<[f64; 2]>,
    /// Render points in all dimensions rather than only their own slice
    pub n_dimensional: bool,
    pub name: Option<String>,
    #[serde(flatten)]
    pub common: CommonParams,
}

impl Default for PointsParams {
    fn default() -> Self {
        Self {
            properties: None,
            symbol: Symbol::Disc,
            size: OneOrMany::One(10.0),
            edge_width: 1.0,
            edge_color: "black".to_string(),
            edge_color_cycle: None,
            edge_colormap: "viridis".to_string(),
            edge_contrast_limits: None,
            face_color: "white".to_string(),
            face_color_cycle: None,
            face_colormap: "viridis".to_string(),
            face_contrast_limits: None,
            n_dimensional: false,
            name: None,
            common: CommonParams::default(),
        }
    }
}

impl PointsParams {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn size(mut self, size: impl Into<OneOrMany<f64>>) -> Self {
        self.size = size.into();
        self
    }

    pub fn symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = symbol;
        self
    }

    pub fn properties(mut self, properties: BTreeMap<String, Vec<Value>>) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn face_color(mut self, color: impl Into<String>) -> Self {
        self.face_color = color.into();
        self
    }

    pub fn face_color_cycle(mut self, cycle: Vec<String>) -> Self {
        self.face_color_cycle = Some(cycle);
        self
    }
}

impl LayerParams for PointsParams {
    const KIND: LayerKind = LayerKind::Points;
    const FIELDS: &'static [&'static str] = &[
        "properties",
        "symbol",
        "size",
        "edge_width",
        "edge_color",
        "edge_color_cycle",
        "edge_colormap",
        "edge_contrast_limits",
        "face_color",
        "face_color_cycle",
        "face_colormap",
        "face_contrast_limits",
        "n_dimensional",
        "name",
    ];
}

/// How point colours are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    /// The same named colour for every point.
    Direct(String),
    /// Categorical: distinct property values take successive cycle colours.
    Cycle { property: String, cycle: Vec<String> },
    /// Continuous: numeric property values mapped through a colormap.
    Colormap {
        property: String,
        colormap: String,
        contrast_limits: [f64; 2],
    },
}

/// Resolved colour of one point.
#[derive(Debug, Clone, PartialEq)]
pub enum PointColor {
    Named(String),
    /// Position in `[0, 1]` along a colormap.
    Mapped { colormap: String, value: f64 },
}

/// A set of points with per-point size, colour and properties.
#[derive(Debug)]
pub struct Points {
    pub(crate) base: LayerBase,
    data: Array2<f64>,
    properties: BTreeMap<String, Vec<Value>>,
    symbol: Symbol,
    sizes: Vec<f64>,
    edge_width: f64,
    edge_color: ColorSpec,
    face_color: ColorSpec,
    n_dimensional: bool,
}

impl Points {
    /// Build a points layer from `(N, D)` coordinates.
    pub fn new(data: Array2<f64>, params: PointsParams) -> Result<Self, LayerError> {
        let n = data.nrows();
        let properties = params.properties.unwrap_or_default();
        for (name, values) in &properties {
            if values.len() != n {
                return Err(LayerError::LengthMismatch {
                    name: format!("properties.{}", name),
                    expected: n,
                    found: values.len(),
                });
            }
        }
        let sizes = params.size.expand("size", n)?;
        if sizes.iter().any(|&s| s < 0.0) {
            return Err(LayerError::invalid_parameter("size", "must not be negative"));
        }

        let edge_color = color_spec(
            "edge",
            &properties,
            params.edge_color,
            params.edge_color_cycle,
            params.edge_colormap,
            params.edge_contrast_limits,
        )?;
        let face_color = color_spec(
            "face",
            &properties,
            params.face_color,
            params.face_color_cycle,
            params.face_colormap,
            params.face_contrast_limits,
        )?;

        let base = LayerBase::new(
            LayerKind::Points,
            params.name,
            params.common,
            1.0,
            Blending::Translucent,
            &coordinate_extent(&data),
        )?;

        Ok(Self {
            base,
            data,
            properties,
            symbol: params.symbol,
            sizes,
            edge_width: params.edge_width,
            edge_color,
            face_color,
            n_dimensional: params.n_dimensional,
        })
    }

    pub fn base(&self) -> &LayerBase {
        &self.base
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the coordinates, keeping per-point attributes aligned by index.
    ///
    /// New points take the size of the last existing point and null properties.
    pub fn set_data(&mut self, data: Array2<f64>) {
        let n = data.nrows();
        let fill = self.sizes.last().copied().unwrap_or(10.0);
        self.sizes.resize(n, fill);
        for values in self.properties.values_mut() {
            values.resize(n, Value::Null);
        }
        let extent = coordinate_extent(&data);
        self.data = data;
        self.base.data_changed(&extent);
    }

    pub fn properties(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.properties
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }

    pub fn edge_width(&self) -> f64 {
        self.edge_width
    }

    pub fn edge_color(&self) -> &ColorSpec {
        &self.edge_color
    }

    pub fn face_color(&self) -> &ColorSpec {
        &self.face_color
    }

    pub fn n_dimensional(&self) -> bool {
        self.n_dimensional
    }

    pub fn face_colors(&self) -> Vec<PointColor> {
        resolve_colors(&self.face_color, &self.properties, self.len())
    }

    pub fn edge_colors(&self) -> Vec<PointColor> {
        resolve_colors(&self.edge_color, &self.properties, self.len())
    }
}

fn coordinate_extent(data: &Array2<f64>) -> Vec<(f64, f64)> {
    data.axis_iter(Axis(1))
        .map(|column| {
            column
                .iter()
                .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                    None => Some((v, v)),
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                })
                .unwrap_or((0.0, 1.0))
        })
        .collect()
}

/// Decide between a plain colour and colouring by property.
///
/// `side` is `"edge"` or `"face"` and prefixes parameter names in errors.
fn color_spec(
    side: &str,
    properties: &BTreeMap<String, Vec<Value>>,
    color: String,
    cycle: Option<Vec<String>>,
    colormap: String,
    contrast_limits: Option<[f64; 2]>,
) -> Result<ColorSpec, LayerError> {
    let contrast_limits = contrast_limits
        .map(|limits| check_limits(&format!("{}_contrast_limits", side), limits))
        .transpose()?;
    let Some(values) = properties.get(&color) else {
        return Ok(ColorSpec::Direct(color));
    };

    let numeric: Option<Vec<f64>> = values.iter().map(Value::as_f64).collect();
    match (numeric, cycle) {
        (Some(numeric), None) => {
            let limits = match contrast_limits {
                Some(limits) => limits,
                None => {
                    let lo = numeric.iter().copied().fold(f64::INFINITY, f64::min);
                    let hi = numeric.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    if lo.is_finite() && lo < hi { [lo, hi] } else { [0.0, 1.0] }
                }
            };
            Ok(ColorSpec::Colormap {
                property: color,
                colormap,
                contrast_limits: limits,
            })
        }
        (_, cycle) => {
            let cycle = cycle.unwrap_or_else(|| CYMRGB.iter().map(|c| c.to_string()).collect());
            if cycle.is_empty() {
                return Err(LayerError::invalid_parameter(
                    format!("{}_color_cycle", side),
                    "must not be empty",
                ));
            }
            Ok(ColorSpec::Cycle {
                property: color,
                cycle,
            })
        }
    }
}

fn resolve_colors(
    spec: &ColorSpec,
    properties: &BTreeMap<String, Vec<Value>>,
    n: usize,
) -> Vec<PointColor> {
    match spec {
        ColorSpec::Direct(color) => vec![PointColor::Named(color.clone()); n],
        ColorSpec::Cycle { property, cycle } => {
            let mut categories: Vec<&Value> = Vec::new();
            properties
                .get(property)
                .map(|values| {
                    values
                        .iter()
                        .map(|value| {
                            let index = match categories.iter().position(|c| *c == value) {
                                Some(index) => index,
                                None => {
                                    categories.push(value);
                                    categories.len() - 1
                                }
                            };
                            PointColor::Named(cycle[index % cycle.len()].clone())
                        })
                        .collect()
                })
                .unwrap_or_default()
        }
        ColorSpec::Colormap {
            property,
            colormap,
            contrast_limits: [lo, hi],
        } => properties
            .get(property)
            .map(|values| {
                values
                    .iter()
                    .map(|value| {
                        let v = value.as_f64().unwrap_or(*lo);
                        PointColor::Mapped {
                            colormap: colormap.clone(),
                            value: ((v - lo) / (hi - lo)).clamp(0.0, 1.0),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use serde_json::json;

    #[test]
    fn test_empty_points() {
        let points = Points::new(Array2::zeros((0, 3)), PointsParams::default()).unwrap();
        assert!(points.is_empty());
        assert_eq!(points.base().dims().ndim(), 3);
        assert_eq!(points.symbol(), Symbol::Disc);
    }

    #[test]
    fn test_symbol_aliases() {
        assert_eq!("o".parse::<Symbol>(), Ok(Symbol::Disc));
        assert_eq!("+".parse::<Symbol>(), Ok(Symbol::Cross));
        assert_eq!("^".parse::<Symbol>(), Ok(Symbol::TriangleUp));
        assert!("hexagon".parse::<Symbol>().is_err());
        let symbol: Symbol = serde_json::from_value(json!("s")).unwrap();
        assert_eq!(symbol, Symbol::Square);
    }

    #[test]
    fn test_per_point_size_length_checked() {
        let data = arr2(&[[0.0, 0.0], [1.0, 1.0]]);
        let params = PointsParams::default().size(OneOrMany::Many(vec![1.0, 2.0, 3.0]));
        let err = Points::new(data, params).unwrap_err();
        assert!(matches!(err, LayerError::LengthMismatch { expected: 2, found: 3, .. }));
    }

    #[test]
    fn test_property_length_checked() {
        let data = arr2(&[[0.0, 0.0], [1.0, 1.0]]);
        let mut properties = BTreeMap::new();
        properties.insert("kind".to_string(), vec![json!("a")]);
        let err = Points::new(data, PointsParams::default().properties(properties)).unwrap_err();
        assert!(err.to_string().contains("properties.kind"));
    }

    #[test]
    fn test_face_color_cycle_by_category() {
        let data = arr2(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
        let mut properties = BTreeMap::new();
        properties.insert("kind".to_string(), vec![json!("a"), json!("b"), json!("a")]);
        let params = PointsParams::default()
            .properties(properties)
            .face_color("kind")
            .face_color_cycle(vec!["red".into(), "blue".into()]);

        let points = Points::new(data, params).unwrap();
        assert_eq!(
            points.face_colors(),
            vec![
                PointColor::Named("red".into()),
                PointColor::Named("blue".into()),
                PointColor::Named("red".into()),
            ]
        );
        assert_eq!(points.edge_colors()[0], PointColor::Named("black".into()));
    }

    #[test]
    fn test_face_color_colormap_by_number() {
        let data = arr2(&[[0.0, 0.0], [1.0, 1.0]]);
        let mut properties = BTreeMap::new();
        properties.insert("score".to_string(), vec![json!(0.0), json!(4.0)]);
        let params = PointsParams::default().properties(properties).face_color("score");

        let points = Points::new(data, params).unwrap();
        assert_eq!(
            points.face_colors()[1],
            PointColor::Mapped {
                colormap: "viridis".into(),
                value: 1.0
            }
        );
    }

    #[test]
    fn test_color_contrast_limits_validated() {
        let data = arr2(&[[0.0, 0.0], [1.0, 1.0]]);
        let mut properties = BTreeMap::new();
        properties.insert("v".to_string(), vec![json!(5.0), json!(5.0)]);

        let mut params = PointsParams::default().properties(properties).face_color("v");
        params.face_contrast_limits = Some([5.0, 5.0]);
        let err = Points::new(data.clone(), params.clone()).unwrap_err();
        assert!(matches!(
            err,
            LayerError::InvalidParameter { ref name, .. } if name == "face_contrast_limits"
        ));

        params.face_contrast_limits = None;
        params.edge_contrast_limits = Some([1.0, 0.0]);
        let err = Points::new(data.clone(), params.clone()).unwrap_err();
        assert!(err.to_string().contains("edge_contrast_limits"));

        params.edge_contrast_limits = None;
        let points = Points::new(data, params).unwrap();
        assert!(points.face_colors().iter().all(|color| matches!(
            color,
            PointColor::Mapped { value, .. } if value.is_finite()
        )));
    }

    #[test]
    fn test_set_data_keeps_attributes_aligned() {
        let data = arr2(&[[0.0, 0.0]]);
        let mut points = Points::new(data, PointsParams::default().size(4.0)).unwrap();
        points.set_data(arr2(&[[0.0, 0.0], [5.0, 2.0]]));
        assert_eq!(points.sizes(), &[4.0, 4.0]);
        assert_eq!(points.base().dims().range()[0], (0.0, 5.0, 1.0));
    }
}
