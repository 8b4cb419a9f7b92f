//! State shared by every layer kind.

use serde::Deserialize;

use crate::data::Metadata;
use crate::layers::dims::{DimRange, Dims};
use crate::layers::events::{Channel, EventEmitter, EventKind, LayerEvent, LayerEvents};
use crate::layers::{LayerError, LayerId, LayerKind};

/// How a layer is blended with the layers below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blending {
    Opaque,
    Translucent,
    Additive,
}

/// Parameters accepted by every layer kind.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommonParams {
    /// Arbitrary key-value metadata stored on the layer
    pub metadata: Option<Metadata>,
    /// Per-dimension scale, defaults to ones
    pub scale: Option<Vec<f64>>,
    /// Per-dimension translation, defaults to zeros
    pub translate: Option<Vec<f64>>,
    /// Opacity in `[0, 1]`, default depends on the layer kind
    pub opacity: Option<f64>,
    /// Blending mode, default depends on the layer kind
    pub blending: Option<Blending>,
    /// Visibility, defaults to true
    pub visible: Option<bool>,
}

impl CommonParams {
    /// Keys every layer kind accepts in plugin metadata.
    pub const FIELDS: &'static [&'static str] = &[
        "metadata",
        "scale",
        "translate",
        "opacity",
        "blending",
        "visible",
    ];

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn blending(mut self, blending: Blending) -> Self {
        self.blending = Some(blending);
        self
    }

    pub fn scale(mut self, scale: Vec<f64>) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn translate(mut self, translate: Vec<f64>) -> Self {
        self.translate = Some(translate);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }
}

/// Attributes and event channels common to all layers.
#[derive(Debug)]
pub struct LayerBase {
    id: LayerId,
    kind: LayerKind,
    name: String,
    metadata: Metadata,
    scale: Vec<f64>,
    translate: Vec<f64>,
    opacity: f64,
    blending: Blending,
    visible: bool,
    selected: bool,
    status: String,
    help: String,
    interactive: bool,
    cursor: String,
    cursor_size: f64,
    events: LayerEvents,
    dims: Dims,
}

impl LayerBase {
    /// Build the shared state for a layer whose data spans `extent` (`(min, max)` per dim).
    ///
    /// `opacity` and `blending` are the kind's defaults, used when `params` leaves them unset.
    pub(crate) fn new(
        kind: LayerKind,
        name: Option<String>,
        params: CommonParams,
        opacity: f64,
        blending: Blending,
        extent: &[(f64, f64)],
    ) -> Result<Self, LayerError> {
        let ndim = extent.len();
        let scale = params.scale.unwrap_or_else(|| vec![1.0; ndim]);
        let translate = params.translate.unwrap_or_else(|| vec![0.0; ndim]);
        check_len("scale", &scale, ndim)?;
        check_len("translate", &translate, ndim)?;
        if scale.iter().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(LayerError::invalid_parameter(
                "scale",
                "entries must be finite and non-zero",
            ));
        }

        let opacity = params.opacity.unwrap_or(opacity);
        if !(0.0..=1.0).contains(&opacity) {
            return Err(LayerError::invalid_parameter(
                "opacity",
                format!("{} is outside [0, 1]", opacity),
            ));
        }

        let range: Vec<DimRange> = extent
            .iter()
            .zip(scale.iter().zip(&translate))
            .map(|(&(lo, hi), (&s, &t))| {
                let (a, b) = (lo * s + t, hi * s + t);
                (a.min(b), a.max(b), s.abs())
            })
            .collect();

        let id = LayerId::next();
        Ok(Self {
            id,
            kind,
            name: name.unwrap_or_else(|| kind.display_name().to_string()),
            metadata: params.metadata.unwrap_or_default(),
            scale,
            translate,
            opacity,
            blending: params.blending.unwrap_or(blending),
            visible: params.visible.unwrap_or(true),
            selected: true,
            status: String::new(),
            help: String::new(),
            interactive: true,
            cursor: "standard".to_string(),
            cursor_size: 1.0,
            events: LayerEvents::default(),
            dims: Dims::new(id, range),
        })
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn translate(&self) -> &[f64] {
        &self.translate
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn blending(&self) -> Blending {
        self.blending
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    pub fn cursor_size(&self) -> f64 {
        self.cursor_size
    }

    pub fn events(&self) -> &LayerEvents {
        &self.events
    }

    /// Emitter for a layer or dims channel.
    pub fn emitter(&self, channel: Channel) -> &EventEmitter {
        match channel {
            Channel::Select => &self.events.select,
            Channel::Deselect => &self.events.deselect,
            Channel::Status => &self.events.status,
            Channel::Help => &self.events.help,
            Channel::Interactive => &self.events.interactive,
            Channel::Cursor => &self.events.cursor,
            Channel::CursorSize => &self.events.cursor_size,
            Channel::Data => &self.events.data,
            Channel::Ndisplay => &self.dims.ndisplay_events,
            Channel::Order => &self.dims.order_events,
            Channel::Range => &self.dims.range_events,
        }
    }

    pub(crate) fn emitter_mut(&mut self, channel: Channel) -> &mut EventEmitter {
        match channel {
            Channel::Select => &mut self.events.select,
            Channel::Deselect => &mut self.events.deselect,
            Channel::Status => &mut self.events.status,
            Channel::Help => &mut self.events.help,
            Channel::Interactive => &mut self.events.interactive,
            Channel::Cursor => &mut self.events.cursor,
            Channel::CursorSize => &mut self.events.cursor_size,
            Channel::Data => &mut self.events.data,
            Channel::Ndisplay => &mut self.dims.ndisplay_events,
            Channel::Order => &mut self.dims.order_events,
            Channel::Range => &mut self.dims.range_events,
        }
    }

    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    pub fn dims_mut(&mut self) -> &mut Dims {
        &mut self.dims
    }

    fn event(&self, kind: EventKind) -> LayerEvent {
        LayerEvent::new(self.id, kind)
    }

    pub fn select(&mut self) {
        self.selected = true;
        self.events.select.emit(&self.event(EventKind::Select));
    }

    pub fn deselect(&mut self) {
        self.selected = false;
        self.events.deselect.emit(&self.event(EventKind::Deselect));
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.events
            .status
            .emit(&self.event(EventKind::Status(self.status.clone())));
    }

    pub fn set_help(&mut self, help: impl Into<String>) {
        self.help = help.into();
        self.events
            .help
            .emit(&self.event(EventKind::Help(self.help.clone())));
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        if self.interactive == interactive {
            return;
        }
        self.interactive = interactive;
        self.events
            .interactive
            .emit(&self.event(EventKind::Interactive(interactive)));
    }

    pub fn set_cursor(&mut self, cursor: impl Into<String>) {
        self.cursor = cursor.into();
        self.events
            .cursor
            .emit(&self.event(EventKind::Cursor(self.cursor.clone())));
    }

    pub fn set_cursor_size(&mut self, size: f64) {
        self.cursor_size = size;
        self.events
            .cursor_size
            .emit(&self.event(EventKind::CursorSize(size)));
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Result<(), LayerError> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(LayerError::invalid_parameter(
                "opacity",
                format!("{} is outside [0, 1]", opacity),
            ));
        }
        self.opacity = opacity;
        Ok(())
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Announce that the layer's data changed and refresh the dims range.
    pub(crate) fn data_changed(&mut self, extent: &[(f64, f64)]) {
        let range = extent
            .iter()
            .enumerate()
            .map(|(i, &(lo, hi))| {
                let s = self.scale.get(i).copied().unwrap_or(1.0);
                let t = self.translate.get(i).copied().unwrap_or(0.0);
                let (a, b) = (lo * s + t, hi * s + t);
                (a.min(b), a.max(b), s.abs())
            })
            .collect();
        self.dims.set_range(range);
        self.events.data.emit(&self.event(EventKind::Data));
    }
}

fn check_len(name: &str, values: &[f64], ndim: usize) -> Result<(), LayerError> {
    if values.len() != ndim {
        return Err(LayerError::LengthMismatch {
            name: name.to_string(),
            expected: ndim,
            found: values.len(),
        });
    }
    Ok(())
}

/// `(0, size)` extent for each axis of an array shape.
pub(crate) fn shape_extent(shape: &[usize]) -> Vec<(f64, f64)> {
    shape.iter().map(|&n| (0.0, n as f64)).collect()
}
