//! Configuration types for PGM layout and canvas settings.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! external sources such as a TOML file. Missing fields fall back to the
//! defaults documented on each field.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and canvas settings.
//! - [`LayoutConfig`] - Offsets and margins used by the layout engine.
//! - [`CanvasConfig`] - Settings handed to the rendering backend.
//!
//! # Example
//!
//! ```
//! # use pgm_builder::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().vertical_offset(), 1.0);
//! assert_eq!(config.canvas().grid_unit(), 4.0);
//! ```

use serde::Deserialize;

use pgm_builder_core::geometry::{Insets, Point, Size};

/// Top-level configuration combining layout and canvas settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Canvas configuration section.
    #[serde(default)]
    canvas: CanvasConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and canvas configurations.
    ///
    /// # Arguments
    ///
    /// * `layout` - Offsets and margins for the layout engine.
    /// * `canvas` - Settings for the rendering backend.
    pub fn new(layout: LayoutConfig, canvas: CanvasConfig) -> Self {
        Self { layout, canvas }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the canvas configuration.
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }
}

/// Offsets and margins used when placing nodes and plates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Distance between a node and its anchor for `above`/`below` placements. Default `1.0`.
    vertical_offset: f32,

    /// Distance between a node and its anchor for `left_of`/`right_of` placements. Default `0.8`.
    horizontal_offset: f32,

    /// Space between a plate's border and its outermost members.
    /// Default: top `0.75`, right `0.8`, bottom `0.35`, left `0.4`.
    plate_margins: Insets,

    /// Growth applied to a plate that has to surround another one. Default `0.15`.
    surround_margin: f32,

    /// Extra room added to both canvas axes when the diagram has plates. Default `0.3`.
    canvas_plate_padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            vertical_offset: 1.0,
            horizontal_offset: 0.8,
            plate_margins: Insets::new(0.75, 0.8, 0.35, 0.4),
            surround_margin: 0.15,
            canvas_plate_padding: 0.3,
        }
    }
}

impl LayoutConfig {
    /// Returns the vertical distance between a node and its anchor.
    pub fn vertical_offset(&self) -> f32 {
        self.vertical_offset
    }

    /// Returns the horizontal distance between a node and its anchor.
    pub fn horizontal_offset(&self) -> f32 {
        self.horizontal_offset
    }

    /// Returns the margins between a plate and its members.
    pub fn plate_margins(&self) -> Insets {
        self.plate_margins
    }

    /// Returns the growth applied when one plate surrounds another.
    pub fn surround_margin(&self) -> f32 {
        self.surround_margin
    }

    /// Returns the canvas padding added when plates are present.
    pub fn canvas_plate_padding(&self) -> f32 {
        self.canvas_plate_padding
    }

    /// Sets the vertical offset.
    pub fn with_vertical_offset(mut self, offset: f32) -> Self {
        self.vertical_offset = offset;
        self
    }

    /// Sets the horizontal offset.
    pub fn with_horizontal_offset(mut self, offset: f32) -> Self {
        self.horizontal_offset = offset;
        self
    }

    /// Sets the plate margins.
    pub fn with_plate_margins(mut self, margins: Insets) -> Self {
        self.plate_margins = margins;
        self
    }
}

/// Settings handed to the rendering backend when the canvas is created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// Canvas origin in grid units. Default `[0, 0]`.
    origin: [f32; 2],

    /// Size of one grid unit in centimetres. Default `4.0`.
    grid_unit: f32,

    /// Font size for node labels. Default `18`.
    label_font_size: u32,

    /// How observed nodes are drawn. Default `"shaded"`.
    observed_style: String,

    /// Node scale used when a node does not set one. Default `2.0`.
    node_scale: f32,

    /// Explicit canvas shape. When unset the shape is computed from the layout.
    shape: Option<[f32; 2]>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0],
            grid_unit: 4.0,
            label_font_size: 18,
            observed_style: "shaded".to_string(),
            node_scale: 2.0,
            shape: None,
        }
    }
}

impl CanvasConfig {
    /// Returns the canvas origin.
    pub fn origin(&self) -> Point {
        Point::from(self.origin)
    }

    /// Returns the size of one grid unit.
    pub fn grid_unit(&self) -> f32 {
        self.grid_unit
    }

    /// Returns the label font size.
    pub fn label_font_size(&self) -> u32 {
        self.label_font_size
    }

    /// Returns the style name for observed nodes.
    pub fn observed_style(&self) -> &str {
        &self.observed_style
    }

    /// Returns the default node scale.
    pub fn node_scale(&self) -> f32 {
        self.node_scale
    }

    /// Returns the explicit canvas shape, if one is configured.
    pub fn shape(&self) -> Option<Size> {
        self.shape.map(Size::from)
    }

    /// Sets an explicit canvas shape, disabling automatic sizing.
    pub fn with_shape(mut self, shape: Size) -> Self {
        self.shape = Some([shape.width(), shape.height()]);
        self
    }

    /// Sets the style name for observed nodes.
    pub fn with_observed_style(mut self, style: impl Into<String>) -> Self {
        self.observed_style = style.into();
        self
    }
}
