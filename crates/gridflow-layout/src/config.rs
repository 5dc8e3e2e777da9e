#![forbid(unsafe_code)]

//! Grid-level configuration.
//!
//! [`GridConfiguration`] is assembled with chained builders. Every builder
//! clamps its input, so an invalid value (negative spacing, negative track
//! count, NaN) never reaches the layout passes. Values that arrive through
//! `serde` are clamped by [`GridConfiguration::normalized`] at the engine
//! boundary.
//!
//! # Environment
//!
//! [`GridConfiguration::from_env`] reads `GRIDFLOW_*` variables on top of the
//! defaults. Unparseable values keep the default and are reported in
//! [`ConfigParse::errors`].

use std::env;
use std::fmt;

use gridflow_core::geometry::{Sides, Size, non_negative};
use serde::{Deserialize, Serialize};

use crate::responsive::{Breakpoints, ResponsiveColumns};
use crate::tokens::{self, SpacingTokens};

pub const ENV_COLUMNS: &str = "GRIDFLOW_COLUMNS";
pub const ENV_ROWS: &str = "GRIDFLOW_ROWS";
pub const ENV_FLOW: &str = "GRIDFLOW_FLOW";
pub const ENV_SPACING: &str = "GRIDFLOW_SPACING";
pub const ENV_ROW_SPACING: &str = "GRIDFLOW_ROW_SPACING";
pub const ENV_COLUMN_SPACING: &str = "GRIDFLOW_COLUMN_SPACING";
pub const ENV_PADDING: &str = "GRIDFLOW_PADDING";
pub const ENV_ALIGN_ITEMS: &str = "GRIDFLOW_ALIGN_ITEMS";
pub const ENV_JUSTIFY_ITEMS: &str = "GRIDFLOW_JUSTIFY_ITEMS";
pub const ENV_ALIGN_CONTENT: &str = "GRIDFLOW_ALIGN_CONTENT";
pub const ENV_JUSTIFY_CONTENT: &str = "GRIDFLOW_JUSTIFY_CONTENT";
pub const ENV_ANIMATED: &str = "GRIDFLOW_ANIMATED";
pub const ENV_WRAP_NAV: &str = "GRIDFLOW_WRAP_NAV";

/// Auto-placement traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GridFlow {
    /// Fill a row left to right, then wrap to the next row.
    #[default]
    Row,
    /// Fill a column top to bottom, then wrap to the next column.
    Column,
    /// Fill a row right to left.
    RowReverse,
    /// Fill a column bottom to top.
    ColumnReverse,
}

impl GridFlow {
    /// Strict parse; unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_name(value).as_str() {
            "row" => Some(Self::Row),
            "column" | "col" => Some(Self::Column),
            "rowreverse" => Some(Self::RowReverse),
            "columnreverse" | "colreverse" => Some(Self::ColumnReverse),
            _ => None,
        }
    }

    /// Lenient parse; unknown names become [`GridFlow::Row`].
    #[must_use]
    pub fn from_name(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// True for flows whose primary axis runs along a row (across columns).
    #[inline]
    #[must_use]
    pub const fn is_row_major(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// True for flows that scan the primary axis from the far edge.
    #[inline]
    #[must_use]
    pub const fn is_reversed(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

/// Per-item alignment inside its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemAlignment {
    Start,
    Center,
    End,
    #[default]
    Stretch,
}

impl ItemAlignment {
    /// Strict parse; unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_name(value).as_str() {
            "start" => Some(Self::Start),
            "center" | "centre" => Some(Self::Center),
            "end" => Some(Self::End),
            "stretch" => Some(Self::Stretch),
            _ => None,
        }
    }

    /// Lenient parse; unknown names become [`ItemAlignment::Start`].
    #[must_use]
    pub fn from_name(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::Start)
    }
}

/// Item-level override of the grid's item alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlignSelf {
    /// Defer to the grid's `align_items` / `justify_items`.
    #[default]
    Auto,
    Start,
    Center,
    End,
    Stretch,
}

impl AlignSelf {
    /// The explicit alignment, if any.
    #[must_use]
    pub const fn explicit(self) -> Option<ItemAlignment> {
        match self {
            Self::Auto => None,
            Self::Start => Some(ItemAlignment::Start),
            Self::Center => Some(ItemAlignment::Center),
            Self::End => Some(ItemAlignment::End),
            Self::Stretch => Some(ItemAlignment::Stretch),
        }
    }

    /// Resolve against the grid-level default for one axis.
    #[must_use]
    pub const fn resolve(self, grid_default: ItemAlignment) -> ItemAlignment {
        match self.explicit() {
            Some(a) => a,
            None => grid_default,
        }
    }
}

/// Distribution of the whole track block when it is smaller than the
/// available space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContentAlignment {
    #[default]
    Start,
    Center,
    End,
    Stretch,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

impl ContentAlignment {
    /// Strict parse; unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_name(value).as_str() {
            "start" => Some(Self::Start),
            "center" | "centre" => Some(Self::Center),
            "end" => Some(Self::End),
            "stretch" => Some(Self::Stretch),
            "spacebetween" => Some(Self::SpaceBetween),
            "spacearound" => Some(Self::SpaceAround),
            "spaceevenly" => Some(Self::SpaceEvenly),
            _ => None,
        }
    }

    /// Lenient parse; unknown names become [`ContentAlignment::Start`].
    #[must_use]
    pub fn from_name(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

fn normalize_name(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Convert the integer "non-positive means auto" convention.
#[inline]
fn track_count(value: i32) -> Option<u32> {
    u32::try_from(value).ok().filter(|&count| count > 0)
}

/// Grid-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfiguration {
    columns: Option<u32>,
    rows: Option<u32>,
    flow: GridFlow,
    align_items: ItemAlignment,
    justify_items: ItemAlignment,
    align_content: ContentAlignment,
    justify_content: ContentAlignment,
    row_spacing: f32,
    column_spacing: f32,
    padding: Sides,
    auto_columns: bool,
    auto_rows: bool,
    animated: bool,
    min_item_width: f32,
    max_cell_size: Option<Size>,
    column_hints: Vec<f32>,
    row_hints: Vec<f32>,
    breakpoints: Breakpoints,
    responsive_columns: Option<ResponsiveColumns>,
    responsive_spacing: bool,
    wrap_navigation: bool,
}

impl Default for GridConfiguration {
    fn default() -> Self {
        Self {
            columns: None,
            rows: None,
            flow: GridFlow::Row,
            align_items: ItemAlignment::Stretch,
            justify_items: ItemAlignment::Stretch,
            align_content: ContentAlignment::Start,
            justify_content: ContentAlignment::Start,
            row_spacing: 8.0,
            column_spacing: 8.0,
            padding: Sides::ZERO,
            auto_columns: true,
            auto_rows: true,
            animated: true,
            min_item_width: 100.0,
            max_cell_size: None,
            column_hints: Vec::new(),
            row_hints: Vec::new(),
            breakpoints: Breakpoints::DEFAULT,
            responsive_columns: None,
            responsive_spacing: false,
            wrap_navigation: false,
        }
    }
}

impl GridConfiguration {
    /// Default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with spacing and padding taken from the
    /// design tokens (`size160`), snapped to the 4px grid.
    #[must_use]
    pub fn from_tokens(tokens: &dyn SpacingTokens) -> Self {
        let value = tokens::snap_to_base_unit(tokens::resolve(tokens, tokens::DEFAULT_TOKEN));
        Self::default().spacing(value).padding(Sides::all(value))
    }

    // --- builders -------------------------------------------------------

    /// Column count; zero or negative means auto.
    #[must_use]
    pub fn columns(mut self, columns: i32) -> Self {
        self.columns = track_count(columns);
        self
    }

    /// Row count; zero or negative means auto.
    #[must_use]
    pub fn rows(mut self, rows: i32) -> Self {
        self.rows = track_count(rows);
        self
    }

    #[must_use]
    pub fn flow(mut self, flow: GridFlow) -> Self {
        self.flow = flow;
        self
    }

    #[must_use]
    pub fn align_items(mut self, alignment: ItemAlignment) -> Self {
        self.align_items = alignment;
        self
    }

    #[must_use]
    pub fn justify_items(mut self, alignment: ItemAlignment) -> Self {
        self.justify_items = alignment;
        self
    }

    #[must_use]
    pub fn align_content(mut self, alignment: ContentAlignment) -> Self {
        self.align_content = alignment;
        self
    }

    #[must_use]
    pub fn justify_content(mut self, alignment: ContentAlignment) -> Self {
        self.justify_content = alignment;
        self
    }

    /// Gap between rows (clamped to `>= 0`).
    #[must_use]
    pub fn row_spacing(mut self, spacing: f32) -> Self {
        self.row_spacing = non_negative(spacing);
        self
    }

    /// Gap between columns (clamped to `>= 0`).
    #[must_use]
    pub fn column_spacing(mut self, spacing: f32) -> Self {
        self.column_spacing = non_negative(spacing);
        self
    }

    /// Uniform gap for both axes.
    #[must_use]
    pub fn spacing(self, spacing: f32) -> Self {
        self.row_spacing(spacing).column_spacing(spacing)
    }

    /// Inset around the whole grid (each side clamped to `>= 0`).
    #[must_use]
    pub fn padding(mut self, padding: Sides) -> Self {
        self.padding = padding.clamped();
        self
    }

    #[must_use]
    pub fn auto_columns(mut self, enabled: bool) -> Self {
        self.auto_columns = enabled;
        self
    }

    #[must_use]
    pub fn auto_rows(mut self, enabled: bool) -> Self {
        self.auto_rows = enabled;
        self
    }

    #[must_use]
    pub fn animated(mut self, enabled: bool) -> Self {
        self.animated = enabled;
        self
    }

    /// Narrowest column auto-sizing will produce.
    #[must_use]
    pub fn min_item_width(mut self, width: f32) -> Self {
        self.min_item_width = non_negative(width);
        self
    }

    /// Upper bound on a single cell's extent. Leftover space is handed to
    /// content distribution.
    #[must_use]
    pub fn max_cell_size(mut self, size: Option<Size>) -> Self {
        self.max_cell_size = size.map(|s| Size::clamped(s.width, s.height));
        self
    }

    /// Content-based column widths, used when `auto_columns` is off.
    #[must_use]
    pub fn column_hints(mut self, hints: impl IntoIterator<Item = f32>) -> Self {
        self.column_hints = hints.into_iter().map(non_negative).collect();
        self
    }

    /// Content-based row heights, used when `auto_rows` is off.
    #[must_use]
    pub fn row_hints(mut self, hints: impl IntoIterator<Item = f32>) -> Self {
        self.row_hints = hints.into_iter().map(non_negative).collect();
        self
    }

    #[must_use]
    pub fn breakpoints(mut self, breakpoints: Breakpoints) -> Self {
        self.breakpoints = Breakpoints::new(
            breakpoints.sm,
            breakpoints.md,
            breakpoints.lg,
            breakpoints.xl,
        );
        self
    }

    #[must_use]
    pub fn responsive_columns(mut self, mode: Option<ResponsiveColumns>) -> Self {
        self.responsive_columns =
            mode.map(|m| ResponsiveColumns::new(m.engage_below, m.min_item_width));
        self
    }

    /// Take spacing from the token source according to the breakpoint.
    #[must_use]
    pub fn responsive_spacing(mut self, enabled: bool) -> Self {
        self.responsive_spacing = enabled;
        self
    }

    /// Let directional navigation wrap at grid edges.
    #[must_use]
    pub fn wrap_navigation(mut self, enabled: bool) -> Self {
        self.wrap_navigation = enabled;
        self
    }

    /// Re-apply every clamp. Used for values that bypassed the builders
    /// (deserialization).
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.columns = self.columns.filter(|&count| count > 0);
        self.rows = self.rows.filter(|&count| count > 0);
        let spacing = (self.row_spacing, self.column_spacing);
        let padding = self.padding;
        let min_item_width = self.min_item_width;
        let max_cell = self.max_cell_size;
        let column_hints = self.column_hints.clone();
        let row_hints = self.row_hints.clone();
        let breakpoints = self.breakpoints;
        let responsive = self.responsive_columns;
        self.row_spacing(spacing.0)
            .column_spacing(spacing.1)
            .padding(padding)
            .min_item_width(min_item_width)
            .max_cell_size(max_cell)
            .column_hints(column_hints)
            .row_hints(row_hints)
            .breakpoints(breakpoints)
            .responsive_columns(responsive)
    }

    // --- accessors ------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn column_count(&self) -> Option<u32> {
        self.columns
    }

    #[inline]
    #[must_use]
    pub fn row_count(&self) -> Option<u32> {
        self.rows
    }

    #[inline]
    #[must_use]
    pub fn grid_flow(&self) -> GridFlow {
        self.flow
    }

    #[inline]
    #[must_use]
    pub fn item_alignment(&self) -> ItemAlignment {
        self.align_items
    }

    #[inline]
    #[must_use]
    pub fn item_justification(&self) -> ItemAlignment {
        self.justify_items
    }

    #[inline]
    #[must_use]
    pub fn content_alignment(&self) -> ContentAlignment {
        self.align_content
    }

    #[inline]
    #[must_use]
    pub fn content_justification(&self) -> ContentAlignment {
        self.justify_content
    }

    #[inline]
    #[must_use]
    pub fn row_gap(&self) -> f32 {
        self.row_spacing
    }

    #[inline]
    #[must_use]
    pub fn column_gap(&self) -> f32 {
        self.column_spacing
    }

    #[inline]
    #[must_use]
    pub fn insets(&self) -> Sides {
        self.padding
    }

    #[inline]
    #[must_use]
    pub fn auto_sizes_columns(&self) -> bool {
        self.auto_columns
    }

    #[inline]
    #[must_use]
    pub fn auto_sizes_rows(&self) -> bool {
        self.auto_rows
    }

    #[inline]
    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    #[inline]
    #[must_use]
    pub fn item_min_width(&self) -> f32 {
        self.min_item_width
    }

    #[inline]
    #[must_use]
    pub fn cell_size_limit(&self) -> Option<Size> {
        self.max_cell_size
    }

    #[inline]
    #[must_use]
    pub fn column_size_hints(&self) -> &[f32] {
        &self.column_hints
    }

    #[inline]
    #[must_use]
    pub fn row_size_hints(&self) -> &[f32] {
        &self.row_hints
    }

    #[inline]
    #[must_use]
    pub fn breakpoint_table(&self) -> &Breakpoints {
        &self.breakpoints
    }

    #[inline]
    #[must_use]
    pub fn responsive_column_mode(&self) -> Option<ResponsiveColumns> {
        self.responsive_columns
    }

    #[inline]
    #[must_use]
    pub fn uses_responsive_spacing(&self) -> bool {
        self.responsive_spacing
    }

    #[inline]
    #[must_use]
    pub fn wraps_navigation(&self) -> bool {
        self.wrap_navigation
    }

    // --- environment ----------------------------------------------------

    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> ConfigParse {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Parse config using a custom lookup (used by tests and embedders).
    pub fn from_env_with<F>(get: F) -> ConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        from_env_with(get)
    }

    /// Report authoring mistakes. Layout behaviour is unaffected: every
    /// reported value is already clamped to something usable.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("row_spacing", self.row_spacing),
            ("column_spacing", self.column_spacing),
            ("padding.top", self.padding.top),
            ("padding.right", self.padding.right),
            ("padding.bottom", self.padding.bottom),
            ("padding.left", self.padding.left),
        ] {
            if !tokens::is_on_base_unit(value) {
                errors.push(ConfigError::new(
                    field,
                    value.to_string(),
                    "not a multiple of the 4px base unit",
                ));
            }
        }
        if !self.auto_columns && self.columns.is_none() && !self.column_hints.is_empty() {
            let n = self.column_hints.len();
            if self.column_hints.iter().all(|h| *h == 0.0) {
                errors.push(ConfigError::new(
                    "column_hints",
                    format!("{n} zero hints"),
                    "all hints are zero; columns fall back to equal widths",
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct ConfigParse {
    pub config: GridConfiguration,
    pub errors: Vec<ConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_track_count(value: &str) -> Option<Option<u32>> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("auto") {
        return Some(None);
    }
    trimmed.parse::<i32>().ok().map(track_count)
}

fn parse_length(value: &str) -> Option<f32> {
    value
        .trim()
        .trim_end_matches("px")
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}

fn from_env_with<F>(mut get: F) -> ConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = GridConfiguration::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_COLUMNS) {
        match parse_track_count(&value) {
            Some(parsed) => config.columns = parsed,
            None => errors.push(ConfigError::new(
                "columns",
                value,
                "expected integer or auto",
            )),
        }
    }

    if let Some(value) = get(ENV_ROWS) {
        match parse_track_count(&value) {
            Some(parsed) => config.rows = parsed,
            None => errors.push(ConfigError::new("rows", value, "expected integer or auto")),
        }
    }

    if let Some(value) = get(ENV_FLOW) {
        match GridFlow::parse(&value) {
            Some(parsed) => config.flow = parsed,
            None => errors.push(ConfigError::new(
                "flow",
                value,
                "expected row|column|row-reverse|column-reverse",
            )),
        }
    }

    if let Some(value) = get(ENV_SPACING) {
        match parse_length(&value) {
            Some(parsed) => config = config.spacing(parsed),
            None => errors.push(ConfigError::new("spacing", value, "expected length")),
        }
    }

    if let Some(value) = get(ENV_ROW_SPACING) {
        match parse_length(&value) {
            Some(parsed) => config = config.row_spacing(parsed),
            None => errors.push(ConfigError::new("row_spacing", value, "expected length")),
        }
    }

    if let Some(value) = get(ENV_COLUMN_SPACING) {
        match parse_length(&value) {
            Some(parsed) => config = config.column_spacing(parsed),
            None => errors.push(ConfigError::new(
                "column_spacing",
                value,
                "expected length",
            )),
        }
    }

    if let Some(value) = get(ENV_PADDING) {
        match parse_length(&value) {
            Some(parsed) => config = config.padding(Sides::all(parsed)),
            None => errors.push(ConfigError::new("padding", value, "expected length")),
        }
    }

    for (key, field) in [
        (ENV_ALIGN_ITEMS, "align_items"),
        (ENV_JUSTIFY_ITEMS, "justify_items"),
    ] {
        if let Some(value) = get(key) {
            match ItemAlignment::parse(&value) {
                Some(parsed) if field == "align_items" => config.align_items = parsed,
                Some(parsed) => config.justify_items = parsed,
                None => errors.push(ConfigError::new(
                    field,
                    value,
                    "expected start|center|end|stretch",
                )),
            }
        }
    }

    for (key, field) in [
        (ENV_ALIGN_CONTENT, "align_content"),
        (ENV_JUSTIFY_CONTENT, "justify_content"),
    ] {
        if let Some(value) = get(key) {
            match ContentAlignment::parse(&value) {
                Some(parsed) if field == "align_content" => config.align_content = parsed,
                Some(parsed) => config.justify_content = parsed,
                None => errors.push(ConfigError::new(
                    field,
                    value,
                    "expected start|center|end|stretch|space-between|space-around|space-evenly",
                )),
            }
        }
    }

    if let Some(value) = get(ENV_ANIMATED) {
        match parse_bool(&value) {
            Some(parsed) => config.animated = parsed,
            None => errors.push(ConfigError::new(
                "animated",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    if let Some(value) = get(ENV_WRAP_NAV) {
        match parse_bool(&value) {
            Some(parsed) => config.wrap_navigation = parsed,
            None => errors.push(ConfigError::new(
                "wrap_navigation",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    ConfigParse { config, errors }
}
