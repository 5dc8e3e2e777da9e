#![forbid(unsafe_code)]

//! Effective column and row counts.
//!
//! Counts are resolved twice: provisionally before placement (to bound the
//! auto-placement scan) and finally from the placements themselves.

use crate::config::GridConfiguration;
use crate::placement::PlacementMap;
use crate::responsive::columns_that_fit;

/// A column × row pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackCounts {
    pub columns: u32,
    pub rows: u32,
}

impl TrackCounts {
    #[inline]
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.columns == 0 || self.rows == 0
    }

    /// `columns * rows`.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }
}

fn isqrt(n: u32) -> u32 {
    // Float estimate corrected in both directions.
    let mut r = f64::from(n).sqrt() as u32;
    while u64::from(r) * u64::from(r) > u64::from(n) {
        r -= 1;
    }
    while u64::from(r + 1) * u64::from(r + 1) <= u64::from(n) {
        r += 1;
    }
    r
}

/// Track counts used to bound the placement scan.
///
/// `item_count == 0` yields `0 × 0`.
#[must_use]
pub fn provisional(
    config: &GridConfiguration,
    item_count: usize,
    available_width: f32,
    column_spacing: f32,
) -> TrackCounts {
    if item_count == 0 {
        return TrackCounts::default();
    }
    let n = u32::try_from(item_count).unwrap_or(u32::MAX);

    let columns = match config.column_count() {
        Some(fixed) => fixed,
        None => {
            let mut columns = isqrt(n).max(1);
            if config.auto_sizes_columns() {
                columns = columns.min(columns_that_fit(
                    available_width,
                    column_spacing,
                    config.item_min_width(),
                ));
            }
            columns
        }
    };
    let rows = match config.row_count() {
        Some(fixed) => fixed,
        None => n.div_ceil(columns.max(1)).max(1),
    };
    TrackCounts::new(columns, rows)
}

/// Column count demanded by responsive mode, if engaged.
///
/// Never wider than a fixed column count.
#[must_use]
pub fn responsive_columns(
    config: &GridConfiguration,
    available_width: f32,
    column_spacing: f32,
) -> Option<u32> {
    let mode = config.responsive_column_mode()?;
    if !mode.is_engaged(config.breakpoint_table(), available_width) {
        return None;
    }
    let fit = columns_that_fit(available_width, column_spacing, mode.min_item_width);
    Some(match config.column_count() {
        Some(fixed) => fit.min(fixed.max(1)),
        None => fit,
    })
}

/// Recompute rows for a new column count (responsive re-pass).
#[must_use]
pub fn with_columns(config: &GridConfiguration, item_count: usize, columns: u32) -> TrackCounts {
    let n = u32::try_from(item_count).unwrap_or(u32::MAX);
    let rows = match config.row_count() {
        Some(fixed) => fixed,
        None if n == 0 => 0,
        None => n.div_ceil(columns.max(1)).max(1),
    };
    TrackCounts::new(columns, rows)
}

/// Final counts after placement.
///
/// Fixed counts stay as configured; auto counts with auto-sizing cover
/// every footprint; auto counts without auto-sizing keep the provisional
/// value. An engaged responsive column count replaces the column rule.
#[must_use]
pub fn resolve(
    config: &GridConfiguration,
    provisional: TrackCounts,
    placements: &PlacementMap,
    responsive_columns: Option<u32>,
) -> TrackCounts {
    if placements.placements.is_empty() {
        return TrackCounts::default();
    }
    let columns = match (responsive_columns, config.column_count()) {
        (Some(responsive), _) => responsive,
        (None, Some(fixed)) => fixed,
        (None, None) if config.auto_sizes_columns() => placements.column_extent(),
        (None, None) => provisional.columns,
    };
    let rows = match config.row_count() {
        Some(fixed) => fixed,
        None if config.auto_sizes_rows() => placements.row_extent(),
        None => provisional.rows,
    };
    TrackCounts::new(columns, rows)
}
