#![forbid(unsafe_code)]

//! Pixel geometry for placed items.
//!
//! # Tracks
//!
//! Uniform tracks split the padded content box evenly:
//!
//! ```text
//! cell   = (available - (n - 1) * spacing) / n      clamped to [0, max_cell]
//! offset = padding + i * (cell + spacing)
//! ```
//!
//! Hinted tracks (axis not auto-sized, hints present) share the same space
//! in proportion to the hints. Sizes are floored and the last track takes
//! the remainder, so the tracks and gaps add up to `available` exactly.
//!
//! # Content distribution
//!
//! When the tracks leave free space, `justify_content` (horizontal) and
//! `align_content` (vertical) shift the whole block or spread it:
//!
//! | Alignment      | Edge offset  | Extra gap     | Track growth |
//! |----------------|--------------|---------------|--------------|
//! | `Start`        | 0            | 0             | 0            |
//! | `Center`       | free / 2     | 0             | 0            |
//! | `End`          | free         | 0             | 0            |
//! | `Stretch`      | 0            | 0             | free / n     |
//! | `SpaceBetween` | 0            | free / (n-1)  | 0            |
//! | `SpaceAround`  | gap / 2      | free / n      | 0            |
//! | `SpaceEvenly`  | gap          | free / (n+1)  | 0            |

use gridflow_core::geometry::{Rect, Size, non_negative};
use rustc_hash::FxHashMap;

use crate::config::{AlignSelf, ContentAlignment, GridConfiguration, ItemAlignment};
use crate::dimension::TrackCounts;
use crate::model::ItemId;
use crate::placement::{Cell, Placement};
use crate::result::{AxisTracks, ItemLayout, LayoutResult};

/// Free space below this is treated as none.
const FREE_SPACE_EPSILON: f32 = 1e-3;

/// Spacing actually used for a relayout (configured or token-derived).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    pub row: f32,
    pub column: f32,
}

impl Spacing {
    #[must_use]
    pub fn of(config: &GridConfiguration) -> Self {
        Self {
            row: config.row_gap(),
            column: config.column_gap(),
        }
    }

    #[must_use]
    pub fn uniform(value: f32) -> Self {
        let value = non_negative(value);
        Self {
            row: value,
            column: value,
        }
    }
}

/// Per-item geometry input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemGeometry {
    pub id: ItemId,
    pub placement: Placement,
    pub natural: Size,
    pub min: Size,
    pub max: Option<Size>,
    pub align_self: AlignSelf,
    pub focusable: bool,
}

/// Offset, extra gap and per-track growth for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Distribution {
    pub offset: f32,
    pub gap: f32,
    pub grow: f32,
}

/// Spread `free` pixels over `count` tracks.
#[must_use]
pub fn distribute(alignment: ContentAlignment, free: f32, count: usize) -> Distribution {
    if count == 0 || !(free > FREE_SPACE_EPSILON) {
        return Distribution::default();
    }
    let n = count as f32;
    match alignment {
        ContentAlignment::Start => Distribution::default(),
        ContentAlignment::Center => Distribution {
            offset: free / 2.0,
            ..Distribution::default()
        },
        ContentAlignment::End => Distribution {
            offset: free,
            ..Distribution::default()
        },
        ContentAlignment::Stretch => Distribution {
            grow: free / n,
            ..Distribution::default()
        },
        ContentAlignment::SpaceBetween if count == 1 => Distribution::default(),
        ContentAlignment::SpaceBetween => Distribution {
            gap: free / (n - 1.0),
            ..Distribution::default()
        },
        ContentAlignment::SpaceAround => {
            let gap = free / n;
            Distribution {
                offset: gap / 2.0,
                gap,
                grow: 0.0,
            }
        }
        ContentAlignment::SpaceEvenly => {
            let gap = free / (n + 1.0);
            Distribution {
                offset: gap,
                gap,
                grow: 0.0,
            }
        }
    }
}

/// Track sizes before distribution, plus whether they are uniform.
fn base_sizes(count: u32, available: f32, spacing: f32, cap: Option<f32>, hints: &[f32]) -> (Vec<f32>, bool) {
    let n = count as usize;
    if n == 0 {
        return (Vec::new(), true);
    }
    let space = non_negative(available - spacing * (n - 1) as f32);

    if !hints.is_empty() {
        let mean = hints.iter().sum::<f32>() / hints.len() as f32;
        let weights: Vec<f32> = (0..n)
            .map(|i| non_negative(hints.get(i).copied().unwrap_or(mean)))
            .collect();
        let total: f32 = weights.iter().sum();
        if total > 0.0 {
            let mut sizes: Vec<f32> = weights
                .iter()
                .map(|w| (space * w / total).floor())
                .collect();
            let assigned: f32 = sizes[..n - 1].iter().sum();
            sizes[n - 1] = non_negative(space - assigned);
            return (sizes, false);
        }
    }

    let mut cell = space / n as f32;
    if let Some(cap) = cap {
        cell = cell.min(cap);
    }
    (vec![non_negative(cell); n], true)
}

/// Resolve one axis: base sizes, distribution, and absolute offsets.
pub(crate) fn resolve_axis(
    count: u32,
    available: f32,
    spacing: f32,
    cap: Option<f32>,
    hints: &[f32],
    alignment: ContentAlignment,
    padding_start: f32,
) -> AxisTracks {
    let (mut sizes, uniform) = base_sizes(count, available, spacing, cap, hints);
    let n = sizes.len();
    if n == 0 {
        return AxisTracks::default();
    }
    let used = sizes.iter().sum::<f32>() + spacing * (n - 1) as f32;
    let dist = distribute(alignment, available - used, n);
    for size in &mut sizes {
        *size += dist.grow;
    }
    let pitch = spacing + dist.gap;
    let start = padding_start + dist.offset;

    let offsets = if uniform {
        let cell = sizes[0];
        (0..n).map(|i| start + i as f32 * (cell + pitch)).collect()
    } else {
        let mut offsets = Vec::with_capacity(n);
        let mut cursor = start;
        for size in &sizes {
            offsets.push(cursor);
            cursor += size + pitch;
        }
        offsets
    };
    AxisTracks::new(offsets, sizes, pitch)
}

/// Place an item's extent along one axis inside its cell span.
///
/// `Stretch` fills the cell within `[min, max]`. Other alignments use the
/// natural size bounded by the cell and `max`; `min` wins over both.
#[must_use]
pub fn align_in_cell(
    alignment: ItemAlignment,
    cell_start: f32,
    cell_extent: f32,
    natural: f32,
    min: f32,
    max: Option<f32>,
) -> (f32, f32) {
    let bounded = |mut extent: f32| {
        if let Some(max) = max {
            extent = extent.min(max);
        }
        extent.max(min)
    };
    match alignment {
        ItemAlignment::Stretch => (cell_start, bounded(cell_extent)),
        other => {
            let extent = bounded(natural.min(cell_extent));
            let start = match other {
                ItemAlignment::Center => cell_start + (cell_extent - extent) / 2.0,
                ItemAlignment::End => cell_start + cell_extent - extent,
                _ => cell_start,
            };
            (start, extent)
        }
    }
}

/// Compute every item rectangle for a resolved grid.
#[must_use]
pub fn compute(
    config: &GridConfiguration,
    container: Size,
    spacing: Spacing,
    tracks: TrackCounts,
    items: &[ItemGeometry],
    owners: FxHashMap<Cell, ItemId>,
) -> LayoutResult {
    let flow = config.grid_flow();
    if container.is_empty() || items.is_empty() || tracks.is_empty() {
        return LayoutResult::empty(container, flow);
    }

    let padding = config.insets();
    let content = Rect::from_size(container).inset(padding);
    let cap = config.cell_size_limit();

    let column_hints = if config.auto_sizes_columns() {
        &[][..]
    } else {
        config.column_size_hints()
    };
    let row_hints = if config.auto_sizes_rows() {
        &[][..]
    } else {
        config.row_size_hints()
    };

    let columns = resolve_axis(
        tracks.columns,
        content.width,
        spacing.column,
        cap.map(|c| c.width),
        column_hints,
        config.content_justification(),
        padding.left,
    );
    let rows = resolve_axis(
        tracks.rows,
        content.height,
        spacing.row,
        cap.map(|c| c.height),
        row_hints,
        config.content_alignment(),
        padding.top,
    );

    let layouts = items
        .iter()
        .map(|item| {
            let p = item.placement;
            let (cx, cw) = columns.span(p.column, p.column_span);
            let (cy, ch) = rows.span(p.row, p.row_span);
            let horizontal = item.align_self.resolve(config.item_justification());
            let vertical = item.align_self.resolve(config.item_alignment());
            let (x, w) = align_in_cell(
                horizontal,
                cx,
                cw,
                item.natural.width,
                item.min.width,
                item.max.map(|m| m.width),
            );
            let (y, h) = align_in_cell(
                vertical,
                cy,
                ch,
                item.natural.height,
                item.min.height,
                item.max.map(|m| m.height),
            );
            ItemLayout {
                id: item.id,
                placement: p,
                rect: Rect::new(x, y, w, h),
                cell_rect: Rect::new(cx, cy, cw, ch),
                focusable: item.focusable,
            }
        })
        .collect();

    let grid_size = Size::new(
        columns.end() + padding.right,
        rows.end() + padding.bottom,
    );

    LayoutResult::new(
        tracks.columns,
        tracks.rows,
        layouts,
        grid_size,
        container,
        flow,
        columns,
        rows,
        owners,
    )
}
