#![forbid(unsafe_code)]

//! Immutable output of one relayout.

use std::cmp::Reverse;
use std::fmt;

use gridflow_core::geometry::{Rect, Size};
use rustc_hash::FxHashMap;

use crate::config::GridFlow;
use crate::model::ItemId;
use crate::placement::{Cell, Placement};

/// Resolved tracks along one axis.
///
/// Offsets already include padding and content distribution. Indices past
/// the last track extrapolate with the last track's size and pitch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisTracks {
    offsets: Vec<f32>,
    sizes: Vec<f32>,
    /// Configured spacing plus any distributed gap.
    gap: f32,
}

impl AxisTracks {
    pub(crate) fn new(offsets: Vec<f32>, sizes: Vec<f32>, gap: f32) -> Self {
        debug_assert_eq!(offsets.len(), sizes.len());
        Self {
            offsets,
            sizes,
            gap,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    #[inline]
    #[must_use]
    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    /// Distance between adjacent tracks.
    #[inline]
    #[must_use]
    pub fn gap(&self) -> f32 {
        self.gap
    }

    /// Start of track `index`.
    #[must_use]
    pub fn offset(&self, index: u32) -> f32 {
        let i = index as usize;
        if let Some(offset) = self.offsets.get(i) {
            return *offset;
        }
        match (self.offsets.last(), self.sizes.last()) {
            (Some(last_offset), Some(last_size)) => {
                let beyond = (i - (self.offsets.len() - 1)) as f32;
                last_offset + beyond * (last_size + self.gap)
            }
            _ => 0.0,
        }
    }

    /// Extent of track `index`.
    #[must_use]
    pub fn size(&self, index: u32) -> f32 {
        self.sizes
            .get(index as usize)
            .or_else(|| self.sizes.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Start and extent of `span` tracks beginning at `index`, interior
    /// gaps included.
    #[must_use]
    pub fn span(&self, index: u32, span: u32) -> (f32, f32) {
        let last = index.saturating_add(span.max(1) - 1);
        let start = self.offset(index);
        let end = self.offset(last) + self.size(last);
        (start, (end - start).max(0.0))
    }

    /// End of the last resolved track (0 with no tracks).
    #[must_use]
    pub fn end(&self) -> f32 {
        match (self.offsets.last(), self.sizes.last()) {
            (Some(offset), Some(size)) => offset + size,
            _ => 0.0,
        }
    }
}

/// Final geometry of one visible item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemLayout {
    pub id: ItemId,
    pub placement: Placement,
    /// The item's rectangle after alignment and clamping.
    pub rect: Rect,
    /// The raw rectangle of the spanned cells.
    pub cell_rect: Rect,
    pub focusable: bool,
}

/// Position facts for assistive technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPosition {
    /// 1-based position in flow order.
    pub index: usize,
    pub count: usize,
    /// 1-based row of the item's origin.
    pub row: u32,
    /// 1-based column of the item's origin.
    pub column: u32,
    pub rows: u32,
    pub columns: u32,
}

impl fmt::Display for ItemPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Item {} of {}, row {} of {}, column {} of {}",
            self.index, self.count, self.row, self.rows, self.column, self.columns
        )
    }
}

/// Output of one relayout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutResult {
    actual_columns: u32,
    actual_rows: u32,
    items: Vec<ItemLayout>,
    grid_size: Size,
    container: Size,
    flow: GridFlow,
    column_tracks: AxisTracks,
    row_tracks: AxisTracks,
    owners: FxHashMap<Cell, ItemId>,
    index: FxHashMap<ItemId, usize>,
}

impl LayoutResult {
    /// No items, no tracks.
    #[must_use]
    pub fn empty(container: Size, flow: GridFlow) -> Self {
        Self {
            container,
            flow,
            ..Self::default()
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        actual_columns: u32,
        actual_rows: u32,
        items: Vec<ItemLayout>,
        grid_size: Size,
        container: Size,
        flow: GridFlow,
        column_tracks: AxisTracks,
        row_tracks: AxisTracks,
        owners: FxHashMap<Cell, ItemId>,
    ) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id, i))
            .collect();
        Self {
            actual_columns,
            actual_rows,
            items,
            grid_size,
            container,
            flow,
            column_tracks,
            row_tracks,
            owners,
            index,
        }
    }

    #[inline]
    #[must_use]
    pub fn actual_columns(&self) -> u32 {
        self.actual_columns
    }

    #[inline]
    #[must_use]
    pub fn actual_rows(&self) -> u32 {
        self.actual_rows
    }

    /// Visible items in model order.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[ItemLayout] {
        &self.items
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Occupied size including padding and distribution offsets.
    #[inline]
    #[must_use]
    pub fn grid_size(&self) -> Size {
        self.grid_size
    }

    #[inline]
    #[must_use]
    pub fn container(&self) -> Size {
        self.container
    }

    #[inline]
    #[must_use]
    pub fn flow(&self) -> GridFlow {
        self.flow
    }

    #[inline]
    #[must_use]
    pub fn column_tracks(&self) -> &AxisTracks {
        &self.column_tracks
    }

    #[inline]
    #[must_use]
    pub fn row_tracks(&self) -> &AxisTracks {
        &self.row_tracks
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&ItemLayout> {
        self.index.get(&id).map(|&i| &self.items[i])
    }

    #[must_use]
    pub fn item_rect(&self, id: ItemId) -> Option<Rect> {
        self.item(id).map(|item| item.rect)
    }

    #[must_use]
    pub fn owner_at(&self, cell: Cell) -> Option<ItemId> {
        self.owners.get(&cell).copied()
    }

    /// Rectangle of the item owning `(row, column)`.
    #[must_use]
    pub fn rect_at(&self, row: u32, column: u32) -> Option<Rect> {
        self.owner_at(Cell::new(row, column))
            .and_then(|id| self.item_rect(id))
    }

    /// Raw rectangle of a single cell (extrapolated past the last track).
    #[must_use]
    pub fn cell_rect(&self, row: u32, column: u32) -> Rect {
        Rect::new(
            self.column_tracks.offset(column),
            self.row_tracks.offset(row),
            self.column_tracks.size(column),
            self.row_tracks.size(row),
        )
    }

    /// Columns covered by any footprint. Can exceed
    /// [`actual_columns`](Self::actual_columns) when explicit items overflow.
    #[must_use]
    pub fn column_extent(&self) -> u32 {
        self.items
            .iter()
            .map(|i| i.placement.column_end())
            .max()
            .unwrap_or(0)
            .max(self.actual_columns)
    }

    /// Rows covered by any footprint, at least [`actual_rows`](Self::actual_rows).
    #[must_use]
    pub fn row_extent(&self) -> u32 {
        self.items
            .iter()
            .map(|i| i.placement.row_end())
            .max()
            .unwrap_or(0)
            .max(self.actual_rows)
    }

    /// Items sorted the way auto-placement visits cells. Ties keep model
    /// order.
    #[must_use]
    pub fn flow_order(&self) -> Vec<&ItemLayout> {
        let mut ordered: Vec<&ItemLayout> = self.items.iter().collect();
        let flow = self.flow;
        ordered.sort_by_key(|item| flow_key(flow, item.placement.origin()));
        ordered
    }

    /// 1-based accessibility position of `id`.
    #[must_use]
    pub fn item_position(&self, id: ItemId) -> Option<ItemPosition> {
        let ordered = self.flow_order();
        let index = ordered.iter().position(|item| item.id == id)?;
        let placement = ordered[index].placement;
        Some(ItemPosition {
            index: index + 1,
            count: ordered.len(),
            row: placement.row + 1,
            column: placement.column + 1,
            rows: self.row_extent(),
            columns: self.column_extent(),
        })
    }
}

/// Sort key matching the auto-placement scan of `flow`.
pub(crate) fn flow_key(flow: GridFlow, cell: Cell) -> (u32, Reverse<u32>, u32) {
    match flow {
        GridFlow::Row => (cell.row, Reverse(0), cell.column),
        GridFlow::RowReverse => (cell.row, Reverse(cell.column), 0),
        GridFlow::Column => (cell.column, Reverse(0), cell.row),
        GridFlow::ColumnReverse => (cell.column, Reverse(cell.row), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks() -> AxisTracks {
        AxisTracks::new(vec![10.0, 60.0], vec![40.0, 40.0], 10.0)
    }

    #[test]
    fn axis_offsets_extrapolate() {
        let t = tracks();
        assert_eq!(t.offset(0), 10.0);
        assert_eq!(t.offset(1), 60.0);
        assert_eq!(t.offset(3), 160.0);
        assert_eq!(t.size(7), 40.0);
        assert_eq!(t.end(), 100.0);
        assert_eq!(AxisTracks::default().offset(3), 0.0);
    }

    #[test]
    fn span_includes_interior_gaps() {
        let t = tracks();
        assert_eq!(t.span(0, 2), (10.0, 90.0));
        assert_eq!(t.span(1, 1), (60.0, 40.0));
        assert_eq!(t.span(1, 2), (60.0, 90.0));
    }

    #[test]
    fn flow_key_orders() {
        let a = Cell::new(0, 1);
        let b = Cell::new(1, 0);
        assert!(flow_key(GridFlow::Row, a) < flow_key(GridFlow::Row, b));
        assert!(flow_key(GridFlow::Column, b) < flow_key(GridFlow::Column, a));
        let c = Cell::new(0, 0);
        assert!(flow_key(GridFlow::RowReverse, a) < flow_key(GridFlow::RowReverse, c));
        assert!(flow_key(GridFlow::ColumnReverse, b) < flow_key(GridFlow::ColumnReverse, c));
    }

    #[test]
    fn position_display() {
        let p = ItemPosition {
            index: 2,
            count: 4,
            row: 1,
            column: 2,
            rows: 2,
            columns: 2,
        };
        assert_eq!(p.to_string(), "Item 2 of 4, row 1 of 2, column 2 of 2");
    }

    #[test]
    fn empty_result() {
        let r = LayoutResult::empty(Size::new(100.0, 100.0), GridFlow::Column);
        assert!(r.is_empty());
        assert_eq!(r.actual_columns(), 0);
        assert_eq!(r.flow(), GridFlow::Column);
        assert_eq!(r.rect_at(0, 0), None);
        assert!(r.flow_order().is_empty());
    }
}
