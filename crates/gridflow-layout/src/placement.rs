#![forbid(unsafe_code)]

//! Cell assignment.
//!
//! Explicitly positioned items claim their full footprint first. Auto items
//! then take the first origin, scanning from `(0, 0)` along the flow's
//! primary axis, whose whole footprint is unclaimed. The primary axis is
//! bounded by the column count (row flows) or row count (column flows); the
//! cross axis grows without bound.
//!
//! Overlapping explicit claims are accepted: the cell's owner is the last
//! claimant and neither item moves.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::GridFlow;
use crate::model::ItemId;

/// Largest row or column span an item may request.
pub const MAX_SPAN: u32 = 256;

/// A (row, column) grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub column: u32,
}

impl Cell {
    #[inline]
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Origin and span footprint of a placed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub row: u32,
    pub column: u32,
    pub row_span: u32,
    pub column_span: u32,
}

impl Placement {
    #[must_use]
    pub fn new(row: u32, column: u32, row_span: u32, column_span: u32) -> Self {
        Self {
            row,
            column,
            row_span: row_span.clamp(1, MAX_SPAN),
            column_span: column_span.clamp(1, MAX_SPAN),
        }
    }

    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Cell {
        Cell::new(self.row, self.column)
    }

    /// One past the last row covered.
    #[inline]
    #[must_use]
    pub fn row_end(&self) -> u32 {
        self.row.saturating_add(self.row_span)
    }

    /// One past the last column covered.
    #[inline]
    #[must_use]
    pub fn column_end(&self) -> u32 {
        self.column.saturating_add(self.column_span)
    }

    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        (self.row..self.row_end()).contains(&cell.row)
            && (self.column..self.column_end()).contains(&cell.column)
    }

    /// Every cell of the footprint, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.row..self.row_end())
            .flat_map(move |row| (self.column..self.column_end()).map(move |col| Cell::new(row, col)))
    }

    /// True if the footprints share at least one cell.
    #[must_use]
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.row < other.row_end()
            && other.row < self.row_end()
            && self.column < other.column_end()
            && other.column < self.column_end()
    }
}

/// Placement input for one visible item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRequest {
    pub id: ItemId,
    pub row: Option<u32>,
    pub column: Option<u32>,
    pub row_span: u32,
    pub column_span: u32,
}

impl PlacementRequest {
    #[inline]
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.row.is_some() && self.column.is_some()
    }
}

/// Output of one placement pass.
#[derive(Debug, Clone, Default)]
pub struct PlacementMap {
    /// One entry per request, in request order.
    pub placements: Vec<(ItemId, Placement)>,
    /// Owner of every claimed cell.
    pub owners: FxHashMap<Cell, ItemId>,
    /// Cells claimed by more than one explicit item.
    pub contested_cells: usize,
}

impl PlacementMap {
    #[must_use]
    pub fn placement_of(&self, id: ItemId) -> Option<Placement> {
        self.placements
            .iter()
            .find(|(item, _)| *item == id)
            .map(|(_, p)| *p)
    }

    /// Columns covered by any footprint (`max(column + span)`).
    #[must_use]
    pub fn column_extent(&self) -> u32 {
        self.placements
            .iter()
            .map(|(_, p)| p.column_end())
            .max()
            .unwrap_or(0)
    }

    /// Rows covered by any footprint (`max(row + span)`).
    #[must_use]
    pub fn row_extent(&self) -> u32 {
        self.placements
            .iter()
            .map(|(_, p)| p.row_end())
            .max()
            .unwrap_or(0)
    }
}

/// Assign cells to `requests` (already in `order`/insertion order).
#[must_use]
pub fn resolve(requests: &[PlacementRequest], flow: GridFlow, columns: u32, rows: u32) -> PlacementMap {
    let mut map = PlacementMap {
        placements: Vec::with_capacity(requests.len()),
        owners: FxHashMap::default(),
        contested_cells: 0,
    };
    if requests.is_empty() {
        return map;
    }

    let mut slots: Vec<Option<Placement>> = vec![None; requests.len()];

    for (slot, request) in slots.iter_mut().zip(requests) {
        let (Some(row), Some(column)) = (request.row, request.column) else {
            continue;
        };
        let placement = Placement::new(row, column, request.row_span, request.column_span);
        let mut contested = 0usize;
        for cell in placement.cells() {
            if let Some(previous) = map.owners.insert(cell, request.id) {
                if previous != request.id {
                    contested += 1;
                }
            }
        }
        if contested > 0 {
            tracing::warn!(
                item = %request.id,
                row,
                column,
                contested,
                "explicit placement overlaps an earlier claim; last claim owns the cells"
            );
            map.contested_cells += contested;
        }
        *slot = Some(placement);
    }

    let primary_extent = if flow.is_row_major() { columns } else { rows }.max(1);
    for (slot, request) in slots.iter_mut().zip(requests) {
        if slot.is_some() {
            continue;
        }
        let placement = auto_place(request, flow, primary_extent, &map.owners);
        for cell in placement.cells() {
            map.owners.insert(cell, request.id);
        }
        *slot = Some(placement);
    }

    map.placements = requests
        .iter()
        .zip(slots)
        .filter_map(|(request, slot)| slot.map(|p| (request.id, p)))
        .collect();

    tracing::trace!(
        items = requests.len(),
        ?flow,
        columns,
        rows,
        contested = map.contested_cells,
        "placement pass"
    );
    map
}

/// Dense first-fit scan for one auto item.
fn auto_place(
    request: &PlacementRequest,
    flow: GridFlow,
    primary_extent: u32,
    owners: &FxHashMap<Cell, ItemId>,
) -> Placement {
    let primary_span = if flow.is_row_major() {
        request.column_span
    } else {
        request.row_span
    };

    let to_placement = |primary: u32, cross: u32| {
        if flow.is_row_major() {
            Placement::new(cross, primary, request.row_span, request.column_span)
        } else {
            Placement::new(primary, cross, request.row_span, request.column_span)
        }
    };
    let is_free = |p: &Placement| p.cells().all(|cell| !owners.contains_key(&cell));

    // Positions along the primary axis in scan order.
    let last_start = primary_extent.saturating_sub(primary_span);
    let starts = move |step: u32| -> u32 {
        if flow.is_reversed() {
            last_start - step
        } else {
            step
        }
    };

    // Claimed cells are finite, so some cross index past them is free.
    let mut cross = 0u32;
    loop {
        for step in 0..=last_start {
            let candidate = to_placement(starts(step), cross);
            if is_free(&candidate) {
                return candidate;
            }
        }
        cross += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auto(id: u64) -> PlacementRequest {
        PlacementRequest {
            id: ItemId(id),
            row: None,
            column: None,
            row_span: 1,
            column_span: 1,
        }
    }

    fn explicit(id: u64, row: u32, column: u32, row_span: u32, column_span: u32) -> PlacementRequest {
        PlacementRequest {
            id: ItemId(id),
            row: Some(row),
            column: Some(column),
            row_span,
            column_span,
        }
    }

    fn origins(map: &PlacementMap) -> Vec<(u32, u32)> {
        map.placements.iter().map(|(_, p)| (p.row, p.column)).collect()
    }

    #[test]
    fn empty_input() {
        let map = resolve(&[], GridFlow::Row, 3, 3);
        assert!(map.placements.is_empty());
        assert!(map.owners.is_empty());
    }

    #[test]
    fn row_flow_fills_rows_first() {
        let reqs: Vec<_> = (0..4).map(auto).collect();
        let map = resolve(&reqs, GridFlow::Row, 2, 2);
        assert_eq!(origins(&map), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn column_flow_fills_columns_first() {
        let reqs: Vec<_> = (0..4).map(auto).collect();
        let map = resolve(&reqs, GridFlow::Column, 2, 2);
        assert_eq!(origins(&map), vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn reverse_flows_mirror_primary_axis() {
        let reqs: Vec<_> = (0..4).map(auto).collect();
        let map = resolve(&reqs, GridFlow::RowReverse, 3, 2);
        assert_eq!(origins(&map), vec![(0, 2), (0, 1), (0, 0), (1, 2)]);

        let map = resolve(&reqs, GridFlow::ColumnReverse, 2, 2);
        assert_eq!(origins(&map), vec![(1, 0), (0, 0), (1, 1), (0, 1)]);
    }

    #[test]
    fn explicit_block_is_skipped_by_auto_items() {
        let reqs = vec![explicit(0, 0, 0, 2, 2), auto(1), auto(2)];
        let map = resolve(&reqs, GridFlow::Row, 3, 3);
        assert_eq!(origins(&map), vec![(0, 0), (0, 2), (1, 2)]);
        assert_eq!(map.owners.get(&Cell::new(1, 1)), Some(&ItemId(0)));
    }

    #[test]
    fn explicit_items_claim_before_earlier_auto_items() {
        let reqs = vec![auto(0), explicit(1, 0, 0, 1, 1)];
        let map = resolve(&reqs, GridFlow::Row, 2, 2);
        assert_eq!(origins(&map), vec![(0, 1), (0, 0)]);
    }

    #[test]
    fn spanning_auto_item_wraps() {
        let reqs = vec![
            auto(0),
            PlacementRequest {
                column_span: 2,
                ..auto(1)
            },
            auto(2),
        ];
        let map = resolve(&reqs, GridFlow::Row, 2, 2);
        assert_eq!(origins(&map), vec![(0, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn oversized_span_goes_to_primary_zero() {
        let reqs = vec![PlacementRequest {
            column_span: 5,
            ..auto(0)
        }];
        let map = resolve(&reqs, GridFlow::Row, 2, 1);
        assert_eq!(origins(&map), vec![(0, 0)]);
        assert_eq!(map.column_extent(), 5);

        let map = resolve(&reqs, GridFlow::RowReverse, 2, 1);
        assert_eq!(origins(&map), vec![(0, 0)]);
    }

    #[test]
    fn unbounded_spans_are_capped() {
        let reqs = vec![
            explicit(0, 0, 0, u32::MAX, u32::MAX),
            PlacementRequest {
                row_span: u32::MAX,
                ..auto(1)
            },
        ];
        let map = resolve(&reqs, GridFlow::Row, 3, 3);
        let p = map.placement_of(ItemId(0)).expect("explicit item placed");
        assert_eq!((p.row_span, p.column_span), (MAX_SPAN, MAX_SPAN));
        assert_eq!(map.placement_of(ItemId(1)).map(|p| (p.row, p.row_span)), Some((MAX_SPAN, MAX_SPAN)));
    }

    #[test]
    fn overlapping_explicit_claims_last_wins() {
        let reqs = vec![explicit(0, 0, 0, 2, 2), explicit(1, 1, 1, 1, 1)];
        let map = resolve(&reqs, GridFlow::Row, 3, 3);
        assert_eq!(origins(&map), vec![(0, 0), (1, 1)]);
        assert_eq!(map.owners.get(&Cell::new(1, 1)), Some(&ItemId(1)));
        assert_eq!(map.owners.get(&Cell::new(0, 0)), Some(&ItemId(0)));
        assert_eq!(map.contested_cells, 1);
    }

    #[test]
    fn auto_footprints_do_not_overlap() {
        let reqs: Vec<_> = (0..9)
            .map(|i| PlacementRequest {
                row_span: 1 + (i as u32 % 2),
                column_span: 1 + (i as u32 % 3),
                ..auto(i)
            })
            .collect();
        let map = resolve(&reqs, GridFlow::Row, 4, 4);
        for (i, (_, a)) in map.placements.iter().enumerate() {
            for (_, b) in &map.placements[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn placement_cells_and_contains() {
        let p = Placement::new(1, 2, 2, 3);
        assert_eq!(p.cells().count(), 6);
        assert!(p.contains(Cell::new(2, 4)));
        assert!(!p.contains(Cell::new(3, 2)));
        assert_eq!(Placement::new(0, 0, 0, 0).cells().count(), 1);
    }
}
