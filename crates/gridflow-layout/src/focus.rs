#![forbid(unsafe_code)]

//! Keyboard navigation over a computed layout.
//!
//! The navigator reads only a [`LayoutResult`]; it never triggers a
//! relayout. Directional intents walk cells along one axis and stop at the
//! nearest cell owned by a *different* focusable item, so moving across a
//! spanning item takes one step. Without focus every intent is a no-op;
//! [`FocusNavigator::focus_first`] enters the grid.

use crate::model::ItemId;
use crate::placement::Cell;
use crate::result::LayoutResult;

/// Navigation request, already decoded from the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavIntent {
    Up,
    Down,
    Left,
    Right,
    /// First focusable item in flow order.
    Home,
    /// Last focusable item in flow order.
    End,
    /// Next item in flow order, wrapping.
    Next,
    /// Previous item in flow order, wrapping.
    Prev,
}

/// The focused item and the cell focus arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusPosition {
    pub id: ItemId,
    pub cell: Cell,
}

/// Focus change events emitted by the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    FocusGained { id: ItemId },
    FocusLost { id: ItemId },
    FocusMoved { from: ItemId, to: ItemId },
}

/// Focus state plus navigation rules.
#[derive(Debug, Clone, Default)]
pub struct FocusNavigator {
    focused: Option<FocusPosition>,
    wrap: bool,
    last_event: Option<FocusEvent>,
}

impl FocusNavigator {
    #[must_use]
    pub fn new(wrap: bool) -> Self {
        Self {
            focused: None,
            wrap,
            last_event: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn wraps(&self) -> bool {
        self.wrap
    }

    /// Enable or disable wraparound at grid edges.
    pub fn set_wrap(&mut self, wrap: bool) {
        self.wrap = wrap;
    }

    #[inline]
    #[must_use]
    pub fn focused(&self) -> Option<FocusPosition> {
        self.focused
    }

    #[must_use]
    pub fn is_focused(&self, id: ItemId) -> bool {
        self.focused.is_some_and(|f| f.id == id)
    }

    /// Last focus change, if any.
    #[must_use]
    pub fn focus_event(&self) -> Option<&FocusEvent> {
        self.last_event.as_ref()
    }

    pub fn take_focus_event(&mut self) -> Option<FocusEvent> {
        self.last_event.take()
    }

    /// Focus the first focusable item in flow order.
    pub fn focus_first(&mut self, result: &LayoutResult) -> Option<Cell> {
        let first = result.flow_order().into_iter().find(|item| item.focusable)?;
        let cell = first.placement.origin();
        self.set_focus(first.id, cell);
        Some(cell)
    }

    /// Focus a specific item at its origin. Non-focusable or absent items
    /// are refused.
    pub fn focus_item(&mut self, id: ItemId, result: &LayoutResult) -> Option<Cell> {
        let item = result.item(id).filter(|item| item.focusable)?;
        let cell = item.placement.origin();
        self.set_focus(id, cell);
        Some(cell)
    }

    /// Drop focus, returning the item that had it.
    pub fn blur(&mut self) -> Option<ItemId> {
        let previous = self.focused.take().map(|f| f.id);
        if let Some(id) = previous {
            self.last_event = Some(FocusEvent::FocusLost { id });
        }
        previous
    }

    /// Clear focus if `id` holds it (item removed or hidden).
    pub fn item_removed(&mut self, id: ItemId) {
        if self.is_focused(id) {
            self.blur();
        }
    }

    /// Re-sync after a relayout: focus follows the item to its new origin,
    /// or is cleared if the item is gone or no longer focusable.
    pub fn sync(&mut self, result: &LayoutResult) {
        let Some(current) = self.focused else {
            return;
        };
        match result.item(current.id).filter(|item| item.focusable) {
            Some(item) => {
                self.focused = Some(FocusPosition {
                    id: current.id,
                    cell: item.placement.origin(),
                });
            }
            None => {
                tracing::trace!(item = %current.id, "focused item left the layout");
                self.blur();
            }
        }
    }

    /// Apply `intent` to the current focus. `None` when unfocused or when
    /// there is nowhere to go.
    pub fn navigate(&mut self, intent: NavIntent, result: &LayoutResult) -> Option<Cell> {
        self.navigate_filtered(intent, result, |_| true)
    }

    /// Like [`navigate`](Self::navigate), but targets only items for which
    /// `eligible` holds. Used when `result` may list items that have since
    /// been removed or hidden.
    pub fn navigate_filtered(
        &mut self,
        intent: NavIntent,
        result: &LayoutResult,
        eligible: impl Fn(ItemId) -> bool,
    ) -> Option<Cell> {
        let current = self.focused?;
        let target = self.target(intent, current.cell, result, &eligible)?;
        let id = result.owner_at(target)?;
        self.set_focus(id, target);
        Some(target)
    }

    /// Target cell for `intent` starting at `from`, without changing state.
    #[must_use]
    pub fn navigate_from(&self, intent: NavIntent, from: Cell, result: &LayoutResult) -> Option<Cell> {
        self.target(intent, from, result, &|_| true)
    }

    fn target(
        &self,
        intent: NavIntent,
        from: Cell,
        result: &LayoutResult,
        eligible: &dyn Fn(ItemId) -> bool,
    ) -> Option<Cell> {
        let current = result.owner_at(from);
        match intent {
            NavIntent::Up | NavIntent::Down | NavIntent::Left | NavIntent::Right => {
                self.directional(intent, from, current, result, eligible)
            }
            NavIntent::Home | NavIntent::End => {
                let order = focusable_order(result, eligible);
                let target = if intent == NavIntent::Home {
                    order.first()
                } else {
                    order.last()
                };
                target
                    .filter(|(id, _)| Some(*id) != current)
                    .map(|(_, cell)| *cell)
            }
            NavIntent::Next | NavIntent::Prev => {
                let order = focusable_order(result, eligible);
                if order.is_empty() {
                    return None;
                }
                let len = order.len();
                let index = match current.and_then(|id| order.iter().position(|(o, _)| *o == id)) {
                    Some(pos) if intent == NavIntent::Next => (pos + 1) % len,
                    Some(pos) => (pos + len - 1) % len,
                    None if intent == NavIntent::Next => 0,
                    None => len - 1,
                };
                let (id, cell) = order[index];
                (Some(id) != current).then_some(cell)
            }
        }
    }

    fn directional(
        &self,
        intent: NavIntent,
        from: Cell,
        current: Option<ItemId>,
        result: &LayoutResult,
        eligible: &dyn Fn(ItemId) -> bool,
    ) -> Option<Cell> {
        let horizontal = matches!(intent, NavIntent::Left | NavIntent::Right);
        let forward = matches!(intent, NavIntent::Right | NavIntent::Down);
        let (position, extent) = if horizontal {
            (from.column, result.column_extent())
        } else {
            (from.row, result.row_extent())
        };
        let at = |i: u32| {
            if horizontal {
                Cell::new(from.row, i)
            } else {
                Cell::new(i, from.column)
            }
        };
        let accepts = |cell: Cell| {
            result.owner_at(cell).is_some_and(|owner| {
                Some(owner) != current
                    && eligible(owner)
                    && result.item(owner).is_some_and(|item| item.focusable)
            })
        };

        let mut candidates: Vec<u32> = if forward {
            (position.saturating_add(1)..extent).collect()
        } else {
            (0..position.min(extent)).rev().collect()
        };
        if self.wrap {
            if forward {
                candidates.extend(0..position.min(extent));
            } else {
                candidates.extend((position.saturating_add(1)..extent).rev());
            }
        }
        candidates.into_iter().map(at).find(|cell| accepts(*cell))
    }

    fn set_focus(&mut self, id: ItemId, cell: Cell) {
        let previous = self.focused.replace(FocusPosition { id, cell });
        self.last_event = match previous {
            Some(p) if p.id == id => self.last_event,
            Some(p) => Some(FocusEvent::FocusMoved { from: p.id, to: id }),
            None => Some(FocusEvent::FocusGained { id }),
        };
    }
}

/// Focusable items and their origins, in flow order.
fn focusable_order(result: &LayoutResult, eligible: &dyn Fn(ItemId) -> bool) -> Vec<(ItemId, Cell)> {
    result
        .flow_order()
        .into_iter()
        .filter(|item| item.focusable && eligible(item.id))
        .map(|item| (item.id, item.placement.origin()))
        .collect()
}
