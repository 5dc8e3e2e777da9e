#![forbid(unsafe_code)]

//! Item collection and grid configuration.
//!
//! Items are stored by value. Each one holds a [`Weak`] reference to a
//! caller-owned [`ItemHandle`]; the engine never keeps a visual object alive.
//! Items whose handle has been dropped are pruned at the next relayout.
//!
//! Every mutation marks the model dirty. The flag is consumed by the engine
//! with [`GridModel::take_dirty`] before it consults the layout cache.

use std::fmt;
use std::rc::{Rc, Weak};

use gridflow_core::geometry::Size;
use serde::{Deserialize, Serialize};

use crate::config::{AlignSelf, GridConfiguration};
use crate::placement::MAX_SPAN;

/// Stable identity of a grid item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Capability the engine needs from a caller-owned visual object.
pub trait ItemHandle {
    /// Stable identity. Must not change while the item is in a grid.
    fn item_id(&self) -> ItemId;

    /// Size the object would like when not stretched.
    fn natural_size(&self) -> Size;

    /// Intrinsic minimum size, if any.
    fn min_size(&self) -> Option<Size> {
        None
    }

    /// Intrinsic maximum size, if any.
    fn max_size(&self) -> Option<Size> {
        None
    }

    /// Whether the object is currently shown.
    fn is_visible(&self) -> bool {
        true
    }

    /// Whether keyboard navigation may land on the object.
    fn is_focusable(&self) -> bool {
        true
    }
}

/// Negative integers mean "auto".
#[inline]
fn coordinate(value: i32) -> Option<u32> {
    u32::try_from(value).ok()
}

#[inline]
fn span(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0).clamp(1, MAX_SPAN)
}

/// A grid entry: handle plus per-item layout properties.
#[derive(Clone)]
pub struct GridItem {
    handle: Weak<dyn ItemHandle>,
    id: ItemId,
    row: Option<u32>,
    column: Option<u32>,
    row_span: u32,
    column_span: u32,
    align_self: AlignSelf,
    min_size: Option<Size>,
    max_size: Option<Size>,
    order: i32,
    visible: bool,
}

impl fmt::Debug for GridItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridItem")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .field("row", &self.row)
            .field("column", &self.column)
            .field("row_span", &self.row_span)
            .field("column_span", &self.column_span)
            .field("align_self", &self.align_self)
            .field("order", &self.order)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

impl GridItem {
    /// Auto-placed, single-cell item for `handle`.
    #[must_use]
    pub fn new<H: ItemHandle + 'static>(handle: &Rc<H>) -> Self {
        let weak: Weak<H> = Rc::downgrade(handle);
        Self::from_weak(weak, handle.item_id())
    }

    /// Same as [`GridItem::new`] for an already type-erased handle.
    #[must_use]
    pub fn from_dyn(handle: &Rc<dyn ItemHandle>) -> Self {
        Self::from_weak(Rc::downgrade(handle), handle.item_id())
    }

    fn from_weak(handle: Weak<dyn ItemHandle>, id: ItemId) -> Self {
        Self {
            handle,
            id,
            row: None,
            column: None,
            row_span: 1,
            column_span: 1,
            align_self: AlignSelf::Auto,
            min_size: None,
            max_size: None,
            order: 0,
            visible: true,
        }
    }

    /// Explicit origin. Negative values mean auto.
    #[must_use]
    pub fn at(self, row: i32, column: i32) -> Self {
        self.row(row).column(column)
    }

    #[must_use]
    pub fn row(mut self, row: i32) -> Self {
        self.row = coordinate(row);
        self
    }

    #[must_use]
    pub fn column(mut self, column: i32) -> Self {
        self.column = coordinate(column);
        self
    }

    /// Clear the explicit origin.
    #[must_use]
    pub fn auto_placed(mut self) -> Self {
        self.row = None;
        self.column = None;
        self
    }

    /// Row and column spans, each clamped to `1..=MAX_SPAN`.
    #[must_use]
    pub fn span(self, row_span: i32, column_span: i32) -> Self {
        self.row_span(row_span).column_span(column_span)
    }

    #[must_use]
    pub fn row_span(mut self, row_span: i32) -> Self {
        self.row_span = span(row_span);
        self
    }

    #[must_use]
    pub fn column_span(mut self, column_span: i32) -> Self {
        self.column_span = span(column_span);
        self
    }

    #[must_use]
    pub fn align_self(mut self, align: AlignSelf) -> Self {
        self.align_self = align;
        self
    }

    /// Override the handle's minimum size.
    #[must_use]
    pub fn min_size(mut self, size: Option<Size>) -> Self {
        self.min_size = size.map(|s| Size::clamped(s.width, s.height));
        self
    }

    /// Override the handle's maximum size.
    #[must_use]
    pub fn max_size(mut self, size: Option<Size>) -> Self {
        self.max_size = size.map(|s| Size::clamped(s.width, s.height));
        self
    }

    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    // --- accessors ------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Upgrade the handle, if the caller still owns it.
    #[must_use]
    pub fn handle(&self) -> Option<Rc<dyn ItemHandle>> {
        self.handle.upgrade()
    }

    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.handle.strong_count() > 0
    }

    #[inline]
    #[must_use]
    pub fn explicit_row(&self) -> Option<u32> {
        self.row
    }

    #[inline]
    #[must_use]
    pub fn explicit_column(&self) -> Option<u32> {
        self.column
    }

    #[inline]
    #[must_use]
    pub fn row_span_count(&self) -> u32 {
        self.row_span
    }

    #[inline]
    #[must_use]
    pub fn column_span_count(&self) -> u32 {
        self.column_span
    }

    /// True when both row and column are set.
    #[inline]
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.row.is_some() && self.column.is_some()
    }

    #[inline]
    #[must_use]
    pub fn alignment(&self) -> AlignSelf {
        self.align_self
    }

    #[inline]
    #[must_use]
    pub fn sort_order(&self) -> i32 {
        self.order
    }

    /// The item's own visibility flag, ignoring the handle.
    #[inline]
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.visible
    }

    /// Flag AND handle visibility. Dead handles are never visible.
    #[must_use]
    pub fn is_effectively_visible(&self) -> bool {
        self.visible && self.handle().is_some_and(|h| h.is_visible())
    }

    #[must_use]
    pub fn is_focusable(&self) -> bool {
        self.handle().is_some_and(|h| h.is_focusable())
    }

    /// Handle's natural size, sanitized. Zero for a dead handle.
    #[must_use]
    pub fn natural_size(&self) -> Size {
        self.handle().map_or(Size::ZERO, |h| {
            let s = h.natural_size();
            Size::clamped(s.width, s.height)
        })
    }

    /// Item override, else handle bound, else zero.
    #[must_use]
    pub fn effective_min_size(&self) -> Size {
        self.min_size
            .or_else(|| {
                self.handle()
                    .and_then(|h| h.min_size())
                    .map(|s| Size::clamped(s.width, s.height))
            })
            .unwrap_or(Size::ZERO)
    }

    /// Item override, else handle bound, else unconstrained.
    #[must_use]
    pub fn effective_max_size(&self) -> Option<Size> {
        self.max_size.or_else(|| {
            self.handle()
                .and_then(|h| h.max_size())
                .map(|s| Size::clamped(s.width, s.height))
        })
    }
}

/// Ordered item collection plus the grid configuration.
#[derive(Debug, Default)]
pub struct GridModel {
    items: Vec<GridItem>,
    config: GridConfiguration,
    dirty: bool,
}

impl GridModel {
    #[must_use]
    pub fn new(config: GridConfiguration) -> Self {
        Self {
            items: Vec::new(),
            config: config.normalized(),
            dirty: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn configuration(&self) -> &GridConfiguration {
        &self.config
    }

    /// Replace the configuration. Returns `false` if nothing changed.
    pub fn set_configuration(&mut self, config: GridConfiguration) -> bool {
        let config = config.normalized();
        if config == self.config {
            return false;
        }
        self.config = config;
        self.dirty = true;
        true
    }

    #[inline]
    #[must_use]
    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&GridItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.index_of(id).is_some()
    }

    /// Append an item. Rejects duplicate ids.
    pub fn push(&mut self, item: GridItem) -> bool {
        self.insert(self.items.len(), item).is_some()
    }

    /// Insert at `index` (clamped to the end). Returns the final index, or
    /// `None` for a duplicate id.
    pub fn insert(&mut self, index: usize, item: GridItem) -> Option<usize> {
        if self.contains(item.id) {
            return None;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        self.dirty = true;
        Some(index)
    }

    /// Remove by id, returning its former index.
    pub fn remove(&mut self, id: ItemId) -> Option<(usize, GridItem)> {
        let index = self.index_of(id)?;
        self.remove_at(index).map(|item| (index, item))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<GridItem> {
        if index >= self.items.len() {
            return None;
        }
        self.dirty = true;
        Some(self.items.remove(index))
    }

    /// Remove every item, returning them in model order.
    pub fn clear(&mut self) -> Vec<GridItem> {
        if !self.items.is_empty() {
            self.dirty = true;
        }
        std::mem::take(&mut self.items)
    }

    /// Rebuild one item through its builder methods. Returns `false` if the
    /// id is unknown. The id cannot be changed this way.
    pub fn update(&mut self, id: ItemId, f: impl FnOnce(GridItem) -> GridItem) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let current = self.items[index].clone();
        let mut updated = f(current);
        updated.handle = self.items[index].handle.clone();
        updated.id = id;
        self.items[index] = updated;
        self.dirty = true;
        true
    }

    /// Move an item to a new index (clamped). Returns `false` for an
    /// out-of-range source.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() {
            return false;
        }
        let to = to.min(self.items.len() - 1);
        if from != to {
            let item = self.items.remove(from);
            self.items.insert(to, item);
            self.dirty = true;
        }
        true
    }

    /// Drop items whose handle is gone. Returns `(former index, id)` pairs
    /// in descending index order so each index is valid at the time of its
    /// removal.
    pub fn prune_dead(&mut self) -> Vec<(usize, ItemId)> {
        let mut pruned = Vec::new();
        for index in (0..self.items.len()).rev() {
            if !self.items[index].is_alive() {
                let item = self.items.remove(index);
                pruned.push((index, item.id));
            }
        }
        if !pruned.is_empty() {
            self.dirty = true;
        }
        pruned
    }

    /// Visible items sorted by `order`, ties by model index.
    #[must_use]
    pub fn visible_in_order(&self) -> Vec<&GridItem> {
        let mut visible: Vec<&GridItem> = self
            .items
            .iter()
            .filter(|item| item.is_effectively_visible())
            .collect();
        visible.sort_by_key(|item| item.order);
        visible
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force the next relayout to recompute.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
