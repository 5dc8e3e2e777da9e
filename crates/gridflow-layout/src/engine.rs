#![forbid(unsafe_code)]

//! The grid engine facade.
//!
//! [`GridEngine`] owns the model, the cache, the transition scheduler and
//! the focus navigator, and wires them together:
//!
//! ```text
//! mutation ──► model dirty ──► relayout()
//!                                 │
//!                 placement ◄─────┤ (at most one responsive re-pass)
//!                 dimensions      │
//!                 geometry ───────┤
//!                 cache store ────┤
//!                 transition plan ┤
//!                 focus sync ─────┤
//!                 announce/notify ┘
//! ```
//!
//! The engine is single-threaded (`!Send`): results are shared as
//! `Rc<LayoutResult>` and item handles are `Weak`.

use std::fmt;
use std::rc::Rc;

use gridflow_core::geometry::{Rect, Size, non_negative};
use rustc_hash::FxHashMap;

use crate::cache::{CacheStats, LayoutCache, LayoutFingerprint};
use crate::config::GridConfiguration;
use crate::dimension;
use crate::events::{EventHub, GridEvent, Subscription};
use crate::focus::{FocusNavigator, FocusPosition, NavIntent};
use crate::geometry::{self, ItemGeometry, Spacing};
use crate::model::{GridItem, GridModel, ItemId};
use crate::placement::{self, Cell, Placement, PlacementRequest};
use crate::responsive;
use crate::result::{ItemPosition, LayoutResult};
use crate::tokens::{self, FluentSpacingTokens, SpacingTokens};
use crate::transition::{
    EnvMotionPreference, MotionPreference, MotionTokens, TransitionPlan, TransitionScheduler,
};

/// Smallest side of a touch target; floor for [`GridEngine::minimum_size_hint`].
pub const MIN_TOUCH_TARGET: f32 = 44.0;

/// Count facts handed to the accessibility layer after each recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutAnnouncement {
    pub item_count: usize,
    pub columns: u32,
    pub rows: u32,
}

impl fmt::Display for LayoutAnnouncement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grid layout updated: {} items in {} columns",
            self.item_count, self.columns
        )
    }
}

/// Receiver of layout announcements.
pub trait Announcer {
    fn announce(&self, announcement: &LayoutAnnouncement);
}

impl<F> Announcer for F
where
    F: Fn(&LayoutAnnouncement),
{
    fn announce(&self, announcement: &LayoutAnnouncement) {
        self(announcement);
    }
}

/// Responsive grid layout engine.
pub struct GridEngine {
    model: GridModel,
    container: Size,
    cache: LayoutCache,
    scheduler: TransitionScheduler,
    focus: FocusNavigator,
    events: EventHub,
    tokens: Box<dyn SpacingTokens>,
    motion: Box<dyn MotionPreference>,
    announcer: Option<Box<dyn Announcer>>,
    plan: Option<TransitionPlan>,
}

impl fmt::Debug for GridEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridEngine")
            .field("items", &self.model.len())
            .field("container", &self.container)
            .field("dirty", &self.model.is_dirty())
            .field("focused", &self.focus.focused())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl Default for GridEngine {
    fn default() -> Self {
        Self::new(GridConfiguration::default())
    }
}

impl GridEngine {
    /// Engine with Fluent spacing tokens and the environment's motion
    /// preference.
    #[must_use]
    pub fn new(config: GridConfiguration) -> Self {
        let model = GridModel::new(config);
        let wrap = model.configuration().wraps_navigation();
        Self {
            model,
            container: Size::ZERO,
            cache: LayoutCache::new(),
            scheduler: TransitionScheduler::default(),
            focus: FocusNavigator::new(wrap),
            events: EventHub::new(),
            tokens: Box::new(FluentSpacingTokens),
            motion: Box::new(EnvMotionPreference),
            announcer: None,
            plan: None,
        }
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: impl SpacingTokens + 'static) -> Self {
        self.tokens = Box::new(tokens);
        self.model.mark_dirty();
        self
    }

    #[must_use]
    pub fn with_motion_preference(mut self, motion: impl MotionPreference + 'static) -> Self {
        self.motion = Box::new(motion);
        self
    }

    #[must_use]
    pub fn with_motion_tokens(mut self, tokens: MotionTokens) -> Self {
        self.scheduler = TransitionScheduler::new(tokens);
        self
    }

    #[must_use]
    pub fn with_announcer(mut self, announcer: impl Announcer + 'static) -> Self {
        self.announcer = Some(Box::new(announcer));
        self
    }

    /// Initial container size.
    #[must_use]
    pub fn with_container(mut self, size: Size) -> Self {
        self.resize(size);
        self
    }

    // --- state ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn configuration(&self) -> &GridConfiguration {
        self.model.configuration()
    }

    #[inline]
    #[must_use]
    pub fn container(&self) -> Size {
        self.container
    }

    #[inline]
    #[must_use]
    pub fn items(&self) -> &[GridItem] {
        self.model.items()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.model.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.model.is_dirty() || self.cache.is_dirty()
    }

    #[inline]
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Result of the last recompute, without recomputing.
    #[must_use]
    pub fn current_layout(&self) -> Option<Rc<LayoutResult>> {
        self.cache.current().cloned()
    }

    #[must_use]
    pub fn previous_layout(&self) -> Option<Rc<LayoutResult>> {
        self.cache.previous().cloned()
    }

    /// Plan produced by the last recompute.
    #[must_use]
    pub fn transition_plan(&self) -> Option<&TransitionPlan> {
        self.plan.as_ref()
    }

    /// True if `generation` is the latest plan's; stale stagger callbacks
    /// should retarget instead of firing.
    #[must_use]
    pub fn is_plan_current(&self, generation: u64) -> bool {
        self.scheduler.is_current(generation)
    }

    pub fn subscribe(&self, callback: impl Fn(&GridEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    // --- mutations ------------------------------------------------------

    /// Append an item. Duplicate ids are rejected.
    pub fn add_item(&mut self, item: GridItem) -> bool {
        self.insert_item(self.model.len(), item)
    }

    /// Insert at `index` (clamped). Duplicate ids are rejected.
    pub fn insert_item(&mut self, index: usize, item: GridItem) -> bool {
        let id = item.id();
        match self.model.insert(index, item) {
            Some(index) => {
                self.events.emit(&GridEvent::ItemAdded { index, id });
                true
            }
            None => {
                tracing::warn!(item = %id, "duplicate item id rejected");
                false
            }
        }
    }

    pub fn remove_item(&mut self, id: ItemId) -> bool {
        let Some((index, _)) = self.model.remove(id) else {
            return false;
        };
        self.focus.item_removed(id);
        self.events.emit(&GridEvent::ItemRemoved { index, id });
        true
    }

    pub fn remove_item_at(&mut self, index: usize) -> Option<ItemId> {
        let id = self.model.remove_at(index)?.id();
        self.focus.item_removed(id);
        self.events.emit(&GridEvent::ItemRemoved { index, id });
        Some(id)
    }

    /// Remove every item. Notifications run last-to-first so each index is
    /// valid when reported.
    pub fn clear(&mut self) {
        let removed = self.model.clear();
        self.focus.blur();
        for (index, item) in removed.iter().enumerate().rev() {
            self.events.emit(&GridEvent::ItemRemoved {
                index,
                id: item.id(),
            });
        }
    }

    /// Rebuild one item through its builders. Hiding the focused item
    /// clears focus.
    pub fn update_item(&mut self, id: ItemId, f: impl FnOnce(GridItem) -> GridItem) -> bool {
        if !self.model.update(id, f) {
            return false;
        }
        let reachable = self
            .model
            .get(id)
            .is_some_and(|item| item.is_effectively_visible() && item.is_focusable());
        if !reachable {
            self.focus.item_removed(id);
        }
        true
    }

    /// Convenience for toggling an item's own visibility flag.
    pub fn set_item_visible(&mut self, id: ItemId, visible: bool) -> bool {
        self.update_item(id, |item| item.visible(visible))
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        self.model.move_item(from, to)
    }

    /// Set the container size. Returns `false` if it did not change.
    pub fn resize(&mut self, size: Size) -> bool {
        let size = Size::clamped(size.width, size.height);
        if size == self.container {
            return false;
        }
        self.container = size;
        self.model.mark_dirty();
        true
    }

    /// Replace the configuration via `f`. Returns `false` if nothing changed.
    pub fn reconfigure(&mut self, f: impl FnOnce(GridConfiguration) -> GridConfiguration) -> bool {
        let next = f(self.model.configuration().clone());
        if !self.model.set_configuration(next) {
            return false;
        }
        self.focus
            .set_wrap(self.model.configuration().wraps_navigation());
        self.events.emit(&GridEvent::ConfigurationChanged);
        true
    }

    /// Mark the layout stale (e.g. after a handle's natural size changed
    /// in a way the caller wants to force).
    pub fn invalidate(&mut self) {
        self.model.mark_dirty();
    }

    // --- layout ---------------------------------------------------------

    /// Current layout, recomputed only if an input changed.
    pub fn relayout(&mut self) -> Rc<LayoutResult> {
        for (index, id) in self.model.prune_dead() {
            tracing::warn!(item = %id, index, "item handle dropped; pruning");
            self.focus.item_removed(id);
            self.events.emit(&GridEvent::ItemRemoved { index, id });
        }
        if self.model.take_dirty() {
            self.cache.invalidate();
        }

        let spacing = self.effective_spacing();
        let fingerprint = LayoutFingerprint::capture(&self.model, self.container, spacing);
        if let Some(hit) = self.cache.lookup(&fingerprint) {
            return hit;
        }

        let _span = tracing::debug_span!(
            "grid_relayout",
            items = self.model.len(),
            width = self.container.width,
            height = self.container.height
        )
        .entered();

        let result = Rc::new(self.compute(spacing));
        self.cache.store(fingerprint, Rc::clone(&result));

        let reduced_motion = self.motion.prefers_reduced_motion();
        let plan = self.scheduler.schedule(
            self.cache.previous().map(Rc::as_ref),
            &result,
            self.model.configuration().is_animated(),
            reduced_motion,
        );
        self.plan = Some(plan);
        self.focus.sync(&result);

        let announcement = LayoutAnnouncement {
            item_count: result.items().len(),
            columns: result.actual_columns(),
            rows: result.actual_rows(),
        };
        if let Some(announcer) = &self.announcer {
            announcer.announce(&announcement);
        }
        self.events.emit(&GridEvent::LayoutChanged {
            columns: announcement.columns,
            rows: announcement.rows,
            item_count: announcement.item_count,
            grid_size: result.grid_size(),
        });
        tracing::debug!(
            columns = announcement.columns,
            rows = announcement.rows,
            items = announcement.item_count,
            "relayout complete"
        );
        result
    }

    /// Rectangle of `id` in the current layout.
    pub fn item_rect(&mut self, id: ItemId) -> Option<Rect> {
        self.relayout().item_rect(id)
    }

    /// Rectangle of the item owning `(row, column)`.
    pub fn rect_at(&mut self, row: u32, column: u32) -> Option<Rect> {
        self.relayout().rect_at(row, column)
    }

    /// Accessibility position of `id`.
    pub fn item_position(&mut self, id: ItemId) -> Option<ItemPosition> {
        self.relayout().item_position(id)
    }

    /// Preferred container size: the occupied grid (padding included),
    /// never below [`minimum_size_hint`](Self::minimum_size_hint).
    pub fn size_hint(&mut self) -> Size {
        self.relayout().grid_size().expanded_to(self.minimum_size_hint())
    }

    /// Padding plus one touch target when the grid holds any item.
    #[must_use]
    pub fn minimum_size_hint(&self) -> Size {
        let padding = self.model.configuration().insets();
        let target = if self.model.is_empty() {
            0.0
        } else {
            MIN_TOUCH_TARGET
        };
        Size::new(target + padding.horizontal(), target + padding.vertical())
    }

    fn available(&self) -> Size {
        let padding = self.model.configuration().insets();
        Size::new(
            non_negative(self.container.width - padding.horizontal()),
            non_negative(self.container.height - padding.vertical()),
        )
    }

    fn effective_spacing(&self) -> Spacing {
        let config = self.model.configuration();
        if !config.uses_responsive_spacing() {
            return Spacing::of(config);
        }
        let value = responsive::responsive_spacing(
            config.breakpoint_table(),
            self.available().width,
            self.tokens.as_ref(),
        );
        Spacing::uniform(tokens::snap_to_base_unit(value))
    }

    fn compute(&self, spacing: Spacing) -> LayoutResult {
        let config = self.model.configuration();
        if self.container.is_empty() {
            return LayoutResult::empty(self.container, config.grid_flow());
        }
        let visible = self.model.visible_in_order();
        let requests: Vec<PlacementRequest> = visible
            .iter()
            .map(|item| PlacementRequest {
                id: item.id(),
                row: item.explicit_row(),
                column: item.explicit_column(),
                row_span: item.row_span_count(),
                column_span: item.column_span_count(),
            })
            .collect();

        let n = requests.len();
        let width = self.available().width;
        let flow = config.grid_flow();
        let mut tracks = dimension::provisional(config, n, width, spacing.column);
        let mut map = placement::resolve(&requests, flow, tracks.columns, tracks.rows);

        let responsive = if n > 0 {
            dimension::responsive_columns(config, width, spacing.column)
        } else {
            None
        };
        if let Some(columns) = responsive {
            if columns != tracks.columns {
                tracing::debug!(
                    from = tracks.columns,
                    to = columns,
                    width,
                    "responsive column re-pass"
                );
                tracks = dimension::with_columns(config, n, columns);
                map = placement::resolve(&requests, flow, tracks.columns, tracks.rows);
            }
        }

        let resolved = dimension::resolve(config, tracks, &map, responsive);
        let placed: FxHashMap<ItemId, Placement> = map.placements.iter().copied().collect();
        let items: Vec<ItemGeometry> = self
            .model
            .items()
            .iter()
            .filter_map(|item| {
                let placement = *placed.get(&item.id())?;
                Some(ItemGeometry {
                    id: item.id(),
                    placement,
                    natural: item.natural_size(),
                    min: item.effective_min_size(),
                    max: item.effective_max_size(),
                    align_self: item.alignment(),
                    focusable: item.is_focusable(),
                })
            })
            .collect();

        geometry::compute(config, self.container, spacing, resolved, &items, map.owners)
    }

    // --- focus ----------------------------------------------------------

    #[must_use]
    pub fn focused(&self) -> Option<FocusPosition> {
        self.focus.focused()
    }

    pub fn focus_first(&mut self) -> Option<Cell> {
        let result = self.relayout();
        self.focus.focus_first(&result)
    }

    pub fn focus_item(&mut self, id: ItemId) -> Option<Cell> {
        let result = self.relayout();
        self.focus.focus_item(id, &result)
    }

    pub fn blur(&mut self) -> Option<ItemId> {
        self.focus.blur()
    }

    /// Move focus using the last computed layout. Never relayouts; items
    /// removed or hidden since then are skipped.
    pub fn navigate(&mut self, intent: NavIntent) -> Option<Cell> {
        let result = self.cache.current().cloned()?;
        let model = &self.model;
        self.focus.navigate_filtered(intent, &result, |id| {
            model
                .get(id)
                .is_some_and(|item| item.is_effectively_visible() && item.is_focusable())
        })
    }

    #[must_use]
    pub fn focus_navigator(&self) -> &FocusNavigator {
        &self.focus
    }
}
