#![forbid(unsafe_code)]

//! Current/previous layout cache.
//!
//! A relayout is a pure function of the configuration, the geometry-relevant
//! fields of every item, and the container size. [`LayoutFingerprint`]
//! captures those inputs by value; a lookup hits only when the cache is
//! clean *and* the fingerprint matches the stored one.

use std::rc::Rc;

use gridflow_core::geometry::Size;

use crate::config::{AlignSelf, GridConfiguration};
use crate::geometry::Spacing;
use crate::model::{GridItem, GridModel, ItemId};
use crate::result::LayoutResult;

/// Layout-relevant snapshot of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFingerprint {
    id: ItemId,
    row: Option<u32>,
    column: Option<u32>,
    row_span: u32,
    column_span: u32,
    align_self: AlignSelf,
    order: i32,
    visible: bool,
    focusable: bool,
    natural: Size,
    min: Size,
    max: Option<Size>,
}

impl ItemFingerprint {
    #[must_use]
    pub fn of(item: &GridItem) -> Self {
        Self {
            id: item.id(),
            row: item.explicit_row(),
            column: item.explicit_column(),
            row_span: item.row_span_count(),
            column_span: item.column_span_count(),
            align_self: item.alignment(),
            order: item.sort_order(),
            visible: item.is_effectively_visible(),
            focusable: item.is_focusable(),
            natural: item.natural_size(),
            min: item.effective_min_size(),
            max: item.effective_max_size(),
        }
    }
}

/// Every input a relayout depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutFingerprint {
    config: GridConfiguration,
    container: Size,
    spacing: Spacing,
    items: Vec<ItemFingerprint>,
}

impl LayoutFingerprint {
    #[must_use]
    pub fn capture(model: &GridModel, container: Size, spacing: Spacing) -> Self {
        Self {
            config: model.configuration().clone(),
            container,
            spacing,
            items: model.items().iter().map(ItemFingerprint::of).collect(),
        }
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0 when nothing was looked up.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Holds the current result (with its fingerprint) and the one before it.
#[derive(Debug, Default)]
pub struct LayoutCache {
    current: Option<(LayoutFingerprint, Rc<LayoutResult>)>,
    previous: Option<Rc<LayoutResult>>,
    dirty: bool,
    stats: CacheStats,
}

impl LayoutCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next lookup to miss.
    #[inline]
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Cached result for `fingerprint`, if clean and matching.
    pub fn lookup(&mut self, fingerprint: &LayoutFingerprint) -> Option<Rc<LayoutResult>> {
        let hit = match &self.current {
            Some((stored, result)) if !self.dirty && stored == fingerprint => Some(Rc::clone(result)),
            _ => None,
        };
        if hit.is_some() {
            self.stats.hits += 1;
            tracing::trace!(hits = self.stats.hits, "layout cache hit");
        } else {
            self.stats.misses += 1;
        }
        hit
    }

    /// Store a fresh result. The old current result becomes the previous one.
    pub fn store(&mut self, fingerprint: LayoutFingerprint, result: Rc<LayoutResult>) {
        if let Some((_, old)) = self.current.take() {
            self.previous = Some(old);
        }
        self.current = Some((fingerprint, result));
        self.dirty = false;
    }

    #[must_use]
    pub fn current(&self) -> Option<&Rc<LayoutResult>> {
        self.current.as_ref().map(|(_, result)| result)
    }

    #[must_use]
    pub fn previous(&self) -> Option<&Rc<LayoutResult>> {
        self.previous.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridFlow;
    use crate::model::test_support::TestHandle;

    fn fingerprint(model: &GridModel, width: f32) -> LayoutFingerprint {
        LayoutFingerprint::capture(
            model,
            Size::new(width, 100.0),
            Spacing::of(model.configuration()),
        )
    }

    fn result() -> Rc<LayoutResult> {
        Rc::new(LayoutResult::empty(Size::new(100.0, 100.0), GridFlow::Row))
    }

    #[test]
    fn empty_cache_misses() {
        let model = GridModel::default();
        let mut cache = LayoutCache::new();
        assert!(cache.lookup(&fingerprint(&model, 100.0)).is_none());
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 1 });
    }

    #[test]
    fn clean_matching_lookup_hits() {
        let model = GridModel::default();
        let mut cache = LayoutCache::new();
        let r = result();
        cache.store(fingerprint(&model, 100.0), Rc::clone(&r));
        let hit = cache.lookup(&fingerprint(&model, 100.0));
        assert!(hit.is_some_and(|h| Rc::ptr_eq(&h, &r)));
        assert!(cache.lookup(&fingerprint(&model, 200.0)).is_none());
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().hit_rate(), 0.5);
    }

    #[test]
    fn dirty_forces_miss_even_with_same_inputs() {
        let model = GridModel::default();
        let mut cache = LayoutCache::new();
        cache.store(fingerprint(&model, 100.0), result());
        cache.invalidate();
        assert!(cache.lookup(&fingerprint(&model, 100.0)).is_none());
    }

    #[test]
    fn store_rotates_previous() {
        let model = GridModel::default();
        let mut cache = LayoutCache::new();
        let first = result();
        let second = result();
        cache.store(fingerprint(&model, 100.0), Rc::clone(&first));
        assert!(cache.previous().is_none());
        cache.store(fingerprint(&model, 100.0), Rc::clone(&second));
        assert!(cache.previous().is_some_and(|p| Rc::ptr_eq(p, &first)));
        assert!(cache.current().is_some_and(|c| Rc::ptr_eq(c, &second)));
    }

    #[test]
    fn natural_size_is_part_of_the_fingerprint() {
        let h = TestHandle::new(1, 10.0, 10.0);
        let mut model = GridModel::default();
        model.push(GridItem::new(&h));
        let before = fingerprint(&model, 100.0);
        h.natural.set(Size::new(30.0, 10.0));
        assert_ne!(before, fingerprint(&model, 100.0));
    }
}
