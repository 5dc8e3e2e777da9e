#![forbid(unsafe_code)]

//! Synchronous grid notifications.
//!
//! # Design
//!
//! Subscribers are stored as `Weak` callbacks; the caller keeps them alive
//! with the returned [`Subscription`] guard. Events are delivered in
//! registration order before the mutating engine call returns.
//!
//! # Failure Modes
//!
//! - **Re-entrant mutation**: a callback that mutates the engine it listens
//!   to cannot compile (the engine is borrowed mutably during emit).
//! - **Subscriber leak**: guards stored indefinitely keep callbacks alive.
//!   Dead entries are pruned lazily during `emit()`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gridflow_core::geometry::Size;

use crate::model::ItemId;

/// Something observable happened to the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridEvent {
    /// An item was inserted at `index` in model order.
    ItemAdded { index: usize, id: ItemId },
    /// An item was removed from `index` (explicitly or because its handle
    /// was dropped).
    ItemRemoved { index: usize, id: ItemId },
    ConfigurationChanged,
    /// A relayout produced a new result.
    LayoutChanged {
        columns: u32,
        rows: u32,
        item_count: usize,
        grid_size: Size,
    },
}

type CallbackRc = Rc<dyn Fn(&GridEvent)>;
type CallbackWeak = Weak<dyn Fn(&GridEvent)>;

/// Registration list for [`GridEvent`] observers.
#[derive(Default)]
pub struct EventHub {
    subscribers: RefCell<Vec<CallbackWeak>>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. Dropping the returned guard unsubscribes it.
    pub fn subscribe(&self, callback: impl Fn(&GridEvent) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription { _callback: strong }
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Deliver `event` to live subscribers and prune dead ones.
    pub fn emit(&self, event: &GridEvent) {
        // Collect first so callbacks may subscribe without a borrow conflict.
        let callbacks: Vec<CallbackRc> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|w| w.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in &callbacks {
            callback(event);
        }
    }
}

/// RAII guard for an event callback.
pub struct Subscription {
    _callback: CallbackRc,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
