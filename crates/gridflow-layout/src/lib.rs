#![forbid(unsafe_code)]

//! Responsive grid layout.
//!
//! # Role in gridflow
//! `gridflow-layout` turns an ordered list of items and a container size
//! into pixel rectangles. It never draws: a host toolkit feeds it item
//! handles (natural sizes, visibility, focusability) and applies the
//! resulting [`LayoutResult`].
//!
//! # Primary responsibilities
//! - **Model**: [`GridModel`] and [`GridItem`] with weak item handles.
//! - **Placement**: explicit cells first, then row- or column-major auto
//!   flow ([`placement`]).
//! - **Dimensions**: fixed, auto and responsive track counts ([`dimension`]).
//! - **Geometry**: track sizing, content distribution and per-item
//!   alignment ([`geometry`]).
//! - **Caching**: fingerprinted current/previous results ([`cache`]).
//! - **Transitions**: staggered, generation-stamped plans ([`transition`]).
//! - **Focus**: directional and sequential navigation ([`focus`]).
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use gridflow_core::geometry::Size;
//! use gridflow_layout::{GridConfiguration, GridEngine, GridItem, ItemHandle, ItemId};
//!
//! struct Tile(u64);
//!
//! impl ItemHandle for Tile {
//!     fn item_id(&self) -> ItemId {
//!         ItemId(self.0)
//!     }
//!     fn natural_size(&self) -> Size {
//!         Size::new(40.0, 20.0)
//!     }
//! }
//!
//! let tiles: Vec<Rc<Tile>> = (0..4).map(|i| Rc::new(Tile(i))).collect();
//! let mut engine = GridEngine::new(GridConfiguration::new().columns(2))
//!     .with_motion_preference(|| true)
//!     .with_container(Size::new(200.0, 100.0));
//! for tile in &tiles {
//!     engine.add_item(GridItem::new(tile));
//! }
//! let layout = engine.relayout();
//! assert_eq!((layout.actual_columns(), layout.actual_rows()), (2, 2));
//! ```

pub mod cache;
pub mod config;
pub mod dimension;
pub mod engine;
pub mod events;
pub mod focus;
pub mod geometry;
pub mod model;
pub mod placement;
pub mod responsive;
pub mod result;
pub mod tokens;
pub mod transition;

pub use cache::{CacheStats, LayoutCache, LayoutFingerprint};
pub use config::{
    AlignSelf, ConfigError, ConfigParse, ContentAlignment, GridConfiguration, GridFlow,
    ItemAlignment,
};
pub use engine::{Announcer, GridEngine, LayoutAnnouncement, MIN_TOUCH_TARGET};
pub use events::{EventHub, GridEvent, Subscription};
pub use focus::{FocusEvent, FocusNavigator, FocusPosition, NavIntent};
pub use geometry::Spacing;
pub use model::{GridItem, GridModel, ItemHandle, ItemId};
pub use placement::{Cell, MAX_SPAN, Placement, PlacementMap, PlacementRequest};
pub use responsive::{Breakpoint, Breakpoints, ResponsiveColumns};
pub use result::{AxisTracks, ItemLayout, ItemPosition, LayoutResult};
pub use tokens::{FluentSpacingTokens, SpacingTokens};
pub use transition::{
    CubicBezier, EnvMotionPreference, MotionPreference, MotionTokens, TransitionEntry,
    TransitionKind, TransitionPlan, TransitionScheduler,
};
