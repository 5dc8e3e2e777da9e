#![forbid(unsafe_code)]

//! Core: pixel geometry and logging bootstrap.
//!
//! # Role in gridflow
//! `gridflow-core` holds the value types every other crate speaks in:
//! points, sizes, rectangles and four-sided insets measured in logical
//! pixels. The layout engine (`gridflow-layout`) consumes and produces these
//! types and never reaches into a UI toolkit directly.
//!
//! # Primary responsibilities
//! - **Geometry**: [`geometry::Rect`], [`geometry::Size`], [`geometry::Point`],
//!   [`geometry::Sides`] with sanitizing constructors.
//! - **Logging**: optional `tracing-subscriber` bootstrap behind the
//!   `tracing-json` feature.

pub mod geometry;
pub mod logging;
