#![forbid(unsafe_code)]

//! Width breakpoints and responsive track policies.
//!
//! The breakpoint table is configuration, not layout math: hosts may supply
//! their own thresholds. Defaults follow the Fluent sizing ramp
//! (480 / 640 / 1024 / 1366 px).

use serde::{Deserialize, Serialize};

use crate::tokens;

/// Width class of the available content area, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl Breakpoint {
    /// All classes in ascending order.
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
    ];

    /// Spacing token used when responsive spacing is enabled.
    #[must_use]
    pub const fn spacing_token(self) -> &'static str {
        match self {
            Breakpoint::Xs | Breakpoint::Sm => "size80",
            Breakpoint::Md => "size120",
            Breakpoint::Lg | Breakpoint::Xl => "size160",
        }
    }
}

/// Lower width bounds (inclusive) for each class above [`Breakpoint::Xs`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints {
    pub sm: f32,
    pub md: f32,
    pub lg: f32,
    pub xl: f32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Breakpoints {
    pub const DEFAULT: Self = Self {
        sm: 480.0,
        md: 640.0,
        lg: 1024.0,
        xl: 1366.0,
    };

    /// Create a table. Thresholds are made monotonic (each at least the
    /// previous one) so classification never inverts.
    #[must_use]
    pub fn new(sm: f32, md: f32, lg: f32, xl: f32) -> Self {
        let sm = gridflow_core::geometry::non_negative(sm);
        let md = md.max(sm);
        let lg = lg.max(md);
        let xl = xl.max(lg);
        Self { sm, md, lg, xl }
    }

    /// Classify a width.
    #[must_use]
    pub fn classify_width(&self, width: f32) -> Breakpoint {
        if width >= self.xl {
            Breakpoint::Xl
        } else if width >= self.lg {
            Breakpoint::Lg
        } else if width >= self.md {
            Breakpoint::Md
        } else if width >= self.sm {
            Breakpoint::Sm
        } else {
            Breakpoint::Xs
        }
    }
}

/// Responsive column mode: below `engage_below`, the column count is
/// derived from how many `min_item_width` columns fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveColumns {
    pub engage_below: Breakpoint,
    pub min_item_width: f32,
}

impl ResponsiveColumns {
    #[must_use]
    pub fn new(engage_below: Breakpoint, min_item_width: f32) -> Self {
        Self {
            engage_below,
            min_item_width: gridflow_core::geometry::non_negative(min_item_width),
        }
    }

    /// True when `available_width` classifies strictly below the engage class.
    #[must_use]
    pub fn is_engaged(&self, breakpoints: &Breakpoints, available_width: f32) -> bool {
        breakpoints.classify_width(available_width) < self.engage_below
    }
}

/// Number of `min_item_width` tracks (with `spacing` gaps) that fit in
/// `available_width`. Always at least 1.
///
/// `max(1, floor((available + spacing) / (min_item_width + spacing)))`
#[must_use]
pub fn columns_that_fit(available_width: f32, spacing: f32, min_item_width: f32) -> u32 {
    let denom = min_item_width + spacing;
    if !(denom > 0.0) || !available_width.is_finite() {
        return 1;
    }
    let fit = ((available_width + spacing) / denom).floor();
    if fit >= 1.0 {
        // Saturating float-to-int cast.
        fit as u32
    } else {
        1
    }
}

/// Spacing resolved from the breakpoint table and a token source.
#[must_use]
pub fn responsive_spacing(
    breakpoints: &Breakpoints,
    available_width: f32,
    tokens: &dyn tokens::SpacingTokens,
) -> f32 {
    let class = breakpoints.classify_width(available_width);
    tokens::resolve(tokens, class.spacing_token())
}
