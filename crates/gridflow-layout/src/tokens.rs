#![forbid(unsafe_code)]

//! Spacing token lookup.
//!
//! The theming system is an external collaborator; the engine only needs a
//! way to turn a token name into a number. Hosts pass any
//! [`SpacingTokens`] implementation (closures included) wherever tokens are
//! consulted. [`FluentSpacingTokens`] is the built-in Fluent ramp.

/// Base grid unit spacing values are snapped to.
pub const BASE_UNIT: f32 = 4.0;

/// Token used when a lookup misses.
pub const DEFAULT_TOKEN: &str = "size160";

/// Value used when even [`DEFAULT_TOKEN`] is unknown to the provider.
pub const DEFAULT_SPACING: f32 = 16.0;

/// Read-only token source.
pub trait SpacingTokens {
    /// Numeric value for `token`, or `None` if unknown.
    fn lookup(&self, token: &str) -> Option<f32>;
}

impl<F> SpacingTokens for F
where
    F: Fn(&str) -> Option<f32>,
{
    fn lookup(&self, token: &str) -> Option<f32> {
        self(token)
    }
}

/// Fluent design spacing ramp (pixels).
#[derive(Debug, Clone, Copy, Default)]
pub struct FluentSpacingTokens;

const FLUENT_RAMP: [(&str, f32); 17] = [
    ("sizeNone", 0.0),
    ("size20", 2.0),
    ("size40", 4.0),
    ("size60", 6.0),
    ("size80", 8.0),
    ("size100", 10.0),
    ("size120", 12.0),
    ("size160", 16.0),
    ("size200", 20.0),
    ("size240", 24.0),
    ("size280", 28.0),
    ("size320", 32.0),
    ("size360", 36.0),
    ("size400", 40.0),
    ("size480", 48.0),
    ("size520", 52.0),
    ("size560", 56.0),
];

impl SpacingTokens for FluentSpacingTokens {
    fn lookup(&self, token: &str) -> Option<f32> {
        FLUENT_RAMP
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, value)| *value)
    }
}

impl FluentSpacingTokens {
    /// True if `value` is one of the ramp's values.
    #[must_use]
    pub fn is_standard(value: f32) -> bool {
        FLUENT_RAMP.iter().any(|(_, v)| *v == value)
    }
}

/// Resolve a token, falling back to [`DEFAULT_TOKEN`] and then
/// [`DEFAULT_SPACING`]. Results are sanitized to `>= 0`.
#[must_use]
pub fn resolve(tokens: &dyn SpacingTokens, token: &str) -> f32 {
    let value = tokens
        .lookup(token)
        .or_else(|| tokens.lookup(DEFAULT_TOKEN))
        .unwrap_or(DEFAULT_SPACING);
    gridflow_core::geometry::non_negative(value)
}

/// Round to the nearest multiple of [`BASE_UNIT`] (halves round up).
#[must_use]
pub fn snap_to_base_unit(value: f32) -> f32 {
    let value = gridflow_core::geometry::non_negative(value);
    (value / BASE_UNIT + 0.5).floor() * BASE_UNIT
}

/// True if `value` already sits on the base grid.
#[must_use]
pub fn is_on_base_unit(value: f32) -> bool {
    (value % BASE_UNIT).abs() < f32::EPSILON
}
