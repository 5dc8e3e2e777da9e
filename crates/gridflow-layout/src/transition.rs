#![forbid(unsafe_code)]

//! Staggered transition plans.
//!
//! The scheduler diffs two [`LayoutResult`]s and returns a value plan: which
//! item moves from where to where, and after what delay. It never drives a
//! tween. Every call produces a new generation; callers holding a stale
//! generation should retarget rather than queue.

use std::env;
use std::time::Duration;

use gridflow_core::geometry::Rect;

use crate::model::ItemId;
use crate::result::LayoutResult;

/// Environment variable consulted by [`EnvMotionPreference`].
pub const ENV_REDUCED_MOTION: &str = "GRIDFLOW_REDUCED_MOTION";

/// Source of the user's reduced-motion preference.
pub trait MotionPreference {
    fn prefers_reduced_motion(&self) -> bool;
}

impl<F> MotionPreference for F
where
    F: Fn() -> bool,
{
    fn prefers_reduced_motion(&self) -> bool {
        self()
    }
}

/// Reads [`ENV_REDUCED_MOTION`] (`1`/`true`/`yes`/`on`) on every query.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvMotionPreference;

impl MotionPreference for EnvMotionPreference {
    fn prefers_reduced_motion(&self) -> bool {
        env::var(ENV_REDUCED_MOTION).is_ok_and(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }
}

/// Easing curve control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CubicBezier {
    /// Fluent "decelerate max" curve.
    pub const DECELERATE: Self = Self {
        x1: 0.1,
        y1: 0.9,
        x2: 0.2,
        y2: 1.0,
    };
}

/// Timing tokens for a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTokens {
    pub stagger_step: Duration,
    pub duration: Duration,
    /// Upper bound on the last entry's delay.
    pub max_spread: Duration,
    pub easing: CubicBezier,
}

impl Default for MotionTokens {
    fn default() -> Self {
        Self {
            stagger_step: Duration::from_millis(20),
            duration: Duration::from_millis(300),
            max_spread: Duration::from_millis(240),
            easing: CubicBezier::DECELERATE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Present in both layouts with a different rectangle.
    Move,
    /// New in this layout; grows from the centre of its final rectangle.
    Enter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionEntry {
    pub id: ItemId,
    pub kind: TransitionKind,
    pub from: Rect,
    pub to: Rect,
    pub delay: Duration,
    pub duration: Duration,
}

/// A generation-stamped set of transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub generation: u64,
    pub entries: Vec<TransitionEntry>,
    pub easing: CubicBezier,
}

impl TransitionPlan {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entry(&self, id: ItemId) -> Option<&TransitionEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Delay of the last entry (zero for an empty plan).
    #[must_use]
    pub fn spread(&self) -> Duration {
        self.entries.last().map_or(Duration::ZERO, |e| e.delay)
    }
}

/// Produces plans and tracks the current generation.
#[derive(Debug, Clone, Default)]
pub struct TransitionScheduler {
    tokens: MotionTokens,
    generation: u64,
}

impl TransitionScheduler {
    #[must_use]
    pub fn new(tokens: MotionTokens) -> Self {
        Self {
            tokens,
            generation: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &MotionTokens {
        &self.tokens
    }

    /// Generation of the most recent plan (0 before the first).
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if `generation` belongs to the most recent plan.
    #[inline]
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Diff `previous` against `next`. Always advances the generation, so
    /// an empty plan also supersedes earlier ones.
    pub fn schedule(
        &mut self,
        previous: Option<&LayoutResult>,
        next: &LayoutResult,
        animated: bool,
        reduced_motion: bool,
    ) -> TransitionPlan {
        self.generation += 1;
        let mut plan = TransitionPlan {
            generation: self.generation,
            entries: Vec::new(),
            easing: self.tokens.easing,
        };
        let Some(previous) = previous else {
            return plan;
        };
        if !animated || reduced_motion {
            tracing::trace!(
                generation = plan.generation,
                animated,
                reduced_motion,
                "transitions suppressed"
            );
            return plan;
        }

        let mut ordered = next.flow_order();
        ordered.retain(|item| previous.item_rect(item.id) != Some(item.rect));
        let count = ordered.len();
        if count == 0 {
            return plan;
        }
        let step = self.step_for(count);

        plan.entries = ordered
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let (kind, from) = match previous.item_rect(item.id) {
                    Some(from) => (TransitionKind::Move, from),
                    None => (TransitionKind::Enter, item.rect.collapsed_to_center()),
                };
                TransitionEntry {
                    id: item.id,
                    kind,
                    from,
                    to: item.rect,
                    delay: step * u32::try_from(index).unwrap_or(u32::MAX),
                    duration: self.tokens.duration,
                }
            })
            .collect();

        tracing::trace!(
            generation = plan.generation,
            entries = plan.entries.len(),
            spread_ms = plan.spread().as_millis() as u64,
            "transition plan"
        );
        plan
    }

    /// Stagger step compressed so `(count - 1) * step <= max_spread`.
    fn step_for(&self, count: usize) -> Duration {
        let intervals = u32::try_from(count.saturating_sub(1)).unwrap_or(u32::MAX);
        if intervals == 0 {
            return self.tokens.stagger_step;
        }
        let natural = self.tokens.stagger_step.saturating_mul(intervals);
        if natural <= self.tokens.max_spread {
            self.tokens.stagger_step
        } else {
            self.tokens.max_spread / intervals
        }
    }
}
