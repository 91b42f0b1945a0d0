// ABOUTME: Domain models for the training core: exercises, routine trees, workout timelines
// ABOUTME: Also defines the tri-state FieldPatch used by sparse patch merges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! # Data Models
//!
//! In-memory representations of the training-plan domain:
//!
//! - [`Exercise`]: referenced entity resolved through storage
//! - [`Routine`] / [`RoutineTree`] / [`Part`]: the recursive plan hierarchy
//! - [`Workout`] / [`WorkoutElement`]: the flat recorded timeline
//!
//! Ordered scopes (section children, workout elements) are mutated only
//! through operations that re-run the sequence kernel, never by direct field
//! assignment, so positions stay contiguous at all times.

pub mod exercise;
pub mod routine;
pub mod workout;

pub use exercise::{Exercise, ExerciseId};
pub use routine::{
    Activity, MoveDirection, Part, PartId, PartRef, Routine, RoutineId, RoutineTree, Section,
};
pub use workout::{ElementKind, ElementPatch, Workout, WorkoutElement, WorkoutId};

/// Tri-state field update used by sparse patches: leave the field alone,
/// clear it, or set a new value. Wire documents map "absent" to [`Keep`] and
/// `null` to [`Clear`] (only for fields whose domain allows clearing).
///
/// [`Keep`]: FieldPatch::Keep
/// [`Clear`]: FieldPatch::Clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldPatch<T> {
    /// Field absent from the patch document; existing value stands.
    #[default]
    Keep,
    /// Explicit `null`; reset the field to absent.
    Clear,
    /// Replace the existing value.
    Set(T),
}

impl<T> FieldPatch<T> {
    /// Whether this patch leaves the field untouched.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Apply to an optional slot: `Clear` empties it, `Set` fills it.
    pub fn apply_to_option(self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value),
        }
    }

    /// Apply to a required slot. `Clear` is ignored: callers reject or
    /// tolerate null-on-required before the merge, depending on the field.
    pub fn apply_to_required(self, slot: &mut T) {
        if let Self::Set(value) = self {
            *slot = value;
        }
    }
}
