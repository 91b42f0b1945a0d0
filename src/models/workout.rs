// ABOUTME: Workout aggregate with its flat ordered element timeline and sparse patch merge
// ABOUTME: Elements fuse identity and payload per slot; also derives per-session performance metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! The recorded workout timeline.
//!
//! A [`Workout`] owns a flat ordered sequence of [`WorkoutElement`] slots.
//! Each slot carries its 1-based position plus the full tagged payload
//! ([`ElementKind::Set`] or [`ElementKind::Rest`]); there is no separate
//! detail record to keep in lockstep, so changing a slot's variant means
//! replacing the slot, never retagging it.
//!
//! Elements bound to a routine are a frozen snapshot taken at creation time;
//! editing the routine later never rewrites them.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::limits;
use crate::errors::{CoreError, CoreResult};
use crate::sequence::{self, Positioned};

use super::exercise::ExerciseId;
use super::routine::RoutineId;
use super::FieldPatch;

/// Stable identifier of a workout within storage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct WorkoutId(i64);

impl WorkoutId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for WorkoutId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for WorkoutId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Payload of one timeline slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A recorded exercise set: actual performed values plus the targets
    /// copied from the generating routine (all optional).
    Set {
        /// Exercise performed; presence of this field is what makes the
        /// slot a set.
        exercise_id: ExerciseId,
        /// Actual repetitions.
        reps: Option<u32>,
        /// Actual duration in seconds.
        time: Option<u32>,
        /// Actual weight in kilograms.
        weight: Option<f32>,
        /// Actual rate of perceived exertion.
        rpe: Option<f32>,
        /// Planned repetitions from the routine.
        target_reps: Option<u32>,
        /// Planned duration from the routine.
        target_time: Option<u32>,
        /// Planned weight from the routine.
        target_weight: Option<f32>,
        /// Planned exertion from the routine.
        target_rpe: Option<f32>,
        /// Whether the timer advances without user confirmation.
        automatic: bool,
    },
    /// A rest interval between sets.
    Rest {
        /// Planned rest duration in seconds.
        target_time: Option<u32>,
        /// Whether the timer advances without user confirmation.
        automatic: bool,
    },
}

impl ElementKind {
    /// Whether this payload is a set.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set { .. })
    }

    fn validate(&self, path: &str) -> CoreResult<()> {
        match self {
            Self::Set {
                weight,
                rpe,
                target_weight,
                target_rpe,
                ..
            } => {
                check_weight(*weight, path, "weight")?;
                check_weight(*target_weight, path, "target_weight")?;
                check_rpe(*rpe, path, "rpe")?;
                check_rpe(*target_rpe, path, "target_rpe")?;
            }
            Self::Rest { .. } => {}
        }
        Ok(())
    }
}

fn check_weight(value: Option<f32>, path: &str, name: &str) -> CoreResult<()> {
    if let Some(weight) = value {
        if !weight.is_finite() || weight < 0.0 {
            return Err(CoreError::validation(
                format!("{path}.{name}"),
                "must be a finite non-negative number",
            ));
        }
    }
    Ok(())
}

fn check_rpe(value: Option<f32>, path: &str, name: &str) -> CoreResult<()> {
    if let Some(rpe) = value {
        if !rpe.is_finite() || rpe < limits::RPE_MIN || rpe > limits::RPE_MAX {
            return Err(CoreError::validation(
                format!("{path}.{name}"),
                "must be between 0 and 10",
            ));
        }
    }
    Ok(())
}

/// One timeline slot: position plus payload, fused. Position is only ever
/// written by the sequence kernel when the owning workout mutates its list.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutElement {
    position: u32,
    kind: ElementKind,
}

impl WorkoutElement {
    /// Wrap a payload; position is assigned when attached to a workout.
    #[must_use]
    pub const fn new(kind: ElementKind) -> Self {
        Self { position: 0, kind }
    }

    /// Current 1-based position in the timeline.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Slot payload.
    #[must_use]
    pub const fn kind(&self) -> &ElementKind {
        &self.kind
    }
}

impl Positioned for WorkoutElement {
    fn position(&self) -> u32 {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}

/// Sparse update for the element at `position`. Fields left at
/// [`FieldPatch::Keep`] are untouched. Set-only fields aimed at a rest slot
/// are a validation error: variants change by delete + recreate, not by
/// patching.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementPatch {
    /// 1-based position of the targeted element.
    pub position: u32,
    /// New exercise reference (sets only; never clearable).
    pub exercise_id: FieldPatch<ExerciseId>,
    /// Actual repetitions.
    pub reps: FieldPatch<u32>,
    /// Actual duration in seconds.
    pub time: FieldPatch<u32>,
    /// Actual weight in kilograms.
    pub weight: FieldPatch<f32>,
    /// Actual rate of perceived exertion.
    pub rpe: FieldPatch<f32>,
    /// Planned repetitions.
    pub target_reps: FieldPatch<u32>,
    /// Planned duration (sets and rests).
    pub target_time: FieldPatch<u32>,
    /// Planned weight.
    pub target_weight: FieldPatch<f32>,
    /// Planned exertion.
    pub target_rpe: FieldPatch<f32>,
    /// Timer auto-advance flag (sets and rests).
    pub automatic: FieldPatch<bool>,
}

impl ElementPatch {
    /// Empty patch addressing `position`; every field starts at `Keep`.
    #[must_use]
    pub fn at(position: u32) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Whether any field that exists only on sets is being touched.
    fn touches_set_only_fields(&self) -> bool {
        !(self.exercise_id.is_keep()
            && self.reps.is_keep()
            && self.time.is_keep()
            && self.weight.is_keep()
            && self.rpe.is_keep()
            && self.target_reps.is_keep()
            && self.target_weight.is_keep()
            && self.target_rpe.is_keep())
    }

    /// Exercise reference introduced by this patch, if any.
    #[must_use]
    pub const fn new_exercise_id(&self) -> Option<ExerciseId> {
        match self.exercise_id {
            FieldPatch::Set(id) => Some(id),
            FieldPatch::Keep | FieldPatch::Clear => None,
        }
    }
}

/// A recorded training session owned by one user: a date, notes, and the
/// flat element timeline. `routine_id` records which plan generated the
/// elements, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    /// Storage identifier.
    pub id: WorkoutId,
    /// Owning user.
    pub user_id: Uuid,
    /// Plan this workout was generated from; `None` for free sessions.
    pub routine_id: Option<RoutineId>,
    /// Session date.
    pub date: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
    elements: Vec<WorkoutElement>,
}

impl Workout {
    /// New unbound workout with an empty timeline.
    #[must_use]
    pub const fn new(id: WorkoutId, user_id: Uuid, date: NaiveDate) -> Self {
        Self {
            id,
            user_id,
            routine_id: None,
            date,
            notes: None,
            elements: Vec::new(),
        }
    }

    /// Ordered timeline slots.
    #[must_use]
    pub fn elements(&self) -> &[WorkoutElement] {
        &self.elements
    }

    /// Destructive full replace of the timeline: discard every existing
    /// slot and rebuild from `kinds` in order, assigning fresh positions.
    pub fn set_elements(&mut self, kinds: Vec<ElementKind>) {
        self.elements = kinds.into_iter().map(WorkoutElement::new).collect();
        sequence::renumber(&mut self.elements);
    }

    /// Merge one sparse update into the element at `patch.position`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] with kind `element position` when the
    /// position is not occupied, and [`CoreError::Validation`] when the
    /// patch carries set-only fields for a rest slot or tries to clear a
    /// set's exercise reference.
    pub fn apply_element_patch(&mut self, patch: &ElementPatch) -> CoreResult<()> {
        let occupied = patch.position >= 1 && (patch.position as usize) <= self.elements.len();
        if !occupied {
            return Err(CoreError::not_found("element position", patch.position));
        }
        let index = patch.position as usize - 1;
        let path = format!("elements[{index}]");
        match &mut self.elements[index].kind {
            ElementKind::Set {
                exercise_id,
                reps,
                time,
                weight,
                rpe,
                target_reps,
                target_time,
                target_weight,
                target_rpe,
                automatic,
            } => {
                if matches!(patch.exercise_id, FieldPatch::Clear) {
                    return Err(CoreError::validation(
                        format!("{path}.exercise_id"),
                        "cannot be cleared; delete the element and recreate it as a rest",
                    ));
                }
                patch.exercise_id.apply_to_required(exercise_id);
                patch.reps.apply_to_option(reps);
                patch.time.apply_to_option(time);
                patch.weight.apply_to_option(weight);
                patch.rpe.apply_to_option(rpe);
                patch.target_reps.apply_to_option(target_reps);
                patch.target_time.apply_to_option(target_time);
                patch.target_weight.apply_to_option(target_weight);
                patch.target_rpe.apply_to_option(target_rpe);
                patch.automatic.apply_to_required(automatic);
            }
            ElementKind::Rest {
                target_time,
                automatic,
            } => {
                if patch.touches_set_only_fields() {
                    return Err(CoreError::validation(
                        path,
                        "fields do not match the rest element at this position; \
                         delete and recreate to change the variant",
                    ));
                }
                patch.target_time.apply_to_option(target_time);
                patch.automatic.apply_to_required(automatic);
            }
        }
        Ok(())
    }

    /// Re-check value invariants before a commit.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for the first out-of-range value.
    ///
    /// # Panics
    ///
    /// Panics if timeline positions are not contiguous; that is a bug in
    /// this crate, not caller input.
    pub fn validate(&self) -> CoreResult<()> {
        assert!(
            sequence::is_contiguous(&self.elements),
            "timeline positions must be contiguous"
        );
        for (index, element) in self.elements.iter().enumerate() {
            element.kind.validate(&format!("elements[{index}]"))?;
        }
        Ok(())
    }

    /// Distinct exercises recorded in this session.
    #[must_use]
    pub fn exercise_ids(&self) -> BTreeSet<ExerciseId> {
        self.elements
            .iter()
            .filter_map(|element| match &element.kind {
                ElementKind::Set { exercise_id, .. } => Some(*exercise_id),
                ElementKind::Rest { .. } => None,
            })
            .collect()
    }

    /// Mean of recorded repetitions over sets that have them.
    #[must_use]
    pub fn avg_reps(&self) -> Option<f32> {
        average(self.set_values(|kind| match kind {
            ElementKind::Set { reps, .. } => reps.map(|v| v as f32),
            ElementKind::Rest { .. } => None,
        }))
    }

    /// Mean of recorded set durations over sets that have them.
    #[must_use]
    pub fn avg_time(&self) -> Option<f32> {
        average(self.set_values(|kind| match kind {
            ElementKind::Set { time, .. } => time.map(|v| v as f32),
            ElementKind::Rest { .. } => None,
        }))
    }

    /// Mean of recorded weights over sets that have them.
    #[must_use]
    pub fn avg_weight(&self) -> Option<f32> {
        average(self.set_values(|kind| match kind {
            ElementKind::Set { weight, .. } => *weight,
            ElementKind::Rest { .. } => None,
        }))
    }

    /// Mean of recorded exertion over sets that have it.
    #[must_use]
    pub fn avg_rpe(&self) -> Option<f32> {
        average(self.set_values(|kind| match kind {
            ElementKind::Set { rpe, .. } => *rpe,
            ElementKind::Rest { .. } => None,
        }))
    }

    /// Total volume load: Σ reps × weight over sets with reps, counting
    /// unweighted sets as bodyweight (reps alone).
    #[must_use]
    pub fn volume_load(&self) -> u32 {
        self.elements
            .iter()
            .filter_map(|element| match &element.kind {
                ElementKind::Set { reps, weight, .. } => reps.map(|reps| {
                    weight.map_or(reps, |weight| (reps as f32 * weight).round() as u32)
                }),
                ElementKind::Rest { .. } => None,
            })
            .sum()
    }

    /// Total time under tension: Σ reps × time over timed sets, assuming one
    /// rep when unset. `None` when no set is timed.
    #[must_use]
    pub fn time_under_tension(&self) -> Option<u32> {
        let per_set: Vec<Option<u32>> = self
            .elements
            .iter()
            .map(|element| match &element.kind {
                ElementKind::Set { reps, time, .. } => time.map(|t| reps.unwrap_or(1) * t),
                ElementKind::Rest { .. } => None,
            })
            .collect();
        if per_set.iter().all(Option::is_none) {
            return None;
        }
        Some(per_set.into_iter().flatten().sum())
    }

    fn set_values(&self, pick: impl Fn(&ElementKind) -> Option<f32>) -> Vec<f32> {
        self.elements
            .iter()
            .filter_map(|element| pick(&element.kind))
            .collect()
    }
}

fn average(values: Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn set(exercise: i64, reps: Option<u32>, weight: Option<f32>) -> ElementKind {
        ElementKind::Set {
            exercise_id: ExerciseId::new(exercise),
            reps,
            time: None,
            weight,
            rpe: None,
            target_reps: Some(10),
            target_time: None,
            target_weight: None,
            target_rpe: None,
            automatic: false,
        }
    }

    fn rest(target_time: Option<u32>) -> ElementKind {
        ElementKind::Rest {
            target_time,
            automatic: true,
        }
    }

    fn sample_workout() -> Workout {
        let mut workout = Workout::new(WorkoutId::new(1), Uuid::new_v4(), date());
        workout.set_elements(vec![
            set(1, Some(10), Some(60.0)),
            rest(Some(60)),
            set(1, Some(8), Some(60.0)),
        ]);
        workout
    }

    #[test]
    fn test_set_elements_assigns_contiguous_positions() {
        let workout = sample_workout();
        let positions: Vec<u32> = workout
            .elements()
            .iter()
            .map(WorkoutElement::position)
            .collect();
        assert_eq!(positions, vec![1, 2, 3]);
        workout.validate().unwrap();
    }

    #[test]
    fn test_replace_is_destructive() {
        let mut workout = sample_workout();
        workout.set_elements(vec![rest(None)]);
        assert_eq!(workout.elements().len(), 1);
        assert_eq!(workout.elements()[0].position(), 1);
    }

    #[test]
    fn test_patch_merges_only_supplied_fields() {
        let mut workout = sample_workout();
        let mut patch = ElementPatch::at(1);
        patch.reps = FieldPatch::Set(12);
        patch.rpe = FieldPatch::Set(8.5);
        workout.apply_element_patch(&patch).unwrap();

        let ElementKind::Set {
            reps,
            weight,
            rpe,
            target_reps,
            ..
        } = workout.elements()[0].kind()
        else {
            panic!("first element must stay a set");
        };
        assert_eq!(*reps, Some(12));
        assert_eq!(*rpe, Some(8.5));
        // untouched fields keep their values
        assert_eq!(*weight, Some(60.0));
        assert_eq!(*target_reps, Some(10));
        // sibling untouched
        assert_eq!(workout.elements()[1].kind(), &rest(Some(60)));
    }

    #[test]
    fn test_patch_clears_nullable_field() {
        let mut workout = sample_workout();
        let mut patch = ElementPatch::at(1);
        patch.weight = FieldPatch::Clear;
        workout.apply_element_patch(&patch).unwrap();

        let ElementKind::Set { weight, .. } = workout.elements()[0].kind() else {
            panic!("first element must stay a set");
        };
        assert_eq!(*weight, None);
    }

    #[test]
    fn test_patch_beyond_length_is_not_found() {
        let mut workout = sample_workout();
        let err = workout.apply_element_patch(&ElementPatch::at(4)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotFound {
                kind: "element position",
                ..
            }
        ));
        let err = workout.apply_element_patch(&ElementPatch::at(0)).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_patch_variant_mismatch_is_rejected() {
        let mut workout = sample_workout();
        let mut patch = ElementPatch::at(2); // a rest
        patch.reps = FieldPatch::Set(5);
        let err = workout.apply_element_patch(&patch).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        // the rest is untouched
        assert_eq!(workout.elements()[1].kind(), &rest(Some(60)));
    }

    #[test]
    fn test_patch_rest_target_time() {
        let mut workout = sample_workout();
        let mut patch = ElementPatch::at(2);
        patch.target_time = FieldPatch::Set(90);
        patch.automatic = FieldPatch::Set(false);
        workout.apply_element_patch(&patch).unwrap();
        assert_eq!(
            workout.elements()[1].kind(),
            &ElementKind::Rest {
                target_time: Some(90),
                automatic: false
            }
        );
    }

    #[test]
    fn test_patch_cannot_clear_set_exercise() {
        let mut workout = sample_workout();
        let mut patch = ElementPatch::at(1);
        patch.exercise_id = FieldPatch::Clear;
        let err = workout.apply_element_patch(&patch).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn test_metrics_over_sets_only() {
        let workout = sample_workout();
        assert_eq!(workout.exercise_ids().len(), 1);
        assert_eq!(workout.avg_reps(), Some(9.0));
        assert_eq!(workout.avg_weight(), Some(60.0));
        assert_eq!(workout.avg_rpe(), None);
        // 10 * 60 + 8 * 60
        assert_eq!(workout.volume_load(), 1080);
        // no set carries a time
        assert_eq!(workout.time_under_tension(), None);
    }

    #[test]
    fn test_time_under_tension_assumes_one_rep_when_unset() {
        let mut workout = Workout::new(WorkoutId::new(2), Uuid::new_v4(), date());
        workout.set_elements(vec![ElementKind::Set {
            exercise_id: ExerciseId::new(3),
            reps: None,
            time: Some(45),
            weight: None,
            rpe: None,
            target_reps: None,
            target_time: None,
            target_weight: None,
            target_rpe: None,
            automatic: false,
        }]);
        assert_eq!(workout.time_under_tension(), Some(45));
    }

    #[test]
    fn test_validate_rejects_out_of_range_rpe() {
        let mut workout = sample_workout();
        let mut patch = ElementPatch::at(1);
        patch.rpe = FieldPatch::Set(11.0);
        workout.apply_element_patch(&patch).unwrap();
        let err = workout.validate().unwrap_err();
        assert_eq!(
            err,
            CoreError::validation("elements[0].rpe", "must be between 0 and 10")
        );
    }

    #[test]
    fn test_empty_timeline_is_valid() {
        let workout = Workout::new(WorkoutId::new(3), Uuid::new_v4(), date());
        assert!(workout.elements().is_empty());
        workout.validate().unwrap();
        assert_eq!(workout.avg_reps(), None);
        assert_eq!(workout.volume_load(), 0);
    }
}
