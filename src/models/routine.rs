// ABOUTME: Routine aggregate and its recursive part tree stored as an arena keyed by part id
// ABOUTME: Structural edits, value validation, flattening to workout elements, and plan metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! The recursive training-plan hierarchy.
//!
//! A [`Routine`] owns a [`RoutineTree`]: every [`Part`] lives in one arena
//! map keyed by [`PartId`], and ordering is carried by [`PartRef`] edges
//! (id + position) held by the top level or by a section's children. The
//! sequence kernel maintains positions on those edge vectors, so the same
//! insert/remove/move code serves every nesting level.
//!
//! Methods taking indices or parent ids assert their contracts: services
//! translate and range-check client-supplied paths first (via
//! [`RoutineTree::resolve_scope`] and friends), which return recoverable
//! [`CoreError`] values instead.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{defaults, limits};
use crate::errors::{CoreError, CoreResult};
use crate::sequence::{self, Positioned};

use super::exercise::ExerciseId;
use super::workout::ElementKind;

/// Stable identifier of a routine within storage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RoutineId(i64);

impl RoutineId {
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

impl Display for RoutineId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RoutineId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Arena key of a [`Part`] inside one [`RoutineTree`]. Never leaves the
/// process; wire documents address parts by sibling-index paths instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartId(u64);

impl Display for PartId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Containment edge: which part occupies which 1-based position within its
/// sibling scope. Position is only ever written by the sequence kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRef {
    id: PartId,
    position: u32,
}

impl PartRef {
    fn new(id: PartId) -> Self {
        Self { id, position: 0 }
    }

    /// Arena key of the referenced part.
    #[must_use]
    pub const fn id(&self) -> PartId {
        self.id
    }

    /// Current 1-based position within the owning scope.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }
}

impl Positioned for PartRef {
    fn position(&self) -> u32 {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}

/// A group part: repeats its ordered children `rounds` times.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// How many times the children run; at least 1.
    pub rounds: u32,
    children: Vec<PartRef>,
}

impl Section {
    /// New section with no children.
    #[must_use]
    pub const fn new(rounds: u32) -> Self {
        Self {
            rounds,
            children: Vec::new(),
        }
    }

    /// Ordered child edges.
    #[must_use]
    pub fn children(&self) -> &[PartRef] {
        &self.children
    }
}

/// A leaf part: one exercise bout, or a rest when `exercise_id` is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    /// Referenced exercise; `None` denotes a rest activity.
    pub exercise_id: Option<ExerciseId>,
    /// Planned repetitions; 0 means unspecified.
    pub reps: u32,
    /// Planned duration in seconds; 0 means unspecified.
    pub time: u32,
    /// Planned weight in kilograms; 0 means unspecified.
    pub weight: f32,
    /// Planned rate of perceived exertion; 0 means unspecified.
    pub rpe: f32,
    /// Whether the timer advances without user confirmation.
    pub automatic: bool,
}

impl Activity {
    /// The editor default for a freshly inserted activity: all numeric
    /// fields zero, no exercise, automatic only when created as a rest.
    #[must_use]
    pub const fn empty(is_rest: bool) -> Self {
        Self {
            exercise_id: None,
            reps: 0,
            time: 0,
            weight: 0.0,
            rpe: 0.0,
            automatic: is_rest,
        }
    }

    /// Whether this activity is a rest (no exercise reference).
    #[must_use]
    pub const fn is_rest(&self) -> bool {
        self.exercise_id.is_none()
    }

    /// Snapshot this activity as a workout element: planned values become
    /// targets (zero meaning "no target"), performed values start unset.
    #[must_use]
    pub fn to_element(&self) -> ElementKind {
        self.exercise_id.map_or_else(
            || ElementKind::Rest {
                target_time: positive(self.time),
                automatic: self.automatic,
            },
            |exercise_id| ElementKind::Set {
                exercise_id,
                reps: None,
                time: None,
                weight: None,
                rpe: None,
                target_reps: positive(self.reps),
                target_time: positive(self.time),
                target_weight: positive_f32(self.weight),
                target_rpe: positive_f32(self.rpe),
                automatic: self.automatic,
            },
        )
    }

    fn validate(&self, path: &str) -> CoreResult<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(CoreError::validation(
                format!("{path}.weight"),
                "must be a finite non-negative number",
            ));
        }
        if !self.rpe.is_finite() || self.rpe < limits::RPE_MIN || self.rpe > limits::RPE_MAX {
            return Err(CoreError::validation(
                format!("{path}.rpe"),
                "must be between 0 and 10",
            ));
        }
        Ok(())
    }

    fn duration_seconds(&self) -> i64 {
        let reps = if self.reps > 0 {
            self.reps
        } else {
            defaults::ESTIMATED_REPS
        };
        let time = if self.time > 0 {
            self.time
        } else {
            defaults::ESTIMATED_REP_SECONDS
        };
        i64::from(reps) * i64::from(time)
    }
}

const fn positive(value: u32) -> Option<u32> {
    if value > 0 {
        Some(value)
    } else {
        None
    }
}

fn positive_f32(value: f32) -> Option<f32> {
    (value > 0.0).then_some(value)
}

/// A node in the routine hierarchy: either a group or a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Ordered group repeated `rounds` times.
    Section(Section),
    /// Leaf exercise bout or rest.
    Activity(Activity),
}

/// Direction of a sibling move within one scope. Moves never change a
/// part's parent scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Swap with the previous sibling; no-op for the first.
    Up,
    /// Swap with the next sibling; no-op for the last.
    Down,
}

/// Arena-backed part hierarchy of one routine.
///
/// All parts live in `nodes`; `top` holds the routine's top-level section
/// edges. Every id referenced by an edge resolves in `nodes`, and every node
/// is referenced by exactly one edge; enforced by construction and
/// re-asserted in [`RoutineTree::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineTree {
    nodes: BTreeMap<PartId, Part>,
    top: Vec<PartRef>,
    next_id: u64,
}

impl RoutineTree {
    /// Empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            top: Vec::new(),
            next_id: 1,
        }
    }

    /// Ordered top-level section edges.
    #[must_use]
    pub fn top(&self) -> &[PartRef] {
        &self.top
    }

    /// Number of live parts in the arena.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a part by arena id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live in this tree; edges obtained from this
    /// tree always resolve.
    #[must_use]
    pub fn part(&self, id: PartId) -> &Part {
        let Some(part) = self.nodes.get(&id) else {
            unreachable!("part {id} must be live in the arena")
        };
        part
    }

    /// Drop every part. Arena ids are not reused across rebuilds.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.top.clear();
    }

    /// Resolve a parent-scope path (sibling indices from the top level) to
    /// the owning section, or `None` for the top level itself. Every
    /// addressed segment must be a section; activities have no child scope.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] with kind `part path` when a segment
    /// is out of range or addresses an activity.
    pub fn resolve_scope(&self, parent_path: &[usize]) -> CoreResult<Option<PartId>> {
        let mut parent: Option<PartId> = None;
        for (depth, &segment) in parent_path.iter().enumerate() {
            let not_found = || CoreError::not_found("part path", render_path(&parent_path[..=depth]));
            let Some(edge) = self.scope(parent).get(segment) else {
                return Err(not_found());
            };
            match self.part(edge.id) {
                Part::Section(_) => parent = Some(edge.id),
                Part::Activity(_) => return Err(not_found()),
            }
        }
        Ok(parent)
    }

    /// Resolve a full part path to its parent scope and final sibling index.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] when the path is empty, a segment is
    /// out of range, or the final index does not address a live part.
    pub fn resolve_slot(&self, path: &[usize]) -> CoreResult<(Option<PartId>, usize)> {
        let Some((&index, parent_path)) = path.split_last() else {
            return Err(CoreError::not_found("part path", "(empty)"));
        };
        let parent = self.resolve_scope(parent_path)?;
        if index >= self.scope(parent).len() {
            return Err(CoreError::not_found("part path", render_path(path)));
        }
        Ok((parent, index))
    }

    /// Number of siblings in the addressed scope.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a live section of this tree.
    #[must_use]
    pub fn scope_len(&self, parent: Option<PartId>) -> usize {
        self.scope(parent).len()
    }

    /// Insert `part` at `index` within the addressed scope and return its
    /// arena id. Section payloads must arrive childless; subtrees are built
    /// by inserting into the fresh section's scope.
    ///
    /// # Panics
    ///
    /// Panics if `index` exceeds the scope length, if a non-section is
    /// placed at the top level, or if a section payload already has
    /// children.
    pub fn insert_part(&mut self, parent: Option<PartId>, index: usize, part: Part) -> PartId {
        assert!(
            parent.is_some() || matches!(part, Part::Section(_)),
            "top-level parts must be sections"
        );
        if let Part::Section(section) = &part {
            assert!(
                section.children.is_empty(),
                "sections are inserted childless and filled in place"
            );
        }
        let id = self.alloc(part);
        sequence::insert(self.scope_mut(parent), index, PartRef::new(id));
        id
    }

    /// Remove the part at `index` within the addressed scope, cascading
    /// through its whole subtree, and renumber the remaining siblings.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the scope.
    pub fn remove_part_at(&mut self, parent: Option<PartId>, index: usize) {
        let edge = sequence::remove(self.scope_mut(parent), index);
        self.remove_subtree(edge.id);
    }

    /// Move the part at `index` one step within its scope. Returns whether
    /// anything moved: moving the first sibling up or the last down is a
    /// no-op.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the scope.
    pub fn move_part_at(
        &mut self,
        parent: Option<PartId>,
        index: usize,
        direction: MoveDirection,
    ) -> bool {
        let scope = self.scope_mut(parent);
        assert!(
            index < scope.len(),
            "move index {index} out of range for scope of length {}",
            scope.len()
        );
        let target = match direction {
            MoveDirection::Up => {
                if index == 0 {
                    return false;
                }
                index - 1
            }
            MoveDirection::Down => {
                if index + 1 == scope.len() {
                    return false;
                }
                index + 1
            }
        };
        sequence::move_item(scope, index, target);
        true
    }

    /// Re-check every value invariant before a commit: section rounds,
    /// activity ranges. Field paths in errors use wire naming
    /// (`sections[0].parts[2].rpe`).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for the first violated value range.
    ///
    /// # Panics
    ///
    /// Panics if a structural invariant (contiguity, single-parent
    /// ownership) is broken; that is a bug in this crate, not caller input.
    pub fn validate(&self) -> CoreResult<()> {
        assert_eq!(
            self.count_scope(&self.top),
            self.nodes.len(),
            "every arena node must be reachable from exactly one edge"
        );
        self.validate_scope(&self.top, "sections")
    }

    /// Flatten the tree into workout element kinds in document order. Each
    /// section's children are emitted `rounds` times; nested sections
    /// multiply. Activities snapshot their planned values as targets.
    #[must_use]
    pub fn generate_elements(&self) -> Vec<ElementKind> {
        let mut elements = Vec::new();
        self.flatten_scope(&self.top, &mut elements);
        elements
    }

    /// Estimated total duration of one pass through the plan.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.scope_duration_seconds(&self.top))
    }

    /// Number of non-rest activities across all unrolled rounds.
    #[must_use]
    pub fn num_sets(&self) -> u32 {
        self.scope_num_sets(&self.top)
    }

    /// Distinct exercises referenced anywhere in the tree.
    #[must_use]
    pub fn exercise_ids(&self) -> BTreeSet<ExerciseId> {
        let mut ids = BTreeSet::new();
        self.collect_exercises(&self.top, &mut ids);
        ids
    }

    fn alloc(&mut self, part: Part) -> PartId {
        let id = PartId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, part);
        id
    }

    fn scope(&self, parent: Option<PartId>) -> &[PartRef] {
        match parent {
            None => &self.top,
            Some(id) => match self.part(id) {
                Part::Section(section) => &section.children,
                Part::Activity(_) => unreachable!("scope parent {id} must be a section"),
            },
        }
    }

    fn scope_mut(&mut self, parent: Option<PartId>) -> &mut Vec<PartRef> {
        match parent {
            None => &mut self.top,
            Some(id) => {
                let Some(Part::Section(section)) = self.nodes.get_mut(&id) else {
                    unreachable!("scope parent {id} must be a live section")
                };
                &mut section.children
            }
        }
    }

    fn remove_subtree(&mut self, id: PartId) {
        let Some(part) = self.nodes.remove(&id) else {
            unreachable!("subtree root {id} must be live in the arena")
        };
        if let Part::Section(section) = part {
            for child in section.children {
                self.remove_subtree(child.id);
            }
        }
    }

    fn count_scope(&self, scope: &[PartRef]) -> usize {
        scope
            .iter()
            .map(|edge| match self.part(edge.id) {
                Part::Section(section) => 1 + self.count_scope(&section.children),
                Part::Activity(_) => 1,
            })
            .sum()
    }

    fn validate_scope(&self, scope: &[PartRef], prefix: &str) -> CoreResult<()> {
        assert!(
            sequence::is_contiguous(scope),
            "positions under `{prefix}` must be contiguous"
        );
        for (index, edge) in scope.iter().enumerate() {
            let path = format!("{prefix}[{index}]");
            match self.part(edge.id) {
                Part::Section(section) => {
                    if section.rounds < limits::MIN_SECTION_ROUNDS {
                        return Err(CoreError::validation(
                            format!("{path}.rounds"),
                            "must be at least 1",
                        ));
                    }
                    self.validate_scope(&section.children, &format!("{path}.parts"))?;
                }
                Part::Activity(activity) => activity.validate(&path)?,
            }
        }
        Ok(())
    }

    fn flatten_scope(&self, scope: &[PartRef], elements: &mut Vec<ElementKind>) {
        for edge in scope {
            match self.part(edge.id) {
                Part::Section(section) => {
                    for _ in 0..section.rounds {
                        self.flatten_scope(&section.children, elements);
                    }
                }
                Part::Activity(activity) => elements.push(activity.to_element()),
            }
        }
    }

    fn scope_duration_seconds(&self, scope: &[PartRef]) -> i64 {
        scope
            .iter()
            .map(|edge| match self.part(edge.id) {
                Part::Section(section) => {
                    self.scope_duration_seconds(&section.children) * i64::from(section.rounds)
                }
                Part::Activity(activity) => activity.duration_seconds(),
            })
            .sum()
    }

    fn scope_num_sets(&self, scope: &[PartRef]) -> u32 {
        scope
            .iter()
            .map(|edge| match self.part(edge.id) {
                Part::Section(section) => self.scope_num_sets(&section.children) * section.rounds,
                Part::Activity(activity) => u32::from(!activity.is_rest()),
            })
            .sum()
    }

    fn collect_exercises(&self, scope: &[PartRef], ids: &mut BTreeSet<ExerciseId>) {
        for edge in scope {
            match self.part(edge.id) {
                Part::Section(section) => self.collect_exercises(&section.children, ids),
                Part::Activity(activity) => {
                    if let Some(id) = activity.exercise_id {
                        ids.insert(id);
                    }
                }
            }
        }
    }
}

impl Default for RoutineTree {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn render_path(segments: &[usize]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

/// A named training plan owned by one user. The part hierarchy lives in
/// [`RoutineTree`]; `name` is unique within the user's namespace
/// (storage-enforced).
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    /// Storage identifier.
    pub id: RoutineId,
    /// Owning user.
    pub user_id: Uuid,
    /// Unique name within the user's routines.
    pub name: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Archived routines are kept but no longer offered for new workouts.
    pub archived: bool,
    /// The part hierarchy.
    pub tree: RoutineTree,
}

impl Routine {
    /// New routine with an empty tree.
    pub fn new(id: RoutineId, user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            user_id,
            name: name.into(),
            notes: None,
            archived: false,
            tree: RoutineTree::new(),
        }
    }

    /// Estimated duration of one pass through the plan.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.tree.duration()
    }

    /// Number of non-rest activities across all unrolled rounds.
    #[must_use]
    pub fn num_sets(&self) -> u32 {
        self.tree.num_sets()
    }

    /// Distinct exercises referenced by the plan.
    #[must_use]
    pub fn exercise_ids(&self) -> BTreeSet<ExerciseId> {
        self.tree.exercise_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(rounds: u32) -> Part {
        Part::Section(Section::new(rounds))
    }

    fn exercise_activity(exercise: i64, reps: u32) -> Part {
        Part::Activity(Activity {
            exercise_id: Some(ExerciseId::new(exercise)),
            reps,
            time: 0,
            weight: 0.0,
            rpe: 0.0,
            automatic: false,
        })
    }

    fn rest_activity(time: u32) -> Part {
        Part::Activity(Activity {
            time,
            ..Activity::empty(true)
        })
    }

    /// Section r=2 [ activity(ex 1), section r=2 [ activity(ex 2) ] ]
    fn nested_tree() -> RoutineTree {
        let mut tree = RoutineTree::new();
        let outer = tree.insert_part(None, 0, section(2));
        tree.insert_part(Some(outer), 0, exercise_activity(1, 5));
        let inner = tree.insert_part(Some(outer), 1, section(2));
        tree.insert_part(Some(inner), 0, exercise_activity(2, 8));
        tree
    }

    #[test]
    fn test_insert_keeps_positions_contiguous_per_scope() {
        let tree = nested_tree();
        assert_eq!(tree.top().len(), 1);
        assert_eq!(tree.top()[0].position(), 1);

        let Part::Section(outer) = tree.part(tree.top()[0].id()) else {
            panic!("top part must be a section");
        };
        let positions: Vec<u32> = outer.children().iter().map(PartRef::position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(tree.node_count(), 4);
        tree.validate().unwrap();
    }

    #[test]
    fn test_remove_cascades_and_leaves_no_orphans() {
        let mut tree = nested_tree();
        // removing the outer section drops the whole subtree
        tree.remove_part_at(None, 0);
        assert_eq!(tree.node_count(), 0);
        assert!(tree.top().is_empty());
        tree.validate().unwrap();
    }

    #[test]
    fn test_remove_nested_child_renumbers_scope() {
        let mut tree = nested_tree();
        let outer = tree.top()[0].id();
        tree.remove_part_at(Some(outer), 0);

        let Part::Section(section) = tree.part(outer) else {
            panic!("outer part must be a section");
        };
        assert_eq!(section.children().len(), 1);
        assert_eq!(section.children()[0].position(), 1);
        // outer section + inner section + inner activity remain
        assert_eq!(tree.node_count(), 3);
        tree.validate().unwrap();
    }

    #[test]
    fn test_boundary_moves_are_noops() {
        let mut tree = nested_tree();
        let outer = tree.top()[0].id();

        assert!(!tree.move_part_at(None, 0, MoveDirection::Up));
        assert!(!tree.move_part_at(None, 0, MoveDirection::Down));
        assert!(!tree.move_part_at(Some(outer), 0, MoveDirection::Up));
        assert!(!tree.move_part_at(Some(outer), 1, MoveDirection::Down));
        tree.validate().unwrap();
    }

    #[test]
    fn test_move_down_swaps_siblings() {
        let mut tree = nested_tree();
        let outer = tree.top()[0].id();
        assert!(tree.move_part_at(Some(outer), 0, MoveDirection::Down));

        let Part::Section(section) = tree.part(outer) else {
            panic!("outer part must be a section");
        };
        assert!(matches!(
            tree.part(section.children()[0].id()),
            Part::Section(_)
        ));
        assert!(matches!(
            tree.part(section.children()[1].id()),
            Part::Activity(_)
        ));
        assert_eq!(
            section
                .children()
                .iter()
                .map(PartRef::position)
                .collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_resolve_scope_rejects_bad_paths() {
        let tree = nested_tree();
        assert!(tree.resolve_scope(&[]).unwrap().is_none());
        assert!(tree.resolve_scope(&[0]).unwrap().is_some());
        assert!(tree.resolve_scope(&[0, 1]).unwrap().is_some());

        // out of range
        let err = tree.resolve_scope(&[3]).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "part path", .. }));
        // addresses an activity
        let err = tree.resolve_scope(&[0, 0]).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "part path", .. }));
    }

    #[test]
    fn test_resolve_slot_requires_live_index() {
        let tree = nested_tree();
        let (parent, index) = tree.resolve_slot(&[0, 1]).unwrap();
        assert!(parent.is_some());
        assert_eq!(index, 1);

        assert!(tree.resolve_slot(&[]).is_err());
        assert!(tree.resolve_slot(&[0, 2]).is_err());
    }

    #[test]
    fn test_flatten_unrolls_rounds_recursively() {
        let tree = nested_tree();
        let elements = tree.generate_elements();
        // 2 * (1 + 2 * 1) = 6
        assert_eq!(elements.len(), 6);

        let set_targets: Vec<Option<u32>> = elements
            .iter()
            .map(|kind| match kind {
                ElementKind::Set { target_reps, .. } => *target_reps,
                ElementKind::Rest { .. } => None,
            })
            .collect();
        assert_eq!(
            set_targets,
            vec![Some(5), Some(8), Some(8), Some(5), Some(8), Some(8)]
        );
    }

    #[test]
    fn test_flatten_maps_rest_activity_to_rest_element() {
        let mut tree = RoutineTree::new();
        let outer = tree.insert_part(None, 0, section(1));
        tree.insert_part(Some(outer), 0, rest_activity(60));
        tree.insert_part(Some(outer), 1, rest_activity(0));

        let elements = tree.generate_elements();
        assert_eq!(
            elements,
            vec![
                ElementKind::Rest {
                    target_time: Some(60),
                    automatic: true
                },
                ElementKind::Rest {
                    target_time: None,
                    automatic: true
                },
            ]
        );
    }

    #[test]
    fn test_validate_rejects_zero_rounds() {
        let mut tree = RoutineTree::new();
        tree.insert_part(None, 0, section(0));
        let err = tree.validate().unwrap_err();
        assert_eq!(
            err,
            CoreError::validation("sections[0].rounds", "must be at least 1")
        );
    }

    #[test]
    fn test_validate_rejects_rpe_out_of_range() {
        let mut tree = RoutineTree::new();
        let outer = tree.insert_part(None, 0, section(1));
        tree.insert_part(
            Some(outer),
            0,
            Part::Activity(Activity {
                rpe: 10.5,
                ..Activity::empty(false)
            }),
        );
        let err = tree.validate().unwrap_err();
        assert_eq!(
            err,
            CoreError::validation("sections[0].parts[0].rpe", "must be between 0 and 10")
        );
    }

    #[test]
    fn test_duration_and_num_sets() {
        let mut tree = RoutineTree::new();
        let outer = tree.insert_part(None, 0, section(3));
        tree.insert_part(
            Some(outer),
            0,
            Part::Activity(Activity {
                exercise_id: Some(ExerciseId::new(1)),
                reps: 10,
                time: 3,
                ..Activity::empty(false)
            }),
        );
        tree.insert_part(Some(outer), 1, rest_activity(60));

        // activity 10 * 3 = 30s, rest 1 * 60 = 60s, section x3
        assert_eq!(tree.duration(), Duration::seconds(270));
        assert_eq!(tree.num_sets(), 3);
        assert_eq!(tree.exercise_ids().len(), 1);
    }

    #[test]
    fn test_clear_empties_arena() {
        let mut tree = nested_tree();
        tree.clear();
        assert_eq!(tree.node_count(), 0);
        assert!(tree.top().is_empty());
        tree.validate().unwrap();
    }
}
