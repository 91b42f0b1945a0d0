// ABOUTME: Document codec between wire JSON and the in-memory tree/timeline models
// ABOUTME: Full decode validates values with field paths; sparse decode distinguishes absent from null
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! Bidirectional mapping between nested wire documents and the models.
//!
//! Field names here are the stable wire contract. Decoding happens in two
//! stages: serde gives shape (failure = [`CoreError::MalformedDocument`]),
//! then a validation walk checks value ranges with full field paths
//! (failure = [`CoreError::Validation`]). Numeric wire fields are signed so
//! a negative count surfaces as a field-level validation error instead of a
//! parse failure.
//!
//! Sparse patch documents are parsed tolerantly: an absent field means
//! "leave unchanged", and `null` clears only fields whose domain allows it
//! (tracked with the double-`Option` pattern). `null` on a non-nullable
//! field is treated as absent.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::limits;
use crate::errors::{CoreError, CoreResult};
use crate::models::{
    Activity, ElementKind, ElementPatch, ExerciseId, FieldPatch, Part, PartId, Routine, RoutineId,
    RoutineTree, Section, Workout,
};

/// Wire shape of a section: `{"rounds": int, "parts": [section|activity]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDoc {
    /// Repeat count for the children.
    pub rounds: i64,
    /// Nested parts in document order.
    pub parts: Vec<PartDoc>,
}

/// Wire shape of an activity; `exercise_id: null` (or absent) denotes a
/// rest activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDoc {
    /// Referenced exercise or `null` for a rest.
    pub exercise_id: Option<i64>,
    /// Planned repetitions.
    pub reps: i64,
    /// Planned duration in seconds.
    pub time: i64,
    /// Planned weight in kilograms.
    pub weight: f32,
    /// Planned rate of perceived exertion.
    pub rpe: f32,
    /// Timer auto-advance flag.
    pub automatic: bool,
}

/// A part is either a section or an activity; the presence of `rounds` +
/// `parts` selects the section shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartDoc {
    /// Nested group.
    Section(SectionDoc),
    /// Leaf activity.
    Activity(ActivityDoc),
}

impl PartDoc {
    /// Whether this document is a section.
    #[must_use]
    pub const fn is_section(&self) -> bool {
        matches!(self, Self::Section(_))
    }
}

/// Wire shape of a timeline element; the presence of `exercise_id` selects
/// the set shape, its absence the rest shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementDoc {
    /// Recorded exercise set.
    Set {
        /// Exercise performed.
        exercise_id: i64,
        /// Actual repetitions.
        reps: Option<i64>,
        /// Actual duration in seconds.
        time: Option<i64>,
        /// Actual weight in kilograms.
        weight: Option<f32>,
        /// Actual rate of perceived exertion.
        rpe: Option<f32>,
        /// Planned repetitions.
        target_reps: Option<i64>,
        /// Planned duration.
        target_time: Option<i64>,
        /// Planned weight.
        target_weight: Option<f32>,
        /// Planned exertion.
        target_rpe: Option<f32>,
        /// Timer auto-advance flag.
        automatic: bool,
    },
    /// Rest interval.
    Rest {
        /// Planned rest duration in seconds.
        target_time: Option<i64>,
        /// Timer auto-advance flag.
        automatic: bool,
    },
}

#[derive(Debug, Deserialize)]
struct RoutineCreateDoc {
    name: String,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    sections: Vec<SectionDoc>,
}

#[derive(Debug, Deserialize)]
struct RoutineReplaceDoc {
    name: String,
    notes: Option<String>,
    archived: bool,
    sections: Vec<SectionDoc>,
}

#[derive(Debug, Deserialize)]
struct RoutinePatchDoc {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    notes: Option<Option<String>>,
    #[serde(default)]
    archived: Option<bool>,
    #[serde(default)]
    sections: Option<Vec<SectionDoc>>,
}

#[derive(Debug, Deserialize)]
struct WorkoutCreateDoc {
    #[serde(default)]
    routine_id: Option<i64>,
    date: NaiveDate,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    elements: Option<Vec<ElementDoc>>,
}

#[derive(Debug, Deserialize)]
struct WorkoutReplaceDoc {
    date: NaiveDate,
    notes: Option<String>,
    elements: Vec<ElementDoc>,
}

#[derive(Debug, Deserialize)]
struct WorkoutPatchDoc {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    notes: Option<Option<String>>,
    #[serde(default)]
    elements: Option<Vec<ElementPatchDoc>>,
}

/// Sparse update for one element, addressed by 1-based `position`.
#[derive(Debug, Deserialize)]
struct ElementPatchDoc {
    position: i64,
    #[serde(default)]
    exercise_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    reps: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    time: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    weight: Option<Option<f32>>,
    #[serde(default, deserialize_with = "double_option")]
    rpe: Option<Option<f32>>,
    #[serde(default, deserialize_with = "double_option")]
    target_reps: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    target_time: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    target_weight: Option<Option<f32>>,
    #[serde(default, deserialize_with = "double_option")]
    target_rpe: Option<Option<f32>>,
    #[serde(default)]
    automatic: Option<bool>,
}

#[derive(Debug, Serialize)]
struct RoutineDoc {
    id: i64,
    name: String,
    notes: Option<String>,
    archived: bool,
    sections: Vec<SectionDoc>,
}

#[derive(Debug, Serialize)]
struct WorkoutDoc {
    id: i64,
    routine_id: Option<i64>,
    date: NaiveDate,
    notes: Option<String>,
    elements: Vec<ElementDoc>,
}

/// Validated content of a routine create/replace document, with the part
/// hierarchy already built.
#[derive(Debug)]
pub struct RoutineDraft {
    /// Routine name (non-empty).
    pub name: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Archived flag.
    pub archived: bool,
    /// Built and validated part hierarchy.
    pub tree: RoutineTree,
}

/// Validated content of a routine patch document.
#[derive(Debug)]
pub struct RoutinePatch {
    /// New name, when supplied.
    pub name: Option<String>,
    /// Notes update (absent / clear / set).
    pub notes: FieldPatch<String>,
    /// New archived flag, when supplied.
    pub archived: Option<bool>,
    /// Full replacement hierarchy, when `sections` was supplied.
    pub tree: Option<RoutineTree>,
}

/// Validated content of a workout create document.
#[derive(Debug)]
pub struct WorkoutDraft {
    /// Plan to bind to, when supplied.
    pub routine_id: Option<RoutineId>,
    /// Session date.
    pub date: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Explicit timeline; `None` asks for generation from the bound plan
    /// (or an empty timeline when unbound).
    pub elements: Option<Vec<ElementKind>>,
}

/// Validated content of a workout replace document.
#[derive(Debug)]
pub struct WorkoutReplace {
    /// Session date.
    pub date: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Full replacement timeline.
    pub elements: Vec<ElementKind>,
}

/// Validated content of a workout patch document.
#[derive(Debug)]
pub struct WorkoutPatch {
    /// New session date, when supplied.
    pub date: Option<NaiveDate>,
    /// Notes update (absent / clear / set).
    pub notes: FieldPatch<String>,
    /// Sparse element updates, when supplied.
    pub elements: Option<Vec<ElementPatch>>,
}

/// Decode and validate a routine create document. Absent `sections` means
/// the routine starts empty.
///
/// # Errors
///
/// [`CoreError::MalformedDocument`] when the shape does not parse,
/// [`CoreError::Validation`] when a value is out of range.
pub fn decode_routine_create(document: Value) -> CoreResult<RoutineDraft> {
    let doc: RoutineCreateDoc = serde_json::from_value(document)?;
    validate_name(&doc.name)?;
    validate_sections(&doc.sections)?;
    Ok(RoutineDraft {
        name: doc.name,
        notes: doc.notes,
        archived: doc.archived,
        tree: build_tree(&doc.sections),
    })
}

/// Decode and validate a routine replace document; the full shape is
/// required.
///
/// # Errors
///
/// [`CoreError::MalformedDocument`] when the shape does not parse,
/// [`CoreError::Validation`] when a value is out of range.
pub fn decode_routine_replace(document: Value) -> CoreResult<RoutineDraft> {
    let doc: RoutineReplaceDoc = serde_json::from_value(document)?;
    validate_name(&doc.name)?;
    validate_sections(&doc.sections)?;
    Ok(RoutineDraft {
        name: doc.name,
        notes: doc.notes,
        archived: doc.archived,
        tree: build_tree(&doc.sections),
    })
}

/// Decode and validate a routine patch document. A supplied `sections`
/// array is a destructive full replacement of the hierarchy.
///
/// # Errors
///
/// [`CoreError::MalformedDocument`] when the shape does not parse,
/// [`CoreError::Validation`] when a value is out of range.
pub fn decode_routine_patch(document: Value) -> CoreResult<RoutinePatch> {
    let doc: RoutinePatchDoc = serde_json::from_value(document)?;
    if let Some(name) = &doc.name {
        validate_name(name)?;
    }
    let tree = match &doc.sections {
        Some(sections) => {
            validate_sections(sections)?;
            Some(build_tree(sections))
        }
        None => None,
    };
    Ok(RoutinePatch {
        name: doc.name,
        notes: option_patch(doc.notes),
        archived: doc.archived,
        tree,
    })
}

/// Decode and validate a single part subtree (for branch replacement).
/// Error paths are rooted at `part`.
///
/// # Errors
///
/// [`CoreError::MalformedDocument`] when the shape does not parse,
/// [`CoreError::Validation`] when a value is out of range.
pub fn decode_part(document: Value) -> CoreResult<PartDoc> {
    let doc: PartDoc = serde_json::from_value(document)?;
    validate_part(&doc, "part")?;
    Ok(doc)
}

/// Decode and validate a workout create document.
///
/// # Errors
///
/// [`CoreError::MalformedDocument`] when the shape does not parse,
/// [`CoreError::Validation`] when a value is out of range.
pub fn decode_workout_create(document: Value) -> CoreResult<WorkoutDraft> {
    let doc: WorkoutCreateDoc = serde_json::from_value(document)?;
    let elements = match &doc.elements {
        Some(docs) => Some(elements_from_docs(docs)?),
        None => None,
    };
    Ok(WorkoutDraft {
        routine_id: doc.routine_id.map(RoutineId::new),
        date: doc.date,
        notes: doc.notes,
        elements,
    })
}

/// Decode and validate a workout replace document; `date` and `elements`
/// are required.
///
/// # Errors
///
/// [`CoreError::MalformedDocument`] when the shape does not parse,
/// [`CoreError::Validation`] when a value is out of range.
pub fn decode_workout_replace(document: Value) -> CoreResult<WorkoutReplace> {
    let doc: WorkoutReplaceDoc = serde_json::from_value(document)?;
    Ok(WorkoutReplace {
        date: doc.date,
        notes: doc.notes,
        elements: elements_from_docs(&doc.elements)?,
    })
}

/// Decode and validate a workout patch document; element entries are keyed
/// by their 1-based `position`.
///
/// # Errors
///
/// [`CoreError::MalformedDocument`] when the shape does not parse,
/// [`CoreError::Validation`] when a value is out of range.
pub fn decode_workout_patch(document: Value) -> CoreResult<WorkoutPatch> {
    let doc: WorkoutPatchDoc = serde_json::from_value(document)?;
    let elements = match doc.elements {
        Some(entries) => {
            let mut patches = Vec::with_capacity(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                patches.push(element_patch_from_doc(entry, index)?);
            }
            Some(patches)
        }
        None => None,
    };
    Ok(WorkoutPatch {
        date: doc.date,
        notes: option_patch(doc.notes),
        elements,
    })
}

/// Encode a routine as its wire document, walking parts in position order.
///
/// # Errors
///
/// Returns [`CoreError::MalformedDocument`] only if serialization itself
/// fails, which does not happen for well-formed models.
pub fn encode_routine(routine: &Routine) -> CoreResult<Value> {
    let sections = routine
        .tree
        .top()
        .iter()
        .map(|edge| section_to_doc(&routine.tree, edge.id()))
        .collect();
    let doc = RoutineDoc {
        id: routine.id.get(),
        name: routine.name.clone(),
        notes: routine.notes.clone(),
        archived: routine.archived,
        sections,
    };
    Ok(serde_json::to_value(doc)?)
}

/// Encode a workout as its wire document, walking elements in position
/// order. Rest elements surface only the fields they own; unset fields
/// encode as `null`.
///
/// # Errors
///
/// Returns [`CoreError::MalformedDocument`] only if serialization itself
/// fails, which does not happen for well-formed models.
pub fn encode_workout(workout: &Workout) -> CoreResult<Value> {
    let doc = WorkoutDoc {
        id: workout.id.get(),
        routine_id: workout.routine_id.map(RoutineId::get),
        date: workout.date,
        notes: workout.notes.clone(),
        elements: workout
            .elements()
            .iter()
            .map(|element| element_to_doc(element.kind()))
            .collect(),
    };
    Ok(serde_json::to_value(doc)?)
}

/// Build a validated part document into the tree at the given slot.
///
/// Callers must run the document through [`decode_part`] first; the
/// numeric narrowing here relies on its range checks.
pub(crate) fn build_part_at(
    tree: &mut RoutineTree,
    parent: Option<PartId>,
    index: usize,
    doc: &PartDoc,
) {
    match doc {
        PartDoc::Section(section) => build_section_at(tree, parent, index, section),
        PartDoc::Activity(activity) => {
            tree.insert_part(parent, index, Part::Activity(activity_from_doc(activity)));
        }
    }
}

fn build_section_at(tree: &mut RoutineTree, parent: Option<PartId>, index: usize, doc: &SectionDoc) {
    let id = tree.insert_part(parent, index, Part::Section(Section::new(doc.rounds as u32)));
    for (child_index, child) in doc.parts.iter().enumerate() {
        build_part_at(tree, Some(id), child_index, child);
    }
}

fn build_tree(sections: &[SectionDoc]) -> RoutineTree {
    let mut tree = RoutineTree::new();
    for (index, section) in sections.iter().enumerate() {
        build_section_at(&mut tree, None, index, section);
    }
    tree
}

fn activity_from_doc(doc: &ActivityDoc) -> Activity {
    Activity {
        exercise_id: doc.exercise_id.map(ExerciseId::new),
        reps: doc.reps as u32,
        time: doc.time as u32,
        weight: doc.weight,
        rpe: doc.rpe,
        automatic: doc.automatic,
    }
}

fn elements_from_docs(docs: &[ElementDoc]) -> CoreResult<Vec<ElementKind>> {
    let mut elements = Vec::with_capacity(docs.len());
    for (index, doc) in docs.iter().enumerate() {
        elements.push(element_from_doc(doc, index)?);
    }
    Ok(elements)
}

fn element_from_doc(doc: &ElementDoc, index: usize) -> CoreResult<ElementKind> {
    let path = format!("elements[{index}]");
    match doc {
        ElementDoc::Set {
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
        } => Ok(ElementKind::Set {
            exercise_id: ExerciseId::new(*exercise_id),
            reps: opt_u32(*reps, &path, "reps")?,
            time: opt_u32(*time, &path, "time")?,
            weight: opt_weight(*weight, &path, "weight")?,
            rpe: opt_rpe(*rpe, &path, "rpe")?,
            target_reps: opt_u32(*target_reps, &path, "target_reps")?,
            target_time: opt_u32(*target_time, &path, "target_time")?,
            target_weight: opt_weight(*target_weight, &path, "target_weight")?,
            target_rpe: opt_rpe(*target_rpe, &path, "target_rpe")?,
            automatic: *automatic,
        }),
        ElementDoc::Rest {
            target_time,
            automatic,
        } => Ok(ElementKind::Rest {
            target_time: opt_u32(*target_time, &path, "target_time")?,
            automatic: *automatic,
        }),
    }
}

fn element_to_doc(kind: &ElementKind) -> ElementDoc {
    match kind {
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
        } => ElementDoc::Set {
            exercise_id: exercise_id.get(),
            reps: reps.map(i64::from),
            time: time.map(i64::from),
            weight: *weight,
            rpe: *rpe,
            target_reps: target_reps.map(i64::from),
            target_time: target_time.map(i64::from),
            target_weight: *target_weight,
            target_rpe: *target_rpe,
            automatic: *automatic,
        },
        ElementKind::Rest {
            target_time,
            automatic,
        } => ElementDoc::Rest {
            target_time: target_time.map(i64::from),
            automatic: *automatic,
        },
    }
}

fn section_to_doc(tree: &RoutineTree, id: PartId) -> SectionDoc {
    let Part::Section(section) = tree.part(id) else {
        unreachable!("part {id} addressed as a section must be one")
    };
    SectionDoc {
        rounds: i64::from(section.rounds),
        parts: section
            .children()
            .iter()
            .map(|edge| part_to_doc(tree, edge.id()))
            .collect(),
    }
}

fn part_to_doc(tree: &RoutineTree, id: PartId) -> PartDoc {
    match tree.part(id) {
        Part::Section(_) => PartDoc::Section(section_to_doc(tree, id)),
        Part::Activity(activity) => PartDoc::Activity(ActivityDoc {
            exercise_id: activity.exercise_id.map(ExerciseId::get),
            reps: i64::from(activity.reps),
            time: i64::from(activity.time),
            weight: activity.weight,
            rpe: activity.rpe,
            automatic: activity.automatic,
        }),
    }
}

fn element_patch_from_doc(doc: &ElementPatchDoc, index: usize) -> CoreResult<ElementPatch> {
    let path = format!("elements[{index}]");
    let position = u32::try_from(doc.position)
        .map_err(|_| non_negative_int(&path, "position"))?;
    Ok(ElementPatch {
        position,
        exercise_id: doc
            .exercise_id
            .map_or(FieldPatch::Keep, |id| FieldPatch::Set(ExerciseId::new(id))),
        reps: patch_field(doc.reps, |v| req_u32(v, &path, "reps"))?,
        time: patch_field(doc.time, |v| req_u32(v, &path, "time"))?,
        weight: patch_field(doc.weight, |v| req_weight(v, &path, "weight"))?,
        rpe: patch_field(doc.rpe, |v| req_rpe(v, &path, "rpe"))?,
        target_reps: patch_field(doc.target_reps, |v| req_u32(v, &path, "target_reps"))?,
        target_time: patch_field(doc.target_time, |v| req_u32(v, &path, "target_time"))?,
        target_weight: patch_field(doc.target_weight, |v| req_weight(v, &path, "target_weight"))?,
        target_rpe: patch_field(doc.target_rpe, |v| req_rpe(v, &path, "target_rpe"))?,
        automatic: doc
            .automatic
            .map_or(FieldPatch::Keep, FieldPatch::Set),
    })
}

fn patch_field<I, O>(
    value: Option<Option<I>>,
    convert: impl FnOnce(I) -> CoreResult<O>,
) -> CoreResult<FieldPatch<O>> {
    match value {
        None => Ok(FieldPatch::Keep),
        Some(None) => Ok(FieldPatch::Clear),
        Some(Some(inner)) => Ok(FieldPatch::Set(convert(inner)?)),
    }
}

fn option_patch<T>(value: Option<Option<T>>) -> FieldPatch<T> {
    match value {
        None => FieldPatch::Keep,
        Some(None) => FieldPatch::Clear,
        Some(Some(inner)) => FieldPatch::Set(inner),
    }
}

fn validate_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("name", "must not be empty"));
    }
    Ok(())
}

fn validate_sections(sections: &[SectionDoc]) -> CoreResult<()> {
    for (index, section) in sections.iter().enumerate() {
        validate_section(section, &format!("sections[{index}]"))?;
    }
    Ok(())
}

fn validate_section(section: &SectionDoc, path: &str) -> CoreResult<()> {
    let rounds_ok = u32::try_from(section.rounds)
        .is_ok_and(|rounds| rounds >= limits::MIN_SECTION_ROUNDS);
    if !rounds_ok {
        return Err(CoreError::validation(
            format!("{path}.rounds"),
            "must be at least 1",
        ));
    }
    for (index, part) in section.parts.iter().enumerate() {
        validate_part(part, &format!("{path}.parts[{index}]"))?;
    }
    Ok(())
}

fn validate_part(part: &PartDoc, path: &str) -> CoreResult<()> {
    match part {
        PartDoc::Section(section) => validate_section(section, path),
        PartDoc::Activity(activity) => {
            req_u32(activity.reps, path, "reps")?;
            req_u32(activity.time, path, "time")?;
            req_weight(activity.weight, path, "weight")?;
            req_rpe(activity.rpe, path, "rpe")?;
            Ok(())
        }
    }
}

fn opt_u32(value: Option<i64>, path: &str, name: &str) -> CoreResult<Option<u32>> {
    value.map(|v| req_u32(v, path, name)).transpose()
}

fn opt_weight(value: Option<f32>, path: &str, name: &str) -> CoreResult<Option<f32>> {
    value.map(|v| req_weight(v, path, name)).transpose()
}

fn opt_rpe(value: Option<f32>, path: &str, name: &str) -> CoreResult<Option<f32>> {
    value.map(|v| req_rpe(v, path, name)).transpose()
}

fn req_u32(value: i64, path: &str, name: &str) -> CoreResult<u32> {
    u32::try_from(value).map_err(|_| non_negative_int(path, name))
}

fn req_weight(value: f32, path: &str, name: &str) -> CoreResult<f32> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::validation(
            format!("{path}.{name}"),
            "must be a finite non-negative number",
        ));
    }
    Ok(value)
}

fn req_rpe(value: f32, path: &str, name: &str) -> CoreResult<f32> {
    if !value.is_finite() || value < limits::RPE_MIN || value > limits::RPE_MAX {
        return Err(CoreError::validation(
            format!("{path}.{name}"),
            "must be between 0 and 10",
        ));
    }
    Ok(value)
}

fn non_negative_int(path: &str, name: &str) -> CoreError {
    CoreError::validation(format!("{path}.{name}"), "must be a non-negative integer")
}

/// Deserializer distinguishing an absent field (outer `None`) from an
/// explicit `null` (inner `None`); pair with `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
