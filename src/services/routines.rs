// ABOUTME: Routine lifecycle and tree-edit operations over a storage provider
// ABOUTME: Decodes wire documents, mutates a copy, validates, then persists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::documents::{self, RoutineDraft};
use crate::errors::{CoreError, CoreResult};
use crate::models::routine::render_path;
use crate::models::{Activity, ExerciseId, MoveDirection, Part, Routine, RoutineId, Section};
use crate::storage::StorageProvider;

/// Routine operations: document lifecycle plus path-addressed tree edits.
///
/// Every mutation works on a copy of the stored routine and persists only
/// after validation, so a rejected edit leaves the stored plan untouched.
#[derive(Clone)]
pub struct RoutineService<S> {
    storage: S,
}

impl<S: StorageProvider> RoutineService<S> {
    /// Wrap a storage handle.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a routine from a create document and return the stored
    /// routine's encoding.
    ///
    /// # Errors
    ///
    /// Malformed or invalid documents are rejected, referenced exercises
    /// must exist for this user, and a duplicate routine name is a
    /// conflict.
    pub async fn create(&self, user_id: Uuid, document: Value) -> CoreResult<Value> {
        let RoutineDraft {
            name,
            notes,
            archived,
            tree,
        } = documents::decode_routine_create(document)?;
        self.check_exercises(user_id, &tree.exercise_ids()).await?;
        let id = self.storage.next_routine_id().await?;
        let mut routine = Routine::new(id, user_id, name);
        routine.notes = notes;
        routine.archived = archived;
        routine.tree = tree;
        routine.tree.validate()?;
        self.storage.save_routine(&routine).await?;
        info!("Created routine {} for user {}", routine.id, user_id);
        documents::encode_routine(&routine)
    }

    /// Fetch one routine as its wire document.
    ///
    /// # Errors
    ///
    /// Unknown ids and routines of other users are not found.
    pub async fn get(&self, user_id: Uuid, id: RoutineId) -> CoreResult<Value> {
        let routine = self.storage.get_routine(user_id, id).await?;
        documents::encode_routine(&routine)
    }

    /// All routines of the user as wire documents, ordered by name.
    ///
    /// # Errors
    ///
    /// Fails only when the storage backend does.
    pub async fn list(&self, user_id: Uuid) -> CoreResult<Vec<Value>> {
        let routines = self.storage.list_routines(user_id).await?;
        routines.iter().map(documents::encode_routine).collect()
    }

    /// Replace a routine's full content from a replace document. The part
    /// hierarchy is rebuilt from scratch; parts absent from the document
    /// cease to exist.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::create`], plus not-found for the routine
    /// itself.
    pub async fn replace(&self, user_id: Uuid, id: RoutineId, document: Value) -> CoreResult<Value> {
        let RoutineDraft {
            name,
            notes,
            archived,
            tree,
        } = documents::decode_routine_replace(document)?;
        let mut routine = self.storage.get_routine(user_id, id).await?;
        self.check_exercises(user_id, &tree.exercise_ids()).await?;
        routine.name = name;
        routine.notes = notes;
        routine.archived = archived;
        routine.tree = tree;
        routine.tree.validate()?;
        self.storage.save_routine(&routine).await?;
        info!("Replaced routine {} for user {}", id, user_id);
        documents::encode_routine(&routine)
    }

    /// Apply a sparse patch document. Absent fields stay untouched; a
    /// supplied `sections` array replaces the whole hierarchy.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::replace`].
    pub async fn patch(&self, user_id: Uuid, id: RoutineId, document: Value) -> CoreResult<Value> {
        let patch = documents::decode_routine_patch(document)?;
        let mut routine = self.storage.get_routine(user_id, id).await?;
        if let Some(name) = patch.name {
            routine.name = name;
        }
        patch.notes.apply_to_option(&mut routine.notes);
        if let Some(archived) = patch.archived {
            routine.archived = archived;
        }
        if let Some(tree) = patch.tree {
            self.check_exercises(user_id, &tree.exercise_ids()).await?;
            routine.tree = tree;
        }
        routine.tree.validate()?;
        self.storage.save_routine(&routine).await?;
        debug!("Patched routine {} for user {}", id, user_id);
        documents::encode_routine(&routine)
    }

    /// Delete a routine; workouts bound to it are deleted with it.
    ///
    /// # Errors
    ///
    /// Unknown ids and routines of other users are not found.
    pub async fn delete(&self, user_id: Uuid, id: RoutineId) -> CoreResult<()> {
        self.storage.delete_routine(user_id, id).await?;
        info!("Deleted routine {} for user {}", id, user_id);
        Ok(())
    }

    /// Insert a fresh one-round section at `index` within the scope
    /// addressed by `parent_path` (empty path = top level).
    ///
    /// # Errors
    ///
    /// Bad paths and out-of-range indices are not found.
    pub async fn add_section(
        &self,
        user_id: Uuid,
        id: RoutineId,
        parent_path: &[usize],
        index: usize,
    ) -> CoreResult<Value> {
        let mut routine = self.storage.get_routine(user_id, id).await?;
        let parent = routine.tree.resolve_scope(parent_path)?;
        if index > routine.tree.scope_len(parent) {
            return Err(slot_not_found(parent_path, index));
        }
        routine.tree.insert_part(parent, index, Part::Section(Section::new(1)));
        routine.tree.validate()?;
        self.storage.save_routine(&routine).await?;
        debug!(
            "Added section to routine {} at {}",
            id,
            slot_path(parent_path, index)
        );
        documents::encode_routine(&routine)
    }

    /// Insert a fresh all-zero activity at `index` within the scope
    /// addressed by `parent_path`. Rest activities start with the
    /// auto-advance flag set.
    ///
    /// # Errors
    ///
    /// Activities cannot sit at the top level (validation error); bad
    /// paths and out-of-range indices are not found.
    pub async fn add_activity(
        &self,
        user_id: Uuid,
        id: RoutineId,
        parent_path: &[usize],
        index: usize,
        is_rest: bool,
    ) -> CoreResult<Value> {
        let mut routine = self.storage.get_routine(user_id, id).await?;
        let parent = routine.tree.resolve_scope(parent_path)?;
        let Some(parent) = parent else {
            return Err(CoreError::validation(
                "part",
                "activities cannot be placed at the routine's top level",
            ));
        };
        if index > routine.tree.scope_len(Some(parent)) {
            return Err(slot_not_found(parent_path, index));
        }
        routine
            .tree
            .insert_part(Some(parent), index, Part::Activity(Activity::empty(is_rest)));
        routine.tree.validate()?;
        self.storage.save_routine(&routine).await?;
        debug!(
            "Added {} to routine {} at {}",
            if is_rest { "rest" } else { "activity" },
            id,
            slot_path(parent_path, index)
        );
        documents::encode_routine(&routine)
    }

    /// Remove the part at `index` within the addressed scope, cascading
    /// through its subtree.
    ///
    /// # Errors
    ///
    /// Bad paths and out-of-range indices are not found.
    pub async fn remove_part(
        &self,
        user_id: Uuid,
        id: RoutineId,
        parent_path: &[usize],
        index: usize,
    ) -> CoreResult<Value> {
        let mut routine = self.storage.get_routine(user_id, id).await?;
        let parent = routine.tree.resolve_scope(parent_path)?;
        if index >= routine.tree.scope_len(parent) {
            return Err(slot_not_found(parent_path, index));
        }
        routine.tree.remove_part_at(parent, index);
        routine.tree.validate()?;
        self.storage.save_routine(&routine).await?;
        debug!(
            "Removed part {} from routine {}",
            slot_path(parent_path, index),
            id
        );
        documents::encode_routine(&routine)
    }

    /// Move the part at `index` one step up or down among its siblings.
    /// Moving the first part up or the last down changes nothing and is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Bad paths and out-of-range indices are not found.
    pub async fn move_part(
        &self,
        user_id: Uuid,
        id: RoutineId,
        parent_path: &[usize],
        index: usize,
        direction: MoveDirection,
    ) -> CoreResult<Value> {
        let mut routine = self.storage.get_routine(user_id, id).await?;
        let parent = routine.tree.resolve_scope(parent_path)?;
        if index >= routine.tree.scope_len(parent) {
            return Err(slot_not_found(parent_path, index));
        }
        if routine.tree.move_part_at(parent, index, direction) {
            routine.tree.validate()?;
            self.storage.save_routine(&routine).await?;
            debug!(
                "Moved part {} {:?} in routine {}",
                slot_path(parent_path, index),
                direction,
                id
            );
        }
        documents::encode_routine(&routine)
    }

    /// Replace the single part addressed by `path` with a new subtree
    /// document, keeping its slot among the siblings.
    ///
    /// # Errors
    ///
    /// The path must address a live part, a top-level replacement must be
    /// a section, and the new subtree is validated like any create.
    pub async fn replace_part(
        &self,
        user_id: Uuid,
        id: RoutineId,
        path: &[usize],
        document: Value,
    ) -> CoreResult<Value> {
        let doc = documents::decode_part(document)?;
        let mut routine = self.storage.get_routine(user_id, id).await?;
        let (parent, index) = routine.tree.resolve_slot(path)?;
        if parent.is_none() && !doc.is_section() {
            return Err(CoreError::validation(
                "part",
                "top-level parts must be sections",
            ));
        }
        routine.tree.remove_part_at(parent, index);
        documents::build_part_at(&mut routine.tree, parent, index, &doc);
        self.check_exercises(user_id, &routine.tree.exercise_ids())
            .await?;
        routine.tree.validate()?;
        self.storage.save_routine(&routine).await?;
        debug!("Replaced part {} in routine {}", render_path(path), id);
        documents::encode_routine(&routine)
    }

    async fn check_exercises(
        &self,
        user_id: Uuid,
        ids: &BTreeSet<ExerciseId>,
    ) -> CoreResult<()> {
        for &id in ids {
            self.storage.get_exercise(user_id, id).await?;
        }
        Ok(())
    }
}

fn slot_path(parent_path: &[usize], index: usize) -> String {
    let mut segments = parent_path.to_vec();
    segments.push(index);
    render_path(&segments)
}

fn slot_not_found(parent_path: &[usize], index: usize) -> CoreError {
    CoreError::not_found("part slot", slot_path(parent_path, index))
}
