// ABOUTME: Workout lifecycle over a storage provider, including plan flattening
// ABOUTME: Creates timelines from routines, applies full replaces and sparse patches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::documents;
use crate::errors::CoreResult;
use crate::models::{ExerciseId, Workout, WorkoutId};
use crate::storage::StorageProvider;

/// Workout operations: session lifecycle and timeline edits.
///
/// A workout created against a routine snapshots the flattened plan as its
/// targets; later routine edits leave recorded workouts untouched.
#[derive(Clone)]
pub struct WorkoutService<S> {
    storage: S,
}

impl<S: StorageProvider> WorkoutService<S> {
    /// Wrap a storage handle.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a workout from a create document and return the stored
    /// workout's encoding. Without an explicit `elements` array the
    /// timeline is generated by flattening the bound routine (or starts
    /// empty when unbound).
    ///
    /// # Errors
    ///
    /// Malformed or invalid documents are rejected, and the bound routine
    /// and every referenced exercise must exist for this user.
    pub async fn create(&self, user_id: Uuid, document: Value) -> CoreResult<Value> {
        let draft = documents::decode_workout_create(document)?;
        let routine = match draft.routine_id {
            Some(routine_id) => Some(self.storage.get_routine(user_id, routine_id).await?),
            None => None,
        };
        let elements = match draft.elements {
            Some(elements) => elements,
            None => {
                let generated = routine
                    .as_ref()
                    .map_or_else(Vec::new, |routine| routine.tree.generate_elements());
                if let Some(routine) = &routine {
                    debug!(
                        "Generated {} elements from routine {}",
                        generated.len(),
                        routine.id
                    );
                }
                generated
            }
        };
        let id = self.storage.next_workout_id().await?;
        let mut workout = Workout::new(id, user_id, draft.date);
        workout.routine_id = draft.routine_id;
        workout.notes = draft.notes;
        workout.set_elements(elements);
        self.check_exercises(user_id, &workout.exercise_ids()).await?;
        workout.validate()?;
        self.storage.save_workout(&workout).await?;
        info!(
            "Created workout {} with {} elements for user {}",
            workout.id,
            workout.elements().len(),
            user_id
        );
        documents::encode_workout(&workout)
    }

    /// Fetch one workout as its wire document.
    ///
    /// # Errors
    ///
    /// Unknown ids and workouts of other users are not found.
    pub async fn get(&self, user_id: Uuid, id: WorkoutId) -> CoreResult<Value> {
        let workout = self.storage.get_workout(user_id, id).await?;
        documents::encode_workout(&workout)
    }

    /// All workouts of the user as wire documents, ordered by date.
    ///
    /// # Errors
    ///
    /// Fails only when the storage backend does.
    pub async fn list(&self, user_id: Uuid) -> CoreResult<Vec<Value>> {
        let workouts = self.storage.list_workouts(user_id).await?;
        workouts.iter().map(documents::encode_workout).collect()
    }

    /// Replace a workout's date, notes, and full timeline. The element
    /// list is rebuilt from the document; elements absent from it cease to
    /// exist. The routine binding is fixed at creation and not touched.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::create`], plus not-found for the workout
    /// itself.
    pub async fn replace(&self, user_id: Uuid, id: WorkoutId, document: Value) -> CoreResult<Value> {
        let replace = documents::decode_workout_replace(document)?;
        let mut workout = self.storage.get_workout(user_id, id).await?;
        workout.date = replace.date;
        workout.notes = replace.notes;
        workout.set_elements(replace.elements);
        self.check_exercises(user_id, &workout.exercise_ids()).await?;
        workout.validate()?;
        self.storage.save_workout(&workout).await?;
        info!("Replaced workout {} for user {}", id, user_id);
        documents::encode_workout(&workout)
    }

    /// Apply a sparse patch document. Element entries merge into the
    /// elements at their positions; fields left out stay as they are.
    ///
    /// # Errors
    ///
    /// An entry addressing an unoccupied position is not found, and one
    /// whose fields belong to the other element variant is a validation
    /// error.
    pub async fn patch(&self, user_id: Uuid, id: WorkoutId, document: Value) -> CoreResult<Value> {
        let patch = documents::decode_workout_patch(document)?;
        let mut workout = self.storage.get_workout(user_id, id).await?;
        if let Some(date) = patch.date {
            workout.date = date;
        }
        patch.notes.apply_to_option(&mut workout.notes);
        if let Some(entries) = patch.elements {
            for entry in &entries {
                if let Some(exercise_id) = entry.new_exercise_id() {
                    self.storage.get_exercise(user_id, exercise_id).await?;
                }
                workout.apply_element_patch(entry)?;
            }
        }
        workout.validate()?;
        self.storage.save_workout(&workout).await?;
        debug!("Patched workout {} for user {}", id, user_id);
        documents::encode_workout(&workout)
    }

    /// Delete a workout.
    ///
    /// # Errors
    ///
    /// Unknown ids and workouts of other users are not found.
    pub async fn delete(&self, user_id: Uuid, id: WorkoutId) -> CoreResult<()> {
        self.storage.delete_workout(user_id, id).await?;
        info!("Deleted workout {} for user {}", id, user_id);
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreError;
    use crate::models::RoutineId;
    use crate::services::routines::RoutineService;
    use crate::storage::InMemoryStorage;
    use serde_json::json;

    struct Fixture {
        routines: RoutineService<InMemoryStorage>,
        workouts: WorkoutService<InMemoryStorage>,
        user: Uuid,
        exercise_id: i64,
    }

    async fn fixture() -> Fixture {
        let storage = InMemoryStorage::new();
        let user = Uuid::new_v4();
        let exercise = storage.create_exercise(user, "Push-up").await.unwrap();
        Fixture {
            routines: RoutineService::new(storage.clone()),
            workouts: WorkoutService::new(storage),
            user,
            exercise_id: exercise.id.get(),
        }
    }

    fn set_doc(exercise_id: i64, reps: u32) -> Value {
        json!({
            "exercise_id": exercise_id, "reps": reps, "time": null, "weight": null, "rpe": null,
            "target_reps": null, "target_time": null, "target_weight": null, "target_rpe": null,
            "automatic": false
        })
    }

    #[tokio::test]
    async fn test_create_unbound_workout_starts_empty() {
        let f = fixture().await;
        let created = f
            .workouts
            .create(f.user, json!({"date": "2026-04-01"}))
            .await
            .unwrap();
        assert_eq!(created["routine_id"], Value::Null);
        assert_eq!(created["elements"], json!([]));
    }

    #[tokio::test]
    async fn test_create_from_routine_flattens_plan() {
        let f = fixture().await;
        let routine = f
            .routines
            .create(
                f.user,
                json!({
                    "name": "A",
                    "sections": [{
                        "rounds": 2,
                        "parts": [
                            {"exercise_id": f.exercise_id, "reps": 10, "time": 0, "weight": 0.0, "rpe": 0.0, "automatic": false},
                            {"exercise_id": null, "reps": 0, "time": 30, "weight": 0.0, "rpe": 0.0, "automatic": true}
                        ]
                    }]
                }),
            )
            .await
            .unwrap();

        let created = f
            .workouts
            .create(
                f.user,
                json!({"routine_id": routine["id"], "date": "2026-04-02"}),
            )
            .await
            .unwrap();
        let elements = created["elements"].as_array().unwrap();
        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0]["target_reps"], 10);
        assert_eq!(elements[0]["reps"], Value::Null);
        assert_eq!(elements[1], json!({"target_time": 30, "automatic": true}));

        // the snapshot survives later plan edits
        let routine_id = RoutineId::new(routine["id"].as_i64().unwrap());
        f.routines
            .patch(f.user, routine_id, json!({"sections": []}))
            .await
            .unwrap();
        let workout_id = WorkoutId::new(created["id"].as_i64().unwrap());
        let fetched = f.workouts.get(f.user, workout_id).await.unwrap();
        assert_eq!(fetched["elements"], created["elements"]);
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_routine() {
        let f = fixture().await;
        let err = f
            .workouts
            .create(f.user, json!({"routine_id": 42, "date": "2026-04-01"}))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "routine", .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_exercise_in_elements() {
        let f = fixture().await;
        let err = f
            .workouts
            .create(
                f.user,
                json!({"date": "2026-04-01", "elements": [set_doc(999, 5)]}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 404);
    }

    #[tokio::test]
    async fn test_patch_merges_sparse_element_updates() {
        let f = fixture().await;
        let created = f
            .workouts
            .create(
                f.user,
                json!({
                    "date": "2026-04-01",
                    "elements": [set_doc(f.exercise_id, 10), {"target_time": 60, "automatic": true}]
                }),
            )
            .await
            .unwrap();
        let id = WorkoutId::new(created["id"].as_i64().unwrap());

        let patched = f
            .workouts
            .patch(
                f.user,
                id,
                json!({"elements": [{"position": 1, "reps": 8, "rpe": 9.0}]}),
            )
            .await
            .unwrap();
        assert_eq!(patched["elements"][0]["reps"], 8);
        assert_eq!(patched["elements"][0]["rpe"], 9.0);
        // untouched fields and sibling element survive
        assert_eq!(patched["elements"][0]["exercise_id"], f.exercise_id);
        assert_eq!(patched["elements"][1], created["elements"][1]);

        // a set-only field aimed at the rest slot is a validation error
        let err = f
            .workouts
            .patch(f.user, id, json!({"elements": [{"position": 2, "reps": 5}]}))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 400);

        // positions past the timeline are not found
        let err = f
            .workouts
            .patch(f.user, id, json!({"elements": [{"position": 3, "reps": 5}]}))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 404);
    }

    #[tokio::test]
    async fn test_replace_rebuilds_timeline() {
        let f = fixture().await;
        let created = f
            .workouts
            .create(
                f.user,
                json!({
                    "date": "2026-04-01",
                    "elements": [set_doc(f.exercise_id, 10), {"target_time": 60, "automatic": true}]
                }),
            )
            .await
            .unwrap();
        let id = WorkoutId::new(created["id"].as_i64().unwrap());

        let replaced = f
            .workouts
            .replace(
                f.user,
                id,
                json!({"date": "2026-04-03", "notes": null, "elements": [set_doc(f.exercise_id, 5)]}),
            )
            .await
            .unwrap();
        assert_eq!(replaced["date"], "2026-04-03");
        assert_eq!(replaced["elements"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_workout() {
        let f = fixture().await;
        let created = f
            .workouts
            .create(f.user, json!({"date": "2026-04-01"}))
            .await
            .unwrap();
        let id = WorkoutId::new(created["id"].as_i64().unwrap());

        f.workouts.delete(f.user, id).await.unwrap();
        let err = f.workouts.get(f.user, id).await.unwrap_err();
        assert_eq!(err.http_status(), 404);
    }
}
