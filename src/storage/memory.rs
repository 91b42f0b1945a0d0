// ABOUTME: In-memory storage provider backed by shared maps behind an Arc
// ABOUTME: Routines and workouts live under async RwLocks, exercises in a DashMap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! Process-local [`StorageProvider`] implementation.
//!
//! Routines and workouts sit in [`BTreeMap`]s behind [`RwLock`]s because
//! their constraints (name uniqueness, delete cascade) span entries.
//! The exercise catalog lives in a [`DashMap`] for lock-free reads; its
//! one cross-entry constraint, per-user name uniqueness, goes through a
//! second map keyed by `(user, name)` whose entry guard makes the
//! duplicate check and the insert a single step. Identifier counters
//! start at 1 and only ever move forward.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{CoreError, CoreResult};
use crate::models::{Exercise, ExerciseId, Routine, RoutineId, Workout, WorkoutId};
use crate::storage::StorageProvider;

/// Shared in-memory store; clones hand out handles to the same data.
#[derive(Clone)]
pub struct InMemoryStorage {
    inner: Arc<Inner>,
}

struct Inner {
    exercises: DashMap<ExerciseId, Exercise>,
    exercise_names: DashMap<(Uuid, String), ExerciseId>,
    routines: RwLock<BTreeMap<RoutineId, Routine>>,
    workouts: RwLock<BTreeMap<WorkoutId, Workout>>,
    next_exercise_id: AtomicI64,
    next_routine_id: AtomicI64,
    next_workout_id: AtomicI64,
}

impl InMemoryStorage {
    /// Empty store with id counters starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                exercises: DashMap::new(),
                exercise_names: DashMap::new(),
                routines: RwLock::new(BTreeMap::new()),
                workouts: RwLock::new(BTreeMap::new()),
                next_exercise_id: AtomicI64::new(1),
                next_routine_id: AtomicI64::new(1),
                next_workout_id: AtomicI64::new(1),
            }),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageProvider for InMemoryStorage {
    // ================================
    // Exercises
    // ================================

    async fn create_exercise(&self, user_id: Uuid, name: &str) -> CoreResult<Exercise> {
        // the entry guard locks the name's shard, so the duplicate check
        // and the reservation happen in one step
        let reservation = self.inner.exercise_names.entry((user_id, name.to_owned()));
        let Entry::Vacant(slot) = reservation else {
            return Err(CoreError::conflict(format!(
                "an exercise named '{name}' already exists"
            )));
        };
        let id = ExerciseId::new(self.inner.next_exercise_id.fetch_add(1, Ordering::SeqCst));
        let exercise = Exercise::new(id, user_id, name);
        self.inner.exercises.insert(id, exercise.clone());
        slot.insert(id);
        Ok(exercise)
    }

    async fn get_exercise(&self, user_id: Uuid, id: ExerciseId) -> CoreResult<Exercise> {
        self.inner
            .exercises
            .get(&id)
            .filter(|exercise| exercise.user_id == user_id)
            .map(|exercise| exercise.clone())
            .ok_or_else(|| CoreError::not_found("exercise", id))
    }

    async fn list_exercises(&self, user_id: Uuid) -> CoreResult<Vec<Exercise>> {
        let mut exercises: Vec<Exercise> = self
            .inner
            .exercises
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.clone())
            .collect();
        exercises.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(exercises)
    }

    // ================================
    // Routines
    // ================================

    async fn next_routine_id(&self) -> CoreResult<RoutineId> {
        Ok(RoutineId::new(
            self.inner.next_routine_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn get_routine(&self, user_id: Uuid, id: RoutineId) -> CoreResult<Routine> {
        self.inner
            .routines
            .read()
            .await
            .get(&id)
            .filter(|routine| routine.user_id == user_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("routine", id))
    }

    async fn list_routines(&self, user_id: Uuid) -> CoreResult<Vec<Routine>> {
        let mut routines: Vec<Routine> = self
            .inner
            .routines
            .read()
            .await
            .values()
            .filter(|routine| routine.user_id == user_id)
            .cloned()
            .collect();
        routines.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(routines)
    }

    async fn save_routine(&self, routine: &Routine) -> CoreResult<()> {
        let mut routines = self.inner.routines.write().await;
        let name_taken = routines.values().any(|existing| {
            existing.user_id == routine.user_id
                && existing.id != routine.id
                && existing.name == routine.name
        });
        if name_taken {
            return Err(CoreError::conflict(format!(
                "a routine named '{}' already exists",
                routine.name
            )));
        }
        routines.insert(routine.id, routine.clone());
        Ok(())
    }

    async fn delete_routine(&self, user_id: Uuid, id: RoutineId) -> CoreResult<()> {
        let mut routines = self.inner.routines.write().await;
        let owned = routines
            .get(&id)
            .is_some_and(|routine| routine.user_id == user_id);
        if !owned {
            return Err(CoreError::not_found("routine", id));
        }
        routines.remove(&id);
        // cascade before releasing the routine lock so no reader observes
        // a workout bound to a vanished plan
        let mut workouts = self.inner.workouts.write().await;
        workouts.retain(|_, workout| {
            !(workout.user_id == user_id && workout.routine_id == Some(id))
        });
        Ok(())
    }

    // ================================
    // Workouts
    // ================================

    async fn next_workout_id(&self) -> CoreResult<WorkoutId> {
        Ok(WorkoutId::new(
            self.inner.next_workout_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn get_workout(&self, user_id: Uuid, id: WorkoutId) -> CoreResult<Workout> {
        self.inner
            .workouts
            .read()
            .await
            .get(&id)
            .filter(|workout| workout.user_id == user_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("workout", id))
    }

    async fn list_workouts(&self, user_id: Uuid) -> CoreResult<Vec<Workout>> {
        let mut workouts: Vec<Workout> = self
            .inner
            .workouts
            .read()
            .await
            .values()
            .filter(|workout| workout.user_id == user_id)
            .cloned()
            .collect();
        workouts.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(workouts)
    }

    async fn save_workout(&self, workout: &Workout) -> CoreResult<()> {
        self.inner
            .workouts
            .write()
            .await
            .insert(workout.id, workout.clone());
        Ok(())
    }

    async fn delete_workout(&self, user_id: Uuid, id: WorkoutId) -> CoreResult<()> {
        let mut workouts = self.inner.workouts.write().await;
        let owned = workouts
            .get(&id)
            .is_some_and(|workout| workout.user_id == user_id);
        if !owned {
            return Err(CoreError::not_found("workout", id));
        }
        workouts.remove(&id);
        Ok(())
    }
}
