// ABOUTME: Storage abstraction for exercises, routines, and workouts
// ABOUTME: Providers enforce ownership, name uniqueness, and referential cascade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! Persistence boundary of the crate.
//!
//! Every operation is scoped to a `user_id`; an entity owned by another
//! user is reported as [`CoreError::NotFound`] rather than revealed.
//! Identifier allocation lives here so backends can map it onto whatever
//! their native id scheme is.
//!
//! [`CoreError::NotFound`]: crate::errors::CoreError::NotFound

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CoreResult;
use crate::models::{Exercise, ExerciseId, Routine, RoutineId, Workout, WorkoutId};

pub mod memory;

pub use memory::InMemoryStorage;

/// Storage abstraction over user-scoped training data.
///
/// All implementations must uphold the same constraints: routine and
/// exercise names are unique per user, and deleting a routine also deletes
/// the workouts bound to it.
#[async_trait]
pub trait StorageProvider: Send + Sync + Clone {
    // ================================
    // Exercises
    // ================================

    /// Create an exercise in the user's catalog.
    async fn create_exercise(&self, user_id: Uuid, name: &str) -> CoreResult<Exercise>;

    /// Get an exercise by id (not found when owned by someone else).
    async fn get_exercise(&self, user_id: Uuid, id: ExerciseId) -> CoreResult<Exercise>;

    /// All exercises of the user, ordered by name.
    async fn list_exercises(&self, user_id: Uuid) -> CoreResult<Vec<Exercise>>;

    // ================================
    // Routines
    // ================================

    /// Allocate the id for a routine about to be created.
    async fn next_routine_id(&self) -> CoreResult<RoutineId>;

    /// Get a routine by id (not found when owned by someone else).
    async fn get_routine(&self, user_id: Uuid, id: RoutineId) -> CoreResult<Routine>;

    /// All routines of the user, ordered by name.
    async fn list_routines(&self, user_id: Uuid) -> CoreResult<Vec<Routine>>;

    /// Insert or update a routine under its id.
    async fn save_routine(&self, routine: &Routine) -> CoreResult<()>;

    /// Delete a routine and every workout of the user bound to it.
    async fn delete_routine(&self, user_id: Uuid, id: RoutineId) -> CoreResult<()>;

    // ================================
    // Workouts
    // ================================

    /// Allocate the id for a workout about to be created.
    async fn next_workout_id(&self) -> CoreResult<WorkoutId>;

    /// Get a workout by id (not found when owned by someone else).
    async fn get_workout(&self, user_id: Uuid, id: WorkoutId) -> CoreResult<Workout>;

    /// All workouts of the user, ordered by date then id.
    async fn list_workouts(&self, user_id: Uuid) -> CoreResult<Vec<Workout>>;

    /// Insert or update a workout under its id.
    async fn save_workout(&self, workout: &Workout) -> CoreResult<()>;

    /// Delete a workout.
    async fn delete_workout(&self, user_id: Uuid, id: WorkoutId) -> CoreResult<()>;
}
