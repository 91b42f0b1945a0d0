// ABOUTME: Exercise entity referenced by routine activities and workout sets
// ABOUTME: Kept minimal - the core only resolves exercises, it does not manage their lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an [`Exercise`] within a user's catalog. This is the
/// value that appears as `exercise_id` in wire documents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ExerciseId(i64);

impl ExerciseId {
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

impl Display for ExerciseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ExerciseId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// An exercise in a user's catalog. Activities and sets reference it by id;
/// everything else about exercises (muscles, media, history) lives outside
/// the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Catalog identifier, unique per user.
    pub id: ExerciseId,
    /// Owning user.
    pub user_id: Uuid,
    /// Display name, unique per user.
    pub name: String,
}

impl Exercise {
    /// Build an exercise owned by `user_id`.
    pub fn new(id: ExerciseId, user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            user_id,
            name: name.into(),
        }
    }
}
