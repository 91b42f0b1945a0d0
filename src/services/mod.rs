// ABOUTME: Domain service layer orchestrating codec, models, and storage
// ABOUTME: Protocol-agnostic operations reusable from any transport or tool front-end
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! Domain service layer.
//!
//! Services take wire documents in, run them through the codec, apply the
//! edit to a copy of the stored entity, validate, and only then persist.
//! A failed step leaves stored state untouched. All operations are scoped
//! to an explicit `user_id`.

/// Routine lifecycle and tree edits: create, replace, patch, structural part operations
pub mod routines;

/// Workout lifecycle and timeline edits: create with plan flattening, replace, sparse patch
pub mod workouts;
