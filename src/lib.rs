// ABOUTME: Library entry point for the Robur training core
// ABOUTME: Hierarchical routine plans, flat workout timelines, and their document codec
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

#![deny(unsafe_code)]

//! # Robur Training Core
//!
//! Data model and edit operations for hierarchical training plans and the
//! flat workout timelines logged against them. Plans are trees of sections
//! and activities; workouts are ordered element timelines whose targets can
//! be generated by flattening a plan. Everything that crosses the process
//! boundary travels as nested JSON documents.
//!
//! ## Architecture
//!
//! - **sequence**: ordered-sequence kernel keeping sibling positions
//!   contiguous and 1-based under every mutation
//! - **models**: routine trees, workout timelines, exercises, and sparse
//!   field patches
//! - **documents**: codec between wire documents and the models
//! - **storage**: user-scoped persistence boundary with an in-memory
//!   provider
//! - **services**: document-in/document-out operations gluing codec,
//!   models, and storage together
//!
//! ## Example
//!
//! ```rust
//! use robur_core::services::routines::RoutineService;
//! use robur_core::storage::InMemoryStorage;
//! use serde_json::json;
//! use uuid::Uuid;
//!
//! # #[tokio::main]
//! # async fn main() -> robur_core::CoreResult<()> {
//! let service = RoutineService::new(InMemoryStorage::new());
//! let user = Uuid::new_v4();
//! let routine = service.create(user, json!({"name": "Push day"})).await?;
//! assert_eq!(routine["sections"], json!([]));
//! # Ok(())
//! # }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the seeder binary (src/bin/) and integration
// tests (tests/). They must remain `pub` so external consumers can access
// them.

/// Value-range limits and element defaults
pub mod constants;

/// Codec between nested wire documents and the in-memory models
pub mod documents;

/// Unified error type with recoverability split and HTTP status mapping
pub mod errors;

/// Routine trees, workout timelines, exercises, and sparse patches
pub mod models;

/// Ordered-sequence kernel for contiguous 1-based sibling positions
pub mod sequence;

/// Document-in/document-out domain services
pub mod services;

/// User-scoped storage abstraction and the in-memory provider
pub mod storage;

pub use errors::{CoreError, CoreResult};
