// ABOUTME: Core error taxonomy for document decoding, validation, lookup, and storage failures
// ABOUTME: Distinguishes recoverable client errors from storage conflicts and maps each kind to an HTTP status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! Error types returned by the document-level operations.
//!
//! Every recoverable failure is an explicit [`CoreError`] value; nothing is
//! logged away or retried inside the core. Positional-index violations in the
//! sequence kernel are caller bugs, enforced with assertions rather than
//! represented here (see [`crate::sequence`]).

use thiserror::Error;

/// Unified error type for all core operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Input did not parse into the expected document shape (wrong types,
    /// missing required structural keys). Surfaced verbatim to the caller.
    #[error("malformed document: {message}")]
    MalformedDocument {
        /// Parser diagnostic describing what failed to deserialize.
        message: String,
    },

    /// Document parsed structurally but violates a value invariant.
    /// Recoverable by resubmission with corrected values.
    #[error("invalid value for `{field}`: {reason}")]
    Validation {
        /// Dotted field path into the offending document, e.g.
        /// `sections[0].parts[2].reps`.
        field: String,
        /// Human-readable description of the violated constraint.
        reason: String,
    },

    /// A referenced routine, workout, exercise, part path, or element
    /// position does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `routine` or `part path`.
        kind: &'static str,
        /// Identifier or path rendering of the missing entity.
        id: String,
    },

    /// Uniqueness violation detected at save time (duplicate routine name,
    /// duplicate exercise). The caller must resubmit with different data.
    #[error("conflict: {message}")]
    Conflict {
        /// Description of the conflicting constraint.
        message: String,
    },

    /// The persistence collaborator failed internally. Not a client error.
    #[error("storage failure: {message}")]
    Storage {
        /// Provider diagnostic.
        message: String,
    },
}

impl CoreError {
    /// Build a [`CoreError::Validation`] for a document field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`CoreError::NotFound`] for an entity kind and id.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Build a [`CoreError::Conflict`] with a constraint description.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// HTTP status the request-handling collaborator should map this error
    /// to. The core never speaks HTTP itself; this keeps the mapping in one
    /// place for every transport that fronts it.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::MalformedDocument { .. } | Self::Validation { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Storage { .. } => 500,
        }
    }

    /// Whether the caller can recover by fixing the request and resubmitting.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage { .. })
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedDocument {
            message: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;
