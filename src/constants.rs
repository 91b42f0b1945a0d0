// ABOUTME: Domain constants shared across validation, flattening, and the demo seeder
// ABOUTME: Groups value-range limits and editor defaults in one place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! Fixed domain values used throughout the crate.

/// Value-range limits enforced by document validation.
pub mod limits {
    /// Lowest accepted rate of perceived exertion.
    pub const RPE_MIN: f32 = 0.0;

    /// Highest accepted rate of perceived exertion (Borg CR10 scale).
    pub const RPE_MAX: f32 = 10.0;

    /// A section must run its children at least once.
    pub const MIN_SECTION_ROUNDS: u32 = 1;
}

/// Editor and estimation defaults.
pub mod defaults {
    /// Rest duration in seconds assigned by the demo seeder between sets.
    pub const REST_SECONDS: u32 = 60;

    /// Assumed repetitions per set when estimating the duration of an
    /// activity that has no rep count.
    pub const ESTIMATED_REPS: u32 = 1;

    /// Assumed seconds per repetition when estimating the duration of an
    /// activity that has no time.
    pub const ESTIMATED_REP_SECONDS: u32 = 4;
}
