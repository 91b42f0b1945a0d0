// ABOUTME: Demo data seeder producing realistic training plans and workout history
// ABOUTME: Drives every service operation so seeded stores exercise the full edit surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! Demo data seeder for the Robur training core.
//!
//! Populates an in-memory store with exercise catalogs, routine plans, and
//! weeks of logged workouts per user, then prints summary metrics. Useful
//! for eyeballing documents and for profiling against realistic shapes.
//!
//! Usage:
//! ```bash
//! # Seed with defaults (3 users, 8 weeks of history, fixed RNG seed)
//! cargo run --bin seed-demo-data
//!
//! # More history, different randomness
//! cargo run --bin seed-demo-data -- --users 5 --weeks 12 --seed 7
//!
//! # Verbose output (per-document logging)
//! cargo run --bin seed-demo-data -- -v
//! ```

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use robur_core::constants::defaults;
use robur_core::models::{MoveDirection, RoutineId, WorkoutId};
use robur_core::services::routines::RoutineService;
use robur_core::services::workouts::WorkoutService;
use robur_core::storage::{InMemoryStorage, StorageProvider};

#[derive(Parser)]
#[command(
    name = "seed-demo-data",
    about = "Robur training core demo data seeder",
    long_about = "Populate an in-memory store with demo exercises, routines, and workout history"
)]
struct SeedArgs {
    /// RNG seed; identical seeds produce identical stores
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of demo users to create
    #[arg(long, default_value = "3")]
    users: u32,

    /// Weeks of workout history to generate per user
    #[arg(long, default_value = "8")]
    weeks: u32,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Exercise catalog seeded for every user.
const EXERCISES: &[&str] = &[
    "Barbell Back Squat",
    "Barbell Bench Press",
    "Barbell Deadlift",
    "Barbell Lunge",
    "Barbell Romanian Deadlift",
    "Barbell Row",
    "Dip",
    "Dumbbell Curl",
    "Dumbbell Press",
    "Dumbbell Shoulder Press",
    "Hip Thrust",
    "Lat Pulldown",
    "Plank",
    "Pull Up",
    "Push Up",
    "Seated Leg Curl",
    "Seated Leg Extension",
    "Walking Lunge",
];

/// Demo plan blueprint: named blocks of (rounds, exercise indices into
/// [`EXERCISES`]).
struct DemoPlan {
    name: &'static str,
    blocks: &'static [(u32, &'static [usize])],
    /// Prepend a warm-up section holding a nested mobility loop.
    warmup: bool,
}

const DEMO_PLANS: &[DemoPlan] = &[
    DemoPlan {
        name: "Training A",
        blocks: &[(3, &[0, 1]), (3, &[4, 5])],
        warmup: true,
    },
    DemoPlan {
        name: "Training B",
        blocks: &[(4, &[2, 3, 6])],
        warmup: true,
    },
    DemoPlan {
        name: "Training C",
        blocks: &[(2, &[7, 9]), (3, &[10, 11, 15])],
        warmup: false,
    },
    DemoPlan {
        name: "Training D",
        blocks: &[(5, &[13, 17])],
        warmup: false,
    },
];

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    info!("=== Robur Training Demo Data Seeder ===");

    seed(&args).await
}

async fn seed(args: &SeedArgs) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let storage = InMemoryStorage::new();
    let routines = RoutineService::new(storage.clone());
    let workouts = WorkoutService::new(storage.clone());
    let today = Utc::now().date_naive();

    for user_index in 0..args.users {
        let user = Uuid::new_v4();
        info!("User {} ({})", user_index + 1, user);

        info!("  Step 1: Seeding exercise catalog...");
        let exercise_ids = seed_exercises(&storage, user).await?;
        info!("    Created {} exercises", exercise_ids.len());

        info!("  Step 2: Creating routine plans...");
        let routine_ids = seed_routines(&routines, user, &exercise_ids, &mut rng).await?;
        info!("    Created {} routines", routine_ids.len());

        info!("  Step 3: Exercising tree edits...");
        garnish_routines(&routines, user, &routine_ids, &exercise_ids, &mut rng).await?;
        info!("    {} plans after edits", routines.list(user).await?.len());

        info!("  Step 4: Generating {} weeks of workouts...", args.weeks);
        seed_workouts(&workouts, user, &routine_ids, today, args.weeks, &mut rng).await?;
        info!("    Logged {} workouts", workouts.list(user).await?.len());

        print_user_summary(&storage, user).await?;
    }

    info!("=== Seeding Complete ===");
    Ok(())
}

/// Create the full exercise catalog for one user.
async fn seed_exercises(storage: &InMemoryStorage, user: Uuid) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(EXERCISES.len());
    for name in EXERCISES {
        let exercise = storage.create_exercise(user, name).await?;
        debug!("    Exercise {}: {}", exercise.id, exercise.name);
        ids.push(exercise.id.get());
    }
    Ok(ids)
}

/// Create every demo plan for one user and return the routine ids.
async fn seed_routines(
    routines: &RoutineService<InMemoryStorage>,
    user: Uuid,
    exercise_ids: &[i64],
    rng: &mut StdRng,
) -> Result<Vec<RoutineId>> {
    let mut ids = Vec::with_capacity(DEMO_PLANS.len());
    for plan in DEMO_PLANS {
        let document = plan_document(plan, exercise_ids, rng);
        let created = routines.create(user, document).await?;
        let id = created["id"].as_i64().unwrap_or_default();
        debug!("    Routine {}: {}", id, plan.name);
        ids.push(RoutineId::new(id));
    }
    Ok(ids)
}

/// Build the create document for one demo plan.
fn plan_document(plan: &DemoPlan, exercise_ids: &[i64], rng: &mut StdRng) -> Value {
    let mut sections = Vec::new();
    if plan.warmup {
        // warm-up holds a nested loop so seeded trees reach depth three
        sections.push(json!({
            "rounds": 1,
            "parts": [
                activity_doc(exercise_ids[12], 0, 30, 0.0, 0.0),
                {
                    "rounds": 2,
                    "parts": [
                        activity_doc(exercise_ids[14], 10, 0, 0.0, 0.0),
                        rest_doc(defaults::REST_SECONDS / 2),
                    ]
                },
            ]
        }));
    }
    for &(rounds, block) in plan.blocks {
        let mut parts = Vec::new();
        for &exercise in block {
            let reps = rng.gen_range(5..=12);
            let weight = f64::from(rng.gen_range(8..=40)) * 2.5;
            parts.push(activity_doc(exercise_ids[exercise], reps, 0, weight, 8.0));
            parts.push(rest_doc(if reps <= 6 {
                2 * defaults::REST_SECONDS
            } else {
                defaults::REST_SECONDS
            }));
        }
        sections.push(json!({"rounds": rounds, "parts": parts}));
    }
    json!({
        "name": plan.name,
        "notes": "seeded demo plan",
        "archived": false,
        "sections": sections,
    })
}

fn activity_doc(exercise_id: i64, reps: u32, time: u32, weight: f64, rpe: f64) -> Value {
    json!({
        "exercise_id": exercise_id,
        "reps": reps,
        "time": time,
        "weight": weight,
        "rpe": rpe,
        "automatic": false,
    })
}

fn rest_doc(seconds: u32) -> Value {
    json!({
        "exercise_id": null,
        "reps": 0,
        "time": seconds,
        "weight": 0.0,
        "rpe": 0.0,
        "automatic": true,
    })
}

/// Run structural and document edits so seeded stores cover the whole op
/// surface: move, add, replace, remove, patch, and delete.
async fn garnish_routines(
    routines: &RoutineService<InMemoryStorage>,
    user: Uuid,
    routine_ids: &[RoutineId],
    exercise_ids: &[i64],
    rng: &mut StdRng,
) -> Result<()> {
    let Some(&first) = routine_ids.first() else {
        return Ok(());
    };

    // reorder the first plan's blocks; moving the top section up is a no-op
    let direction = if rng.gen_bool(0.5) {
        MoveDirection::Up
    } else {
        MoveDirection::Down
    };
    routines.move_part(user, first, &[], 0, direction).await?;

    // append a finisher section: timed plank plus a cool-down slot
    let count = section_count(routines, user, first).await?;
    let updated = routines.add_section(user, first, &[], count).await?;
    let last = updated["sections"]
        .as_array()
        .map_or(0, Vec::len)
        .saturating_sub(1);
    routines
        .replace_part(
            user,
            first,
            &[last],
            json!({
                "rounds": 3,
                "parts": [
                    activity_doc(exercise_ids[12], 0, 45, 0.0, 0.0),
                    rest_doc(defaults::REST_SECONDS / 2),
                ]
            }),
        )
        .await?;
    routines.add_activity(user, first, &[last], 2, true).await?;
    debug!("    Added finisher section to routine {}", first);

    // flatten the second plan's warm-up and leave a coaching note
    if let Some(&second) = routine_ids.get(1) {
        routines.remove_part(user, second, &[0], 1).await?;
        routines
            .patch(user, second, json!({"notes": "warm-up trimmed"}))
            .await?;
        debug!("    Trimmed warm-up of routine {}", second);
    }

    // regenerate the third plan wholesale with fresh loads
    if let Some(&third) = routine_ids.get(2) {
        let revised = plan_document(&DEMO_PLANS[2], exercise_ids, rng);
        routines.replace(user, third, revised).await?;
        debug!("    Replaced routine {}", third);
    }

    // a discarded draft covers the delete path
    let draft = routines.create(user, json!({"name": "Scratch Pad"})).await?;
    let draft_id = RoutineId::new(draft["id"].as_i64().unwrap_or_default());
    routines.delete(user, draft_id).await?;
    Ok(())
}

async fn section_count(
    routines: &RoutineService<InMemoryStorage>,
    user: Uuid,
    id: RoutineId,
) -> Result<usize> {
    let document = routines.get(user, id).await?;
    Ok(document["sections"].as_array().map_or(0, Vec::len))
}

/// Generate logged workouts over past weeks, patching in actual values over
/// the generated targets. A few sessions get cut short or abandoned.
async fn seed_workouts(
    workouts: &WorkoutService<InMemoryStorage>,
    user: Uuid,
    routine_ids: &[RoutineId],
    today: NaiveDate,
    weeks: u32,
    rng: &mut StdRng,
) -> Result<()> {
    if routine_ids.is_empty() {
        return Ok(());
    }
    let mut rotation = 0_usize;
    let mut latest = None;
    for week in (1..=weeks).rev() {
        let sessions = rng.gen_range(2..=3);
        for session in 0..sessions {
            let days_ago = i64::from(week * 7) - i64::from(session * 2 + rng.gen_range(0..2));
            if days_ago < 0 {
                continue;
            }
            let date = today - Duration::days(days_ago);
            let routine_id = routine_ids[rotation % routine_ids.len()];
            rotation += 1;

            let mut document = workouts
                .create(
                    user,
                    json!({"routine_id": routine_id.get(), "date": date}),
                )
                .await?;
            let workout_id = WorkoutId::new(document["id"].as_i64().unwrap_or_default());

            if rng.gen_bool(0.04) {
                workouts.delete(user, workout_id).await?;
                debug!("    Abandoned workout {} on {}", workout_id, date);
                continue;
            }
            if rng.gen_bool(0.1) {
                // session cut short: keep the first half of the timeline
                let mut elements = document["elements"].as_array().cloned().unwrap_or_default();
                elements.truncate(elements.len().div_ceil(2));
                document = workouts
                    .replace(
                        user,
                        workout_id,
                        json!({"date": date, "notes": "cut short", "elements": elements}),
                    )
                    .await?;
            }

            let patch = actuals_patch(&document, weeks - week, rng);
            workouts.patch(user, workout_id, patch).await?;
            debug!("    Workout {} on {}", workout_id, date);
            latest = Some(workout_id);
        }
    }

    if let Some(id) = latest {
        let document = workouts.get(user, id).await?;
        debug!(
            "    Latest workout document:\n{}",
            serde_json::to_string_pretty(&document)?
        );
    }
    Ok(())
}

/// Build a sparse patch recording plausible actuals against the targets of
/// a freshly generated workout. Weight drifts upward week over week.
fn actuals_patch(created: &Value, weeks_trained: u32, rng: &mut StdRng) -> Value {
    let progression = 1.0 + 0.02 * f64::from(weeks_trained);
    let mut entries = Vec::new();
    let elements = created["elements"].as_array().cloned().unwrap_or_default();
    for (index, element) in elements.iter().enumerate() {
        if element["exercise_id"].as_i64().is_none() {
            continue; // rests keep their plan values
        }
        if rng.gen_bool(0.08) {
            continue; // the occasional skipped set
        }
        let position = index + 1;
        let mut entry = json!({"position": position});
        if let Some(target_reps) = element["target_reps"].as_i64() {
            let slip = rng.gen_range(-2_i64..=1);
            entry["reps"] = json!((target_reps + slip).max(1));
        }
        if let Some(target_time) = element["target_time"].as_i64() {
            entry["time"] = json!(target_time + rng.gen_range(-5_i64..=5).max(-target_time));
        }
        if let Some(target_weight) = element["target_weight"].as_f64() {
            let lifted = round_to_plate(target_weight * progression);
            if lifted > 0.0 {
                entry["weight"] = json!(lifted);
            }
        }
        let rpe = f64::from(rng.gen_range(12..=19)) / 2.0;
        entry["rpe"] = json!(rpe);
        entries.push(entry);
    }

    let mut patch = json!({"elements": entries});
    if rng.gen_bool(0.2) {
        patch["notes"] = json!("felt strong today");
    }
    patch
}

/// Round a weight to the nearest 2.5 kg plate increment.
fn round_to_plate(weight: f64) -> f64 {
    (weight / 2.5).round() * 2.5
}

/// Print per-user summary metrics from the stored models.
async fn print_user_summary(storage: &InMemoryStorage, user: Uuid) -> Result<()> {
    for routine in storage.list_routines(user).await? {
        info!(
            "    {}: ~{} min, {} sets, {} exercises",
            routine.name,
            routine.duration().num_minutes(),
            routine.num_sets(),
            routine.exercise_ids().len(),
        );
    }

    let workouts = storage.list_workouts(user).await?;
    let total_volume: u64 = workouts.iter().map(|w| u64::from(w.volume_load())).sum();
    let avg_rpe: f32 = {
        let values: Vec<f32> = workouts.iter().filter_map(|w| w.avg_rpe()).collect();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f32>() / values.len() as f32
        }
    };
    info!(
        "    {} workouts, total volume load {} kg, mean session RPE {:.1}",
        workouts.len(),
        total_volume,
        avg_rpe,
    );
    Ok(())
}
