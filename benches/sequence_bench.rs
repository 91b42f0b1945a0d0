// ABOUTME: Criterion benchmarks for the ordered-sequence kernel and plan flattening
// ABOUTME: Measures structural edits, repeat unrolling, and wire codec throughput
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! Criterion benchmarks for the hot paths of the core: position edits on
//! ordered scopes, flattening a plan into a workout timeline, and the
//! document codec.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use robur_core::documents;
use robur_core::models::{ElementKind, Routine, RoutineId, RoutineTree, WorkoutElement};
use robur_core::sequence;
use serde_json::{json, Value};
use uuid::Uuid;

fn rest_element() -> WorkoutElement {
    WorkoutElement::new(ElementKind::Rest {
        target_time: Some(60),
        automatic: true,
    })
}

fn scope_of(len: usize) -> Vec<WorkoutElement> {
    let mut scope: Vec<WorkoutElement> = (0..len).map(|_| rest_element()).collect();
    sequence::renumber(&mut scope);
    scope
}

fn lift_doc(exercise_id: i64, reps: i64) -> Value {
    json!({
        "exercise_id": exercise_id, "reps": reps, "time": 0,
        "weight": 60.0, "rpe": 7.5, "automatic": false
    })
}

/// Flat plan: one section, `activities` lifts, no nesting.
fn flat_plan(activities: i64) -> Value {
    let parts: Vec<Value> = (0..activities).map(|i| lift_doc(i + 1, 5)).collect();
    json!({
        "name": "Flat",
        "sections": [{"rounds": 1, "parts": parts}]
    })
}

/// Plan nested `depth` sections deep, each round multiplying its children.
fn nested_plan(depth: u32, rounds: i64) -> Value {
    let mut inner = json!({"rounds": rounds, "parts": [lift_doc(1, 5)]});
    for level in 1..depth {
        inner = json!({
            "rounds": rounds,
            "parts": [lift_doc(i64::from(level) + 1, 5), inner]
        });
    }
    json!({"name": "Nested", "sections": [inner]})
}

fn tree_from(plan: Value) -> RoutineTree {
    documents::decode_routine_create(plan).unwrap().tree
}

/// Benchmark the sequence kernel on scopes of realistic length
fn bench_sequence_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_kernel");

    let scope_256 = scope_of(256);
    group.bench_function("insert_middle_256", |b| {
        b.iter(|| {
            let mut scope = scope_256.clone();
            sequence::insert(&mut scope, black_box(128), rest_element());
            scope
        });
    });

    group.bench_function("remove_middle_256", |b| {
        b.iter(|| {
            let mut scope = scope_256.clone();
            sequence::remove(&mut scope, black_box(128));
            scope
        });
    });

    group.bench_function("move_across_256", |b| {
        b.iter(|| {
            let mut scope = scope_256.clone();
            sequence::move_item(&mut scope, black_box(8), black_box(248));
            scope
        });
    });

    let scope_4096 = scope_of(4096);
    group.bench_function("renumber_4096", |b| {
        b.iter(|| {
            let mut scope = scope_4096.clone();
            sequence::renumber(&mut scope);
            scope
        });
    });

    group.finish();
}

/// Benchmark repeat unrolling into workout elements
fn bench_plan_flattening(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten_plan");

    let flat = tree_from(flat_plan(32));
    group.throughput(Throughput::Elements(flat.generate_elements().len() as u64));
    group.bench_function("flat_32_activities", |b| {
        b.iter(|| black_box(&flat).generate_elements());
    });

    // 4 levels at 4 rounds each unroll to 340 elements
    let nested = tree_from(nested_plan(4, 4));
    group.throughput(Throughput::Elements(nested.generate_elements().len() as u64));
    group.bench_function("nested_4_levels_4_rounds", |b| {
        b.iter(|| black_box(&nested).generate_elements());
    });

    group.finish();
}

/// Benchmark the document codec in both directions
fn bench_document_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_codec");

    let flat = flat_plan(32);
    let flat_bytes = serde_json::to_vec(&flat).unwrap();
    group.throughput(Throughput::Bytes(flat_bytes.len() as u64));
    group.bench_function("decode_flat_32", |b| {
        b.iter(|| documents::decode_routine_create(black_box(flat.clone())).unwrap());
    });

    let nested = nested_plan(6, 2);
    let nested_bytes = serde_json::to_vec(&nested).unwrap();
    group.throughput(Throughput::Bytes(nested_bytes.len() as u64));
    group.bench_function("decode_nested_6_levels", |b| {
        b.iter(|| documents::decode_routine_create(black_box(nested.clone())).unwrap());
    });

    let mut routine = Routine::new(RoutineId::new(1), Uuid::new_v4(), "Bench");
    routine.tree = tree_from(flat_plan(32));
    group.bench_function("encode_flat_32", |b| {
        b.iter(|| documents::encode_routine(black_box(&routine)).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sequence_kernel,
    bench_plan_flattening,
    bench_document_codec,
);
criterion_main!(benches);
