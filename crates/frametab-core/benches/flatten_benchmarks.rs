//! Flattening throughput.
//!
//! A replay runs at 60 frames per second, so an eight-minute match is close
//! to 30K snapshots. These benchmarks measure the per-frame cost of
//! [`flatten`] for a sparse frame (no companions, no projectiles) and a busy
//! frame (both companions, every projectile slot plus overflow), and the cost
//! of walking a record's cells.
//!
//! Run with: `cargo bench --bench flatten_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use frametab_core::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn character(name: &str) -> CharacterState {
    let mut state = CharacterState {
        character: Some(name.to_owned()),
        action: Some("STANDING".to_owned()),
        percent: 12.0,
        stock: 4,
        ..Default::default()
    };
    state.controller_state.buttons.insert(Button::A, true);
    state
}

fn snapshot(busy: bool) -> Snapshot {
    let nana = busy.then(|| character("NANA"));
    Snapshot {
        frame: 1_000,
        stage: Some("BATTLEFIELD".to_owned()),
        players: vec![
            PlayerEntry {
                port: 1,
                state: ParticipantState {
                    body: character("POPO"),
                    nana: nana.clone(),
                },
            },
            PlayerEntry {
                port: 2,
                state: ParticipantState {
                    body: character("POPO"),
                    nana,
                },
            },
        ],
        projectiles: if busy {
            (0..MAX_PROJ as i64 + 2)
                .map(|owner| Projectile {
                    owner,
                    kind: Some("FOX_LASER".to_owned()),
                    ..Default::default()
                })
                .collect()
        } else {
            Vec::new()
        },
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_flatten(c: &mut Criterion) {
    let tables = CategoryTables::builtin();
    let mut group = c.benchmark_group("flatten");
    for (name, busy) in [("sparse", false), ("busy", true)] {
        let snap = snapshot(busy);
        let seats = SeatOrder::from_snapshot(&snap);
        group.bench_with_input(BenchmarkId::from_parameter(name), &snap, |b, snap| {
            b.iter(|| black_box(flatten(black_box(snap), &seats, tables)));
        });
    }
    group.finish();
}

fn bench_values(c: &mut Criterion) {
    let snap = snapshot(true);
    let (record, _) = flatten(&snap, &SeatOrder::from_snapshot(&snap), CategoryTables::builtin());
    c.bench_function("record_values", |b| {
        b.iter(|| black_box(record.values()));
    });
    c.bench_function("record_digest", |b| {
        b.iter(|| black_box(record.digest()));
    });
}

criterion_group!(benches, bench_flatten, bench_values);
criterion_main!(benches);
