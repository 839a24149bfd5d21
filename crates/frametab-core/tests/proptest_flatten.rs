//! Property tests for per-frame flattening.
//!
//! Random snapshots (with and without companions, with any number of
//! projectiles, with arbitrary labels) must always flatten to the canonical
//! column list with the canonical kinds.

use frametab_core::prelude::*;
use proptest::prelude::*;

/// Finite f64 values; placeholders are the only NaNs we want to see.
fn finite_f64() -> impl Strategy<Value = f64> {
    (-1_000_000i32..1_000_000i32).prop_map(|v| f64::from(v) * 0.01)
}

fn label() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("FOX".to_owned())),
        Just(Some("STANDING".to_owned())),
        Just(Some("FINAL_DESTINATION".to_owned())),
        "[A-Z_]{1,12}".prop_map(Some),
    ]
}

fn character_state() -> impl Strategy<Value = CharacterState> {
    (
        label(),
        label(),
        -10i64..100,
        finite_f64(),
        finite_f64(),
        any::<bool>(),
        0i64..5,
        prop::collection::btree_map(
            prop::sample::select(Button::ALL.to_vec()),
            any::<bool>(),
            0..6,
        ),
    )
        .prop_map(
            |(character, action, action_frame, x, percent, facing, stock, buttons)| {
                CharacterState {
                    character,
                    action,
                    action_frame,
                    controller_state: ControllerState {
                        buttons,
                        ..Default::default()
                    },
                    facing,
                    percent,
                    position: Point { x, y: -x },
                    stock,
                    ..Default::default()
                }
            },
        )
}

fn projectile() -> impl Strategy<Value = Projectile> {
    (0i64..5, finite_f64(), label()).prop_map(|(owner, x, kind)| Projectile {
        owner,
        position: Point { x, y: x },
        kind,
        ..Default::default()
    })
}

fn snapshot() -> impl Strategy<Value = Snapshot> {
    (
        -123i64..10_000,
        label(),
        prop::collection::vec(
            (
                1u8..5,
                character_state(),
                prop::option::of(character_state()),
            ),
            0..4,
        ),
        prop::collection::vec(projectile(), 0..12),
    )
        .prop_map(|(frame, stage, players, projectiles)| Snapshot {
            frame,
            stage,
            players: players
                .into_iter()
                .map(|(port, body, nana)| PlayerEntry {
                    port,
                    state: ParticipantState { body, nana },
                })
                .collect(),
            projectiles,
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn flattened_kinds_never_change(snap in snapshot()) {
        let schema = Schema::canonical();
        let seats = SeatOrder::from_snapshot(&snap);
        let (record, report) = flatten(&snap, &seats, CategoryTables::builtin());

        let values = record.values();
        prop_assert_eq!(values.len(), schema.len());
        for (spec, value) in schema.columns().iter().zip(&values) {
            prop_assert_eq!(spec.kind, value.kind(), "column {}", &spec.name);
        }
        prop_assert_eq!(
            report.dropped_projectiles,
            snap.projectiles.len().saturating_sub(MAX_PROJ)
        );
    }

    #[test]
    fn codes_are_table_codes_or_sentinel(snap in snapshot()) {
        let tables = CategoryTables::builtin();
        let seats = SeatOrder::from_snapshot(&snap);
        let (record, _) = flatten(&snap, &seats, tables);

        prop_assert!(record.stage >= -1);
        prop_assert!(record.stage < tables.len(CategoryDomain::Stage) as i64);
        for seat in Seat::BOTH {
            let character = record.player(seat).body.character;
            prop_assert!(character >= -1);
            prop_assert!(character < tables.len(CategoryDomain::Character) as i64);
        }
    }

    #[test]
    fn flattening_is_deterministic(snap in snapshot()) {
        let seats = SeatOrder::from_snapshot(&snap);
        let (a, _) = flatten(&snap, &seats, CategoryTables::builtin());
        let (b, _) = flatten(&snap, &seats, CategoryTables::builtin());
        prop_assert_eq!(a.digest(), b.digest());
    }
}
