//! Property tests for perspective projection.
//!
//! Swapping the decoder order of the two participants in every snapshot of a
//! replay must swap the two perspective views exactly, and both views must
//! always list the same columns with the same storage types.

use frametab_core::prelude::*;
use frametab_table::prelude::*;
use proptest::prelude::*;

fn finite_f64() -> impl Strategy<Value = f64> {
    (-100_000i32..100_000i32).prop_map(|v| f64::from(v) * 0.01)
}

fn character(name: &'static str) -> impl Strategy<Value = CharacterState> {
    (finite_f64(), finite_f64(), 0i64..5, any::<bool>()).prop_map(
        move |(x, percent, stock, on_ground)| CharacterState {
            character: Some(name.to_owned()),
            action: Some("STANDING".to_owned()),
            position: Point { x, y: 0.0 },
            percent,
            stock,
            on_ground,
            ..Default::default()
        },
    )
}

/// One frame: Popo (maybe with Nana) on port 1, Fox on port 2.
fn frame_pair() -> impl Strategy<Value = (PlayerEntry, PlayerEntry, usize)> {
    (
        character("POPO"),
        prop::option::of(character("NANA")),
        character("FOX"),
        0usize..11,
    )
        .prop_map(|(popo, nana, fox, projectiles)| {
            (
                PlayerEntry {
                    port: 1,
                    state: ParticipantState { body: popo, nana },
                },
                PlayerEntry {
                    port: 2,
                    state: ParticipantState {
                        body: fox,
                        nana: None,
                    },
                },
                projectiles,
            )
        })
}

fn replay(frames: &[(PlayerEntry, PlayerEntry, usize)], swap: bool) -> FrameTable {
    let snaps: Vec<Snapshot> = frames
        .iter()
        .enumerate()
        .map(|(i, (a, b, projectiles))| {
            let players = if swap {
                vec![b.clone(), a.clone()]
            } else {
                vec![a.clone(), b.clone()]
            };
            Snapshot {
                frame: i as i64,
                players,
                projectiles: (0..*projectiles)
                    .map(|j| Projectile {
                        owner: (j % 2) as i64 + 1,
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }
        })
        .collect();

    let mut table = FrameTable::canonical();
    if let Some(first) = snaps.first() {
        let seats = SeatOrder::from_snapshot(first);
        for snap in &snaps {
            let (record, _) = flatten(snap, &seats, CategoryTables::builtin());
            table.push(&record).unwrap();
        }
    }
    narrow_floats(&mut table);
    table
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn swapping_participants_swaps_views(frames in prop::collection::vec(frame_pair(), 0..20)) {
        let (orig_p1, orig_p2) = project(&replay(&frames, false));
        let (swap_p1, swap_p2) = project(&replay(&frames, true));
        prop_assert!(swap_p1.bit_eq(&orig_p2));
        prop_assert!(swap_p2.bit_eq(&orig_p1));
    }

    #[test]
    fn views_share_header(frames in prop::collection::vec(frame_pair(), 1..10)) {
        let (p1, p2) = project(&replay(&frames, false));
        let header = |t: &PerspectiveTable| -> Vec<(String, &'static str)> {
            t.columns().map(|(n, d)| (n.to_owned(), d.dtype())).collect()
        };
        prop_assert_eq!(header(&p1), header(&p2));
        prop_assert_eq!(p1.rows(), frames.len());
    }
}
