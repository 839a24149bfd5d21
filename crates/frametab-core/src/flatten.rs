//! Snapshot -> [`FlatRecord`].
//!
//! [`flatten`] turns one in-game [`Snapshot`] into one record with the
//! canonical shape:
//!
//! 1. Frame-level scalars.
//! 2. Both participant seats, in [`SeatOrder`].
//! 3. Companions that are present.
//! 4. Exactly [`MAX_PROJ`] projectile slots; empty slots get placeholders and
//!    projectiles beyond the cap are dropped.
//! 5. Placeholders for every companion that was not present.
//! 6. Categorical encoding of every label collected above, as the last step.
//!
//! Flattening is pure: the same snapshot and seat order always give a
//! bit-identical record (see [`FlatRecord::digest`]).
//!
//! Dropped data is never an error, but it is counted in the returned
//! [`FlattenReport`] so callers can surface it.

use crate::codes::{CategoryDomain, CategoryTables, NO_PROJECTILE_LABEL, UNKNOWN_LABEL};
use crate::record::{CharacterColumns, FlatRecord, ParticipantColumns, ProjectileColumns};
use crate::schema::{Seat, MAX_PROJ};
use crate::snapshot::{Button, CharacterState, Projectile, Snapshot};

// ---------------------------------------------------------------------------
// SeatOrder
// ---------------------------------------------------------------------------

/// Which controller port sits in which seat.
///
/// Seats are taken in order of first appearance and never reassigned, so
/// `p1_` always describes the same participant. A seat left empty by the
/// first in-game snapshot is filled by the first new port a later snapshot
/// brings (see [`SeatOrder::fill_from`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SeatOrder {
    ports: [Option<u8>; 2],
}

impl SeatOrder {
    pub fn new(p1: Option<u8>, p2: Option<u8>) -> Self {
        Self { ports: [p1, p2] }
    }

    /// Seats the first two participants of `snapshot`, in order of appearance.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut seats = Self::default();
        seats.fill_from(snapshot);
        seats
    }

    /// Seat unseen ports of `snapshot` in empty seats, in order of
    /// appearance. Occupied seats are kept. Returns whether a seat was filled.
    pub fn fill_from(&mut self, snapshot: &Snapshot) -> bool {
        let mut filled = false;
        for entry in &snapshot.players {
            if self.contains(entry.port) {
                continue;
            }
            let Some(empty) = self.ports.iter_mut().find(|port| port.is_none()) else {
                break;
            };
            *empty = Some(entry.port);
            filled = true;
        }
        filled
    }

    /// Whether both seats are taken.
    pub fn is_full(&self) -> bool {
        self.ports.iter().all(Option::is_some)
    }

    pub fn port(&self, seat: Seat) -> Option<u8> {
        self.ports[seat.index()]
    }

    /// The same participants with seats exchanged.
    pub fn swapped(&self) -> Self {
        Self::new(self.ports[1], self.ports[0])
    }

    fn contains(&self, port: u8) -> bool {
        self.ports.contains(&Some(port))
    }
}

// ---------------------------------------------------------------------------
// FlattenReport
// ---------------------------------------------------------------------------

/// Data the fixed schema could not hold, counted per frame (or summed per
/// replay via [`FlattenReport::merge`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlattenReport {
    /// Projectiles beyond the [`MAX_PROJ`] slots.
    pub dropped_projectiles: usize,
    /// Pressed companion buttons that have no companion column
    /// (`BUTTON_MAIN`, `BUTTON_C`).
    pub dropped_companion_buttons: usize,
    /// Participants beyond the two seats.
    pub unseated_participants: usize,
    /// Seats whose port had no state on the frame.
    pub missing_participants: usize,
}

impl FlattenReport {
    pub fn merge(&mut self, other: &FlattenReport) {
        self.dropped_projectiles += other.dropped_projectiles;
        self.dropped_companion_buttons += other.dropped_companion_buttons;
        self.unseated_participants += other.unseated_participants;
        self.missing_participants += other.missing_participants;
    }

    /// Whether nothing was dropped or seeded for a missing participant.
    pub fn is_clean(&self) -> bool {
        *self == FlattenReport::default()
    }
}

// ---------------------------------------------------------------------------
// Pending labels
// ---------------------------------------------------------------------------

/// Labels of one character, collected before encoding.
#[derive(Clone, Copy)]
struct CharacterLabels<'s> {
    character: Option<&'s str>,
    action: Option<&'s str>,
}

impl CharacterLabels<'static> {
    const UNKNOWN: Self = CharacterLabels {
        character: Some(UNKNOWN_LABEL),
        action: Some(UNKNOWN_LABEL),
    };
}

impl<'s> CharacterLabels<'s> {
    fn of(state: &'s CharacterState) -> Self {
        Self {
            character: state.character.as_deref(),
            action: state.action.as_deref(),
        }
    }

    fn encode_into(&self, tables: &CategoryTables, columns: &mut CharacterColumns) {
        columns.character = tables.encode(CategoryDomain::Character, self.character);
        columns.action = tables.encode(CategoryDomain::Action, self.action);
    }
}

/// Every categorical label of a frame, collected in steps 1-5 and encoded
/// into the record in step 6.
struct PendingLabels<'s> {
    stage: Option<&'s str>,
    players: [CharacterLabels<'s>; 2],
    companions: [CharacterLabels<'s>; 2],
    projectiles: [Option<&'s str>; MAX_PROJ],
}

impl PendingLabels<'_> {
    fn encode_into(&self, tables: &CategoryTables, record: &mut FlatRecord) {
        record.stage = tables.encode(CategoryDomain::Stage, self.stage);
        for seat in Seat::BOTH {
            let i = seat.index();
            self.players[i].encode_into(tables, &mut record.players[i].body);
            self.companions[i].encode_into(tables, &mut record.companions[i]);
        }
        for (label, slot) in self.projectiles.iter().zip(record.projectiles.iter_mut()) {
            slot.kind = tables.encode(CategoryDomain::ProjectileType, *label);
        }
    }
}

// ---------------------------------------------------------------------------
// Column builders
// ---------------------------------------------------------------------------

/// Copy a character's values, keeping only the buttons in `buttons`.
///
/// Code fields stay at the sentinel until the encoding step. Returns the
/// columns and the number of pressed buttons that were left out.
fn character_columns(state: &CharacterState, buttons: &[Button]) -> (CharacterColumns, usize) {
    let controller = &state.controller_state;
    let mut pressed = [false; Button::COUNT];
    for &button in buttons {
        pressed[button.index()] = controller.is_pressed(button);
    }
    let dropped = Button::ALL
        .iter()
        .filter(|&&b| !buttons.contains(&b) && controller.is_pressed(b))
        .count();

    let columns = CharacterColumns {
        buttons: pressed,
        action_frame: state.action_frame,
        main_x: controller.main_stick[0],
        main_y: controller.main_stick[1],
        c_x: controller.c_stick[0],
        c_y: controller.c_stick[1],
        l_shldr: controller.l_shoulder,
        r_shldr: controller.r_shoulder,
        costume: state.costume,
        ecb_bottom: state.ecb_bottom,
        ecb_left: state.ecb_left,
        ecb_right: state.ecb_right,
        ecb_top: state.ecb_top,
        facing: state.facing,
        hitlag_left: state.hitlag_left,
        hitstun_left: state.hitstun_frames_left,
        invuln_left: state.invulnerability_left,
        invulnerable: state.invulnerable,
        jumps_left: state.jumps_left,
        moonwalkwarning: state.moonwalkwarning,
        off_stage: state.off_stage,
        on_ground: state.on_ground,
        percent: state.percent,
        pos_x: state.position.x,
        pos_y: state.position.y,
        shield_strength: state.shield_strength,
        speed_air_x_self: state.speed_air_x_self,
        speed_ground_x_self: state.speed_ground_x_self,
        speed_x_attack: state.speed_x_attack,
        speed_y_attack: state.speed_y_attack,
        speed_y_self: state.speed_y_self,
        stock: state.stock,
        ..CharacterColumns::placeholder()
    };
    (columns, dropped)
}

fn projectile_columns(projectile: &Projectile) -> ProjectileColumns {
    ProjectileColumns {
        frame: projectile.frame,
        owner: projectile.owner,
        pos_x: projectile.position.x,
        pos_y: projectile.position.y,
        speed_x: projectile.speed.x,
        speed_y: projectile.speed.y,
        subtype: projectile.subtype,
        ..ProjectileColumns::placeholder()
    }
}

// ---------------------------------------------------------------------------
// flatten
// ---------------------------------------------------------------------------

/// Flatten one in-game snapshot.
///
/// `seats` decides which participant fills the `p1_` and `p2_` families; use
/// the same [`SeatOrder`] for every frame of a replay. Snapshots outside of
/// active gameplay should be filtered out before calling this.
pub fn flatten(
    snapshot: &Snapshot,
    seats: &SeatOrder,
    tables: &CategoryTables,
) -> (FlatRecord, FlattenReport) {
    let mut report = FlattenReport::default();

    // 1. Frame-level scalars.
    let mut labels = PendingLabels {
        stage: snapshot.stage.as_deref(),
        players: [CharacterLabels::UNKNOWN; 2],
        companions: [CharacterLabels::UNKNOWN; 2],
        projectiles: [Some(NO_PROJECTILE_LABEL); MAX_PROJ],
    };

    // 2-3. Participants and whichever companions are present.
    let mut players = [ParticipantColumns::placeholder(), ParticipantColumns::placeholder()];
    let mut companions: [Option<CharacterColumns>; 2] = [None, None];
    for seat in Seat::BOTH {
        let i = seat.index();
        let Some((port, state)) = seats
            .port(seat)
            .and_then(|port| snapshot.player(port).map(|state| (port, state)))
        else {
            report.missing_participants += 1;
            continue;
        };

        let (body, dropped) = character_columns(&state.body, &Button::ALL);
        debug_assert_eq!(dropped, 0);
        players[i] = ParticipantColumns {
            port: i64::from(port),
            body,
        };
        labels.players[i] = CharacterLabels::of(&state.body);

        if let Some(nana) = &state.nana {
            let (columns, dropped) = character_columns(nana, &Button::COMPANION);
            report.dropped_companion_buttons += dropped;
            companions[i] = Some(columns);
            labels.companions[i] = CharacterLabels::of(nana);
        }
    }
    report.unseated_participants = snapshot
        .players
        .iter()
        .filter(|entry| !seats.contains(entry.port))
        .count();

    // 4. Fixed projectile slots.
    let projectiles: [ProjectileColumns; MAX_PROJ] = std::array::from_fn(|slot| {
        match snapshot.projectiles.get(slot) {
            Some(projectile) => {
                labels.projectiles[slot] = projectile.kind.as_deref();
                projectile_columns(projectile)
            }
            None => ProjectileColumns::placeholder(),
        }
    });
    report.dropped_projectiles = snapshot.projectiles.len().saturating_sub(MAX_PROJ);

    // 5. Seed absent companions.
    let companions = companions.map(|c| c.unwrap_or_else(CharacterColumns::placeholder));

    let mut record = FlatRecord {
        frame: snapshot.frame,
        distance: snapshot.distance,
        stage: crate::codes::UNMAPPED,
        start_at: snapshot.start_at.clone(),
        players,
        companions,
        projectiles,
    };

    // 6. Encode categoricals in place.
    labels.encode_into(tables, &mut record);

    (record, report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
