//! Placeholders for absent sub-entities.
//!
//! When a companion, a participant seat, or a projectile slot has no real
//! data on a frame, its columns are still emitted, filled with these
//! placeholders. Each placeholder has exactly the Rust type of the present
//! value, so accumulating frames never promotes a column's type:
//!
//! | kind  | placeholder |
//! |-------|-------------|
//! | bool  | `false`     |
//! | int   | `-1`        |
//! | float | `NaN`       |
//! | label | [`UNKNOWN_LABEL`] / [`NO_PROJECTILE_LABEL`], encoding to `-1` |
//!
//! [`UNKNOWN_LABEL`]: crate::codes::UNKNOWN_LABEL
//! [`NO_PROJECTILE_LABEL`]: crate::codes::NO_PROJECTILE_LABEL

use crate::codes::UNMAPPED;
use crate::record::{CharacterColumns, ParticipantColumns, ProjectileColumns};
use crate::schema::{ColumnKind, Value};
use crate::snapshot::Button;

pub const PLACEHOLDER_INT: i64 = -1;
pub const PLACEHOLDER_FLOAT: f64 = f64::NAN;
pub const PLACEHOLDER_BOOL: bool = false;

/// Placeholder cell for a column of `kind`.
pub fn placeholder(kind: ColumnKind) -> Value {
    match kind {
        ColumnKind::Int => Value::Int(PLACEHOLDER_INT),
        ColumnKind::Float => Value::Float(PLACEHOLDER_FLOAT),
        ColumnKind::Bool => Value::Bool(PLACEHOLDER_BOOL),
        ColumnKind::Str => Value::Str(String::new()),
    }
}

impl CharacterColumns {
    /// Columns of a character with no decoded state. Code fields hold
    /// [`UNMAPPED`] until the encoder runs.
    pub fn placeholder() -> Self {
        Self {
            character: UNMAPPED,
            action: UNMAPPED,
            action_frame: PLACEHOLDER_INT,
            buttons: [PLACEHOLDER_BOOL; Button::COUNT],
            main_x: PLACEHOLDER_FLOAT,
            main_y: PLACEHOLDER_FLOAT,
            c_x: PLACEHOLDER_FLOAT,
            c_y: PLACEHOLDER_FLOAT,
            l_shldr: PLACEHOLDER_FLOAT,
            r_shldr: PLACEHOLDER_FLOAT,
            costume: PLACEHOLDER_INT,
            ecb_bottom: [PLACEHOLDER_FLOAT; 2],
            ecb_left: [PLACEHOLDER_FLOAT; 2],
            ecb_right: [PLACEHOLDER_FLOAT; 2],
            ecb_top: [PLACEHOLDER_FLOAT; 2],
            facing: PLACEHOLDER_BOOL,
            hitlag_left: PLACEHOLDER_INT,
            hitstun_left: PLACEHOLDER_INT,
            invuln_left: PLACEHOLDER_INT,
            invulnerable: PLACEHOLDER_BOOL,
            jumps_left: PLACEHOLDER_INT,
            moonwalkwarning: PLACEHOLDER_BOOL,
            off_stage: PLACEHOLDER_BOOL,
            on_ground: PLACEHOLDER_BOOL,
            percent: PLACEHOLDER_FLOAT,
            pos_x: PLACEHOLDER_FLOAT,
            pos_y: PLACEHOLDER_FLOAT,
            shield_strength: PLACEHOLDER_FLOAT,
            speed_air_x_self: PLACEHOLDER_FLOAT,
            speed_ground_x_self: PLACEHOLDER_FLOAT,
            speed_x_attack: PLACEHOLDER_FLOAT,
            speed_y_attack: PLACEHOLDER_FLOAT,
            speed_y_self: PLACEHOLDER_FLOAT,
            stock: PLACEHOLDER_INT,
        }
    }
}

impl ParticipantColumns {
    /// Columns of a seat whose port has no state on this frame.
    pub fn placeholder() -> Self {
        Self {
            port: PLACEHOLDER_INT,
            body: CharacterColumns::placeholder(),
        }
    }
}

impl ProjectileColumns {
    /// Columns of an unused projectile slot.
    pub fn placeholder() -> Self {
        Self {
            frame: PLACEHOLDER_INT,
            owner: PLACEHOLDER_INT,
            pos_x: PLACEHOLDER_FLOAT,
            pos_y: PLACEHOLDER_FLOAT,
            speed_x: PLACEHOLDER_FLOAT,
            speed_y: PLACEHOLDER_FLOAT,
            subtype: PLACEHOLDER_INT,
            kind: UNMAPPED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_kinds_round_trip() {
        for kind in [
            ColumnKind::Int,
            ColumnKind::Float,
            ColumnKind::Bool,
            ColumnKind::Str,
        ] {
            assert_eq!(placeholder(kind).kind(), kind);
        }
    }

    #[test]
    fn projectile_placeholder_is_exact() {
        let slot = ProjectileColumns::placeholder();
        assert_eq!(slot.frame, -1);
        assert_eq!(slot.owner, -1);
        assert_eq!(slot.subtype, -1);
        assert_eq!(slot.kind, -1);
        assert!(slot.pos_x.is_nan() && slot.pos_y.is_nan());
        assert!(slot.speed_x.is_nan() && slot.speed_y.is_nan());
    }

    #[test]
    fn character_placeholder_has_no_pressed_buttons() {
        let nana = CharacterColumns::placeholder();
        assert!(nana.buttons.iter().all(|pressed| !pressed));
        assert!(!nana.facing && !nana.on_ground);
        assert_eq!(nana.stock, -1);
        assert!(nana.percent.is_nan());
    }
}
