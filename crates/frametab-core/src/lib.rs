//! Frametab core -- per-frame flattening of fighting-game replay snapshots.
//!
//! This crate turns one decoded [`Snapshot`](snapshot::Snapshot) into one
//! [`FlatRecord`](record::FlatRecord) with a fixed, replay-independent shape:
//! the same columns, in the same order, with the same kinds, whether or not a
//! participant has a companion or how many projectiles are alive. Absent
//! sub-entities are seeded with type-preserving placeholders ([`seed`]) and
//! categorical labels are replaced by integer codes from versioned lookup
//! tables ([`codes`]).
//!
//! # Quick Start
//!
//! ```
//! use frametab_core::prelude::*;
//!
//! let snap: Snapshot = serde_json::from_str(r#"{
//!     "frame": 0,
//!     "stage": "BATTLEFIELD",
//!     "players": [
//!         { "port": 1, "character": "FOX", "action": "STANDING" },
//!         { "port": 2, "character": "MARTH" }
//!     ],
//!     "projectiles": [ { "owner": 1, "type": "FOX_LASER" } ]
//! }"#).unwrap();
//!
//! let tables = CategoryTables::builtin();
//! let seats = SeatOrder::from_snapshot(&snap);
//! let (record, report) = flatten(&snap, &seats, tables);
//!
//! assert!(report.is_clean());
//! assert_eq!(record.values().len(), Schema::canonical().len());
//! // No companion on this frame: its columns are still there.
//! assert_eq!(record.get("p1_nana_btn_BUTTON_A"), Some(Value::Bool(false)));
//! assert_eq!(record.get("proj1_owner"), Some(Value::Int(-1)));
//! ```

#![deny(unsafe_code)]

pub mod codes;
pub mod flatten;
pub mod record;
pub mod schema;
pub mod seed;
pub mod snapshot;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::codes::{
        CategoryDomain, CategoryTables, CodesError, NO_PROJECTILE_LABEL, UNKNOWN_LABEL, UNMAPPED,
    };
    pub use crate::flatten::{flatten, FlattenReport, SeatOrder};
    pub use crate::record::{
        CharacterColumns, ColumnVisitor, FlatRecord, ParticipantColumns, ProjectileColumns,
    };
    pub use crate::schema::{ColumnKind, ColumnSpec, Family, Schema, Seat, Value, MAX_PROJ};
    pub use crate::snapshot::{
        Button, CharacterState, ControllerState, MenuState, ParticipantState, PlayerEntry, Point,
        Projectile, Snapshot,
    };
}
