//! The canonical column schema.
//!
//! Every record produced by the flattener, for every replay, has exactly the
//! columns listed here, in this order, with these kinds. The schema is
//! declared statically as field tables per column family and expanded once
//! per process into a [`Schema`]; nothing builds column names while frames
//! are being flattened.
//!
//! Column families, in order:
//!
//! 1. Frame-level columns ([`FRAME_FIELDS`]).
//! 2. The `p1_` and `p2_` participant families: `port`, the character head
//!    ([`CHARACTER_HEAD_FIELDS`]), one column per [`Button::ALL`], and the
//!    character tail ([`CHARACTER_TAIL_FIELDS`]).
//! 3. The `p1_nana_` and `p2_nana_` companion families: head, one column per
//!    [`Button::COMPANION`], tail.
//! 4. `proj0_` .. `proj7_` projectile slots ([`PROJECTILE_FIELDS`]).

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::codes::CategoryTables;
use crate::snapshot::Button;

/// Number of projectile slots in every record. Projectiles beyond this are
/// dropped; changing it changes the schema.
pub const MAX_PROJ: usize = 8;

// ---------------------------------------------------------------------------
// ColumnKind / Value
// ---------------------------------------------------------------------------

/// Logical type of a column.
///
/// `Float` columns are accumulated at double precision and narrowed to
/// single precision by the table normalizer before export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Int,
    Float,
    Bool,
    Str,
}

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Value::Int(_) => ColumnKind::Int,
            Value::Float(_) => ColumnKind::Float,
            Value::Bool(_) => ColumnKind::Bool,
            Value::Str(_) => ColumnKind::Str,
        }
    }

    /// Bitwise equality: unlike `==`, two NaN floats with the same bit
    /// pattern compare equal.
    pub fn bit_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

// ---------------------------------------------------------------------------
// Seat / Family
// ---------------------------------------------------------------------------

/// One of the two participant seats of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Seat {
    P1,
    P2,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::P1, Seat::P2];

    pub fn index(self) -> usize {
        match self {
            Seat::P1 => 0,
            Seat::P2 => 1,
        }
    }

    pub fn other(self) -> Seat {
        match self {
            Seat::P1 => Seat::P2,
            Seat::P2 => Seat::P1,
        }
    }

    /// Column prefix of this seat's participant family.
    pub fn prefix(self) -> &'static str {
        match self {
            Seat::P1 => "p1_",
            Seat::P2 => "p2_",
        }
    }
}

/// The family a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Frame,
    Participant(Seat),
    Companion(Seat),
    Projectile(usize),
}

impl Family {
    /// The seat this family belongs to, if any.
    pub fn seat(self) -> Option<Seat> {
        match self {
            Family::Participant(seat) | Family::Companion(seat) => Some(seat),
            Family::Frame | Family::Projectile(_) => None,
        }
    }

    /// Column name prefix for this family.
    pub fn prefix(self) -> String {
        match self {
            Family::Frame => String::new(),
            Family::Participant(seat) => seat.prefix().to_owned(),
            Family::Companion(seat) => format!("{}nana_", seat.prefix()),
            Family::Projectile(slot) => format!("proj{slot}_"),
        }
    }
}

// ---------------------------------------------------------------------------
// Static field tables
// ---------------------------------------------------------------------------

/// A field of a column family: the column-name suffix and its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn int(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: ColumnKind::Int,
    }
}

const fn float(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: ColumnKind::Float,
    }
}

const fn boolean(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: ColumnKind::Bool,
    }
}

const fn string(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: ColumnKind::Str,
    }
}

/// Frame-level columns. `stage` holds the encoded stage code.
pub const FRAME_FIELDS: &[FieldSpec] = &[
    int("frame"),
    float("distance"),
    int("stage"),
    string("startAt"),
];

/// Participant-only columns, emitted before the character head.
pub const PARTICIPANT_FIELDS: &[FieldSpec] = &[int("port")];

/// Identity columns shared by participants and companions. `character` and
/// `action` hold encoded codes.
pub const CHARACTER_HEAD_FIELDS: &[FieldSpec] =
    &[int("character"), int("action"), int("action_frame")];

/// Scalar columns emitted after the button columns.
pub const CHARACTER_TAIL_FIELDS: &[FieldSpec] = &[
    float("main_x"),
    float("main_y"),
    float("c_x"),
    float("c_y"),
    float("l_shldr"),
    float("r_shldr"),
    int("costume"),
    float("ecb_bottom_x"),
    float("ecb_bottom_y"),
    float("ecb_left_x"),
    float("ecb_left_y"),
    float("ecb_right_x"),
    float("ecb_right_y"),
    float("ecb_top_x"),
    float("ecb_top_y"),
    boolean("facing"),
    int("hitlag_left"),
    int("hitstun_left"),
    int("invuln_left"),
    boolean("invulnerable"),
    int("jumps_left"),
    boolean("moonwalkwarning"),
    boolean("off_stage"),
    boolean("on_ground"),
    float("percent"),
    float("pos_x"),
    float("pos_y"),
    float("shield_strength"),
    float("speed_air_x_self"),
    float("speed_ground_x_self"),
    float("speed_x_attack"),
    float("speed_y_attack"),
    float("speed_y_self"),
    int("stock"),
];

/// Columns of one projectile slot. `type` holds the encoded type code.
pub const PROJECTILE_FIELDS: &[FieldSpec] = &[
    int("frame"),
    int("owner"),
    float("pos_x"),
    float("pos_y"),
    float("speed_x"),
    float("speed_y"),
    int("subtype"),
    int("type"),
];

/// The ordered fields of `family`.
pub fn family_fields(family: Family) -> Vec<FieldSpec> {
    let buttons = |list: &[Button]| {
        list.iter()
            .map(|b| boolean(b.column_name()))
            .collect::<Vec<_>>()
    };
    match family {
        Family::Frame => FRAME_FIELDS.to_vec(),
        Family::Participant(_) => PARTICIPANT_FIELDS
            .iter()
            .chain(CHARACTER_HEAD_FIELDS)
            .copied()
            .chain(buttons(&Button::ALL))
            .chain(CHARACTER_TAIL_FIELDS.iter().copied())
            .collect(),
        Family::Companion(_) => CHARACTER_HEAD_FIELDS
            .iter()
            .copied()
            .chain(buttons(&Button::COMPANION))
            .chain(CHARACTER_TAIL_FIELDS.iter().copied())
            .collect(),
        Family::Projectile(_) => PROJECTILE_FIELDS.to_vec(),
    }
}

/// Families in canonical column order.
pub fn families() -> Vec<Family> {
    let mut out = vec![Family::Frame];
    out.extend(Seat::BOTH.map(Family::Participant));
    out.extend(Seat::BOTH.map(Family::Companion));
    out.extend((0..MAX_PROJ).map(Family::Projectile));
    out
}

// ---------------------------------------------------------------------------
// ColumnSpec / Schema
// ---------------------------------------------------------------------------

/// One fully expanded column of the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Full column name, e.g. `"p2_nana_btn_BUTTON_A"`.
    pub name: String,
    pub family: Family,
    /// Name within the family, e.g. `"btn_BUTTON_A"`.
    pub field: &'static str,
    pub kind: ColumnKind,
    /// Placeholder value used when the owning entity is absent.
    pub default: Value,
}

/// The expanded, ordered column list plus a name index.
#[derive(Debug)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    /// The canonical schema, built on first use.
    pub fn canonical() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(Schema::build)
    }

    fn build() -> Schema {
        let mut columns = Vec::new();
        for family in families() {
            let prefix = family.prefix();
            for field in family_fields(family) {
                columns.push(ColumnSpec {
                    name: format!("{prefix}{}", field.name),
                    family,
                    field: field.name,
                    kind: field.kind,
                    default: crate::seed::placeholder(field.kind),
                });
            }
        }
        let by_name = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Schema { columns, by_name }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of the column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.position(name).map(|i| &self.columns[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// BLAKE3 hex digest identifying this schema under `tables`.
    ///
    /// Covers the ordered column names and kinds and the categorical table
    /// version, i.e. everything a consumer needs to agree on to read two
    /// exports side by side.
    pub fn fingerprint(&self, tables: &CategoryTables) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&tables.version.to_le_bytes());
        for column in &self.columns {
            hasher.update(column.name.as_bytes());
            hasher.update(&[0, column.kind as u8]);
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Int => "int",
            ColumnKind::Float => "float",
            ColumnKind::Bool => "bool",
            ColumnKind::Str => "str",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_counts_per_family() {
        assert_eq!(family_fields(Family::Frame).len(), 4);
        assert_eq!(family_fields(Family::Participant(Seat::P1)).len(), 52);
        assert_eq!(family_fields(Family::Companion(Seat::P1)).len(), 49);
        assert_eq!(family_fields(Family::Projectile(0)).len(), 8);
        assert_eq!(Schema::canonical().len(), 4 + 2 * 52 + 2 * 49 + MAX_PROJ * 8);
    }

    #[test]
    fn names_are_unique() {
        let schema = Schema::canonical();
        let mut names: Vec<&str> = schema.names().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), schema.len());
    }

    #[test]
    fn canonical_order_starts_with_frame_and_ends_with_projectiles() {
        let schema = Schema::canonical();
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(&names[..4], &["frame", "distance", "stage", "startAt"]);
        assert_eq!(names[4], "p1_port");
        assert_eq!(names[5], "p1_character");
        assert_eq!(names[4 + 52], "p2_port");
        assert_eq!(names[4 + 104], "p1_nana_character");
        assert_eq!(names.last().copied(), Some("proj7_type"));
    }

    #[test]
    fn companion_family_has_no_port_or_stick_buttons() {
        let schema = Schema::canonical();
        assert!(schema.column("p1_nana_port").is_none());
        assert!(schema.column("p1_nana_btn_BUTTON_MAIN").is_none());
        assert!(schema.column("p1_btn_BUTTON_MAIN").is_some());
        assert!(schema.column("p2_nana_btn_BUTTON_D_RIGHT").is_some());
    }

    #[test]
    fn defaults_match_kinds() {
        for column in Schema::canonical().columns() {
            assert_eq!(column.default.kind(), column.kind, "{}", column.name);
        }
        let nana_percent = Schema::canonical().column("p1_nana_percent").unwrap();
        assert!(matches!(nana_percent.default, Value::Float(f) if f.is_nan()));
    }

    #[test]
    fn fingerprint_tracks_table_version() {
        let schema = Schema::canonical();
        let v1 = CategoryTables::builtin().clone();
        let mut v2 = v1.clone();
        v2.version = 2;
        assert_eq!(schema.fingerprint(&v1), schema.fingerprint(&v1));
        assert_ne!(schema.fingerprint(&v1), schema.fingerprint(&v2));
        assert_eq!(schema.fingerprint(&v1).len(), 64);
    }

    #[test]
    fn seat_helpers() {
        assert_eq!(Seat::P1.other(), Seat::P2);
        assert_eq!(Family::Companion(Seat::P2).prefix(), "p2_nana_");
        assert_eq!(Family::Projectile(3).prefix(), "proj3_");
        assert_eq!(Family::Projectile(3).seat(), None);
    }
}
