//! The flat, fixed-shape record produced for every in-game frame.
//!
//! [`FlatRecord`] is a plain struct: one field per scalar, with categorical
//! labels already replaced by their integer codes. It only turns into
//! `(column, value)` cells at the table boundary, via
//! [`FlatRecord::visit`], which walks the fields in exactly the order of the
//! [`Schema`](crate::schema::Schema) field tables.

use crate::schema::{Family, Schema, Seat, Value, MAX_PROJ};
use crate::snapshot::Button;

// ---------------------------------------------------------------------------
// ColumnVisitor
// ---------------------------------------------------------------------------

/// Receives the cells of a record in canonical column order.
///
/// `field` is the column name within its family (e.g. `"pos_x"`), so sinks
/// can check they are in step with the schema without building full names.
pub trait ColumnVisitor {
    fn visit(&mut self, family: Family, field: &'static str, value: Value);
}

// ---------------------------------------------------------------------------
// CharacterColumns
// ---------------------------------------------------------------------------

/// Columns shared by a participant's main character and its companion.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterColumns {
    pub character: i64,
    pub action: i64,
    pub action_frame: i64,
    /// Indexed by [`Button::index`].
    pub buttons: [bool; Button::COUNT],
    pub main_x: f64,
    pub main_y: f64,
    pub c_x: f64,
    pub c_y: f64,
    pub l_shldr: f64,
    pub r_shldr: f64,
    pub costume: i64,
    pub ecb_bottom: [f64; 2],
    pub ecb_left: [f64; 2],
    pub ecb_right: [f64; 2],
    pub ecb_top: [f64; 2],
    pub facing: bool,
    pub hitlag_left: i64,
    pub hitstun_left: i64,
    pub invuln_left: i64,
    pub invulnerable: bool,
    pub jumps_left: i64,
    pub moonwalkwarning: bool,
    pub off_stage: bool,
    pub on_ground: bool,
    pub percent: f64,
    pub pos_x: f64,
    pub pos_y: f64,
    pub shield_strength: f64,
    pub speed_air_x_self: f64,
    pub speed_ground_x_self: f64,
    pub speed_x_attack: f64,
    pub speed_y_attack: f64,
    pub speed_y_self: f64,
    pub stock: i64,
}

impl CharacterColumns {
    fn visit_head(&self, family: Family, v: &mut impl ColumnVisitor) {
        v.visit(family, "character", Value::Int(self.character));
        v.visit(family, "action", Value::Int(self.action));
        v.visit(family, "action_frame", Value::Int(self.action_frame));
    }

    fn visit_buttons(&self, family: Family, buttons: &[Button], v: &mut impl ColumnVisitor) {
        for &button in buttons {
            v.visit(
                family,
                button.column_name(),
                Value::Bool(self.buttons[button.index()]),
            );
        }
    }

    fn visit_tail(&self, family: Family, v: &mut impl ColumnVisitor) {
        v.visit(family, "main_x", Value::Float(self.main_x));
        v.visit(family, "main_y", Value::Float(self.main_y));
        v.visit(family, "c_x", Value::Float(self.c_x));
        v.visit(family, "c_y", Value::Float(self.c_y));
        v.visit(family, "l_shldr", Value::Float(self.l_shldr));
        v.visit(family, "r_shldr", Value::Float(self.r_shldr));
        v.visit(family, "costume", Value::Int(self.costume));
        v.visit(family, "ecb_bottom_x", Value::Float(self.ecb_bottom[0]));
        v.visit(family, "ecb_bottom_y", Value::Float(self.ecb_bottom[1]));
        v.visit(family, "ecb_left_x", Value::Float(self.ecb_left[0]));
        v.visit(family, "ecb_left_y", Value::Float(self.ecb_left[1]));
        v.visit(family, "ecb_right_x", Value::Float(self.ecb_right[0]));
        v.visit(family, "ecb_right_y", Value::Float(self.ecb_right[1]));
        v.visit(family, "ecb_top_x", Value::Float(self.ecb_top[0]));
        v.visit(family, "ecb_top_y", Value::Float(self.ecb_top[1]));
        v.visit(family, "facing", Value::Bool(self.facing));
        v.visit(family, "hitlag_left", Value::Int(self.hitlag_left));
        v.visit(family, "hitstun_left", Value::Int(self.hitstun_left));
        v.visit(family, "invuln_left", Value::Int(self.invuln_left));
        v.visit(family, "invulnerable", Value::Bool(self.invulnerable));
        v.visit(family, "jumps_left", Value::Int(self.jumps_left));
        v.visit(family, "moonwalkwarning", Value::Bool(self.moonwalkwarning));
        v.visit(family, "off_stage", Value::Bool(self.off_stage));
        v.visit(family, "on_ground", Value::Bool(self.on_ground));
        v.visit(family, "percent", Value::Float(self.percent));
        v.visit(family, "pos_x", Value::Float(self.pos_x));
        v.visit(family, "pos_y", Value::Float(self.pos_y));
        v.visit(family, "shield_strength", Value::Float(self.shield_strength));
        v.visit(family, "speed_air_x_self", Value::Float(self.speed_air_x_self));
        v.visit(
            family,
            "speed_ground_x_self",
            Value::Float(self.speed_ground_x_self),
        );
        v.visit(family, "speed_x_attack", Value::Float(self.speed_x_attack));
        v.visit(family, "speed_y_attack", Value::Float(self.speed_y_attack));
        v.visit(family, "speed_y_self", Value::Float(self.speed_y_self));
        v.visit(family, "stock", Value::Int(self.stock));
    }

    /// Visit as a companion family: no port, only [`Button::COMPANION`].
    fn visit_companion(&self, seat: Seat, v: &mut impl ColumnVisitor) {
        let family = Family::Companion(seat);
        self.visit_head(family, v);
        self.visit_buttons(family, &Button::COMPANION, v);
        self.visit_tail(family, v);
    }
}

// ---------------------------------------------------------------------------
// ParticipantColumns
// ---------------------------------------------------------------------------

/// Columns of one participant seat.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantColumns {
    /// Controller port, or `-1` if the seat had no state on this frame.
    pub port: i64,
    pub body: CharacterColumns,
}

impl ParticipantColumns {
    fn visit(&self, seat: Seat, v: &mut impl ColumnVisitor) {
        let family = Family::Participant(seat);
        v.visit(family, "port", Value::Int(self.port));
        self.body.visit_head(family, v);
        self.body.visit_buttons(family, &Button::ALL, v);
        self.body.visit_tail(family, v);
    }
}

// ---------------------------------------------------------------------------
// ProjectileColumns
// ---------------------------------------------------------------------------

/// Columns of one projectile slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileColumns {
    pub frame: i64,
    pub owner: i64,
    pub pos_x: f64,
    pub pos_y: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    pub subtype: i64,
    /// Encoded projectile type.
    pub kind: i64,
}

impl ProjectileColumns {
    fn visit(&self, slot: usize, v: &mut impl ColumnVisitor) {
        let family = Family::Projectile(slot);
        v.visit(family, "frame", Value::Int(self.frame));
        v.visit(family, "owner", Value::Int(self.owner));
        v.visit(family, "pos_x", Value::Float(self.pos_x));
        v.visit(family, "pos_y", Value::Float(self.pos_y));
        v.visit(family, "speed_x", Value::Float(self.speed_x));
        v.visit(family, "speed_y", Value::Float(self.speed_y));
        v.visit(family, "subtype", Value::Int(self.subtype));
        v.visit(family, "type", Value::Int(self.kind));
    }
}

// ---------------------------------------------------------------------------
// FlatRecord
// ---------------------------------------------------------------------------

/// One row of the canonical table: everything about one in-game frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    pub frame: i64,
    pub distance: f64,
    /// Encoded stage.
    pub stage: i64,
    pub start_at: String,
    /// Indexed by [`Seat::index`].
    pub players: [ParticipantColumns; 2],
    /// Indexed by [`Seat::index`]. Always populated; absent companions hold
    /// placeholders.
    pub companions: [CharacterColumns; 2],
    pub projectiles: [ProjectileColumns; MAX_PROJ],
}

impl FlatRecord {
    pub fn player(&self, seat: Seat) -> &ParticipantColumns {
        &self.players[seat.index()]
    }

    pub fn companion(&self, seat: Seat) -> &CharacterColumns {
        &self.companions[seat.index()]
    }

    /// Walk every cell in canonical column order.
    pub fn visit(&self, v: &mut impl ColumnVisitor) {
        v.visit(Family::Frame, "frame", Value::Int(self.frame));
        v.visit(Family::Frame, "distance", Value::Float(self.distance));
        v.visit(Family::Frame, "stage", Value::Int(self.stage));
        v.visit(Family::Frame, "startAt", Value::Str(self.start_at.clone()));
        for seat in Seat::BOTH {
            self.players[seat.index()].visit(seat, v);
        }
        for seat in Seat::BOTH {
            self.companions[seat.index()].visit_companion(seat, v);
        }
        for (slot, projectile) in self.projectiles.iter().enumerate() {
            projectile.visit(slot, v);
        }
    }

    /// All cells in canonical column order.
    pub fn values(&self) -> Vec<Value> {
        struct Collect(Vec<Value>);
        impl ColumnVisitor for Collect {
            fn visit(&mut self, _: Family, _: &'static str, value: Value) {
                self.0.push(value);
            }
        }
        let mut out = Collect(Vec::with_capacity(Schema::canonical().len()));
        self.visit(&mut out);
        out.0
    }

    /// The cell of the column called `name`.
    ///
    /// Convenience for tests and debugging; goes through the full value list.
    pub fn get(&self, name: &str) -> Option<Value> {
        let position = Schema::canonical().position(name)?;
        self.values().into_iter().nth(position)
    }

    /// BLAKE3 hex digest over the bit patterns of every cell, in order.
    ///
    /// Two records have the same digest iff they are bit-identical
    /// (NaN placeholders included).
    pub fn digest(&self) -> String {
        struct Hash(blake3::Hasher);
        impl ColumnVisitor for Hash {
            fn visit(&mut self, _: Family, _: &'static str, value: Value) {
                match value {
                    Value::Int(i) => {
                        self.0.update(&[0]);
                        self.0.update(&i.to_le_bytes());
                    }
                    Value::Float(f) => {
                        self.0.update(&[1]);
                        self.0.update(&f.to_bits().to_le_bytes());
                    }
                    Value::Bool(b) => {
                        self.0.update(&[2, u8::from(b)]);
                    }
                    Value::Str(s) => {
                        self.0.update(&[3]);
                        self.0.update(&(s.len() as u64).to_le_bytes());
                        self.0.update(s.as_bytes());
                    }
                }
            }
        }
        let mut hash = Hash(blake3::Hasher::new());
        self.visit(&mut hash);
        hash.0.finalize().to_hex().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
