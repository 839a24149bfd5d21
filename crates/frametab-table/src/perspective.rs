//! Self/opponent views of a frame table.
//!
//! [`project`] derives two tables from one [`FrameTable`]: in the first, the
//! `p1_` participant is "self"; in the second, `p2_` is. Participant columns
//! are renamed `self_*` / `opp_*` (companions `self_nana_*` / `opp_nana_*`)
//! and reordered so both views list their columns in the same order:
//!
//! 1. frame-level columns,
//! 2. `self_`, then `opp_`,
//! 3. `self_nana_`, then `opp_nana_`,
//! 4. projectile slots.
//!
//! Frame-level and projectile columns are copied through unchanged.
//!
//! ```
//! use frametab_table::prelude::*;
//!
//! let table = FrameTable::canonical();
//! let (p1, p2) = project(&table);
//! assert_eq!(p1.column_names(), p2.column_names());
//! assert!(p1.column("self_stock").is_some());
//! assert!(p2.column("opp_nana_percent").is_some());
//! assert!(p1.column("p1_stock").is_none());
//! ```

use std::collections::HashMap;

use frametab_core::schema::{Family, Seat};

use crate::table::{Column, ColumnData, FrameTable};

pub const SELF_PREFIX: &str = "self_";
pub const OPP_PREFIX: &str = "opp_";
pub const SELF_NANA_PREFIX: &str = "self_nana_";
pub const OPP_NANA_PREFIX: &str = "opp_nana_";

/// One participant's view of a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveTable {
    self_seat: Seat,
    rows: usize,
    columns: Vec<(String, ColumnData)>,
    index: HashMap<String, usize>,
}

impl PerspectiveTable {
    /// The seat whose columns appear as `self_*`.
    pub fn self_seat(&self) -> Seat {
        self.self_seat
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.index.get(name).map(|&i| &self.columns[i].1)
    }

    /// Columns in output order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnData)> {
        self.columns.iter().map(|(name, data)| (name.as_str(), data))
    }

    /// Same column list, and every column bit-identical (`NaN` included).
    pub fn bit_eq(&self, other: &PerspectiveTable) -> bool {
        self.rows == other.rows
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|((a, x), (b, y))| a == b && x.bit_eq(y))
    }
}

/// Output prefix of `family` when `self_seat` is "self".
fn view_prefix(family: Family, self_seat: Seat) -> String {
    match family {
        Family::Participant(seat) if seat == self_seat => SELF_PREFIX.to_owned(),
        Family::Participant(_) => OPP_PREFIX.to_owned(),
        Family::Companion(seat) if seat == self_seat => SELF_NANA_PREFIX.to_owned(),
        Family::Companion(_) => OPP_NANA_PREFIX.to_owned(),
        Family::Frame | Family::Projectile(_) => family.prefix(),
    }
}

/// Rank of `family` in the output order of a view.
fn view_rank(family: Family, self_seat: Seat) -> (u8, usize) {
    match family {
        Family::Frame => (0, 0),
        Family::Participant(seat) if seat == self_seat => (1, 0),
        Family::Participant(_) => (2, 0),
        Family::Companion(seat) if seat == self_seat => (3, 0),
        Family::Companion(_) => (4, 0),
        Family::Projectile(slot) => (5, slot),
    }
}

fn view(table: &FrameTable, self_seat: Seat) -> PerspectiveTable {
    let mut ordered: Vec<&Column> = table.columns().iter().collect();
    // Stable: keeps field order within each family.
    ordered.sort_by_key(|c| view_rank(c.family, self_seat));

    let columns: Vec<(String, ColumnData)> = ordered
        .into_iter()
        .map(|c| {
            let name = format!("{}{}", view_prefix(c.family, self_seat), c.field);
            (name, c.data.clone())
        })
        .collect();
    let index = columns
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.clone(), i))
        .collect();

    PerspectiveTable {
        self_seat,
        rows: table.rows(),
        columns,
        index,
    }
}

/// Build the `p1`-as-self and `p2`-as-self views of `table`.
pub fn project(table: &FrameTable) -> (PerspectiveTable, PerspectiveTable) {
    (view(table, Seat::P1), view(table, Seat::P2))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
