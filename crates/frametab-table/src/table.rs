//! Column-oriented accumulation of flat records.
//!
//! A [`FrameTable`] holds one replay as a Structure-of-Arrays: one typed
//! [`ColumnData`] vector per schema column, all of the same length. Every
//! column is declared up front from the [`Schema`], so a replay with zero
//! in-game frames still yields the full column set, just with no rows.
//!
//! Rows are appended with [`FrameTable::push`], which walks the record's
//! cells and checks each against the declared column before anything is
//! written; a rejected record leaves the table untouched.

use std::collections::HashMap;

use frametab_core::record::{ColumnVisitor, FlatRecord};
use frametab_core::schema::{ColumnKind, Family, Schema, Value};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while accumulating records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    /// A cell's kind differs from the declared kind of its column.
    #[error("column '{column}' holds {expected} values, got {found}")]
    KindMismatch {
        column: String,
        expected: String,
        found: ColumnKind,
    },

    /// The record's cells are out of step with the declared columns.
    #[error("column '{column}' expected field '{expected}', record produced '{found}'")]
    FieldMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// The record produced a different number of cells than there are columns.
    #[error("record has {found} cells, table has {expected} columns")]
    WidthMismatch { expected: usize, found: usize },
}

// ---------------------------------------------------------------------------
// ColumnData
// ---------------------------------------------------------------------------

/// The values of one column.
///
/// Serializes as a plain JSON array. Non-finite floats (the `NaN`
/// placeholders) become `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnData {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Float32(Vec<f32>),
    Bool(Vec<bool>),
    Utf8(Vec<String>),
}

impl ColumnData {
    /// Empty storage for a column of `kind`.
    pub fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Int => ColumnData::Int64(Vec::new()),
            ColumnKind::Float => ColumnData::Float64(Vec::new()),
            ColumnKind::Bool => ColumnData::Bool(Vec::new()),
            ColumnKind::Str => ColumnData::Utf8(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage type name, as written to the output header.
    pub fn dtype(&self) -> &'static str {
        match self {
            ColumnData::Int64(_) => "int64",
            ColumnData::Float64(_) => "float64",
            ColumnData::Float32(_) => "float32",
            ColumnData::Bool(_) => "bool",
            ColumnData::Utf8(_) => "utf8",
        }
    }

    /// Logical kind of the values, independent of float width.
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Int64(_) => ColumnKind::Int,
            ColumnData::Float64(_) | ColumnData::Float32(_) => ColumnKind::Float,
            ColumnData::Bool(_) => ColumnKind::Bool,
            ColumnData::Utf8(_) => ColumnKind::Str,
        }
    }

    /// The cell at `row`. Narrowed floats are widened back to `f64`.
    pub fn get(&self, row: usize) -> Option<Value> {
        match self {
            ColumnData::Int64(v) => v.get(row).map(|&i| Value::Int(i)),
            ColumnData::Float64(v) => v.get(row).map(|&f| Value::Float(f)),
            ColumnData::Float32(v) => v.get(row).map(|&f| Value::Float(f64::from(f))),
            ColumnData::Bool(v) => v.get(row).map(|&b| Value::Bool(b)),
            ColumnData::Utf8(v) => v.get(row).map(|s| Value::Str(s.clone())),
        }
    }

    /// Equality that treats `NaN` cells as equal to each other.
    pub fn bit_eq(&self, other: &ColumnData) -> bool {
        match (self, other) {
            (ColumnData::Float64(a), ColumnData::Float64(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (ColumnData::Float32(a), ColumnData::Float32(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            _ => self == other,
        }
    }

    /// Append `value`; the caller has already checked its kind.
    fn push(&mut self, value: Value) {
        match (self, value) {
            (ColumnData::Int64(v), Value::Int(i)) => v.push(i),
            (ColumnData::Float64(v), Value::Float(f)) => v.push(f),
            (ColumnData::Float32(v), Value::Float(f)) => v.push(f as f32),
            (ColumnData::Bool(v), Value::Bool(b)) => v.push(b),
            (ColumnData::Utf8(v), Value::Str(s)) => v.push(s),
            (column, value) => unreachable!(
                "{} cell pushed into {} column",
                value.kind(),
                column.dtype()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A named column together with the schema family it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub family: Family,
    /// Name within the family, e.g. `"pos_x"`.
    pub field: &'static str,
    pub data: ColumnData,
}

// ---------------------------------------------------------------------------
// FrameTable
// ---------------------------------------------------------------------------

/// One replay's worth of flat records, stored column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTable {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    rows: usize,
}

impl FrameTable {
    /// An empty table with every column of `schema` declared.
    pub fn new(schema: &Schema) -> Self {
        let columns: Vec<Column> = schema
            .columns()
            .iter()
            .map(|spec| Column {
                name: spec.name.clone(),
                family: spec.family,
                field: spec.field,
                data: ColumnData::for_kind(spec.kind),
            })
            .collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self {
            columns,
            index,
            rows: 0,
        }
    }

    /// An empty table over [`Schema::canonical`].
    pub fn canonical() -> Self {
        Self::new(Schema::canonical())
    }

    /// Append one record as a new row.
    pub fn push(&mut self, record: &FlatRecord) -> Result<(), TableError> {
        struct Stage<'t> {
            columns: &'t [Column],
            cells: Vec<Value>,
            error: Option<TableError>,
        }

        impl ColumnVisitor for Stage<'_> {
            fn visit(&mut self, family: Family, field: &'static str, value: Value) {
                if self.error.is_some() {
                    return;
                }
                let at = self.cells.len();
                let Some(column) = self.columns.get(at) else {
                    // Width is checked once the walk is done.
                    self.cells.push(value);
                    return;
                };
                if column.family != family || column.field != field {
                    self.error = Some(TableError::FieldMismatch {
                        column: column.name.clone(),
                        expected: column.field.to_owned(),
                        found: format!("{}{field}", family.prefix()),
                    });
                } else if column.data.kind() != value.kind() {
                    self.error = Some(TableError::KindMismatch {
                        column: column.name.clone(),
                        expected: column.data.dtype().to_owned(),
                        found: value.kind(),
                    });
                } else {
                    self.cells.push(value);
                }
            }
        }

        let mut stage = Stage {
            columns: &self.columns,
            cells: Vec::with_capacity(self.columns.len()),
            error: None,
        };
        record.visit(&mut stage);
        if let Some(err) = stage.error {
            return Err(err);
        }
        if stage.cells.len() != self.columns.len() {
            return Err(TableError::WidthMismatch {
                expected: self.columns.len(),
                found: stage.cells.len(),
            });
        }

        let cells = stage.cells;
        for (column, value) in self.columns.iter_mut().zip(cells) {
            column.data.push(value);
        }
        self.rows += 1;
        Ok(())
    }

    /// Number of rows pushed so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.index.get(name).map(|&i| &self.columns[i].data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use frametab_core::prelude::*;

    fn record(frame: i64) -> FlatRecord {
        let snap = Snapshot {
            frame,
            stage: Some("BATTLEFIELD".to_owned()),
            players: vec![
                PlayerEntry {
                    port: 1,
                    ..Default::default()
                },
                PlayerEntry {
                    port: 2,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        flatten(&snap, &SeatOrder::from_snapshot(&snap), CategoryTables::builtin()).0
    }

    #[test]
    fn empty_table_declares_every_column() {
        let table = FrameTable::canonical();
        assert_eq!(table.rows(), 0);
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), Schema::canonical().len());
        assert!(table.columns().iter().all(|c| c.data.is_empty()));
        assert_eq!(table.column("p1_nana_stock").map(ColumnData::dtype), Some("int64"));
        assert_eq!(table.column("startAt").map(ColumnData::dtype), Some("utf8"));
    }

    #[test]
    fn push_appends_in_order() {
        let mut table = FrameTable::canonical();
        for frame in [-123, -122, -121] {
            table.push(&record(frame)).unwrap();
        }
        assert_eq!(table.rows(), 3);
        assert_eq!(
            table.column("frame"),
            Some(&ColumnData::Int64(vec![-123, -122, -121]))
        );
        assert!(table.columns().iter().all(|c| c.data.len() == 3));
        assert_eq!(table.column("p2_port").and_then(|c| c.get(2)), Some(Value::Int(2)));
    }

    #[test]
    fn bit_eq_matches_nan_cells() {
        let a = ColumnData::Float64(vec![1.0, f64::NAN]);
        let b = ColumnData::Float64(vec![1.0, f64::NAN]);
        assert_ne!(a, b);
        assert!(a.bit_eq(&b));
        assert!(!a.bit_eq(&ColumnData::Float64(vec![1.0])));
    }

    #[test]
    fn narrowed_column_reads_back_as_float() {
        let column = ColumnData::Float32(vec![0.5]);
        assert_eq!(column.kind(), ColumnKind::Float);
        assert_eq!(column.get(0), Some(Value::Float(0.5)));
        assert_eq!(column.get(1), None);
    }
}
