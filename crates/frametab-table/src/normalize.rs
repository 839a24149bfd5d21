//! Float narrowing.
//!
//! Every `float64` column is stored as `float32` before export. Integer,
//! boolean and string columns are left alone. `NaN` placeholders stay `NaN`.

use crate::table::{ColumnData, FrameTable};

/// Narrow every `Float64` column of `table` to `Float32`.
///
/// Returns the number of columns converted; calling it again on the same
/// table converts nothing.
pub fn narrow_floats(table: &mut FrameTable) -> usize {
    let mut narrowed = 0;
    for column in table.columns_mut() {
        if let ColumnData::Float64(values) = &column.data {
            column.data = ColumnData::Float32(values.iter().map(|&v| v as f32).collect());
            narrowed += 1;
        }
    }
    if narrowed > 0 {
        tracing::debug!(columns = narrowed, rows = table.rows(), "narrowed float columns");
    }
    narrowed
}
