//! Frametab table -- per-replay column storage and perspective views.
//!
//! Flat records from [`frametab_core`] are accumulated into a column-oriented
//! [`FrameTable`](table::FrameTable), their floats narrowed to `f32`
//! ([`normalize`]), and the result split into two participant-relative
//! [`PerspectiveTable`](perspective::PerspectiveTable)s ([`perspective`]).

#![deny(unsafe_code)]

pub mod normalize;
pub mod perspective;
pub mod table;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::normalize::narrow_floats;
    pub use crate::perspective::{project, PerspectiveTable};
    pub use crate::table::{Column, ColumnData, FrameTable, TableError};
}
