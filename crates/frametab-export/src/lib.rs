//! Frametab export -- the per-replay pipeline and its file boundary.
//!
//! - [`source`]: the [`SnapshotSource`](source::SnapshotSource) seam and a
//!   JSON Lines reader for decoded snapshot streams.
//! - [`export`]: [`export_replay`](export::export_replay), which turns one
//!   stream into two perspective tables.
//! - [`naming`]: slugged, disambiguated output file names.
//! - [`writer`]: column-oriented JSON output.

#![deny(unsafe_code)]

pub mod export;
pub mod naming;
pub mod source;
pub mod writer;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::export::{export_replay, ExportOptions, ExportStats, ReplayExport, ReplayMeta};
    pub use crate::naming::{slug, OutputName, DEFAULT_EXTENSION};
    pub use crate::source::{from_snapshots, IterSource, JsonLinesSource, SnapshotSource, SourceError};
    pub use crate::writer::{write_replay, write_table, WriteError};
}
