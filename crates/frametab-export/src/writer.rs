//! Table serialization.
//!
//! A [`PerspectiveTable`] is written as one column-oriented JSON document:
//!
//! ```json
//! {
//!   "schema_fingerprint": "9f3c...",
//!   "perspective": "p1",
//!   "rows": 2,
//!   "columns": [
//!     { "name": "frame", "type": "int64", "values": [-123, -122] },
//!     { "name": "self_percent", "type": "float32", "values": [0.0, null] }
//!   ]
//! }
//! ```
//!
//! `NaN` placeholders are written as `null`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use frametab_core::schema::Seat;
use frametab_table::perspective::PerspectiveTable;
use frametab_table::table::ColumnData;
use serde::Serialize;

use crate::export::ReplayExport;
use crate::naming::OutputName;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while writing tables.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Document layout
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TableDocument<'a> {
    schema_fingerprint: &'a str,
    perspective: &'static str,
    rows: usize,
    columns: Vec<ColumnDocument<'a>>,
}

#[derive(Serialize)]
struct ColumnDocument<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    dtype: &'static str,
    values: &'a ColumnData,
}

fn perspective_label(seat: Seat) -> &'static str {
    match seat {
        Seat::P1 => "p1",
        Seat::P2 => "p2",
    }
}

/// Write `table` to `path`, tagged with `fingerprint`.
pub fn write_table(
    path: &Path,
    table: &PerspectiveTable,
    fingerprint: &str,
) -> Result<(), WriteError> {
    let document = TableDocument {
        schema_fingerprint: fingerprint,
        perspective: perspective_label(table.self_seat()),
        rows: table.rows(),
        columns: table
            .columns()
            .map(|(name, values)| ColumnDocument {
                name,
                dtype: values.dtype(),
                values,
            })
            .collect(),
    };

    let file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, &document).map_err(|source| WriteError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    out.write_all(b"\n")
        .and_then(|()| out.flush())
        .map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), rows = table.rows(), "table written");
    Ok(())
}

/// Staging path for `path`: same directory, hidden, `.partial` suffix.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

/// Write both views of `export` under `dir`; returns the two paths, p1 first.
///
/// Both tables are staged first and only renamed into place once both were
/// written, so a failure never leaves one view without its partner.
pub fn write_replay(
    dir: &Path,
    name: &OutputName,
    export: &ReplayExport,
    extension: &str,
) -> Result<[PathBuf; 2], WriteError> {
    let paths = name.paths(dir, extension);
    let staged = paths.each_ref().map(|path| staging_path(path));

    let written = Seat::BOTH
        .into_iter()
        .zip(&staged)
        .try_for_each(|(seat, path)| write_table(path, export.view(seat), &export.fingerprint));
    if let Err(err) = written {
        discard(&staged);
        return Err(err);
    }

    for (i, (from, to)) in staged.iter().zip(&paths).enumerate() {
        if let Err(source) = std::fs::rename(from, to) {
            discard(&staged);
            discard(&paths[..i]);
            return Err(WriteError::Io {
                path: to.clone(),
                source,
            });
        }
    }
    Ok(paths)
}

/// Best-effort removal of files left by a failed write.
fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(err) = std::fs::remove_file(path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), "could not remove partial output: {err}");
            }
        }
    }
}
