//! Where snapshots come from.
//!
//! The replay decoder lives outside this workspace; the exporter only sees a
//! [`SnapshotSource`] that yields "next snapshot or end of stream". Decoded
//! streams are stored as JSON Lines (one [`Snapshot`] per line) and read back
//! with [`JsonLinesSource`], one line at a time.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use frametab_core::snapshot::Snapshot;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while pulling snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("parse snapshot on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A decoder-side failure reported by a non-file source.
    #[error("decoder: {0}")]
    Decoder(String),
}

// ---------------------------------------------------------------------------
// SnapshotSource
// ---------------------------------------------------------------------------

/// A pull-based stream of decoded snapshots for one replay.
pub trait SnapshotSource {
    /// The next snapshot, `Ok(None)` at end of stream.
    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, SourceError>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for &mut S {
    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, SourceError> {
        (**self).next_snapshot()
    }
}

/// Source over any iterator of decoded snapshots.
///
/// ```
/// use frametab_core::snapshot::Snapshot;
/// use frametab_export::source::{from_snapshots, SnapshotSource};
///
/// let mut source = from_snapshots(vec![Snapshot::default()]);
/// assert!(source.next_snapshot().unwrap().is_some());
/// assert!(source.next_snapshot().unwrap().is_none());
/// ```
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Result<Snapshot, SourceError>>,
{
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

/// Source over snapshots already in memory.
pub fn from_snapshots(
    snapshots: Vec<Snapshot>,
) -> IterSource<impl Iterator<Item = Result<Snapshot, SourceError>>> {
    IterSource::new(snapshots.into_iter().map(Ok))
}

impl<I> SnapshotSource for IterSource<I>
where
    I: Iterator<Item = Result<Snapshot, SourceError>>,
{
    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, SourceError> {
        self.iter.next().transpose()
    }
}

// ---------------------------------------------------------------------------
// JsonLinesSource
// ---------------------------------------------------------------------------

/// Reads one JSON snapshot per line. Blank lines are skipped.
pub struct JsonLinesSource<R> {
    reader: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::with_capacity(8 << 10),
            line_no: 0,
        }
    }

    /// Lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl JsonLinesSource<BufReader<File>> {
    /// Open a `.jsonl` file of decoded snapshots.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> SnapshotSource for JsonLinesSource<R> {
    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, SourceError> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_line(&mut self.buf)
                .map_err(|source| SourceError::Read {
                    line: self.line_no + 1,
                    source,
                })?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            return serde_json::from_str(line)
                .map(Some)
                .map_err(|source| SourceError::Parse {
                    line: self.line_no,
                    source,
                });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
