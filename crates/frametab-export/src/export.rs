//! Replay export: snapshot stream in, two perspective tables out.
//!
//! [`export_replay`] drives the whole per-replay pipeline:
//!
//! 1. Pull snapshots from a [`SnapshotSource`] until end of stream.
//! 2. Skip everything outside active gameplay.
//! 3. Seat participants in order of first appearance ([`SeatOrder`]); a
//!    seated port keeps its seat for the rest of the replay. [`ReplayMeta`]
//!    comes from the first in-game snapshot.
//! 4. Flatten every in-game snapshot and push it into a [`FrameTable`].
//! 5. Narrow floats and project the two [`PerspectiveTable`]s.
//!
//! A source error aborts the replay: no partial tables are returned.
//!
//! ```
//! use frametab_core::snapshot::Snapshot;
//! use frametab_export::export::{export_replay, ExportOptions};
//! use frametab_export::source::from_snapshots;
//!
//! let snaps: Vec<Snapshot> = (0..3)
//!     .map(|frame| Snapshot { frame, ..Default::default() })
//!     .collect();
//! let export = export_replay(from_snapshots(snaps), &ExportOptions::default()).unwrap();
//! assert_eq!(export.stats.frames, 3);
//! assert_eq!(export.p1.rows(), 3);
//! assert_eq!(export.p1.column_names(), export.p2.column_names());
//! ```

use std::sync::Arc;

use anyhow::Context;
use frametab_core::codes::CategoryTables;
use frametab_core::flatten::{flatten, FlattenReport, SeatOrder};
use frametab_core::schema::{Schema, Seat};
use frametab_core::snapshot::Snapshot;
use frametab_table::normalize::narrow_floats;
use frametab_table::perspective::{project, PerspectiveTable};
use frametab_table::table::FrameTable;

use crate::source::SnapshotSource;

// ---------------------------------------------------------------------------
// ExportOptions
// ---------------------------------------------------------------------------

/// Per-run export settings.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Categorical lookup tables. Shared, never mutated.
    pub categories: Arc<CategoryTables>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            categories: Arc::new(CategoryTables::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// ReplayMeta / ExportStats / ReplayExport
// ---------------------------------------------------------------------------

/// Labels captured from the first in-game snapshot, used for naming.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplayMeta {
    pub stage: Option<String>,
    pub p1_character: Option<String>,
    pub p2_character: Option<String>,
    pub start_at: String,
}

impl ReplayMeta {
    fn capture(snapshot: &Snapshot, seats: &SeatOrder) -> Self {
        let mut meta = Self {
            stage: snapshot.stage.clone(),
            p1_character: None,
            p2_character: None,
            start_at: snapshot.start_at.clone(),
        };
        meta.fill_characters(snapshot, seats);
        meta
    }

    /// Record the character of each seated participant not named yet.
    fn fill_characters(&mut self, snapshot: &Snapshot, seats: &SeatOrder) {
        for (seat, slot) in Seat::BOTH
            .into_iter()
            .zip([&mut self.p1_character, &mut self.p2_character])
        {
            if slot.is_none() {
                *slot = seats
                    .port(seat)
                    .and_then(|port| snapshot.player(port))
                    .and_then(|state| state.body.character.clone());
            }
        }
    }
}

/// Counters for one exported replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportStats {
    /// Snapshots pulled from the source.
    pub snapshots: usize,
    /// In-game snapshots flattened into rows.
    pub frames: usize,
    /// Snapshots skipped for being outside active gameplay.
    pub skipped: usize,
    /// Data the fixed schema could not hold, summed over all frames.
    pub dropped: FlattenReport,
}

/// Everything produced for one replay.
#[derive(Debug, Clone)]
pub struct ReplayExport {
    pub meta: ReplayMeta,
    pub stats: ExportStats,
    /// [`Schema::fingerprint`] under the tables used for this export.
    pub fingerprint: String,
    /// View with `p1` as self.
    pub p1: PerspectiveTable,
    /// View with `p2` as self.
    pub p2: PerspectiveTable,
}

impl ReplayExport {
    pub fn view(&self, seat: Seat) -> &PerspectiveTable {
        match seat {
            Seat::P1 => &self.p1,
            Seat::P2 => &self.p2,
        }
    }
}

// ---------------------------------------------------------------------------
// export_replay
// ---------------------------------------------------------------------------

/// Export one replay read from `source`.
pub fn export_replay<S: SnapshotSource>(
    mut source: S,
    options: &ExportOptions,
) -> anyhow::Result<ReplayExport> {
    let tables = options.categories.as_ref();
    let schema = Schema::canonical();
    let mut table = FrameTable::new(schema);
    let mut stats = ExportStats::default();
    let mut seats = SeatOrder::default();
    let mut meta: Option<ReplayMeta> = None;

    while let Some(snapshot) = source
        .next_snapshot()
        .with_context(|| format!("reading snapshot {}", stats.snapshots + 1))?
    {
        stats.snapshots += 1;
        if !snapshot.menu_state.is_in_game() {
            stats.skipped += 1;
            continue;
        }

        if !seats.is_full() && seats.fill_from(&snapshot) {
            tracing::debug!(
                frame = snapshot.frame,
                p1_port = ?seats.port(Seat::P1),
                p2_port = ?seats.port(Seat::P2),
                "seat assigned"
            );
            if let Some(meta) = meta.as_mut() {
                meta.fill_characters(&snapshot, &seats);
            }
        }
        if meta.is_none() {
            let first = ReplayMeta::capture(&snapshot, &seats);
            tracing::debug!(stage = first.stage.as_deref().unwrap_or("-"), "first in-game frame");
            meta = Some(first);
        }

        let (record, report) = flatten(&snapshot, &seats, tables);
        table
            .push(&record)
            .with_context(|| format!("appending frame {}", snapshot.frame))?;
        stats.dropped.merge(&report);
        stats.frames += 1;
    }

    let meta = meta.unwrap_or_default();
    if !stats.dropped.is_clean() {
        tracing::warn!(
            dropped_projectiles = stats.dropped.dropped_projectiles,
            dropped_companion_buttons = stats.dropped.dropped_companion_buttons,
            unseated_participants = stats.dropped.unseated_participants,
            missing_participants = stats.dropped.missing_participants,
            "replay data did not fit the fixed schema"
        );
    }
    if stats.frames == 0 {
        tracing::warn!(snapshots = stats.snapshots, "replay has no in-game frames");
    }

    narrow_floats(&mut table);
    let (p1, p2) = project(&table);
    tracing::debug!(
        frames = stats.frames,
        skipped = stats.skipped,
        columns = schema.len(),
        "replay exported"
    );

    Ok(ReplayExport {
        meta,
        stats,
        fingerprint: schema.fingerprint(tables),
        p1,
        p2,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
