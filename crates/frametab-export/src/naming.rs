//! Output file names.
//!
//! Each replay is written as two files sharing one base name:
//!
//! ```text
//! <stage>_<p1>_vs_<p2>_<timestamp>_<uniq>-p1.json
//! <stage>_<p1>_vs_<p2>_<timestamp>_<uniq>-p2.json
//! ```
//!
//! Every component goes through [`slug`]; `uniq` is eight lowercase hex
//! characters drawn from a caller-supplied RNG, so two exports of the same
//! match never collide unless the RNG is seeded to make them.

use std::path::{Path, PathBuf};

use frametab_core::schema::Seat;
use rand::Rng;
use unicode_normalization::UnicodeNormalization;

use crate::export::ReplayMeta;

/// Slug used for missing or empty components.
pub const UNKNOWN_SLUG: &str = "unknown";

/// Default output extension.
pub const DEFAULT_EXTENSION: &str = "json";

/// Lower-case, accent-stripped, filesystem-safe form of `input`.
///
/// Non-word characters other than whitespace and `-` are removed, and runs
/// of whitespace and `-` become a single `_`. Missing input, or input with
/// nothing left after cleaning, gives [`UNKNOWN_SLUG`].
///
/// ```
/// use frametab_export::naming::slug;
///
/// assert_eq!(slug(Some("Final Destination")), "final_destination");
/// assert_eq!(slug(Some("Pokémon Stadium")), "pokemon_stadium");
/// assert_eq!(slug(Some("2023-05-01T18:00:00Z")), "2023_05_01t180000z");
/// assert_eq!(slug(None), "unknown");
/// ```
pub fn slug(input: Option<&str>) -> String {
    let Some(raw) = input else {
        return UNKNOWN_SLUG.to_owned();
    };

    // Compatibility decomposition, then drop whatever has no ASCII form.
    let folded: String = raw.nfkd().filter(char::is_ascii).collect();

    let kept: String = folded
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut out = String::with_capacity(kept.len());
    let mut in_run = false;
    for c in kept.trim().chars() {
        if c == '-' || c.is_whitespace() {
            if !in_run {
                out.push('_');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }

    if out.is_empty() {
        UNKNOWN_SLUG.to_owned()
    } else {
        out
    }
}

// ---------------------------------------------------------------------------
// OutputName
// ---------------------------------------------------------------------------

/// Base name shared by the two perspective files of one replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    base: String,
}

impl OutputName {
    pub fn new(meta: &ReplayMeta, rng: &mut impl Rng) -> Self {
        let uniq = format!("{:08x}", rng.gen::<u32>());
        let base = format!(
            "{}_{}_vs_{}_{}_{uniq}",
            slug(meta.stage.as_deref()),
            slug(meta.p1_character.as_deref()),
            slug(meta.p2_character.as_deref()),
            slug(Some(meta.start_at.as_str()).filter(|s| !s.is_empty())),
        );
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// File name of the view where `seat` is "self".
    pub fn file_name(&self, seat: Seat, extension: &str) -> String {
        let suffix = match seat {
            Seat::P1 => "p1",
            Seat::P2 => "p2",
        };
        format!("{}-{suffix}.{extension}", self.base)
    }

    /// Both output paths under `dir`, p1 view first.
    pub fn paths(&self, dir: &Path, extension: &str) -> [PathBuf; 2] {
        Seat::BOTH.map(|seat| dir.join(self.file_name(seat, extension)))
    }
}
