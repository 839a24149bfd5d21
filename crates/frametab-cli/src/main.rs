// crates/frametab-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use frametab_core::codes::CategoryTables;
use frametab_core::schema::Schema;
use frametab_export::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "frametab",
    about = "Fixed-schema frame tables from decoded replay snapshot streams",
    long_about = "Fixed-schema frame tables from decoded replay snapshot streams.\n\nEach input stream (one JSON snapshot per line) becomes two column-oriented tables, one per participant, with identical headers for every replay.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Export every snapshot stream in a directory
    Export {
        /// Directory of decoded snapshot streams
        #[arg(long)]
        input: PathBuf,

        /// Directory for the perspective tables (created if missing)
        #[arg(long)]
        output: PathBuf,

        /// Categorical tables (JSON); defaults to the embedded v1 tables
        #[arg(long)]
        categories: Option<PathBuf>,

        /// Seed for the file-name disambiguator, for reproducible names
        #[arg(long)]
        seed: Option<u64>,

        /// Extension of input streams
        #[arg(long, default_value = "jsonl")]
        ext: String,
    },

    /// Print the canonical column list and its fingerprint
    Schema {
        /// Categorical tables (JSON) to fingerprint against
        #[arg(long)]
        categories: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Cmd::Export {
            input,
            output,
            categories,
            seed,
            ext,
        } => {
            let options = ExportOptions {
                categories: Arc::new(load_categories(categories.as_deref())?),
            };
            let mut rng = match seed {
                Some(seed) => Pcg64::seed_from_u64(seed),
                None => Pcg64::from_entropy(),
            };
            let summary = export_dir(&input, &output, &ext, &options, &mut rng)?;
            info!(
                exported = summary.exported,
                failed = summary.failed,
                frames = summary.frames,
                "done"
            );
            if summary.failed > 0 {
                bail!(
                    "{} of {} replays failed",
                    summary.failed,
                    summary.exported + summary.failed
                );
            }
            Ok(())
        }

        Cmd::Schema { categories } => {
            let tables = load_categories(categories.as_deref())?;
            print!("{}", describe_schema(&tables));
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn load_categories(path: Option<&Path>) -> Result<CategoryTables> {
    match path {
        Some(path) => CategoryTables::from_path(path)
            .with_context(|| format!("loading categorical tables from {}", path.display())),
        None => Ok(CategoryTables::default()),
    }
}

/// Input streams under `dir` with extension `ext`, sorted by path.
fn list_inputs(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;
    let mut inputs = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("listing {}", dir.display()))?
            .path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches && path.is_file() {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RunSummary {
    exported: usize,
    failed: usize,
    frames: usize,
}

/// Export one stream and write both views; returns the frame count.
fn export_file(
    input: &Path,
    output: &Path,
    options: &ExportOptions,
    rng: &mut Pcg64,
) -> Result<usize> {
    let source = JsonLinesSource::open(input)?;
    let export = export_replay(source, options)?;
    let name = OutputName::new(&export.meta, rng);
    let [p1, p2] = write_replay(output, &name, &export, DEFAULT_EXTENSION)?;
    info!(
        input = %input.display(),
        frames = export.stats.frames,
        columns = export.p1.column_names().len(),
        p1 = %p1.display(),
        p2 = %p2.display(),
        "replay exported"
    );
    Ok(export.stats.frames)
}

/// Export every stream under `input`. A failing replay is logged and
/// skipped; the rest still run.
fn export_dir(
    input: &Path,
    output: &Path,
    ext: &str,
    options: &ExportOptions,
    rng: &mut Pcg64,
) -> Result<RunSummary> {
    let inputs = list_inputs(input, ext)?;
    std::fs::create_dir_all(output)
        .with_context(|| format!("creating output directory {}", output.display()))?;
    if inputs.is_empty() {
        info!(dir = %input.display(), ext, "no input streams found");
    }

    let mut summary = RunSummary::default();
    for path in &inputs {
        match export_file(path, output, options, rng) {
            Ok(frames) => {
                summary.exported += 1;
                summary.frames += frames;
            }
            Err(err) => {
                error!(input = %path.display(), "replay failed: {err:#}");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// One line per column (`index name kind`), then the fingerprint.
fn describe_schema(tables: &CategoryTables) -> String {
    let schema = Schema::canonical();
    let mut out = String::new();
    for (i, column) in schema.columns().iter().enumerate() {
        out.push_str(&format!("{i:>4}  {:<32} {}\n", column.name, column.kind));
    }
    out.push_str(&format!(
        "{} columns, categories v{}, fingerprint {}\n",
        schema.len(),
        tables.version,
        schema.fingerprint(tables)
    ));
    out
}
