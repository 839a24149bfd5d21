//! Categorical encoding: string label -> fixed integer code.
//!
//! Four label domains ([`CategoryDomain`]) are turned into integers before a
//! record reaches the table, so the only string column left in the output is
//! the match timestamp. The lookup tables ([`CategoryTables`]) are an
//! immutable, versioned resource: adding a label is a schema change, and a
//! label the tables do not know about encodes to [`UNMAPPED`] (`-1`). That is
//! an expected outcome, not an error.
//!
//! # Example
//!
//! ```
//! use frametab_core::codes::{CategoryDomain, CategoryTables, UNMAPPED};
//!
//! let tables = CategoryTables::builtin();
//! assert!(tables.encode(CategoryDomain::Character, Some("FOX")) >= 0);
//! assert_eq!(tables.encode(CategoryDomain::Character, Some("NOT_A_FIGHTER")), UNMAPPED);
//! assert_eq!(tables.encode(CategoryDomain::Stage, None), UNMAPPED);
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sentinels
// ---------------------------------------------------------------------------

/// Code for a label that is missing or absent from its domain's table.
pub const UNMAPPED: i64 = -1;

/// Placeholder label for the string fields of an absent companion.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Placeholder label for the type of an empty projectile slot.
pub const NO_PROJECTILE_LABEL: &str = "NONE";

/// Labels no table may map. Placeholders must always encode to [`UNMAPPED`].
pub const RESERVED_LABELS: [&str; 2] = [UNKNOWN_LABEL, NO_PROJECTILE_LABEL];

const BUILTIN_TABLES_JSON: &str = include_str!("../data/categories_v1.json");

// ---------------------------------------------------------------------------
// CodesError
// ---------------------------------------------------------------------------

/// Errors produced while loading categorical tables.
#[derive(Debug, thiserror::Error)]
pub enum CodesError {
    /// The tables document could not be parsed.
    #[error("failed to parse categorical tables: {0}")]
    Parse(#[from] serde_json::Error),

    /// The tables file could not be read.
    #[error("failed to read categorical tables from '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A table maps a placeholder label, which would let placeholders encode
    /// to a real code.
    #[error("{domain} table maps reserved placeholder label '{label}'")]
    ReservedLabel {
        domain: CategoryDomain,
        label: String,
    },

    /// Codes are non-negative; `-1` belongs to the unmapped sentinel.
    #[error("{domain} table maps '{label}' to negative code {code}")]
    NegativeCode {
        domain: CategoryDomain,
        label: String,
        code: i64,
    },
}

// ---------------------------------------------------------------------------
// CategoryDomain
// ---------------------------------------------------------------------------

/// The label domains that are encoded to integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryDomain {
    Stage,
    Character,
    Action,
    ProjectileType,
}

impl CategoryDomain {
    pub const ALL: [CategoryDomain; 4] = [
        CategoryDomain::Stage,
        CategoryDomain::Character,
        CategoryDomain::Action,
        CategoryDomain::ProjectileType,
    ];
}

impl std::fmt::Display for CategoryDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CategoryDomain::Stage => "stage",
            CategoryDomain::Character => "character",
            CategoryDomain::Action => "action",
            CategoryDomain::ProjectileType => "projectile_type",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// CategoryTables
// ---------------------------------------------------------------------------

/// The four label -> code tables, plus the version they were frozen at.
///
/// Tables use `BTreeMap` so their serialized form (and therefore the schema
/// fingerprint that covers the version) is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTables {
    /// Version of the frozen tables. Bumped whenever a label is added,
    /// removed, or renumbered.
    pub version: u32,
    #[serde(default)]
    stage: BTreeMap<String, i64>,
    #[serde(default)]
    character: BTreeMap<String, i64>,
    #[serde(default)]
    action: BTreeMap<String, i64>,
    #[serde(default)]
    projectile_type: BTreeMap<String, i64>,
}

impl CategoryTables {
    /// Build tables from explicit label lists, validating them.
    pub fn new(
        version: u32,
        stage: BTreeMap<String, i64>,
        character: BTreeMap<String, i64>,
        action: BTreeMap<String, i64>,
        projectile_type: BTreeMap<String, i64>,
    ) -> Result<Self, CodesError> {
        let tables = Self {
            version,
            stage,
            character,
            action,
            projectile_type,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// The tables embedded in the crate (version 1).
    pub fn builtin() -> &'static CategoryTables {
        static BUILTIN: OnceLock<CategoryTables> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Self::from_json_str(BUILTIN_TABLES_JSON)
                .expect("embedded categorical tables should always be valid")
        })
    }

    /// Parse and validate tables from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, CodesError> {
        let tables: CategoryTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Read, parse and validate tables from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CodesError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CodesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tables = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            version = tables.version,
            "loaded categorical tables"
        );
        Ok(tables)
    }

    fn validate(&self) -> Result<(), CodesError> {
        for domain in CategoryDomain::ALL {
            let table = self.table(domain);
            for reserved in RESERVED_LABELS {
                if table.contains_key(reserved) {
                    return Err(CodesError::ReservedLabel {
                        domain,
                        label: reserved.to_owned(),
                    });
                }
            }
            if let Some((label, &code)) = table.iter().find(|(_, code)| **code < 0) {
                return Err(CodesError::NegativeCode {
                    domain,
                    label: label.clone(),
                    code,
                });
            }
        }
        Ok(())
    }

    fn table(&self, domain: CategoryDomain) -> &BTreeMap<String, i64> {
        match domain {
            CategoryDomain::Stage => &self.stage,
            CategoryDomain::Character => &self.character,
            CategoryDomain::Action => &self.action,
            CategoryDomain::ProjectileType => &self.projectile_type,
        }
    }

    /// Encode `label` in `domain`. Missing or unknown labels give [`UNMAPPED`].
    pub fn encode(&self, domain: CategoryDomain, label: Option<&str>) -> i64 {
        label
            .and_then(|label| self.table(domain).get(label))
            .copied()
            .unwrap_or(UNMAPPED)
    }

    /// Number of labels known in `domain`.
    pub fn len(&self, domain: CategoryDomain) -> usize {
        self.table(domain).len()
    }
}

impl Default for CategoryTables {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
