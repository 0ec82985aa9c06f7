//! Declared-symbol to file-path maps.
//!
//! Scans the files of a finished search (or a plain directory) with a
//! declaration regex and records where each symbol is declared. A later
//! declaration of the same symbol overwrites an earlier one, so the map
//! reflects the last file that declares it in scan order.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::SiftError;

/// Top-level Rust items with a name. One capture group: the symbol.
fn default_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait|fn|mod|type)\s+([A-Za-z_][A-Za-z0-9_]*)",
        )
        .unwrap()
    })
}

/// A symbol → declaring-file map.
#[derive(Debug)]
pub struct SymbolMap {
    map: BTreeMap<String, PathBuf>,
}

impl SymbolMap {
    /// Build a map from an ordered sequence of file paths using the default
    /// Rust declaration pattern.
    pub fn from_paths<I>(paths: I) -> Result<Self, SiftError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self::from_paths_with_pattern(paths, default_pattern())
    }

    /// Build a map with a caller-supplied declaration pattern. The pattern
    /// must have at least one capture group; group 1 is the symbol name.
    pub fn from_paths_with_pattern<I>(paths: I, pattern: &Regex) -> Result<Self, SiftError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        if pattern.captures_len() < 2 {
            return Err(SiftError::parse(
                pattern.as_str(),
                "declaration pattern needs a capture group",
            ));
        }

        let mut map = BTreeMap::new();
        for path in paths {
            let source = fs::read_to_string(&path).map_err(|e| SiftError::io(&path, e))?;
            for captures in pattern.captures_iter(&source) {
                if let Some(symbol) = captures.get(1) {
                    map.insert(symbol.as_str().to_string(), path.clone());
                }
            }
        }
        Ok(Self { map })
    }

    /// Scan every `*.rs` file under a directory.
    pub fn from_dir(dir: &Path) -> Result<Self, SiftError> {
        let hits = crate::search()
            .files()
            .name("*.rs")?
            .in_path(dir.to_string_lossy())?;

        let mut paths = Vec::new();
        for item in hits.entries()? {
            paths.push(item?.path().to_path_buf());
        }
        Self::from_paths(paths)
    }

    /// The file declaring `symbol`, if any.
    pub fn get(&self, symbol: &str) -> Option<&Path> {
        self.map.get(symbol).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
