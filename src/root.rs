use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use ignore::WalkBuilder;
use tracing::debug;

use crate::error::SiftError;

// ---------------------------------------------------------------------------
// SearchRoot
// ---------------------------------------------------------------------------

/// One resolved starting point for a scan: either an ordinary directory or a
/// location inside a zip container (`zip://archive.zip!/inner/dir`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRoot {
    Dir(PathBuf),
    Archive(ArchiveRoot),
}

/// An archive-backed root. `prefix` is the directory inside the archive the
/// scan starts from; empty means the archive top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRoot {
    pub archive: PathBuf,
    pub prefix:  String,
}

impl SearchRoot {
    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive(_))
    }

    /// The plain directory behind this root, when it has one.
    pub fn as_dir(&self) -> Option<&Path> {
        match self {
            Self::Dir(p) => Some(p.as_path()),
            Self::Archive(_) => None,
        }
    }

    /// A path usable in error messages and keys, for either variant.
    pub fn display_path(&self) -> PathBuf {
        match self {
            Self::Dir(p) => p.clone(),
            Self::Archive(a) if a.prefix.is_empty() => {
                PathBuf::from(format!("zip://{}", a.archive.display()))
            }
            Self::Archive(a) => {
                PathBuf::from(format!("zip://{}!/{}", a.archive.display(), a.prefix))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

const ZIP_SCHEME: &str = "zip://";

/// Resolve one root declaration into concrete scan roots.
///
/// Plain paths must name an existing directory. A declaration containing
/// glob metacharacters expands immediately; every match must be a directory
/// and at least one match must exist. Archive declarations must name an
/// existing archive file.
pub(crate) fn resolve_root(input: &str) -> Result<Vec<SearchRoot>, SiftError> {
    if let Some(rest) = input.strip_prefix(ZIP_SCHEME) {
        let (archive, prefix) = match rest.split_once("!/") {
            Some((a, p)) => (a, p.trim_matches('/').to_string()),
            None => (rest, String::new()),
        };
        let archive = PathBuf::from(archive);
        if !archive.is_file() {
            return Err(SiftError::InvalidRoot(PathBuf::from(input)));
        }
        return Ok(vec![SearchRoot::Archive(ArchiveRoot { archive, prefix })]);
    }

    if is_glob(input) {
        let matches = expand_glob(input)?;
        if matches.is_empty() {
            return Err(SiftError::InvalidRoot(PathBuf::from(input)));
        }
        debug!(pattern = input, count = matches.len(), "expanded glob root");
        let mut roots = Vec::with_capacity(matches.len());
        for path in matches {
            if !path.is_dir() {
                return Err(SiftError::InvalidRoot(path));
            }
            roots.push(SearchRoot::Dir(path));
        }
        return Ok(roots);
    }

    let path = PathBuf::from(input);
    if !path.is_dir() {
        return Err(SiftError::InvalidRoot(path));
    }
    Ok(vec![SearchRoot::Dir(path)])
}

/// Whether a declaration contains glob metacharacters.
fn is_glob(s: &str) -> bool {
    s.contains('*') || s.contains('?') || s.contains('[')
}

/// Expand a glob declaration against the filesystem.
///
/// The walk starts at the longest literal prefix of the pattern and only
/// descends as deep as the pattern has components; `*` never crosses a
/// separator here.
fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, SiftError> {
    let mut base = PathBuf::new();
    let mut rest: Vec<String> = Vec::new();

    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy().into_owned();
        if rest.is_empty() && !is_glob(&text) {
            base.push(component.as_os_str());
        } else {
            rest.push(text);
        }
    }

    if base.as_os_str().is_empty() {
        base.push(".");
    }
    if !base.is_dir() {
        return Err(SiftError::InvalidRoot(PathBuf::from(pattern)));
    }

    let depth = rest.len();
    let matcher = GlobBuilder::new(&rest.join("/"))
        .literal_separator(true)
        .build()
        .map_err(|e| SiftError::parse(pattern, e.to_string()))?
        .compile_matcher();

    let mut found = Vec::new();
    let walker = WalkBuilder::new(&base)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .max_depth(Some(depth))
        .build();

    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(_) => continue,
        };
        if entry.depth() != depth {
            continue;
        }
        let rel = match entry.path().strip_prefix(&base) {
            Ok(r) => r,
            Err(_) => continue,
        };
        let slashed: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if matcher.is_match(slashed.join("/")) {
            found.push(entry.path().to_path_buf());
        }
    }

    found.sort();
    Ok(found)
}
