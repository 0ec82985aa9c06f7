use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::adapter::{archive, Adapter, EntryStream};
use crate::criteria::Criteria;
use crate::entry::Entry;
use crate::error::AdapterError;
use crate::root::SearchRoot;

// ---------------------------------------------------------------------------
// WalkAdapter
// ---------------------------------------------------------------------------

/// The portable strategy: descends the tree in-process and evaluates every
/// criterion itself. Supported for every root, including archive-backed
/// ones, which the delegating adapters cannot reach.
#[derive(Debug, Default)]
pub struct WalkAdapter;

impl Adapter for WalkAdapter {
    fn name(&self) -> &'static str {
        "walk"
    }

    fn is_supported(&self, _root: &SearchRoot) -> bool {
        true
    }

    fn search(
        &self,
        criteria: &Criteria,
        root: &SearchRoot,
    ) -> Result<EntryStream, AdapterError> {
        match root {
            SearchRoot::Dir(dir) => walk_dir(criteria, dir),
            SearchRoot::Archive(archive_root) => archive::stream(criteria, archive_root),
        }
    }
}

// ---------------------------------------------------------------------------
// Directory walk
// ---------------------------------------------------------------------------

fn walk_dir(criteria: &Criteria, dir: &Path) -> Result<EntryStream, AdapterError> {
    let mut builder = WalkBuilder::new(dir);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(criteria.follow_links())
        .max_depth(criteria.depth_ceiling());

    // Prune excluded, VCS and dot subtrees before they are visited. The
    // root itself is exempt so a dot-named scan root still gets walked.
    let prune = criteria.clone();
    builder.filter_entry(move |candidate| {
        if candidate.depth() == 0 {
            return true;
        }
        let name = candidate.file_name().to_string_lossy();
        let is_dir = candidate
            .file_type()
            .map(|t| t.is_dir())
            .unwrap_or(false);
        !prune.prunes(&name, is_dir)
    });

    let criteria = criteria.clone();
    let root = dir.to_path_buf();
    let follow = criteria.follow_links();

    let stream = builder.build().filter_map(move |result| {
        let candidate = match result {
            Ok(c) => c,
            Err(e) => return Some(Err(map_walk_error(e))),
        };
        if candidate.depth() == 0 {
            return None;
        }

        let entry = match Entry::from_fs(candidate.path(), &root, candidate.depth(), follow) {
            Ok(e) => e,
            // The tree can change underneath the walk; a vanished entry is
            // not an adapter failure.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => return Some(Err(AdapterError::io(candidate.path(), e))),
        };

        let content_path = entry.path().to_path_buf();
        if criteria.matches(&entry, || read_text(&content_path)) {
            Some(Ok(entry))
        } else {
            None
        }
    });

    Ok(Box::new(stream))
}

pub(crate) fn read_text(path: &Path) -> Option<String> {
    fs::read(path)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn map_walk_error(e: ignore::Error) -> AdapterError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => AdapterError::io(path, io_err),
            other => AdapterError::io(path, other_io(other)),
        },
        ignore::Error::Loop { child, .. } => AdapterError::io(
            child,
            io::Error::new(io::ErrorKind::Other, "symlink loop"),
        ),
        ignore::Error::Io(io_err) => AdapterError::io(PathBuf::new(), io_err),
        other => AdapterError::io(PathBuf::new(), other_io(other)),
    }
}

fn other_io(e: ignore::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}
