//! Shared command construction for the delegating `find` adapters.
//!
//! Only traversal-shaped criteria are translated into flags (depth bounds,
//! entry type, prune clauses, symlink policy); everything else is evaluated
//! in-process against the utility's output, exactly as the walking adapter
//! would.

use std::ffi::OsString;
use std::io;
use std::os::unix::ffi::OsStringExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::adapter::walk::read_text;
use crate::adapter::EntryStream;
use crate::criteria::{Criteria, SearchMode, VCS_NAMES};
use crate::entry::Entry;
use crate::error::AdapterError;

pub(crate) fn run_find(
    find_bin: &Path,
    criteria: &Criteria,
    dir: &Path,
    gnu: bool,
) -> Result<EntryStream, AdapterError> {
    let mut cmd = Command::new(find_bin);

    if criteria.follow_links() {
        cmd.arg("-L");
    }
    cmd.arg(dir);
    if gnu {
        cmd.arg("-noleaf");
    }

    // Always 1: protects the starting point from the prune clause below.
    // Depth floors stay in the post-filter — a larger -mindepth would also
    // suppress -prune at the skipped levels and leak pruned subtrees.
    cmd.arg("-mindepth").arg("1");
    if let Some(ceiling) = criteria.depth_ceiling() {
        cmd.arg("-maxdepth").arg(ceiling.to_string());
    }

    append_prune_clause(&mut cmd, criteria);

    match criteria.mode() {
        SearchMode::Files => {
            cmd.args(["-type", "f"]);
        }
        SearchMode::Dirs => {
            cmd.args(["-type", "d"]);
        }
        SearchMode::Both => {}
    }
    cmd.arg("-print0");

    let output = cmd.output().map_err(|e| AdapterError::Spawn {
        utility: "find".to_string(),
        source:  e,
    })?;
    if !output.status.success() {
        return Err(AdapterError::Utility {
            utility: "find".to_string(),
            status:  output.status.to_string(),
        });
    }

    parse_output(&output.stdout, criteria, dir)
}

/// Emit `( <pruned dirs> -o <dot entries> ) -prune -o` so pruned subtrees
/// are never descended into, mirroring the walking adapter's filter.
fn append_prune_clause(cmd: &mut Command, criteria: &Criteria) {
    let mut dir_names: Vec<&str> = criteria.excluded.iter().map(String::as_str).collect();
    if criteria.ignore_vcs {
        dir_names.extend_from_slice(VCS_NAMES);
    }
    let dots = criteria.ignore_dot_files;

    if dir_names.is_empty() && !dots {
        return;
    }

    cmd.arg("(");
    if !dir_names.is_empty() {
        cmd.args(["-type", "d", "("]);
        for (i, name) in dir_names.iter().enumerate() {
            if i > 0 {
                cmd.arg("-o");
            }
            cmd.arg("-name").arg(name);
        }
        cmd.arg(")");
        if dots {
            cmd.arg("-o");
        }
    }
    if dots {
        cmd.arg("-name").arg(".*");
    }
    cmd.args([")", "-prune", "-o"]);
}

fn parse_output(
    stdout: &[u8],
    criteria: &Criteria,
    dir: &Path,
) -> Result<EntryStream, AdapterError> {
    let follow = criteria.follow_links();
    let mut entries = Vec::new();

    for chunk in stdout.split(|b| *b == 0) {
        if chunk.is_empty() {
            continue;
        }
        let path = PathBuf::from(OsString::from_vec(chunk.to_vec()));
        let depth = match path.strip_prefix(dir) {
            Ok(rel) => rel.components().count(),
            Err(_) => {
                return Err(AdapterError::Utility {
                    utility: "find".to_string(),
                    status:  format!("unexpected output line `{}`", path.display()),
                })
            }
        };
        if depth == 0 {
            continue;
        }

        let entry = match Entry::from_fs(&path, dir, depth, follow) {
            Ok(e) => e,
            // Entries can vanish between the listing and the stat.
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(AdapterError::io(path, e)),
        };

        let content_path = entry.path().to_path_buf();
        if criteria.matches(&entry, || read_text(&content_path)) {
            entries.push(entry);
        }
    }

    Ok(Box::new(entries.into_iter().map(Ok)))
}
