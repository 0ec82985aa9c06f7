//! Traversal of archive-backed roots.
//!
//! Zip archives carry a flat index of member names, so the "walk" is a scan
//! over that index with the same pruning and criteria evaluation the
//! directory walk performs.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{NaiveDate, TimeZone, Utc};
use zip::ZipArchive;

use crate::adapter::EntryStream;
use crate::criteria::Criteria;
use crate::entry::{Entry, EntryKind};
use crate::error::AdapterError;
use crate::root::ArchiveRoot;

pub(crate) fn stream(
    criteria: &Criteria,
    root: &ArchiveRoot,
) -> Result<EntryStream, AdapterError> {
    let file = File::open(&root.archive).map_err(|e| AdapterError::io(&root.archive, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| archive_error(root, e))?;

    let prefix = if root.prefix.is_empty() {
        String::new()
    } else {
        format!("{}/", root.prefix)
    };
    let wants_content =
        !criteria.contents.is_empty() || !criteria.not_contents.is_empty();

    let mut out = Vec::new();
    for index in 0..archive.len() {
        let mut member = archive
            .by_index(index)
            .map_err(|e| archive_error(root, e))?;

        let full_name = member.name().trim_end_matches('/').to_string();
        let rel = match full_name.strip_prefix(&prefix) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => continue,
        };

        let is_dir = member.is_dir();
        let components: Vec<&str> = rel.split('/').collect();
        if pruned(criteria, &components, is_dir) {
            continue;
        }

        let kind = if is_dir { EntryKind::Dir } else { EntryKind::File };
        let mtime = member_mtime(&member);
        let entry = Entry::from_parts(
            PathBuf::from(format!("zip://{}!/{}", root.archive.display(), full_name)),
            PathBuf::from(&rel),
            kind,
            member.size(),
            components.len(),
            mtime,
            mtime,
            mtime,
        );

        // Member bytes are only reachable while the borrow lasts, so the
        // content is read up front when content filters are in play.
        let text = if wants_content && !is_dir {
            let mut bytes = Vec::new();
            member.read_to_end(&mut bytes).ok();
            Some(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            None
        };

        if criteria.matches(&entry, || text) {
            out.push(entry);
        }
    }

    Ok(Box::new(out.into_iter().map(Ok)))
}

/// Whether any path component falls under the criteria's prune rules.
fn pruned(criteria: &Criteria, components: &[&str], is_dir: bool) -> bool {
    components.iter().enumerate().any(|(i, name)| {
        let last = i + 1 == components.len();
        criteria.prunes(name, !last || is_dir)
    })
}

fn member_mtime(member: &zip::read::ZipFile<'_>) -> SystemTime {
    let dt = member.last_modified();
    let timestamp = NaiveDate::from_ymd_opt(
        i32::from(dt.year()),
        u32::from(dt.month()),
        u32::from(dt.day()),
    )
    .and_then(|d| {
        d.and_hms_opt(
            u32::from(dt.hour()),
            u32::from(dt.minute()),
            u32::from(dt.second()),
        )
    })
    .map(|naive| Utc.from_utc_datetime(&naive).timestamp());

    match timestamp {
        Some(secs) if secs >= 0 => UNIX_EPOCH + Duration::from_secs(secs as u64),
        _ => UNIX_EPOCH,
    }
}

fn archive_error(root: &ArchiveRoot, e: zip::result::ZipError) -> AdapterError {
    AdapterError::Archive {
        archive: root.archive.clone(),
        reason:  e.to_string(),
    }
}
