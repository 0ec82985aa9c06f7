use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// ---------------------------------------------------------------------------
// EntryKind
// ---------------------------------------------------------------------------

/// The kind of a matched entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link (only seen when links are not followed).
    Symlink,
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A single matched filesystem object.
///
/// Produced by an adapter and immutable once yielded. Carries the absolute
/// path, the path relative to the scan root that produced it (with and
/// without the file name), and the metadata the filter set needs so that
/// downstream consumers never have to `stat` again.
#[derive(Debug, Clone)]
pub struct Entry {
    path:              PathBuf,
    relative_path:     PathBuf,
    relative_pathname: PathBuf,
    file_name:         String,
    kind:              EntryKind,
    size:              u64,
    depth:             usize,
    accessed:          SystemTime,
    modified:          SystemTime,
    changed:           SystemTime,
}

impl Entry {
    /// Build an entry by inspecting the filesystem.
    ///
    /// `root` is the scan root the relative paths are computed against; a
    /// path outside `root` keeps its full path as the relative pathname.
    pub fn from_fs(
        path: &Path,
        root: &Path,
        depth: usize,
        follow_links: bool,
    ) -> io::Result<Self> {
        let metadata = if follow_links {
            fs::metadata(path)?
        } else {
            fs::symlink_metadata(path)?
        };

        let file_type = metadata.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };

        let relative_pathname = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf());

        Ok(Self::from_parts(
            path.to_path_buf(),
            relative_pathname,
            kind,
            metadata.len(),
            depth,
            metadata.accessed().unwrap_or(UNIX_EPOCH),
            metadata.modified().unwrap_or(UNIX_EPOCH),
            changed_time(&metadata),
        ))
    }

    /// Assemble an entry from already-known metadata. Used by adapters whose
    /// entries do not come from a plain `stat` (archives, test doubles).
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        path: PathBuf,
        relative_pathname: PathBuf,
        kind: EntryKind,
        size: u64,
        depth: usize,
        accessed: SystemTime,
        modified: SystemTime,
        changed: SystemTime,
    ) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let relative_path = relative_pathname
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            path,
            relative_path,
            relative_pathname,
            file_name,
            kind,
            size,
            depth,
            accessed,
            modified,
            changed,
        }
    }

    /// Absolute path. Also the iteration key for keyed consumption.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory part of the path, relative to the originating scan root.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Path relative to the originating scan root, including the file name.
    pub fn relative_pathname(&self) -> &Path {
        &self.relative_pathname
    }

    /// Base file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Depth below the scan root; direct children are depth 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn accessed(&self) -> SystemTime {
        self.accessed
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Inode change time on Unix; falls back to the modification time on
    /// platforms without one.
    pub fn changed(&self) -> SystemTime {
        self.changed
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// Relative pathname with `/` separators regardless of host convention.
    /// Path patterns always match against this form.
    pub fn slash_path(&self) -> String {
        let parts: Vec<_> = self
            .relative_pathname
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        parts.join("/")
    }

    pub(crate) fn accessed_secs(&self) -> i64 {
        unix_secs(self.accessed)
    }

    pub(crate) fn modified_secs(&self) -> i64 {
        unix_secs(self.modified)
    }

    pub(crate) fn changed_secs(&self) -> i64 {
        unix_secs(self.changed)
    }
}

fn unix_secs(t: SystemTime) -> i64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(unix)]
fn changed_time(metadata: &fs::Metadata) -> SystemTime {
    use std::os::unix::fs::MetadataExt;
    let ctime = metadata.ctime();
    if ctime >= 0 {
        UNIX_EPOCH + Duration::from_secs(ctime as u64)
    } else {
        UNIX_EPOCH
    }
}

#[cfg(not(unix))]
fn changed_time(metadata: &fs::Metadata) -> SystemTime {
    metadata.modified().unwrap_or(UNIX_EPOCH)
}
