use crate::adapter::{shell, Adapter, EntryStream};
use crate::criteria::Criteria;
use crate::error::AdapterError;
use crate::root::SearchRoot;

/// Delegates the traversal to BSD `find` on the BSD family and macOS.
#[derive(Debug, Default)]
pub struct BsdFindAdapter;

impl Adapter for BsdFindAdapter {
    fn name(&self) -> &'static str {
        "bsd-find"
    }

    fn is_supported(&self, root: &SearchRoot) -> bool {
        cfg!(any(
            target_os = "macos",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd",
            target_os = "dragonfly",
        )) && root.as_dir().is_some()
            && which::which("find").is_ok()
    }

    fn search(
        &self,
        criteria: &Criteria,
        root: &SearchRoot,
    ) -> Result<EntryStream, AdapterError> {
        let dir = root.as_dir().ok_or_else(|| AdapterError::Archive {
            archive: root.display_path(),
            reason:  "external utilities cannot traverse archives".to_string(),
        })?;
        let bin = which::which("find").map_err(|e| AdapterError::Spawn {
            utility: "find".to_string(),
            source:  std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        })?;
        shell::run_find(&bin, criteria, dir, false)
    }
}
