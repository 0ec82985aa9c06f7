use crate::adapter::{shell, Adapter, EntryStream};
use crate::criteria::Criteria;
use crate::error::AdapterError;
use crate::root::SearchRoot;

/// Delegates the traversal to GNU `find`. Linux only; archive-backed roots
/// are out of reach for an external utility.
#[derive(Debug, Default)]
pub struct GnuFindAdapter;

impl Adapter for GnuFindAdapter {
    fn name(&self) -> &'static str {
        "gnu-find"
    }

    fn is_supported(&self, root: &SearchRoot) -> bool {
        cfg!(target_os = "linux") && root.as_dir().is_some() && which::which("find").is_ok()
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
        shell::run_find(&bin, criteria, dir, true)
    }
}
