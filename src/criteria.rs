use std::sync::Arc;

use crate::comparator::Comparator;
use crate::entry::Entry;
use crate::pattern::Pattern;
use crate::root::SearchRoot;

/// Directory basenames pruned when VCS metadata is ignored.
pub(crate) const VCS_NAMES: &[&str] = &[
    ".git",
    ".svn",
    "_svn",
    "CVS",
    "_darcs",
    ".arch-params",
    ".monotone",
    ".bzr",
    ".hg",
];

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Which entry kinds a query yields. Last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Files,
    Dirs,
    Both,
}

/// How the merged result sequence is ordered.
#[derive(Clone)]
pub enum SortMode {
    None,
    ByName,
    ByType,
    ByAccessed,
    ByChanged,
    ByModified,
    Custom(Arc<dyn Fn(&Entry, &Entry) -> std::cmp::Ordering + Send + Sync>),
}

impl SortMode {
    pub(crate) fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// A caller-supplied predicate over candidate entries.
pub type EntryPredicate = Arc<dyn Fn(&Entry) -> bool + Send + Sync>;

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// The accumulated constraints of one query session.
///
/// Repeated additions to the same set combine as a logical OR within the set
/// and a logical AND across distinct constraint kinds; the negative pattern
/// sets reject an entry when ANY of them matches. Owned by exactly one query;
/// read-only once iteration starts.
#[derive(Clone)]
pub struct Criteria {
    pub(crate) roots:            Vec<SearchRoot>,
    pub(crate) depths:           Vec<Comparator>,
    pub(crate) names:            Vec<Pattern>,
    pub(crate) not_names:        Vec<Pattern>,
    pub(crate) paths:            Vec<Pattern>,
    pub(crate) not_paths:        Vec<Pattern>,
    pub(crate) sizes:            Vec<Comparator>,
    pub(crate) dates:            Vec<Comparator>,
    pub(crate) contents:         Vec<Pattern>,
    pub(crate) not_contents:     Vec<Pattern>,
    pub(crate) excluded:         Vec<String>,
    pub(crate) ignore_vcs:       bool,
    pub(crate) ignore_dot_files: bool,
    pub(crate) mode:             SearchMode,
    pub(crate) follow_links:     bool,
    pub(crate) sort:             SortMode,
    pub(crate) filters:          Vec<EntryPredicate>,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            roots:            Vec::new(),
            depths:           Vec::new(),
            names:            Vec::new(),
            not_names:        Vec::new(),
            paths:            Vec::new(),
            not_paths:        Vec::new(),
            sizes:            Vec::new(),
            dates:            Vec::new(),
            contents:         Vec::new(),
            not_contents:     Vec::new(),
            excluded:         Vec::new(),
            ignore_vcs:       true,
            ignore_dot_files: true,
            mode:             SearchMode::Both,
            follow_links:     false,
            sort:             SortMode::None,
            filters:          Vec::new(),
        }
    }
}

impl Criteria {
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn follow_links(&self) -> bool {
        self.follow_links
    }

    /// Whether an entry with this basename starts a subtree that must never
    /// be visited. Shared by the walking adapter's prune filter and the
    /// delegating adapters' `-prune` clauses.
    pub fn prunes(&self, name: &str, is_dir: bool) -> bool {
        if self.ignore_dot_files && name.starts_with('.') {
            return true;
        }
        if is_dir {
            if self.excluded.iter().any(|e| e == name) {
                return true;
            }
            if self.ignore_vcs && VCS_NAMES.contains(&name) {
                return true;
            }
        }
        false
    }

    /// The deepest level any depth comparator can admit; used to cap the
    /// traversal before it begins.
    pub fn depth_ceiling(&self) -> Option<usize> {
        self.depths
            .iter()
            .filter_map(|c| c.ceiling())
            .min()
            .map(|c| usize::try_from(c).unwrap_or(0))
    }

    /// The shallowest level any depth comparator requires; never below 1
    /// since the root itself is not a result.
    pub fn depth_floor(&self) -> usize {
        self.depths
            .iter()
            .filter_map(|c| c.floor())
            .max()
            .map(|f| usize::try_from(f).unwrap_or(usize::MAX))
            .unwrap_or(1)
            .max(1)
    }

    /// Evaluate every in-process criterion against one candidate.
    ///
    /// `read_content` is called at most once, and only when content patterns
    /// are present and the candidate is a file; `None` means the content
    /// could not be read, which rejects the candidate outright.
    pub fn matches<F>(&self, entry: &Entry, read_content: F) -> bool
    where
        F: FnOnce() -> Option<String>,
    {
        match self.mode {
            SearchMode::Files if !entry.is_file() => return false,
            SearchMode::Dirs if !entry.is_dir() => return false,
            _ => {}
        }

        let depth = entry.depth() as i64;
        if !self.depths.iter().all(|c| c.matches(depth)) {
            return false;
        }

        let name = entry.file_name();
        if !self.names.is_empty() && !self.names.iter().any(|p| p.is_match(name)) {
            return false;
        }
        if self.not_names.iter().any(|p| p.is_match(name)) {
            return false;
        }

        if !self.paths.is_empty() || !self.not_paths.is_empty() {
            let slashed = entry.slash_path();
            if !self.paths.is_empty() && !self.paths.iter().any(|p| p.is_match(&slashed)) {
                return false;
            }
            if self.not_paths.iter().any(|p| p.is_match(&slashed)) {
                return false;
            }
        }

        if entry.is_file() {
            let size = entry.size() as i64;
            if !self.sizes.iter().all(|c| c.matches(size)) {
                return false;
            }
            let mtime = entry.modified_secs();
            if !self.dates.iter().all(|c| c.matches(mtime)) {
                return false;
            }
        }

        if !self.contents.is_empty() || !self.not_contents.is_empty() {
            if entry.is_file() {
                let Some(text) = read_content() else {
                    return false;
                };
                if !self.contents.is_empty()
                    && !self.contents.iter().any(|p| p.is_match(&text))
                {
                    return false;
                }
                if self.not_contents.iter().any(|p| p.is_match(&text)) {
                    return false;
                }
            } else if !self.contents.is_empty() {
                // Directories have no content to match.
                return false;
            }
        }

        self.filters.iter().all(|f| f(entry))
    }
}
