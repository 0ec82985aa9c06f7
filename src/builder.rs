use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

use crate::chain::AdapterChain;
use crate::comparator::Comparator;
use crate::criteria::{Criteria, SearchMode, SortMode};
use crate::entry::Entry;
use crate::error::SiftError;
use crate::pattern::Pattern;
use crate::results::Results;
use crate::root::resolve_root;

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a search.
///
/// Created via [`sift::search()`](crate::search). Each call adds to its
/// constraint set — repeated calls of the same kind combine as a logical OR
/// within that set, distinct kinds as a logical AND — except
/// [`files`](SearchBuilder::files)/[`directories`](SearchBuilder::directories)
/// and [`follow_links`](SearchBuilder::follow_links), where the last call
/// wins. Methods that parse or validate their argument return `Result` so
/// malformed input surfaces immediately.
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> Result<(), sift::SiftError> {
/// let hits = sift::search()
///     .files()
///     .name("*.rs")?
///     .size("< 1M")?
///     .in_path("src")?;
///
/// for entry in hits.entries()? {
///     println!("{}", entry?.path().display());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SearchBuilder {
    pub(crate) criteria: Criteria,
    pub(crate) chain:    AdapterChain,
    pub(crate) appended: Vec<AppendSource>,
}

/// A source concatenated after the builder's own matches.
pub(crate) enum AppendSource {
    Search(Box<SearchBuilder>),
    Paths(Vec<PathBuf>),
}

impl std::fmt::Debug for SearchBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchBuilder").finish_non_exhaustive()
    }
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            criteria: Criteria::default(),
            chain:    AdapterChain::default(),
            appended: Vec::new(),
        }
    }
}

impl SearchBuilder {
    // ── Roots ─────────────────────────────────────────────────────────────

    /// Declare a scan root: a directory path, a glob expanding to directory
    /// paths, or a `zip://archive!/dir` location. Validated eagerly.
    pub fn in_path(mut self, root: impl AsRef<str>) -> Result<Self, SiftError> {
        let resolved = resolve_root(root.as_ref())?;
        self.criteria.roots.extend(resolved);
        Ok(self)
    }

    /// Declare several scan roots at once, in order.
    pub fn in_paths<I, S>(mut self, roots: I) -> Result<Self, SiftError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for root in roots {
            self = self.in_path(root)?;
        }
        Ok(self)
    }

    // ── Entry kinds ───────────────────────────────────────────────────────

    /// Yield files only. Overwrites any previous mode selection.
    pub fn files(mut self) -> Self {
        self.criteria.mode = SearchMode::Files;
        self
    }

    /// Yield directories only. Overwrites any previous mode selection.
    pub fn directories(mut self) -> Self {
        self.criteria.mode = SearchMode::Dirs;
        self
    }

    // ── Comparator filters ────────────────────────────────────────────────

    /// Constrain the depth below the scan root (`"< 3"`, `">= 1"`).
    /// Multiple calls AND together; `"< 1"` then `">= 1"` is the empty
    /// query, which is well-defined rather than an error.
    pub fn depth(mut self, expr: &str) -> Result<Self, SiftError> {
        self.criteria.depths.push(Comparator::depth(expr)?);
        Ok(self)
    }

    /// Constrain file size (`"< 1K"`, `">= 2Mi"`). Directories pass
    /// vacuously.
    pub fn size(mut self, expr: &str) -> Result<Self, SiftError> {
        self.criteria.sizes.push(Comparator::size(expr)?);
        Ok(self)
    }

    /// Constrain the modification time (`"since yesterday"`,
    /// `"until last month"`, `"> 2024-01-01"`). Directories pass vacuously.
    pub fn date(mut self, expr: &str) -> Result<Self, SiftError> {
        self.criteria.dates.push(Comparator::date(expr)?);
        Ok(self)
    }

    // ── Pattern filters ───────────────────────────────────────────────────

    /// Match base file names against a glob, or a `~regex~` / `/regex/`.
    pub fn name(mut self, pattern: &str) -> Result<Self, SiftError> {
        self.criteria.names.push(Pattern::name(pattern)?);
        Ok(self)
    }

    /// Reject entries whose base name matches ANY `not_name` pattern.
    pub fn not_name(mut self, pattern: &str) -> Result<Self, SiftError> {
        self.criteria.not_names.push(Pattern::name(pattern)?);
        Ok(self)
    }

    /// Match the `/`-normalized path relative to the scan root.
    pub fn path(mut self, pattern: &str) -> Result<Self, SiftError> {
        self.criteria.paths.push(Pattern::path(pattern)?);
        Ok(self)
    }

    /// Reject entries whose relative path matches ANY `not_path` pattern.
    pub fn not_path(mut self, pattern: &str) -> Result<Self, SiftError> {
        self.criteria.not_paths.push(Pattern::path(pattern)?);
        Ok(self)
    }

    /// Keep files whose content matches the pattern (literal substring, or a
    /// delimited regex). Directories never match.
    pub fn contains(mut self, pattern: &str) -> Result<Self, SiftError> {
        self.criteria.contents.push(Pattern::content(pattern)?);
        Ok(self)
    }

    /// Reject files whose content matches ANY `not_contains` pattern.
    /// Directories always pass.
    pub fn not_contains(mut self, pattern: &str) -> Result<Self, SiftError> {
        self.criteria.not_contents.push(Pattern::content(pattern)?);
        Ok(self)
    }

    // ── Visibility ────────────────────────────────────────────────────────

    /// Prune every subtree rooted at a directory with this basename.
    /// Pruned descendants are never visited, not merely filtered out.
    pub fn exclude(mut self, dir_name: impl Into<String>) -> Self {
        self.criteria.excluded.push(dir_name.into());
        self
    }

    /// Whether VCS metadata directories (`.git`, `.svn`, ...) are pruned.
    /// On by default.
    pub fn ignore_vcs(mut self, yes: bool) -> Self {
        self.criteria.ignore_vcs = yes;
        self
    }

    /// Whether dot entries are skipped. On by default.
    pub fn ignore_dot_files(mut self, yes: bool) -> Self {
        self.criteria.ignore_dot_files = yes;
        self
    }

    /// Whether to descend through symlinked directories. Off by default.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.criteria.follow_links = yes;
        self
    }

    /// Add a custom predicate; every predicate must accept an entry for it
    /// to be yielded.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Entry) -> bool + Send + Sync + 'static,
    {
        self.criteria.filters.push(Arc::new(predicate));
        self
    }

    // ── Ordering ──────────────────────────────────────────────────────────

    /// Sort the merged sequence by absolute path.
    pub fn sort_by_name(mut self) -> Self {
        self.criteria.sort = SortMode::ByName;
        self
    }

    /// Sort directories ahead of files, each group by absolute path.
    pub fn sort_by_type(mut self) -> Self {
        self.criteria.sort = SortMode::ByType;
        self
    }

    /// Sort by last access time, ascending.
    pub fn sort_by_accessed(mut self) -> Self {
        self.criteria.sort = SortMode::ByAccessed;
        self
    }

    /// Sort by inode change time, ascending.
    pub fn sort_by_changed(mut self) -> Self {
        self.criteria.sort = SortMode::ByChanged;
        self
    }

    /// Sort by modification time, ascending.
    pub fn sort_by_modified(mut self) -> Self {
        self.criteria.sort = SortMode::ByModified;
        self
    }

    /// Sort with a caller-supplied total order.
    pub fn sort_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&Entry, &Entry) -> Ordering + Send + Sync + 'static,
    {
        self.criteria.sort = SortMode::Custom(Arc::new(compare));
        self
    }

    // ── Adapters ──────────────────────────────────────────────────────────

    /// Register an additional adapter on this query's chain.
    pub fn add_adapter(
        mut self,
        adapter: impl crate::adapter::Adapter + 'static,
        priority: i32,
    ) -> Self {
        self.chain.add(adapter, priority);
        self
    }

    /// Drop every adapter from this query's chain, typically to force a
    /// specific adapter set with [`add_adapter`](SearchBuilder::add_adapter).
    pub fn remove_adapters(mut self) -> Self {
        self.chain.clear();
        self
    }

    /// Adapter names in chain order.
    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    // ── Composition ───────────────────────────────────────────────────────

    /// Concatenate another query's matches after this one's. The appended
    /// query keeps its own criteria and chain; duplicates are preserved.
    pub fn append(mut self, other: SearchBuilder) -> Self {
        self.appended.push(AppendSource::Search(Box::new(other)));
        self
    }

    /// Concatenate literal paths after this query's matches. The paths are
    /// yielded as-is, without passing this query's criteria.
    pub fn append_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.appended
            .push(AppendSource::Paths(paths.into_iter().map(Into::into).collect()));
        self
    }

    // ── Execution ─────────────────────────────────────────────────────────

    /// Execute the search, yielding the lazy result sequence.
    ///
    /// Roots are evaluated independently and in declaration order; a root
    /// whose every supporting adapter failed surfaces as an `Err` item
    /// without aborting the remaining roots. Calling `entries()` again
    /// re-executes the search from the start.
    ///
    /// # Errors
    ///
    /// [`SiftError::NoRootDeclared`] when no root was declared and nothing
    /// was appended.
    pub fn entries(&self) -> Result<Results<'_>, SiftError> {
        if self.criteria.roots.is_empty() && self.appended.is_empty() {
            return Err(SiftError::NoRootDeclared);
        }
        Ok(Results::new(self))
    }

    /// Count the matches, materializing the full sequence.
    pub fn count(&self) -> Result<usize, SiftError> {
        let mut n = 0;
        for item in self.entries()? {
            item?;
            n += 1;
        }
        Ok(n)
    }
}
