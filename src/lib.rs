//! # sift
//!
//! A criteria-driven filesystem search engine with pluggable traversal
//! strategies.
//!
//! sift owns the criteria model (name/path patterns, size, date and depth
//! comparators, content grep, custom predicates), the adapter contract
//! ([`Adapter`]), the priority-ordered [`AdapterChain`] that picks a
//! strategy per root and falls back on failure, and the lazy, restartable
//! result sequence ([`Results`]). It does **not** own output formatting or
//! file-type detection — those belong to the caller.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # fn main() -> Result<(), sift::SiftError> {
//! let hits = sift::search()
//!     .files()
//!     .name("*.rs")?
//!     .not_path("~target/~")?
//!     .size("< 1Mi")?
//!     .date("since last week")?
//!     .sort_by_name()
//!     .in_path("src")?;
//!
//! for entry in hits.entries()? {
//!     let entry = entry?;
//!     println!("{} ({} bytes)", entry.path().display(), entry.size());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Adapters
//!
//! Three strategies ship with the crate: the portable [`WalkAdapter`]
//! descends the tree in-process (and is the only one that can see inside
//! `zip://` archive roots), while [`GnuFindAdapter`] and [`BsdFindAdapter`]
//! delegate the traversal to the system `find` utility and post-filter its
//! output. The default chain prefers the delegating variants and keeps the
//! walk as the universal fallback; a runtime failure in one adapter falls
//! through to the next without surfacing, and only a root no adapter could
//! handle errors out.
//!
//! Implement [`Adapter`] to plug in your own strategy:
//!
//! ```rust
//! use sift::{Adapter, AdapterError, Criteria, EntryStream, SearchRoot};
//!
//! struct EmptyAdapter;
//!
//! impl Adapter for EmptyAdapter {
//!     fn name(&self) -> &'static str {
//!         "empty"
//!     }
//!
//!     fn is_supported(&self, _root: &SearchRoot) -> bool {
//!         true
//!     }
//!
//!     fn search(
//!         &self,
//!         _criteria: &Criteria,
//!         _root: &SearchRoot,
//!     ) -> Result<EntryStream, AdapterError> {
//!         Ok(Box::new(std::iter::empty()))
//!     }
//! }
//! ```

#![forbid(unsafe_code)]

pub mod adapter;
pub mod storage;
pub mod symbolmap;

mod builder;
mod chain;
mod comparator;
mod criteria;
mod entry;
mod error;
mod pattern;
mod results;
mod root;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use adapter::{Adapter, EntryStream, WalkAdapter};
pub use builder::SearchBuilder;
pub use chain::AdapterChain;
pub use comparator::{CompareOp, Comparator};
pub use criteria::{Criteria, SearchMode, SortMode};
pub use entry::{Entry, EntryKind};
pub use error::{AdapterError, SiftError};
pub use pattern::Pattern;
pub use results::Results;
pub use root::{ArchiveRoot, SearchRoot};
pub use storage::TemporaryStorage;
pub use symbolmap::SymbolMap;

#[cfg(unix)]
pub use adapter::{BsdFindAdapter, GnuFindAdapter};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] with the default adapter chain.
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> Result<(), sift::SiftError> {
/// let count = sift::search()
///     .directories()
///     .in_path("/tmp")?
///     .count()?;
/// println!("{count} directories");
/// # Ok(())
/// # }
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
