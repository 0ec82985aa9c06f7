//! Search strategies.
//!
//! An [`Adapter`] is one way of producing the entries under a root: the
//! portable [`WalkAdapter`] descends the tree in-process, while the
//! delegating adapters hand the traversal to the system `find` utility and
//! post-filter its output. The [`AdapterChain`](crate::AdapterChain) picks
//! between them per root.

use crate::criteria::Criteria;
use crate::entry::Entry;
use crate::error::AdapterError;
use crate::root::SearchRoot;

mod archive;
mod walk;

#[cfg(unix)]
mod bsd;
#[cfg(unix)]
mod gnu;
#[cfg(unix)]
mod shell;

pub use walk::WalkAdapter;

#[cfg(unix)]
pub use bsd::BsdFindAdapter;
#[cfg(unix)]
pub use gnu::GnuFindAdapter;

/// The lazy sequence an adapter execution produces. A mid-stream `Err`
/// means the whole walk failed; the chain discards everything buffered from
/// it and moves on to the next adapter.
pub type EntryStream = Box<dyn Iterator<Item = Result<Entry, AdapterError>>>;

/// A pluggable search strategy.
pub trait Adapter: Send + Sync {
    /// Unique name within a chain.
    fn name(&self) -> &'static str;

    /// Whether this adapter can, in principle, search the given root.
    ///
    /// Must be cheap and side-effect free: platform gating and binary
    /// lookup, never a subprocess probe. Returning `true` here does not
    /// guarantee [`search`](Adapter::search) will succeed at runtime.
    fn is_supported(&self, root: &SearchRoot) -> bool;

    /// Produce the entries under `root` that satisfy `criteria`.
    fn search(
        &self,
        criteria: &Criteria,
        root: &SearchRoot,
    ) -> Result<EntryStream, AdapterError>;
}
