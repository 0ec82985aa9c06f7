use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapter::Adapter;
use crate::criteria::Criteria;
use crate::entry::Entry;
use crate::error::SiftError;
use crate::root::SearchRoot;

// ---------------------------------------------------------------------------
// AdapterChain
// ---------------------------------------------------------------------------

struct Registered {
    adapter:  Arc<dyn Adapter>,
    priority: i32,
    seq:      u64,
}

/// An ordered registry of search adapters.
///
/// Higher priority runs first; equal priorities keep their insertion order.
/// A chain is a plain caller-owned value — there is no process-wide
/// registry — and its adapter list is read-only during execution, so one
/// chain can back several concurrently running queries.
pub struct AdapterChain {
    adapters: Vec<Registered>,
    next_seq: u64,
}

impl Default for AdapterChain {
    /// The stock chain: both delegating `find` variants ahead of the
    /// portable walk, which acts as the universal fallback.
    fn default() -> Self {
        let mut chain = Self::empty();
        #[cfg(unix)]
        {
            chain.add(crate::adapter::GnuFindAdapter, 0);
            chain.add(crate::adapter::BsdFindAdapter, 0);
        }
        chain.add(crate::adapter::WalkAdapter, -50);
        chain
    }
}

impl AdapterChain {
    /// A chain with no adapters registered.
    pub fn empty() -> Self {
        Self {
            adapters: Vec::new(),
            next_seq: 0,
        }
    }

    /// Register an adapter and re-sort the chain.
    pub fn add(&mut self, adapter: impl Adapter + 'static, priority: i32) -> &mut Self {
        self.adapters.push(Registered {
            adapter: Arc::new(adapter),
            priority,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        self.adapters
            .sort_by_key(|r| (Reverse(r.priority), r.seq));
        self
    }

    /// Remove every registered adapter.
    pub fn clear(&mut self) -> &mut Self {
        self.adapters.clear();
        self
    }

    /// Adapter names in chain order.
    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|r| r.adapter.name()).collect()
    }

    /// The adapters claiming support for `root`, preserving chain order.
    pub fn select_for(&self, root: &SearchRoot) -> Vec<Arc<dyn Adapter>> {
        self.adapters
            .iter()
            .filter(|r| r.adapter.is_supported(root))
            .map(|r| Arc::clone(&r.adapter))
            .collect()
    }

    /// Run one root through the chain.
    ///
    /// Candidates are tried in order; a runtime failure — at spawn time or
    /// anywhere mid-stream — discards that adapter's partial output and
    /// falls through to the next. Only when no candidate exists, or every
    /// candidate has failed, does the root surface as unsupported.
    pub(crate) fn search_root(
        &self,
        criteria: &Criteria,
        root: &SearchRoot,
    ) -> Result<Vec<Entry>, SiftError> {
        let candidates = self.select_for(root);
        if candidates.is_empty() {
            return Err(SiftError::NoSupportedAdapter(root.display_path()));
        }

        for adapter in candidates {
            debug!(adapter = adapter.name(), root = %root.display_path().display(), "trying adapter");
            let stream = match adapter.search(criteria, root) {
                Ok(s) => s,
                Err(e) => {
                    warn!(adapter = adapter.name(), error = %e, "adapter failed, falling back");
                    continue;
                }
            };

            let mut buffer = Vec::new();
            let mut failed = false;
            for item in stream {
                match item {
                    Ok(entry) => buffer.push(entry),
                    Err(e) => {
                        warn!(adapter = adapter.name(), error = %e, "adapter failed mid-walk, falling back");
                        failed = true;
                        break;
                    }
                }
            }
            if !failed {
                return Ok(buffer);
            }
        }

        Err(SiftError::NoSupportedAdapter(root.display_path()))
    }
}
