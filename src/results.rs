use std::path::{Path, PathBuf};
use std::vec;

use tracing::debug;

use crate::builder::{AppendSource, SearchBuilder};
use crate::criteria::SortMode;
use crate::entry::Entry;
use crate::error::SiftError;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The result sequence of one search execution.
///
/// Roots are pulled one at a time, in declaration order, so abandoning the
/// iteration early never touches the remaining roots; appended sources
/// follow after the last root. With a sort mode set the whole merged
/// sequence is materialized up front — sorting is the one combinator that
/// gives up laziness — and any per-root errors are yielded ahead of the
/// sorted block.
///
/// The iteration key for keyed consumption is always the entry's absolute
/// path; see [`Results::keyed`].
pub struct Results<'a> {
    builder:        &'a SearchBuilder,
    root_idx:       usize,
    buffer:         vec::IntoIter<Entry>,
    append_idx:     usize,
    current_append: Option<BoxedItems<'a>>,
    materialized:   Option<vec::IntoIter<Result<Entry, SiftError>>>,
}

type BoxedItems<'a> = Box<dyn Iterator<Item = Result<Entry, SiftError>> + 'a>;

impl<'a> Results<'a> {
    pub(crate) fn new(builder: &'a SearchBuilder) -> Self {
        let materialized = if builder.criteria.sort.is_none() {
            None
        } else {
            Some(materialize(builder).into_iter())
        };
        Self {
            builder,
            root_idx: 0,
            buffer: Vec::new().into_iter(),
            append_idx: 0,
            current_append: None,
            materialized,
        }
    }

    /// Iterate `(absolute path, entry)` pairs.
    pub fn keyed(self) -> impl Iterator<Item = Result<(PathBuf, Entry), SiftError>> + 'a {
        self.map(|item| item.map(|entry| (entry.path().to_path_buf(), entry)))
    }
}

impl<'a> Iterator for Results<'a> {
    type Item = Result<Entry, SiftError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(items) = &mut self.materialized {
            return items.next();
        }

        loop {
            if let Some(entry) = self.buffer.next() {
                return Some(Ok(entry));
            }

            let roots = &self.builder.criteria.roots;
            if self.root_idx < roots.len() {
                let root = &roots[self.root_idx];
                self.root_idx += 1;
                match self.builder.chain.search_root(&self.builder.criteria, root) {
                    Ok(found) => {
                        self.buffer = found.into_iter();
                        continue;
                    }
                    // One root failing does not abort the ones after it.
                    Err(e) => return Some(Err(e)),
                }
            }

            if let Some(inner) = &mut self.current_append {
                match inner.next() {
                    Some(item) => return Some(item),
                    None => self.current_append = None,
                }
            }

            if self.append_idx < self.builder.appended.len() {
                let source = &self.builder.appended[self.append_idx];
                self.append_idx += 1;
                self.current_append = Some(append_iter(source));
                continue;
            }

            return None;
        }
    }
}

// ---------------------------------------------------------------------------
// Materialization and sorting
// ---------------------------------------------------------------------------

fn materialize(builder: &SearchBuilder) -> Vec<Result<Entry, SiftError>> {
    let mut errors = Vec::new();
    let mut entries = Vec::new();

    for root in &builder.criteria.roots {
        match builder.chain.search_root(&builder.criteria, root) {
            Ok(found) => entries.extend(found),
            Err(e) => errors.push(e),
        }
    }

    sort_entries(&builder.criteria.sort, &mut entries);

    let mut items: Vec<Result<Entry, SiftError>> = errors
        .into_iter()
        .map(Err)
        .chain(entries.into_iter().map(Ok))
        .collect();

    for source in &builder.appended {
        items.extend(append_iter(source));
    }
    items
}

fn sort_entries(mode: &SortMode, entries: &mut [Entry]) {
    match mode {
        SortMode::None => {}
        SortMode::ByName => entries.sort_by(|a, b| a.path().cmp(b.path())),
        SortMode::ByType => entries.sort_by(|a, b| {
            let rank = |e: &Entry| u8::from(!e.is_dir());
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.path().cmp(b.path()))
        }),
        SortMode::ByAccessed => entries.sort_by(|a, b| {
            a.accessed_secs()
                .cmp(&b.accessed_secs())
                .then_with(|| a.path().cmp(b.path()))
        }),
        SortMode::ByChanged => entries.sort_by(|a, b| {
            a.changed_secs()
                .cmp(&b.changed_secs())
                .then_with(|| a.path().cmp(b.path()))
        }),
        SortMode::ByModified => entries.sort_by(|a, b| {
            a.modified_secs()
                .cmp(&b.modified_secs())
                .then_with(|| a.path().cmp(b.path()))
        }),
        SortMode::Custom(compare) => entries.sort_by(|a, b| compare(a, b)),
    }
}

// ---------------------------------------------------------------------------
// Appended sources
// ---------------------------------------------------------------------------

fn append_iter(source: &AppendSource) -> BoxedItems<'_> {
    match source {
        AppendSource::Search(other) => match other.entries() {
            Ok(results) => Box::new(results),
            Err(e) => Box::new(std::iter::once(Err(e))),
        },
        AppendSource::Paths(paths) => Box::new(paths.iter().filter_map(|path| {
            let parent = path.parent().unwrap_or_else(|| Path::new(""));
            match Entry::from_fs(path, parent, 0, false) {
                Ok(entry) => Some(Ok(entry)),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping appended path");
                    None
                }
            }
        })),
    }
}
