use snafu::{ResultExt, Snafu};
use tracing::debug;
use walkdir::WalkDir;

use crate::listing::ListingEntry;
use crate::tree::PathStyle;

/// Anything that can enumerate the directories under a root.
///
/// Entries must come in directory-before-descendant order: a directory is
/// listed before any entry for a path inside it.
pub trait ListEntries {
    fn entries(&self, root: &str) -> impl Iterator<Item = Result<ListingEntry, ListingError>>;

    /// Path style of the paths this walker reports.
    fn style(&self) -> PathStyle;
}

/// Walks the live filesystem, one entry per directory in pre-order.
///
/// Every directory is read exactly once; the walk is completed before the
/// first entry is yielded because a directory's entry needs all of its
/// children. Symbolic links are not followed and are reported as files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveWalker;

impl LiveWalker {
    fn walk(root: &str) -> Result<Vec<ListingEntry>, ListingError> {
        let mut listings: Vec<ListingEntry> = Vec::new();
        // Index into `listings` of the open directory at each depth.
        let mut open: Vec<usize> = Vec::new();

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry.context(WalkSnafu { root })?;
            let depth = entry.depth();
            open.truncate(depth);

            if let Some(&parent) = open.last() {
                let name = entry.file_name().to_string_lossy().into_owned();
                let parent = &mut listings[parent];
                if entry.file_type().is_dir() {
                    parent.subdirectories.push(name);
                } else {
                    parent.files.push(name);
                }
            }

            if entry.file_type().is_dir() {
                open.push(listings.len());
                listings.push(ListingEntry {
                    path: entry.path().to_string_lossy().into_owned(),
                    subdirectories: Vec::new(),
                    files: Vec::new(),
                });
            }
        }

        Ok(listings)
    }
}

impl ListEntries for LiveWalker {
    fn entries(&self, root: &str) -> impl Iterator<Item = Result<ListingEntry, ListingError>> {
        debug!("Walking live filesystem under {}", root);
        let (listings, failure) = match Self::walk(root) {
            Ok(listings) => (listings, None),
            Err(e) => (Vec::new(), Some(e)),
        };
        listings.into_iter().map(Ok).chain(failure.map(Err))
    }

    fn style(&self) -> PathStyle {
        PathStyle::native()
    }
}

/// Replays a previously captured listing, keeping only entries under the
/// requested root.
#[derive(Debug, Clone)]
pub struct ReplayWalker {
    entries: Vec<ListingEntry>,
    style: PathStyle,
}

impl ReplayWalker {
    pub fn new(entries: Vec<ListingEntry>, style: PathStyle) -> Self {
        Self { entries, style }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl ListEntries for ReplayWalker {
    fn entries(&self, root: &str) -> impl Iterator<Item = Result<ListingEntry, ListingError>> {
        debug!(
            "Replaying {} cached entries filtered to {}",
            self.entry_count(),
            root
        );
        let style = self.style;
        self.entries
            .iter()
            .filter(move |entry| style.strip_root(root, &entry.path).is_some())
            .cloned()
            .map(Ok)
    }

    fn style(&self) -> PathStyle {
        self.style
    }
}

#[derive(Debug, Snafu)]
pub enum ListingError {
    #[snafu(display("Failed to walk the directory tree under {}", root))]
    WalkError {
        root: String,
        source: walkdir::Error,
    },
}
