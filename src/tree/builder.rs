use snafu::prelude::*;
use tracing::{debug, info};

use crate::listing::{ListEntries, ListingEntry, ListingError};
use crate::tree::{Tree, TreeNode};

/// How often build progress is reported, in listing entries.
const PROGRESS_INTERVAL: usize = 1000;

/// Assembles a [`Tree`] from the entries a walker reports under one root.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root_path: String,
}

impl TreeBuilder {
    pub fn new(root_path: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    /// Consumes every entry of `walker` under the root and returns the full
    /// tree. Any walker error or inconsistent entry aborts the build.
    pub fn build<W: ListEntries>(&self, walker: &W) -> Result<Tree, TreeBuildError> {
        let mut tree = Tree::new(self.root_path.clone(), walker.style());
        let mut processed = 0usize;

        for entry in walker.entries(&self.root_path) {
            let entry = entry.with_context(|_| ListingFailedSnafu {
                root: self.root_path.clone(),
            })?;
            self.apply(&mut tree, entry)?;

            processed += 1;
            if processed % PROGRESS_INTERVAL == 0 {
                debug!("Processed {} entries under {}", processed, self.root_path);
            }
        }

        info!(
            "Built tree for {} from {} entries ({} directories)",
            self.root_path,
            processed,
            tree.root().node_count()
        );
        Ok(tree)
    }

    fn apply(&self, tree: &mut Tree, entry: ListingEntry) -> Result<(), TreeBuildError> {
        let style = tree.style();
        let relative = style
            .strip_root(&self.root_path, &entry.path)
            .with_context(|| PrefixMismatchSnafu {
                root: self.root_path.clone(),
                path: entry.path.clone(),
            })?;
        let segments = style.split(relative);

        let Some((name, parent)) = segments.split_last() else {
            tree.root_mut().set_files(entry.files);
            return Ok(());
        };

        if let Some(node) = tree.root_mut().get_by_path_mut(&segments) {
            debug!("Directory {} listed again, replacing its files", segments);
            node.set_files(entry.files);
            return Ok(());
        }

        let parent_node = if parent.is_empty() {
            tree.root_mut()
        } else {
            tree.root_mut()
                .get_by_path_mut(parent)
                .with_context(|| UnresolvableParentSnafu {
                    path: entry.path.clone(),
                })?
        };
        parent_node.add_child(TreeNode::with_files(name.clone(), entry.files));
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum TreeBuildError {
    #[snafu(display("Listed path {} is not under the root {}", path, root))]
    PrefixMismatchError { root: String, path: String },
    #[snafu(display(
        "Parent directory of {} was not listed before it, the listing is out of order",
        path
    ))]
    UnresolvableParentError { path: String },
    #[snafu(display("Failed to list entries under {}", root))]
    ListingFailedError { root: String, source: ListingError },
}
