use std::num::NonZeroUsize;
use std::thread::available_parallelism;

use compio::dispatcher::{Dispatcher, DispatcherBuilder};
use derive_more::Display;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::listing::{ListingEntry, LiveWalker, ReplayWalker};
use crate::tree::{PathStyle, Tree, TreeBuildError, TreeBuilder};

/// One build per side of the reconciliation
const BUILD_SIDES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Side {
    #[display("source")]
    Source,
    #[display("target")]
    Target,
}

/// Where the listing for one side comes from.
#[derive(Debug, Clone)]
pub enum TreeSource {
    Live {
        root: String,
    },
    Replay {
        root: String,
        entries: Vec<ListingEntry>,
        style: PathStyle,
    },
}

impl TreeSource {
    pub fn root(&self) -> &str {
        match self {
            TreeSource::Live { root } | TreeSource::Replay { root, .. } => root,
        }
    }

    pub fn build(self) -> Result<Tree, TreeBuildError> {
        match self {
            TreeSource::Live { root } => TreeBuilder::new(root).build(&LiveWalker),
            TreeSource::Replay {
                root,
                entries,
                style,
            } => TreeBuilder::new(root).build(&ReplayWalker::new(entries, style)),
        }
    }
}

/// Builds the source and target trees on separate worker threads.
pub struct TreeBuildExecutor {
    dispatcher: Dispatcher,
}

impl TreeBuildExecutor {
    pub fn new() -> Result<Self, ExecutorCreationError> {
        let workers_num = Self::determine_worker_count();
        debug!("Using {} worker threads for tree construction", workers_num);

        let dispatcher = DispatcherBuilder::new()
            .worker_threads(workers_num)
            .build()
            .context(DispatcherSnafu)?;

        Ok(Self { dispatcher })
    }

    /// One worker per side, fewer if the machine has a single core.
    fn determine_worker_count() -> NonZeroUsize {
        available_parallelism()
            .map(|n| n.get().min(BUILD_SIDES))
            .ok()
            .and_then(NonZeroUsize::new)
            .unwrap_or(NonZeroUsize::MIN)
    }

    /// Builds both trees and returns only once both are complete. The first
    /// failure, source side first, aborts the whole reconciliation.
    pub async fn build_pair(
        &self,
        source: TreeSource,
        target: TreeSource,
    ) -> Result<(Tree, Tree), ExecutionError> {
        info!(
            "Building trees for {} and {}",
            source.root(),
            target.root()
        );

        let source_receiver = self
            .dispatcher
            .dispatch(move || async move { source.build() })
            .map_err(|e| ExecutionError::DispatchError {
                side: Side::Source,
                error: e.to_string(),
            })?;
        let target_receiver = self
            .dispatcher
            .dispatch(move || async move { target.build() })
            .map_err(|e| ExecutionError::DispatchError {
                side: Side::Target,
                error: e.to_string(),
            })?;

        let source_tree = source_receiver
            .await
            .context(CanceledSnafu { side: Side::Source })?
            .context(BuildSnafu { side: Side::Source })?;
        let target_tree = target_receiver
            .await
            .context(CanceledSnafu { side: Side::Target })?
            .context(BuildSnafu { side: Side::Target })?;

        debug!("Both trees are complete");
        Ok((source_tree, target_tree))
    }
}

#[derive(Debug, Snafu)]
pub enum ExecutorCreationError {
    #[snafu(display("Failed to create the tree build dispatcher"))]
    DispatcherError { source: std::io::Error },
}

#[derive(Debug, Snafu)]
pub enum ExecutionError {
    #[snafu(display("Failed to dispatch the {} tree build: {}", side, error))]
    DispatchError { side: Side, error: String },
    #[snafu(display("The {} tree build was cancelled", side))]
    CanceledError {
        side: Side,
        source: futures_channel::oneshot::Canceled,
    },
    #[snafu(display("Failed to build the {} tree", side))]
    BuildError { side: Side, source: TreeBuildError },
}
