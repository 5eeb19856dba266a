use std::path::PathBuf;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::{DiffRequest, Mode, RuntimeConfig, SnapshotRequest};
use crate::commands::{
    CommandGenerator, CommandRenderer, CopyCommand, ExecuteSink, PrintSink, ScriptSink, SinkError,
    SinkKind, drain,
};
use crate::config::{Config, ConfigError};
use crate::diff::{DiffEngine, DiffReport};
use crate::executor::{ExecutionError, ExecutorCreationError, TreeBuildExecutor, TreeSource};
use crate::listing::{
    ListEntries, ListingError, ListingFile, ListingFileError, ListingFormat, LiveWalker,
};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let config = Config::read(app_config.config_path.as_deref())
            .await
            .context(LoadConfigSnafu)?;
        debug!("Loaded config: {:?}", config);

        match app_config.mode {
            Mode::Diff(request) => Self::reconcile(&config, request).await,
            Mode::Snapshot(request) => Self::snapshot(request).await,
        }
    }

    async fn reconcile(config: &Config, request: DiffRequest) -> Result<(), ApplicationError> {
        let source = Self::tree_source(
            config,
            request.source_root,
            request.source_listing,
            request.listing_format,
        )
        .await?;
        let target = Self::tree_source(
            config,
            request.target_root,
            request.target_listing,
            request.listing_format,
        )
        .await?;

        let (source_tree, target_tree) = TreeBuildExecutor::new()
            .context(BuildExecutorSnafu)?
            .build_pair(source, target)
            .await
            .context(TreeConstructionSnafu)?;

        let report = DiffEngine::new(&source_tree, &target_tree, request.skip_root_prefix).run();
        for observation in &report.observations {
            warn!(
                "Files only on the target in {}: {:?}",
                target_tree.absolute_path(&observation.segments),
                observation.files
            );
        }

        let commands = CommandGenerator::new(&source_tree, &target_tree).generate(&report.entries);
        Self::log_summary(&report, &commands);

        let renderer = CommandRenderer::new(config.copy_tool.clone());
        match request.sink {
            SinkKind::Print => drain(PrintSink::stdout(renderer), &commands).await,
            SinkKind::Script => {
                drain(ScriptSink::new(request.script_path, renderer), &commands).await
            }
            SinkKind::Execute => drain(ExecuteSink::new(renderer), &commands).await,
        }
        .context(CommandSinkSnafu)?;

        Ok(())
    }

    /// A cached listing replaces the live walk when one is given.
    async fn tree_source(
        config: &Config,
        root: String,
        listing: Option<PathBuf>,
        format: Option<ListingFormat>,
    ) -> Result<TreeSource, ApplicationError> {
        let Some(listing) = listing else {
            return Ok(TreeSource::Live { root });
        };
        let entries = ListingFile::new(listing, format)
            .read()
            .await
            .context(CachedListingSnafu)?;
        Ok(TreeSource::Replay {
            root,
            entries,
            style: config.listing_style,
        })
    }

    async fn snapshot(request: SnapshotRequest) -> Result<(), ApplicationError> {
        let entries = LiveWalker
            .entries(&request.root)
            .collect::<Result<Vec<_>, _>>()
            .context(SnapshotWalkSnafu)?;

        let file = ListingFile::new(request.output, request.listing_format);
        file.write(&entries).await.context(SnapshotWriteSnafu)?;
        info!(
            "Stored {} directories of {} in {} as {:?}",
            entries.len(),
            request.root,
            file.path().display(),
            file.format()
        );
        Ok(())
    }

    fn log_summary(report: &DiffReport, commands: &[CopyCommand]) {
        let recursive = commands.iter().filter(|command| command.recursive).count();
        let complete = report
            .entries
            .iter()
            .filter(|entry| entry.classification.is_complete())
            .count();
        info!(
            "{} copy commands: {} recursive, {} single files",
            commands.len(),
            recursive,
            commands.len() - recursive
        );
        info!(
            "{} directories up to date, {} covered by a recursive copy, {} with files only on the target",
            complete,
            report.subsumed,
            report.observations.len()
        );
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    LoadConfigError { source: ConfigError },
    #[snafu(display("Critical failure encountered while loading a cached listing"))]
    CachedListingError { source: ListingFileError },
    #[snafu(display("Critical failure encountered during executor creation"))]
    BuildExecutorError { source: ExecutorCreationError },
    #[snafu(display("Critical failure encountered while building the directory trees"))]
    TreeConstructionError { source: ExecutionError },
    #[snafu(display("Critical failure encountered while walking the snapshot root"))]
    SnapshotWalkError { source: ListingError },
    #[snafu(display("Critical failure encountered while storing the snapshot"))]
    SnapshotWriteError { source: ListingFileError },
    #[snafu(display("Critical failure encountered while handing out copy commands"))]
    CommandSinkError { source: SinkError },
}
