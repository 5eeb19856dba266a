use std::path::PathBuf;

use crate::cli::{Cli, Command, DiffArgs, SnapshotArgs};
use crate::commands::SinkKind;
use crate::listing::ListingFormat;

const DEFAULT_SCRIPT_PATH: &str = "arcsync-copy.bat";

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub config_path: Option<PathBuf>,
    pub mode: Mode,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Diff(DiffRequest),
    Snapshot(SnapshotRequest),
}

#[derive(Debug, Clone)]
pub struct DiffRequest {
    pub source_root: String,
    pub target_root: String,
    pub source_listing: Option<PathBuf>,
    pub target_listing: Option<PathBuf>,
    pub listing_format: Option<ListingFormat>,
    /// Drop the source root's own name when mapping onto the target
    pub skip_root_prefix: bool,
    pub sink: SinkKind,
    pub script_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    pub root: String,
    pub output: PathBuf,
    pub listing_format: Option<ListingFormat>,
}

impl From<DiffArgs> for DiffRequest {
    fn from(args: DiffArgs) -> Self {
        Self {
            source_root: args.source,
            target_root: args.target,
            source_listing: args.source_listing,
            target_listing: args.target_listing,
            listing_format: args.listing_format,
            skip_root_prefix: !args.keep_root_segment,
            sink: args.sink,
            script_path: args
                .output
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT_PATH)),
        }
    }
}

impl From<SnapshotArgs> for SnapshotRequest {
    fn from(args: SnapshotArgs) -> Self {
        Self {
            root: args.root,
            output: args.output,
            listing_format: args.listing_format,
        }
    }
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let mode = match cli.command {
            Command::Diff(args) => Mode::Diff(args.into()),
            Command::Snapshot(args) => Mode::Snapshot(args.into()),
        };
        Self {
            config_path: cli.config,
            mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn root_prefix_is_skipped_unless_kept() {
        let cli = Cli::try_parse_from(["arcsync", "-c", "tape.yaml", "diff", "/src", "/dst"])
            .expect("arguments are valid");
        let config = RuntimeConfig::from(cli);

        assert_eq!(config.config_path, Some(PathBuf::from("tape.yaml")));
        let Mode::Diff(request) = config.mode else {
            panic!("expected a diff request");
        };
        assert!(request.skip_root_prefix);
        assert_eq!(request.script_path, PathBuf::from(DEFAULT_SCRIPT_PATH));

        let cli = Cli::try_parse_from(["arcsync", "diff", "/src", "/dst", "--keep-root-segment"])
            .expect("arguments are valid");
        let Mode::Diff(request) = RuntimeConfig::from(cli).mode else {
            panic!("expected a diff request");
        };
        assert!(!request.skip_root_prefix);
    }
}
