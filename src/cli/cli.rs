use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::application::data::LogLevel;
use crate::commands::SinkKind;
use crate::listing::ListingFormat;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Reconciles a source tree against an archive target")]
pub struct Cli {
    #[clap(long, short, global = true, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// YAML config file, `arcsync.yaml` in the working directory by default
    #[clap(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compare two trees and emit the copy commands that bring the target up to date
    Diff(DiffArgs),
    /// Walk a directory and store its listing for later replay
    Snapshot(SnapshotArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// Root of the tree to copy from
    pub source: String,
    /// Root of the tree to copy into
    pub target: String,

    /// Use a cached listing instead of walking the target
    #[clap(long)]
    pub target_listing: Option<PathBuf>,
    /// Use a cached listing instead of walking the source
    #[clap(long)]
    pub source_listing: Option<PathBuf>,
    /// Format of the cached listings, guessed from the extension when omitted
    #[clap(long, value_enum)]
    pub listing_format: Option<ListingFormat>,

    /// Keep the source root's own name as the first target segment
    #[clap(long)]
    pub keep_root_segment: bool,

    #[clap(long, default_value = "print", value_enum)]
    pub sink: SinkKind,
    /// Script path for `--sink script`
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Directory to walk
    pub root: String,
    /// Listing file to write
    #[clap(long, short)]
    pub output: PathBuf,
    #[clap(long, value_enum)]
    pub listing_format: Option<ListingFormat>,
}
