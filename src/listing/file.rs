use std::path::{Path, PathBuf};

use clap::ValueEnum;
use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::listing::ListingEntry;

const ZSTD_LEVEL: i32 = 3;

/// On-disk layout of a cached listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingFormat {
    /// JSON array of `[path, [subdirectories], [files]]` triples
    Json,
    /// zstd-compressed bincode
    Binary,
}

impl ListingFormat {
    /// `.json` files are JSON, everything else is the binary format.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ListingFormat::Json,
            _ => ListingFormat::Binary,
        }
    }
}

/// A listing persisted on disk, read wholesale before replay.
#[derive(Debug, Clone)]
pub struct ListingFile {
    path: PathBuf,
    format: ListingFormat,
}

impl ListingFile {
    pub fn new(path: impl Into<PathBuf>, format: Option<ListingFormat>) -> Self {
        let path = path.into();
        let format = format.unwrap_or_else(|| ListingFormat::detect(&path));
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ListingFormat {
        self.format
    }

    pub async fn read(&self) -> Result<Vec<ListingEntry>, ListingFileError> {
        debug!(
            "Reading {:?} listing from {}",
            self.format,
            self.path.display()
        );
        let bytes = fs::read(&self.path).await.context(ReadSnafu {
            file_path: self.path.display().to_string(),
        })?;
        let entries = self.decode(&bytes)?;
        info!(
            "Loaded {} cached entries from {}",
            entries.len(),
            self.path.display()
        );
        Ok(entries)
    }

    pub async fn write(&self, entries: &[ListingEntry]) -> Result<(), ListingFileError> {
        let bytes = self.encode(entries)?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.context(WriteSnafu {
                file_path: parent.display().to_string(),
            })?;
        }

        let size = bytes.len();
        fs::write(&self.path, bytes).await.0.context(WriteSnafu {
            file_path: self.path.display().to_string(),
        })?;
        info!(
            "Wrote {} entries ({} bytes) to {}",
            entries.len(),
            size,
            self.path.display()
        );
        Ok(())
    }

    fn encode(&self, entries: &[ListingEntry]) -> Result<Vec<u8>, ListingFileError> {
        match self.format {
            ListingFormat::Json => serde_json::to_vec(entries).context(JsonSnafu),
            ListingFormat::Binary => {
                let raw = bincode::encode_to_vec(entries, bincode::config::standard())
                    .context(EncodeSnafu)?;
                zstd::encode_all(raw.as_slice(), ZSTD_LEVEL).context(CompressSnafu)
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<ListingEntry>, ListingFileError> {
        match self.format {
            ListingFormat::Json => serde_json::from_slice(bytes).context(JsonSnafu),
            ListingFormat::Binary => {
                let raw = zstd::decode_all(bytes).context(DecompressSnafu)?;
                let (entries, _) =
                    bincode::decode_from_slice(&raw, bincode::config::standard())
                        .context(DecodeSnafu)?;
                Ok(entries)
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ListingFileError {
    #[snafu(display("Failed to read the listing file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write the listing file: {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Malformed JSON listing"))]
    JsonError { source: serde_json::Error },
    #[snafu(display("Failed to encode the listing"))]
    EncodeError {
        source: bincode::error::EncodeError,
    },
    #[snafu(display("Malformed binary listing"))]
    DecodeError {
        source: bincode::error::DecodeError,
    },
    #[snafu(display("Failed to compress the listing"))]
    CompressError { source: std::io::Error },
    #[snafu(display("Failed to decompress the listing"))]
    DecompressError { source: std::io::Error },
}
