use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    borrow::Cow,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::tree::PathStyle;

const CONFIG_FILE_NAME: &str = "arcsync.yaml";

const DEFAULT_EXECUTABLE: &str = r"C:\Program Files\HPE\LTFS\ltfscopy.exe";

/// How the external copy tool is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyToolConfig {
    pub executable: String,
    /// Only passed for directory copies.
    pub recursive_flags: Vec<String>,
    pub common_flags: Vec<String>,
    /// Empty when the tool takes the source positionally.
    pub source_flag: String,
    pub destination_flag: String,
}

impl Default for CopyToolConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            recursive_flags: vec!["--recursive".to_string()],
            common_flags: vec!["--preservetime".to_string(), "--verbose".to_string()],
            source_flag: "-s".to_string(),
            destination_flag: "-d".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// Separator used by paths inside cached listings.
    pub listing_style: PathStyle,
    pub copy_tool: CopyToolConfig,
}

impl Config {
    /// Reads `explicit` if given, otherwise `arcsync.yaml` in the working
    /// directory. Only a missing default file falls back to built-in defaults.
    pub async fn read(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_path(path.to_path_buf()).await,
            None => {
                let path = PathBuf::from(CONFIG_FILE_NAME);
                match Self::from_path(path).await {
                    Err(ConfigError::ReadError { source, .. })
                        if source.kind() == ErrorKind::NotFound =>
                    {
                        debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                        Ok(Self::default())
                    }
                    other => other,
                }
            }
        }
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, ConfigError> {
        debug!("Reading config file: {}", path.display());
        let bytes = fs::read(&path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    fn parse_copy_tool(
        mapping: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<CopyToolConfig, ConfigError> {
        let defaults = CopyToolConfig::default();
        Ok(CopyToolConfig {
            executable: string_field(mapping, "executable")?.unwrap_or(defaults.executable),
            recursive_flags: list_field(mapping, "recursive_flags")?
                .unwrap_or(defaults.recursive_flags),
            common_flags: list_field(mapping, "common_flags")?.unwrap_or(defaults.common_flags),
            source_flag: string_field(mapping, "source_flag")?.unwrap_or(defaults.source_flag),
            destination_flag: string_field(mapping, "destination_flag")?
                .unwrap_or(defaults.destination_flag),
        })
    }

    fn parse_separator(mapping: &LinkedHashMap<Yaml, Yaml>) -> Result<PathStyle, ConfigError> {
        let Some(separator) = string_field(mapping, "listing_separator")? else {
            return Ok(PathStyle::native());
        };
        let mut chars = separator.chars();
        match (chars.next(), chars.next()) {
            (Some(separator), None) => {
                let style = PathStyle::with_separator(separator);
                debug!("Cached listings use {:?} as separator", style.separator());
                Ok(style)
            }
            _ => InvalidFieldSnafu {
                field: "listing_separator",
                expected: "a single character",
            }
            .fail(),
        }
    }
}

impl TryFrom<&str> for Config {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        };

        let top_level = document
            .as_mapping()
            .ok_or(ConfigError::TopLevelNotMap)?;

        for key in top_level.keys() {
            match key {
                Yaml::Value(Scalar::String(name))
                    if name == "listing_separator" || name == "copy_tool" => {}
                _ => debug!("Ignoring unknown config key: {:?}", key),
            }
        }

        let copy_tool = match top_level.get(&key("copy_tool")) {
            None => CopyToolConfig::default(),
            Some(value) => {
                let mapping = value.as_mapping().context(InvalidFieldSnafu {
                    field: "copy_tool",
                    expected: "a map",
                })?;
                Self::parse_copy_tool(mapping)?
            }
        };

        Ok(Config {
            listing_style: Self::parse_separator(top_level)?,
            copy_tool,
        })
    }
}

fn key(name: &str) -> Yaml<'_> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

fn string_field(
    mapping: &LinkedHashMap<Yaml, Yaml>,
    field: &'static str,
) -> Result<Option<String>, ConfigError> {
    mapping
        .get(&key(field))
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .context(InvalidFieldSnafu {
                    field,
                    expected: "a string",
                })
        })
        .transpose()
}

fn list_field(
    mapping: &LinkedHashMap<Yaml, Yaml>,
    field: &'static str,
) -> Result<Option<Vec<String>>, ConfigError> {
    let Some(value) = mapping.get(&key(field)) else {
        return Ok(None);
    };
    let invalid = InvalidFieldSnafu {
        field,
        expected: "a list of strings",
    };
    let items = value.as_sequence().context(invalid)?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).context(invalid))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config field '{}' should be {}", field, expected))]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}
