//! Application metadata (name and version).

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MetadataConfig;

/// Name and version reported in logs and the base route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Metadata {
    pub name: String,
    pub version: String,
}

/// Errors reading the metadata file.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata read error ({path}): {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata unmarshal error ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Metadata {
    /// Resolve metadata from the configured file, falling back to the
    /// configured name and the crate version. A configured version always wins.
    pub fn load(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let mut metadata = match &config.path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| MetadataError::Read {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&raw).map_err(|source| MetadataError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            None => Metadata {
                name: config.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        if let Some(version) = &config.version {
            metadata.version = version.clone();
        }

        Ok(metadata)
    }
}
