//! Error types for ikuai-ipgroup.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IpGroupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch IP list from {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },

    #[error("No valid IPv4 CIDR found in the IP list")]
    EmptyFeed,

    #[error("No IP group was generated, the IP list may be empty")]
    NoGroups,

    #[error("File system error on {path:?}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IpGroupError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }
}
