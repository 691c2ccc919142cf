//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// A failure raised by a single plugin while answering one request.
///
/// These never leave the dispatcher: each one is logged and turned into
/// "no result" from the failing plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("{0}")]
    Failed(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("plugin panicked: {0}")]
    Panicked(String),
}

impl PluginError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

pub type PluginResult<T> = std::result::Result<T, PluginError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
