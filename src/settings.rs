//! Settings loaded from `settings.toml`.
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [plugins]
//! disabled = ["css"]
//!
//! [embedded]
//! disabled = ["file:///a.vue#embedded=style_0"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};

use crate::dispatch::{Disabled, PluginEntry};
use crate::error::SettingsError;

pub const SETTINGS_FILE: &str = "settings.toml";

/// Root settings structure loaded from settings.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub log: Option<LogSettings>,
    pub plugins: Option<PluginSettings>,
    pub embedded: Option<EmbeddedSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogSettings {
    /// A `tracing` filter directive, e.g. `debug` or `vdsp=trace`.
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PluginSettings {
    /// Names of registered plugins that should never be asked.
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmbeddedSettings {
    /// Encoded embedded document URIs to skip.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Settings {
    pub fn log_level(&self) -> Option<&str> {
        self.log.as_ref()?.level.as_deref()
    }

    /// Resolve the configured names and URIs against the registered plugins.
    ///
    /// Unknown plugin names and malformed URIs are logged and skipped.
    pub fn disabled(&self, plugins: &[PluginEntry]) -> Disabled {
        let mut disabled = Disabled::default();

        for name in self.plugins.iter().flat_map(|p| p.disabled.iter()) {
            let mut matched = false;
            for entry in plugins.iter().filter(|entry| entry.name() == name) {
                disabled.plugins.insert(entry.key());
                matched = true;
            }
            if !matched {
                warn!(plugin = %name, "settings disable an unknown plugin");
            }
        }

        for uri in self.embedded.iter().flat_map(|e| e.disabled.iter()) {
            match Url::parse(uri) {
                Ok(uri) => {
                    disabled.embedded.insert(uri);
                }
                Err(error) => warn!(uri = %uri, %error, "ignoring malformed embedded document uri"),
            }
        }

        disabled
    }
}

/// Read and parse a settings file.
pub fn read_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings from a settings.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match read_settings(path) {
        Ok(settings) => settings,
        Err(SettingsError::Read { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Settings::default()
        }
        Err(error) => {
            warn!(%error, "using default settings");
            Settings::default()
        }
    }
}

/// Find the directory holding the workspace settings.
///
/// The nearest of `start_dir` and its ancestors wins. A workspace opened one
/// level above its project also finds the settings of an immediate child.
/// The returned directory is `start_dir` when no settings exist.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let found = start_dir
        .ancestors()
        .find(|dir| has_settings(dir))
        .map(Path::to_path_buf)
        .or_else(|| child_with_settings(start_dir));

    match found {
        Some(dir) => {
            debug!(dir = %dir.display(), "found {SETTINGS_FILE}");
            (load_settings(&dir.join(SETTINGS_FILE)), dir)
        }
        None => (Settings::default(), start_dir.to_path_buf()),
    }
}

fn has_settings(dir: &Path) -> bool {
    dir.join(SETTINGS_FILE).is_file()
}

fn child_with_settings(dir: &Path) -> Option<PathBuf> {
    std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
        .map(|entry| entry.path())
        .find(|child| has_settings(child))
}
