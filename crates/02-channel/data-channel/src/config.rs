//! Channel settings: the feature flag and the build metadata embedded in the module.
//!
//! ```toml
//! [channel]
//! enabled = true
//!
//! [build]
//! module_package_name = "com.example.module"
//! version = "1.4.0-7f3c2a1"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read channel settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid channel settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Runtime switches for the channel.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelConfig {
    /// When false every send and registration is a silent no-op.
    pub enabled: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Identity of the module build the current process runs.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildInfo {
    pub module_package_name: Option<String>,
    /// Compared during the version handshake.
    pub version: String,
}

impl BuildInfo {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            module_package_name: None,
            version: version.into(),
        }
    }

    pub fn with_module_package(mut self, package: impl Into<String>) -> Self {
        self.module_package_name = Some(package.into());
        self
    }

    /// The module package name, ignoring blank values.
    pub fn module_package(&self) -> Option<&str> {
        self.module_package_name
            .as_deref()
            .map(str::trim)
            .filter(|package| !package.is_empty())
    }
}

/// Everything a [`crate::DataChannel`] is constructed from.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelSettings {
    pub channel: ChannelConfig,
    pub build: BuildInfo,
}

impl ChannelSettings {
    pub fn new(build: BuildInfo) -> Self {
        Self {
            channel: ChannelConfig::default(),
            build,
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.channel.enabled = enabled;
        self
    }
}
