use std::fmt;
use std::fs;
use std::path::Path;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the configuration or reading a target version.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read the config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid target version `{0}`, expected major.minor")]
    InvalidTargetVersion(String),
    #[error("Archive extension must not be empty")]
    EmptyArchiveExtension,
    #[error("Failed to build filename pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Operator settings shared by every directory operation.
///
/// Every field has a default, so a config file only needs to name what it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Suffix a directory entry must end with to be treated as a mod archive.
    pub archive_extension: String,
    /// Loader-platform tokens stripped from filenames, matched case-insensitively.
    pub loader_tokens: Vec<String>,
    /// Platform versions recognised by the stale-version purge.
    ///
    /// A trailing `.x` stands for a single patch digit `1`-`9`, e.g. `1.20.x`.
    pub historical_versions: Vec<String>,
    /// File name of the update-diff report, written inside the main directory.
    pub update_report: String,
    /// File name of the client/server report, written inside the client directory.
    pub side_report: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_extension: ".jar".to_string(),
            loader_tokens: vec!["neo".to_string(), "neoforge".to_string(), "fabric".to_string()],
            historical_versions: ["1.7.10", "1.12.x", "1.16.x", "1.19.x", "1.20.x", "1.21.x"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
            update_report: "processed_mods.txt".to_string(),
            side_report: "client_and_serverside_mods.txt".to_string(),
        }
    }
}

impl Config {
    /// Loads a JSON config file, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or sets an
    /// empty archive extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;

        if config.archive_extension.is_empty() {
            return Err(ConfigError::EmptyArchiveExtension);
        }

        Ok(config)
    }
}

/// The platform (game) version a batch of mods is expected to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetVersion {
    pub major: u32,
    pub minor: u32,
    /// Only set for releases that are selected by their full triple, such as `1.7.10`.
    pub patch: Option<u32>,
}

impl TargetVersion {
    /// Parses `major.minor` or `major.minor.patch`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidTargetVersion(raw.to_string());
        let mut parts = raw.trim().split('.');

        let mut next_number = || -> Result<Option<u32>, ConfigError> {
            match parts.next() {
                Some(p) => p.parse().map(Some).map_err(|_| invalid()),
                None => Ok(None),
            }
        };

        let major = next_number()?.ok_or_else(invalid)?;
        let minor = next_number()?.ok_or_else(invalid)?;
        let patch = next_number()?;

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self { major, minor, patch })
    }

    /// The previous minor release, e.g. `1.20` for `1.21`. `None` when the minor is 0.
    pub fn previous(&self) -> Option<String> {
        self.minor
            .checked_sub(1)
            .map(|minor| format!("{}.{}", self.major, minor))
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}
