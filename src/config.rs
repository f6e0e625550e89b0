//! Configuration management for ikuai-ipgroup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::IpGroupError;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "ikuai-ipgroup.yaml";

/// Characters that would break the router's `key=value` line format
const FORBIDDEN_FIELD_CHARS: &[char] = &[',', '='];

/// Largest accepted `date_offset_days`, in either direction
const MAX_DATE_OFFSET_DAYS: i64 = 366;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// IPv4 CIDR list to download (one CIDR per line)
    pub source_url: String,

    /// Timeout for the single download attempt
    pub fetch_timeout_secs: u64,

    /// Directory where both artifacts are written
    pub output_dir: PathBuf,

    /// File name prefix of the address-group file
    pub group_file_prefix: String,

    /// File name prefix of the ACL rule file
    pub acl_file_prefix: String,

    /// Group names are `<group_name_prefix>-<n>`, referenced by ACL rules
    pub group_name_prefix: String,

    /// Id of the first group, kept clear of the router's built-in entries
    pub base_id: u32,

    /// Maximum CIDRs per address group
    pub group_capacity: usize,

    /// Id of the generated ACL rule
    pub acl_id: u32,

    /// Comment field of the generated ACL rule
    pub acl_comment: String,

    /// Days added to the current UTC date for the file name stamp
    pub date_offset_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: "https://cdn.jsdelivr.net/gh/Loyalsoldier/geoip@release/text/cn.txt"
                .to_string(),
            fetch_timeout_secs: 10,
            output_dir: PathBuf::from("."),
            group_file_prefix: "domestic_ikuai_ipgroup".to_string(),
            acl_file_prefix: "domestic_ikuai_acl".to_string(),
            group_name_prefix: "国内IP".to_string(),
            base_id: 60,
            group_capacity: 1000,
            acl_id: 60,
            acl_comment: "允许国内IP访问".to_string(),
            date_offset_days: 1,
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when `path` is the
    /// default location and nothing is there.
    ///
    /// An explicitly chosen path that does not exist is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), IpGroupError> {
        if !self.source_url.starts_with("https://") {
            return Err(IpGroupError::Config(format!(
                "source_url must use HTTPS: {}",
                self.source_url
            )));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(IpGroupError::Config(
                "fetch_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.group_capacity == 0 {
            return Err(IpGroupError::Config(
                "group_capacity must be greater than 0".to_string(),
            ));
        }

        if !(-MAX_DATE_OFFSET_DAYS..=MAX_DATE_OFFSET_DAYS).contains(&self.date_offset_days) {
            return Err(IpGroupError::Config(format!(
                "date_offset_days must be within -{0}..={0}: {1}",
                MAX_DATE_OFFSET_DAYS, self.date_offset_days
            )));
        }

        for (key, value) in [
            ("group_file_prefix", &self.group_file_prefix),
            ("acl_file_prefix", &self.acl_file_prefix),
        ] {
            validate_field(key, value)?;
            if value.contains(|c: char| c == '/' || c == '\\') {
                return Err(IpGroupError::Config(format!(
                    "{} must be a file name, not a path: {}",
                    key, value
                )));
            }
        }
        validate_field("group_name_prefix", &self.group_name_prefix)?;
        validate_field("acl_comment", &self.acl_comment)?;

        Ok(())
    }

    /// Generate default config with comments
    pub fn generate_default_yaml() -> String {
        include_str!("../templates/config.yaml").to_string()
    }
}

/// A value embedded in a `key=value` record must be non-empty and contain no
/// whitespace or record separators.
fn validate_field(key: &str, value: &str) -> Result<(), IpGroupError> {
    if value.is_empty() {
        return Err(IpGroupError::Config(format!("{} cannot be empty", key)));
    }
    if value.chars().any(char::is_whitespace) || value.contains(FORBIDDEN_FIELD_CHARS) {
        return Err(IpGroupError::Config(format!(
            "{} cannot contain whitespace, ',' or '=': {:?}",
            key, value
        )));
    }
    Ok(())
}
