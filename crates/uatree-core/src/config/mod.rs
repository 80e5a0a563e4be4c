//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::browser::BrowseOptions;
use crate::node::NodeRef;

/// Public demo server used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "opc.tcp://milo.digitalpetri.com:62541/milo";

/// uatree configuration
///
/// Missing sections and keys fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub browse: BrowseConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub server_url: String,
    pub application_name: String,
    pub application_uri: String,
    pub session_retry_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Unlimited when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    pub verbose: bool,
    pub root: NodeRef,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            verbose: false,
            root: NodeRef::root_folder(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            application_name: "uatree address space browser".to_string(),
            application_uri: "urn:uatree:client".to_string(),
            session_retry_limit: 3,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_server_url(&self.server_url)
    }
}

impl BrowseConfig {
    /// Browse options with CLI overrides applied on top of the configured values
    pub fn options(&self, max_depth: Option<usize>, verbose: bool) -> BrowseOptions {
        BrowseOptions::default()
            .with_max_depth(max_depth.or(self.max_depth).unwrap_or(usize::MAX))
            .with_verbose(verbose || self.verbose)
    }
}

fn validate_server_url(url: &str) -> anyhow::Result<()> {
    if !url.starts_with("opc.tcp://") || url.len() <= "opc.tcp://".len() {
        return Err(anyhow!(
            "Invalid server URL: {}. Expected opc.tcp://<host>:<port>[/path]",
            url
        ));
    }
    Ok(())
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("UATREE_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("uatree")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            // Return default config without creating file
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.session.validate()?;
        if self.browse.max_depth == Some(0) {
            return Err(anyhow!("browse.max_depth must be at least 1"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            // Session settings
            "session.server_url" => Ok(self.session.server_url.clone()),
            "session.application_name" => Ok(self.session.application_name.clone()),
            "session.application_uri" => Ok(self.session.application_uri.clone()),
            "session.session_retry_limit" => Ok(self.session.session_retry_limit.to_string()),

            // Browse settings
            "browse.max_depth" => Ok(self
                .browse
                .max_depth
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string())),
            "browse.verbose" => Ok(self.browse.verbose.to_string()),
            "browse.root" => Ok(self.browse.root.to_string()),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `uatree config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            // Session settings
            "session.server_url" => {
                validate_server_url(value)?;
                self.session.server_url = value.to_string();
            }
            "session.application_name" => {
                self.session.application_name = value.to_string();
            }
            "session.application_uri" => {
                self.session.application_uri = value.to_string();
            }
            "session.session_retry_limit" => {
                self.session.session_retry_limit = value
                    .parse()
                    .with_context(|| format!("Invalid session_retry_limit value: {}", value))?;
            }

            // Browse settings
            "browse.max_depth" => {
                self.browse.max_depth = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    let depth: usize = value
                        .parse()
                        .with_context(|| format!("Invalid max_depth value: {}", value))?;
                    if depth == 0 {
                        return Err(anyhow!("max_depth must be at least 1, or `none` for unlimited"));
                    }
                    Some(depth)
                };
            }
            "browse.verbose" => {
                self.browse.verbose = value
                    .parse()
                    .with_context(|| format!("Invalid verbose value: {} (expected true or false)", value))?;
            }
            "browse.root" => {
                self.browse.root = value.parse()?;
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `uatree config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "session.server_url",
            "session.application_name",
            "session.application_uri",
            "session.session_retry_limit",
            "browse.max_depth",
            "browse.verbose",
            "browse.root",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.get("session.server_url").unwrap(), DEFAULT_SERVER_URL);
        assert_eq!(config.get("browse.root").unwrap(), "i=84");
        assert_eq!(config.get("browse.max_depth").unwrap(), "none");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("session.server_url", "opc.tcp://localhost:4840").unwrap();
        config.set("browse.max_depth", "3").unwrap();
        config.set("browse.root", "2,Demo").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.browse.root, NodeRef::string(2, "Demo"));
        assert_eq!(loaded.browse.max_depth, Some(3));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[browse]\nmax_depth = 2\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.browse.max_depth, Some(2));
        assert_eq!(config.browse.root, NodeRef::root_folder());
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[session]\nserver_url = \"http://x\"\napplication_name = \"a\"\n\
             application_uri = \"u\"\nsession_retry_limit = 1\n\n[browse]\nroot = \"i=84\"\n",
        )
        .unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_set_validation() {
        let mut config = Config::default();
        assert!(config.set("session.server_url", "http://example.com").is_err());
        assert!(config.set("browse.max_depth", "0").is_err());
        assert!(config.set("browse.max_depth", "deep").is_err());
        assert!(config.set("browse.verbose", "maybe").is_err());
        assert!(config.set("browse.root", "not a node").is_err());
        assert!(config.set("no.such.key", "1").is_err());
        assert_eq!(config, Config::default());

        config.set("browse.max_depth", "5").unwrap();
        config.set("browse.max_depth", "none").unwrap();
        assert_eq!(config.browse.max_depth, None);
    }

    #[test]
    fn test_list_covers_every_key() {
        let config = Config::default();
        let listed = config.list().unwrap();
        assert_eq!(listed.len(), 7);
        for (key, value) in listed {
            assert_eq!(config.get(&key).unwrap(), value);
        }
    }

    #[test]
    fn test_browse_options_overrides() {
        let mut config = Config::default();
        let options = config.browse.options(None, false);
        assert_eq!(options.max_depth, usize::MAX);
        assert!(!options.verbose);

        config.browse.max_depth = Some(4);
        config.browse.verbose = true;
        assert_eq!(config.browse.options(None, false).max_depth, 4);
        assert_eq!(config.browse.options(Some(2), false).max_depth, 2);
        assert!(config.browse.options(Some(2), false).verbose);
    }
}
