use crate::error::{GitBumpError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "gitbump.toml";

/// Represents the complete configuration for git-bump.
///
/// Every section is optional; missing sections and keys fall back to defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub outputs: OutputsConfig,
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_true() -> bool {
    true
}

/// Where development happens and which remote releases go to.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Branch tracking the highest major under development
    #[serde(default = "default_main_branch")]
    pub main_branch: String,

    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            main_branch: default_main_branch(),
            remote: default_remote(),
        }
    }
}

/// Remote interaction around the release step
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Push created refs to the remote after a release
    #[serde(default)]
    pub push: bool,

    /// Fetch branches and tags before computing a bump
    #[serde(default)]
    pub fetch: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputsConfig {
    /// Append outputs to `$GITHUB_OUTPUT` when the variable is set
    #[serde(default = "default_true")]
    pub github_output: bool,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        OutputsConfig {
            github_output: true,
        }
    }
}

impl Config {
    /// Parse a configuration document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| GitBumpError::config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.repository.main_branch.trim().is_empty() {
            return Err(GitBumpError::config("repository.main_branch must not be empty"));
        }
        if self.repository.main_branch.starts_with("release/") {
            return Err(GitBumpError::config(format!(
                "repository.main_branch '{}' collides with release branch naming",
                self.repository.main_branch
            )));
        }
        if self.repository.remote.trim().is_empty() {
            return Err(GitBumpError::config("repository.remote must not be empty"));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitbump.toml` in current directory
/// 3. `.gitbump.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| GitBumpError::config(format!("Cannot read '{}': {}", path, e)))?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    Config::from_toml(&config_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.repository.main_branch, "main");
        assert_eq!(config.repository.remote, "origin");
        assert!(!config.release.push);
        assert!(!config.release.fetch);
        assert!(config.outputs.github_output);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = Config::from_toml("[release]\npush = true\n").unwrap();
        assert!(config.release.push);
        assert_eq!(config.repository.main_branch, "main");
        assert!(config.outputs.github_output);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::from_toml("[repository]\nmain = \"trunk\"\n").is_err());
        assert!(Config::from_toml("[hooks]\n").is_err());
    }

    #[test]
    fn test_validation() {
        assert!(Config::from_toml("[repository]\nmain_branch = \"\"\n").is_err());
        assert!(Config::from_toml("[repository]\nmain_branch = \"release/v1\"\n").is_err());
        assert!(Config::from_toml("[repository]\nremote = \" \"\n").is_err());
    }
}
