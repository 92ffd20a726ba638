//! Configuration file support for stylecomb
//!
//! Loads `.stylecomb.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use stylecomb_rules::RuleSettings;

pub const CONFIG_FILE: &str = ".stylecomb.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rule name to value; rules set to `false` are disabled
    pub rules: RuleSettings,
    pub paths: PathsConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
}

impl Config {
    /// Load config from `.stylecomb.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Ok(Some((Self::load_path(&config_path)?, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Compute the settings to run with
    ///
    /// Rules named on the command line replace the configured ones. Without
    /// either, every rule is enabled.
    pub fn effective_settings(&self, all_rules: &[&str], cli_rules: &[String]) -> RuleSettings {
        if !cli_rules.is_empty() {
            return RuleSettings::enabled(cli_rules.iter().cloned());
        }
        if !self.rules.is_empty() {
            return self.rules.clone();
        }
        RuleSettings::enabled(all_rules.iter().copied())
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // Directory patterns match any path component
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use stylecomb_rules::ConfigValue;
    use tempfile::TempDir;

    const ALL: &[&str] = &["align-colons", "inline-single-declarations", "vendor-prefix-align"];

    fn create_config(dir: &Path, content: &str) {
        fs::write(dir.join(CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn test_load_basic_config() {
        let temp = TempDir::new().unwrap();
        create_config(
            temp.path(),
            r#"
[rules]
vendor-prefix-align = true
align-colons = false

[paths]
exclude = ["vendor/", "*.min.css"]
"#,
        );

        let (config, path) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert_eq!(path, temp.path().join(CONFIG_FILE));
        assert_eq!(config.rules.get("vendor-prefix-align"), Some(&ConfigValue::Bool(true)));
        assert_eq!(config.rules.get("align-colons"), Some(&ConfigValue::Bool(false)));
        assert_eq!(
            config.paths.exclude,
            vec!["vendor/".to_string(), "*.min.css".to_string()]
        );
    }

    #[test]
    fn test_load_from_parent_directory() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[rules]\nalign-colons = true\n");
        let nested = temp.path().join("styles").join("theme");
        fs::create_dir_all(&nested).unwrap();

        let (config, path) = Config::load_from(nested).unwrap().unwrap();
        assert_eq!(path, temp.path().join(CONFIG_FILE));
        assert_eq!(config.rules.len(), 1);
    }

    #[test]
    fn test_load_empty_config() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "");

        let (config, _) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert!(config.rules.is_empty());
        assert!(config.paths.exclude.is_empty());
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[rules\n");

        let err = Config::load_from(temp.path().to_path_buf()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_no_config_found() {
        let temp = TempDir::new().unwrap();
        let result = Config::load_from(temp.path().to_path_buf()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_effective_settings_cli_override() {
        let mut config = Config::default();
        config.rules.set("vendor-prefix-align", true);
        let cli_rules = vec!["align-colons".to_string()];

        let effective = config.effective_settings(ALL, &cli_rules);

        assert_eq!(effective.len(), 1);
        assert_eq!(effective.get("align-colons"), Some(&ConfigValue::Bool(true)));
    }

    #[test]
    fn test_effective_settings_from_config() {
        let mut config = Config::default();
        config.rules.set("align-colons", false);

        let effective = config.effective_settings(ALL, &[]);
        assert_eq!(effective, config.rules);
    }

    #[test]
    fn test_effective_settings_default_to_all() {
        let effective = Config::default().effective_settings(ALL, &[]);
        assert_eq!(effective.len(), 3);
        assert!(effective.iter().all(|(_, v)| *v == ConfigValue::Bool(true)));
    }

    #[test]
    fn test_should_exclude_glob() {
        let config = Config {
            paths: PathsConfig {
                exclude: vec!["*.min.css".to_string()],
            },
            ..Default::default()
        };

        assert!(config.should_exclude(Path::new("dist/app.min.css")));
        assert!(!config.should_exclude(Path::new("app.css")));
    }

    #[test]
    fn test_should_exclude_directory() {
        let config = Config {
            paths: PathsConfig {
                exclude: vec!["vendor/".to_string()],
            },
            ..Default::default()
        };

        assert!(config.should_exclude(Path::new("project/vendor/reset.css")));
        assert!(config.should_exclude(Path::new("vendor/lib/grid.scss")));
        assert!(!config.should_exclude(Path::new("src/vendor.css")));
    }
}
