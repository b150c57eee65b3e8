use crate::models::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".overdue.toml";

/// Load configuration from file or use defaults
pub fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let source = config_source(custom_path)?;
    load_config_at(source.as_deref())
}

/// Locate the configuration file to use, `None` meaning built-in defaults
///
/// Search order:
/// 1. Custom path if provided via --config
/// 2. .overdue.toml in the current directory, then in each parent up to the root
/// 3. ~/.overdue.toml in home directory
pub fn config_source(custom_path: Option<&Path>) -> Result<Option<PathBuf>> {
    // If custom path provided, use it exclusively
    if let Some(path) = custom_path {
        return Ok(Some(path.to_path_buf()));
    }

    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    if let Some(path) = find_config_upwards(&cwd) {
        return Ok(Some(path));
    }

    Ok(get_home_config_path().filter(|path| path.is_file()))
}

/// Load the given config file, or the defaults when there is none
pub fn load_config_at(source: Option<&Path>) -> Result<Config> {
    match source {
        Some(path) => load_config_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Closest config file in `start` or one of its ancestors
pub fn find_config_upwards(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Load config from a specific file
fn load_config_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Get path to home directory config file
fn get_home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

/// Save a config to a file
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let toml_string = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_custom_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
comment_prefixes = ["@", "%"]
tags = ["fixit", "later"]
expiry_pattern = "{tag}(?:->{date})?:"
date_layout = "02/01/2006"
case_sensitive = false
strict = true
"#;
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = load_config(Some(temp_file.path())).unwrap();
        assert_eq!(config.comment_prefixes, vec!["@", "%"]);
        assert_eq!(config.tags, vec!["fixit", "later"]);
        assert_eq!(config.expiry_pattern, "{tag}(?:->{date})?:");
        assert_eq!(config.date_layout, "02/01/2006");
        assert!(!config.case_sensitive);
        assert!(config.strict);
        // Unset keys keep their defaults
        assert!(config.recursive);
        assert!(config.respect_gitignore);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"tags = \"TODO\"").unwrap();

        assert!(load_config(Some(temp_file.path())).is_err());
    }

    #[test]
    fn test_config_source_prefers_custom_path() {
        let temp_file = NamedTempFile::new().unwrap();
        let source = config_source(Some(temp_file.path())).unwrap();
        assert_eq!(source.as_deref(), Some(temp_file.path()));
    }

    #[test]
    fn test_load_config_at_without_source() {
        let config = load_config_at(None).unwrap();
        assert_eq!(config.tags, Config::default().tags);
    }

    #[test]
    fn test_find_config_upwards() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "strict = true\n").unwrap();

        assert_eq!(find_config_upwards(&nested), Some(config_path));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = Config::default();

        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config_from_file(temp_file.path()).unwrap();

        assert_eq!(config.tags, loaded.tags);
        assert_eq!(config.expiry_pattern, loaded.expiry_pattern);
        assert_eq!(config.files, loaded.files);
    }
}
