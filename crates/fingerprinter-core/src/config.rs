use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Glob patterns matched against release-relative paths; matches are not ingested.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Directory holding one extracted release tree per version, named by version number.
    #[serde(default = "default_release_root")]
    pub release_root: String,
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Unset means ask the operator after a unique-fingerprint hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_on_unique_match: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            ignore_patterns: Vec::new(),
            release_root: default_release_root(),
            staging_dir: default_staging_dir(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
            stop_on_unique_match: None,
        }
    }
}

fn default_database_path() -> String {
    "fingerprinter.db".to_string()
}

fn default_release_root() -> String {
    "releases".to_string()
}

fn default_staging_dir() -> String {
    "staging".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("fingerprinter/{}", env!("CARGO_PKG_VERSION"))
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("FINGERPRINTER")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = Config::builder()
            .set_override("release_root", "/srv/releases")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>()
            .unwrap();

        assert_eq!(config.release_root, "/srv/releases");
        assert_eq!(config.database_path, "fingerprinter.db");
        assert_eq!(config.fetch_timeout_secs, 30);
        assert!(config.ignore_patterns.is_empty());
        assert_eq!(config.stop_on_unique_match, None);
    }
}
