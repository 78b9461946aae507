use crate::actions::DEFAULT_PAGE_SIZE;
use crate::error::BotError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Telegram caps an inline answer at 50 results.
const MAX_PAGE_SIZE: u32 = 50;

#[derive(Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram_bot_token: String,
    /// Host of the quotes API, without scheme.
    #[serde(default)]
    pub api_host: String,
    /// Service-wide key for the internal user endpoints.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Repository link shown in the `/start` message.
    #[serde(default)]
    pub source_url: Option<String>,
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"<redacted>")
            .field("api_host", &self.api_host)
            .field("api_key", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("source_url", &self.source_url)
            .finish()
    }
}

impl Config {
    /// Loads the config file (explicit path or the default location) and
    /// applies `BOT_TOKEN`, `API_HOST` and `API_KEY` from the environment.
    ///
    /// A missing default file is fine as long as the environment fills in
    /// every required value. A missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    fn load_with(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => {
                let default_path = config_file_path()?;
                if default_path.exists() {
                    Self::read_file(&default_path)?
                } else {
                    tracing::debug!(
                        "No config file at {}, using environment only",
                        default_path.display()
                    );
                    Self {
                        page_size: DEFAULT_PAGE_SIZE,
                        ..Self::default()
                    }
                }
            }
        };
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    fn read_file(config_path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            BotError::ConfigInvalid(format!(
                "Cannot read config at {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| {
            BotError::ConfigInvalid(format!("Invalid TOML in {}: {}", config_path.display(), e))
        })?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(token) = non_empty("BOT_TOKEN") {
            self.telegram_bot_token = token;
        }
        if let Some(host) = non_empty("API_HOST") {
            self.api_host = host;
        }
        if let Some(key) = non_empty("API_KEY") {
            self.api_key = key;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.telegram_bot_token.is_empty() {
            anyhow::bail!("telegram_bot_token must not be empty");
        }
        if self.api_host.is_empty() {
            anyhow::bail!("api_host must not be empty");
        }
        if self.api_host.contains("://") {
            anyhow::bail!("api_host must be a bare host, without scheme");
        }
        if self.api_key.is_empty() {
            anyhow::bail!("api_key must not be empty");
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            anyhow::bail!("page_size must be between 1 and {MAX_PAGE_SIZE}");
        }
        Ok(())
    }
}

fn config_file_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BotError::ConfigInvalid("Cannot determine home directory".to_string()))?;
    Ok(home.join(".config").join("quotes-bot").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_file(path: &Path) -> anyhow::Result<Config> {
        Config::load_with(Some(path), |_| None)
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_valid_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = "123:ABC"
            api_host = "quotes.example.com"
            api_key = "svc-key"
            page_size = 20
            "#,
        );
        let config = load_file(&path).unwrap();
        assert_eq!(config.telegram_bot_token, "123:ABC");
        assert_eq!(config.api_host, "quotes.example.com");
        assert_eq!(config.api_key, "svc-key");
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn default_page_size_is_10() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = "tok"
            api_host = "quotes.example.com"
            api_key = "key"
            "#,
        );
        let config = load_file(&path).unwrap();
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn empty_token_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = ""
            api_host = "quotes.example.com"
            api_key = "key"
            "#,
        );
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn missing_api_key_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = "tok"
            api_host = "quotes.example.com"
            "#,
        );
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn host_with_scheme_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = "tok"
            api_host = "https://quotes.example.com"
            api_key = "key"
            "#,
        );
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("without scheme"));
    }

    #[test]
    fn page_size_bounds() {
        let tmp = tempfile::tempdir().unwrap();
        for (page_size, ok) in [(0, false), (1, true), (50, true), (51, false)] {
            let path = write_config(
                tmp.path(),
                &format!(
                    r#"
                    telegram_bot_token = "tok"
                    api_host = "quotes.example.com"
                    api_key = "key"
                    page_size = {page_size}
                    "#
                ),
            );
            assert_eq!(load_file(&path).is_ok(), ok, "page_size {page_size}");
        }
    }

    #[test]
    fn invalid_toml_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(tmp.path(), "telegram_bot_token = ");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn missing_explicit_file_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_file(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Cannot read config"));
    }

    #[test]
    fn environment_overrides_file_values() {
        let env = HashMap::from([
            ("BOT_TOKEN", "env-token".to_string()),
            ("API_KEY", "env-key".to_string()),
            ("API_HOST", String::new()),
        ]);
        let mut config = Config {
            telegram_bot_token: "file-token".to_string(),
            api_host: "file.example.com".to_string(),
            api_key: "file-key".to_string(),
            page_size: 10,
            source_url: None,
        };
        config.apply_overrides(|key| env.get(key).cloned());
        assert_eq!(config.telegram_bot_token, "env-token");
        assert_eq!(config.api_key, "env-key");
        // Empty variables do not clobber file values.
        assert_eq!(config.api_host, "file.example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_applies_environment_over_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = "file-token"
            api_host = "quotes.example.com"
            source_url = "https://git.example.com/quotes-bot"
            "#,
        );
        let env = HashMap::from([("API_KEY", "env-key".to_string())]);
        let config = Config::load_with(Some(&path), |key| env.get(key).cloned()).unwrap();
        assert_eq!(config.telegram_bot_token, "file-token");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(
            config.source_url.as_deref(),
            Some("https://git.example.com/quotes-bot")
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = Config {
            telegram_bot_token: "123:SECRET".to_string(),
            api_host: "quotes.example.com".to_string(),
            api_key: "svc-secret".to_string(),
            page_size: 10,
            source_url: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("SECRET"));
        assert!(!debug.contains("svc-secret"));
        assert!(debug.contains("quotes.example.com"));
    }
}
