use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// Имя необязательного файла конфигурации в рабочем каталоге.
pub const CONFIG_FILE: &str = "zepartners";
/// Префикс переменных окружения, например `ZEPARTNERS__LOGGING__LEVEL`.
pub const ENV_PREFIX: &str = "ZEPARTNERS";

/// Настройки сервиса.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub listen_address: String,
    pub snapshot_path: PathBuf,
    pub max_connections: usize,
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1:8080".to_string(),
            snapshot_path: PathBuf::from("partners.json"),
            max_connections: 100,
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Defaults, then `zepartners.toml` if present, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name(CONFIG_FILE).required(false))
    }

    /// Same as [`Settings::load`] but with an explicit config file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(File::from(path.as_ref()).required(true))
    }

    fn build<T>(file: T) -> Result<Self, ConfigError>
    where
        T: config::Source + Send + Sync + 'static,
    {
        let cfg = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::Message(
                "max_connections must be greater than zero".into(),
            ));
        }
        self.logging
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::logging::LogFormat;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.listen_address, "127.0.0.1:8080");
        assert_eq!(s.snapshot_path, PathBuf::from("partners.json"));
        assert_eq!(s.max_connections, 100);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = toml_file(
            r#"
            snapshot_path = "/var/lib/zepartners/partners.json"

            [logging]
            level = "debug"

            [logging.console]
            format = "json"
            "#,
        );

        let s = Settings::load_from(file.path()).unwrap();
        assert_eq!(
            s.snapshot_path,
            PathBuf::from("/var/lib/zepartners/partners.json")
        );
        assert_eq!(s.listen_address, "127.0.0.1:8080");
        assert_eq!(s.logging.level, "debug");
        assert_eq!(s.logging.console.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = toml_file("max_connections = 0\n");
        assert!(Settings::load_from(file.path()).is_err());

        let file = toml_file("[logging]\nlevel = \"chatty\"\n");
        assert!(Settings::load_from(file.path()).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(Settings::load_from("/definitely/not/here.toml").is_err());
    }
}
