use serde::Deserialize;
use sqlc_common::Result;

/// The settings file looked up in the working directory when no file is
/// given, without extension.
const DEFAULT_FILE: &str = "sqlc";

/// CLI settings. Loaded from built-in defaults, then an optional TOML file,
/// then SQLC_* environment variables (e.g. SQLC_DIALECT), each overriding the
/// previous. Command line flags override all of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// The SQL dialect to compile with.
    pub dialect: String,
    /// The log level: off, error, warn, info, debug or trace.
    pub log_level: String,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Settings {
    /// Loads the settings. An explicitly given file must exist.
    pub fn load(file: Option<&str>) -> Result<Self> {
        let source = match file {
            Some(file) => config::File::with_name(file),
            None => config::File::with_name(DEFAULT_FILE).required(false),
        };
        Ok(config::Config::builder()
            .set_default("dialect", "mysql")?
            .set_default("log_level", "warn")?
            .set_default("pretty", false)?
            .add_source(source)
            .add_source(config::Environment::with_prefix("SQLC").try_parsing(true))
            .build()?
            .try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlc_common::Error;

    fn write_file(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn file_overrides_defaults() {
        let path = write_file("sqlc_settings_test.toml", "log_level = \"debug\"\npretty = true\n");
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert!(settings.pretty);
        assert_eq!(settings.dialect, "mysql");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Settings::load(Some("/nonexistent/sqlc.toml")).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = write_file("sqlc_settings_malformed.toml", "pretty = \"sometimes\"\n");
        assert!(matches!(Settings::load(Some(&path)), Err(Error::InvalidConfig(_))));
    }
}
