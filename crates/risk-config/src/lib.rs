//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, EvaluationSettings, LoggingConfig, ProfileSettings};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Environment variable prefix, e.g. `RISKCTL__EVALUATION__PARALLEL=true`.
pub const ENV_PREFIX: &str = "RISKCTL";

/// Load configuration from an optional TOML file and the environment.
///
/// Built-in defaults apply to anything neither source sets; the environment
/// wins over the file.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.evaluation.cache_market_data);
        assert_eq!(config.evaluation.page_size, 500);
        assert_eq!(config.default_profile.max_position_size, dec!(1000));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = toml_file(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [evaluation]
            timeout_secs = 30

            [default_profile]
            max_position_size = 2500
            max_drawdown = 0.15
            "#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.evaluation.timeout_secs, Some(30));
        assert_eq!(config.default_profile.max_position_size, dec!(2500));
        assert_eq!(config.default_profile.max_drawdown, dec!(0.15));
        assert_eq!(config.default_profile.min_liquidity, dec!(10000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = toml_file(
            r#"
            [evaluation]
            page_size = 100
            parallel = false
            "#,
        );

        std::env::set_var("RISKCTL__EVALUATION__PARALLEL", "true");
        let config = load_config(Some(file.path()));
        std::env::remove_var("RISKCTL__EVALUATION__PARALLEL");

        let config = config.unwrap();
        assert!(config.evaluation.parallel);
        assert_eq!(config.evaluation.page_size, 100);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/riskctl.toml"))).is_err());
    }
}
