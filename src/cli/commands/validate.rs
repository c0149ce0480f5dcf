//! Validate configuration command.

use anyhow::Result;
use risk_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>, config: &AppConfig) -> Result<()> {
    match config_path {
        Some(path) => println!("Validating configuration: {:?}", path),
        None => println!("Validating built-in configuration"),
    }

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Parallel evaluation: {}", config.evaluation.parallel);
    println!("Max position size: {}", config.default_profile.max_position_size);
    println!("Max total exposure: {}", config.default_profile.max_total_exposure);
    println!();
    println!("{}", config.to_toml()?);

    Ok(())
}
