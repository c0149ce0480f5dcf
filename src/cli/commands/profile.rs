//! Print default profile command.

use anyhow::Result;
use risk_config::AppConfig;

use crate::cli::{ProfileArgs, ProfileFormat};

pub async fn run(args: ProfileArgs, config: &AppConfig) -> Result<()> {
    let profile = config.default_profile.to_profile(&args.user);
    profile.validate()?;

    match args.format {
        ProfileFormat::Toml => println!("{}", toml::to_string_pretty(&profile)?),
        ProfileFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
    }

    Ok(())
}
