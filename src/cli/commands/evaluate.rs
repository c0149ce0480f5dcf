//! Evaluate command implementation.

use anyhow::{Context, Result};
use risk_config::AppConfig;
use risk_controls::{EvaluationMode, RiskPorts, RiskService, ServiceSettings};
use risk_data::load_snapshot;
use risk_monitor::AssessmentReport;
use tracing::info;

use crate::cli::{EvaluateArgs, OutputFormat};

pub async fn run(args: EvaluateArgs, config: &AppConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    info!("Evaluating risk for user: {}", args.user);

    let (market, accounts) = load_snapshot(&args.snapshot, args.candles.as_deref())
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;

    let ports = RiskPorts::new(market, accounts.clone(), accounts.clone(), accounts.clone());
    let mode = if args.parallel || config.evaluation.parallel {
        EvaluationMode::Parallel
    } else {
        EvaluationMode::Sequential
    };
    let settings = ServiceSettings {
        mode,
        cache_market_data: config.evaluation.cache_market_data,
        timeout: config.evaluation.timeout(),
        page_size: config.evaluation.page_size,
    };
    let service = RiskService::new(ports, accounts.clone(), accounts)
        .with_settings(settings)
        .with_default_profile(config.default_profile.to_profile(&args.user));

    let profile = service.get_user_risk_profile(&args.user).await?;
    let assessments = service
        .evaluate_user(&args.user)
        .await
        .context("Risk evaluation failed")?;
    let metrics = service.calculate_risk_metrics(&args.user).await?;

    let report = AssessmentReport::new(profile, assessments).with_metrics(metrics);

    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, report.to_json()?)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Report saved to {:?}", save_path);
    }

    Ok(())
}
