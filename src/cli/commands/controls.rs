//! List controls command.

use anyhow::Result;
use risk_controls::{RiskEvaluator, RiskPorts};
use risk_data::{InMemoryAccounts, InMemoryMarketData};
use std::sync::Arc;

pub async fn run() -> Result<()> {
    let accounts = Arc::new(InMemoryAccounts::new());
    let ports = RiskPorts::new(
        Arc::new(InMemoryMarketData::new()),
        accounts.clone(),
        accounts.clone(),
        accounts,
    );
    let evaluator = RiskEvaluator::new(&ports);

    println!("Risk Controls");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for (i, control) in evaluator.controls().iter().enumerate() {
        println!("  {}. {:<20} {}", i + 1, control.name(), control.risk_type());
    }

    println!();
    println!("Controls run in the order listed; the first failure aborts the evaluation.");

    Ok(())
}
