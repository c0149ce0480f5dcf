//! Risk assessment report rendering.

use chrono::{DateTime, Utc};
use risk_core::{RiskAssessment, RiskLevel, RiskMetrics, RiskProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Findings of one evaluation, with the profile they were measured against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    pub profile: RiskProfile,
    pub assessments: Vec<RiskAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RiskMetrics>,
}

impl AssessmentReport {
    pub fn new(profile: RiskProfile, assessments: Vec<RiskAssessment>) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            generated_at: Utc::now(),
            profile,
            assessments,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: RiskMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Number of findings per level, least severe first.
    pub fn count_by_level(&self) -> BTreeMap<RiskLevel, usize> {
        let mut counts = BTreeMap::new();
        for assessment in &self.assessments {
            *counts.entry(assessment.level).or_insert(0) += 1;
        }
        counts
    }

    /// Most severe level found, if any.
    pub fn highest_level(&self) -> Option<RiskLevel> {
        self.assessments.iter().map(|a| a.level).max()
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                   RISK ASSESSMENT REPORT                   \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  User:                {}\n", self.user_id));
        s.push_str(&format!(
            "  Generated:           {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        s.push('\n');

        s.push_str("PROFILE\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!(
            "  Max Position Size:   ${:.2}\n",
            self.profile.max_position_size
        ));
        s.push_str(&format!(
            "  Max Total Exposure:  ${:.2}\n",
            self.profile.max_total_exposure
        ));
        s.push_str(&format!(
            "  Max Drawdown:        {}\n",
            self.profile.max_drawdown
        ));
        s.push_str(&format!(
            "  Max Concentration:   {}\n",
            self.profile.max_concentration
        ));
        s.push_str(&format!(
            "  Min Liquidity:       ${:.2}\n",
            self.profile.min_liquidity
        ));
        s.push_str(&format!(
            "  Volatility Limit:    {}\n",
            self.profile.volatility_threshold
        ));
        s.push('\n');

        if let Some(metrics) = &self.metrics {
            s.push_str("METRICS\n");
            s.push_str("───────────────────────────────────────────────────────────\n");
            s.push_str(&format!(
                "  Total Exposure:      ${:.2}\n",
                metrics.total_exposure
            ));
            s.push_str(&format!(
                "  Top Concentration:   {:.2}%\n",
                metrics.highest_concentration * rust_decimal::Decimal::ONE_HUNDRED
            ));
            s.push_str(&format!(
                "  Open Positions:      {}\n",
                metrics.open_positions
            ));
            s.push_str(&format!("  Active Risks:        {}\n", metrics.active_risks));
            s.push_str(&format!("  High/Critical:       {}\n", metrics.high_risk_count));
            s.push('\n');
        }

        s.push_str("FINDINGS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        if self.assessments.is_empty() {
            s.push_str("  No risks detected\n");
        } else {
            let counts = self.count_by_level();
            for level in RiskLevel::all().iter().rev() {
                if let Some(count) = counts.get(level) {
                    s.push_str(&format!("  {:<21}{}\n", format!("{}:", level), count));
                }
            }
            s.push('\n');

            for assessment in &self.assessments {
                s.push_str(&format!(
                    "  [{}] {} {}\n",
                    assessment.level,
                    assessment.risk_type,
                    assessment.symbol.as_deref().unwrap_or("-")
                ));
                s.push_str(&format!("      {}\n", assessment.message));
                if !assessment.recommendation.is_empty() {
                    s.push_str(&format!("      -> {}\n", assessment.recommendation));
                }
            }
        }
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
