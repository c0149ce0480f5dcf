//! Application-level risk service: profiles, evaluation, persistence and
//! lifecycle transitions.

use chrono::Utc;
use risk_core::{
    MarketDataService, OrderRequest, RiskAssessment, RiskAssessmentRepository, RiskError,
    RiskLevel, RiskMetrics, RiskProfile, RiskProfileRepository, RiskResult, RiskType,
};
use risk_data::SnapshotMarketData;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::control::{to_f64, RiskPorts, DEFAULT_PAGE_SIZE};
use crate::evaluator::{EvaluationMode, RiskEvaluator};

/// Wallet assets valued one-to-one in quote currency.
const QUOTE_ASSETS: [&str; 2] = ["USDT", "USD"];

/// Evaluation settings for [`RiskService`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub mode: EvaluationMode,
    /// Memoize market data for the duration of one evaluation
    pub cache_market_data: bool,
    /// Abort an evaluation that runs longer than this
    pub timeout: Option<Duration>,
    pub page_size: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            mode: EvaluationMode::Sequential,
            cache_market_data: true,
            timeout: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Risk service.
pub struct RiskService {
    ports: RiskPorts,
    assessments: Arc<dyn RiskAssessmentRepository>,
    profiles: Arc<dyn RiskProfileRepository>,
    default_profile: Option<RiskProfile>,
    settings: ServiceSettings,
}

impl RiskService {
    pub fn new(
        ports: RiskPorts,
        assessments: Arc<dyn RiskAssessmentRepository>,
        profiles: Arc<dyn RiskProfileRepository>,
    ) -> Self {
        Self {
            ports,
            assessments,
            profiles,
            default_profile: None,
            settings: ServiceSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Template for users without a stored profile. Falls back to the
    /// built-in defaults when unset.
    pub fn with_default_profile(mut self, template: RiskProfile) -> Self {
        self.default_profile = Some(template);
        self
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// The user's risk profile. A user without one gets the default
    /// profile, which is stored for next time.
    pub async fn get_user_risk_profile(&self, user_id: &str) -> RiskResult<RiskProfile> {
        let stored = self
            .profiles
            .get_by_user_id(user_id)
            .await
            .map_err(|e| RiskError::repository("risk profile", e))?;
        if let Some(profile) = stored {
            return Ok(profile);
        }

        let profile = self.default_profile_for(user_id);
        self.profiles
            .save(&profile)
            .await
            .map_err(|e| RiskError::persist("risk profile", e))?;
        info!(user_id = %user_id, "Created default risk profile");
        Ok(profile)
    }

    fn default_profile_for(&self, user_id: &str) -> RiskProfile {
        match &self.default_profile {
            Some(template) => {
                let now = Utc::now();
                RiskProfile {
                    id: Uuid::new_v4(),
                    user_id: user_id.to_string(),
                    created_at: now,
                    updated_at: now,
                    ..template.clone()
                }
            }
            None => RiskProfile::new(user_id),
        }
    }

    /// Market data for a single call, memoized when caching is on.
    fn market_data(&self) -> Arc<dyn MarketDataService> {
        if self.settings.cache_market_data {
            Arc::new(SnapshotMarketData::new(self.ports.market_data.clone()))
        } else {
            self.ports.market_data.clone()
        }
    }

    /// Evaluator for a single evaluation call.
    pub fn evaluator(&self) -> RiskEvaluator {
        let ports = self.ports.with_market_data(self.market_data());
        RiskEvaluator::with_page_size(&ports, self.settings.page_size).with_mode(self.settings.mode)
    }

    /// Evaluate a user against their stored (or default) profile and persist
    /// the findings.
    pub async fn evaluate_user(&self, user_id: &str) -> RiskResult<Vec<RiskAssessment>> {
        let profile = self.get_user_risk_profile(user_id).await?;
        profile.validate()?;
        self.evaluate_with_profile(user_id, &profile).await
    }

    /// Evaluate a user against an explicit profile and persist the findings.
    pub async fn evaluate_with_profile(
        &self,
        user_id: &str,
        profile: &RiskProfile,
    ) -> RiskResult<Vec<RiskAssessment>> {
        let evaluator = self.evaluator();
        let run = evaluator.evaluate_all_risks(user_id, profile);

        let assessments = match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| RiskError::Timeout {
                    secs: limit.as_secs(),
                })??,
            None => run.await?,
        };

        if !assessments.is_empty() {
            self.assessments
                .save_all(&assessments)
                .await
                .map_err(|e| RiskError::persist("risk assessments", e))?;
        }
        debug!(user_id = %user_id, count = assessments.len(), "Saved risk assessments");

        Ok(assessments)
    }

    /// Active assessments of a user.
    pub async fn get_active_risks(&self, user_id: &str) -> RiskResult<Vec<RiskAssessment>> {
        self.assessments
            .get_active_by_user(user_id)
            .await
            .map_err(|e| RiskError::repository("risk assessments", e))
    }

    pub async fn resolve_risk(&self, id: &Uuid) -> RiskResult<RiskAssessment> {
        self.transition(id, RiskAssessment::resolve).await
    }

    pub async fn ignore_risk(&self, id: &Uuid) -> RiskResult<RiskAssessment> {
        self.transition(id, RiskAssessment::ignore).await
    }

    async fn transition(
        &self,
        id: &Uuid,
        apply: fn(&mut RiskAssessment),
    ) -> RiskResult<RiskAssessment> {
        let mut assessment = self
            .assessments
            .get_by_id(id)
            .await
            .map_err(|e| RiskError::repository("risk assessment", e))?
            .ok_or_else(|| RiskError::NotFound(id.to_string()))?;

        apply(&mut assessment);
        self.assessments
            .save(&assessment)
            .await
            .map_err(|e| RiskError::persist("risk assessment", e))?;

        info!(id = %id, status = %assessment.status, "Risk assessment updated");
        Ok(assessment)
    }

    /// Exposure and concentration of open positions at their stored marks,
    /// plus the number of active risks.
    pub async fn calculate_risk_metrics(&self, user_id: &str) -> RiskResult<RiskMetrics> {
        let positions = self
            .ports
            .positions
            .get_active_by_user(user_id)
            .await
            .map_err(|e| RiskError::repository("positions", e))?;

        let mut total_exposure = Decimal::ZERO;
        let mut by_symbol: Vec<(&str, Decimal)> = Vec::new();
        for position in &positions {
            let value = position.market_value();
            total_exposure += value;
            match by_symbol.iter_mut().find(|(s, _)| *s == position.symbol) {
                Some((_, bucket)) => *bucket += value,
                None => by_symbol.push((&position.symbol, value)),
            }
        }

        let highest_concentration = if total_exposure > Decimal::ZERO {
            by_symbol
                .iter()
                .map(|(_, value)| *value / total_exposure)
                .max()
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        let active = self.get_active_risks(user_id).await?;
        let high_risk_count = active
            .iter()
            .filter(|a| a.level >= RiskLevel::High)
            .count();

        Ok(RiskMetrics {
            user_id: user_id.to_string(),
            total_exposure,
            highest_concentration,
            open_positions: positions.len(),
            active_risks: active.len(),
            high_risk_count,
            computed_at: Utc::now(),
        })
    }

    /// Check a proposed order against the user's profile before it is
    /// placed. Findings are returned, not stored.
    ///
    /// The order is valued at the last price. If the portfolio value or the
    /// current exposure cannot be read, that check is skipped with a warning.
    pub async fn assess_order_risk(
        &self,
        user_id: &str,
        order: &OrderRequest,
    ) -> RiskResult<Vec<RiskAssessment>> {
        info!(
            user_id = %user_id,
            symbol = %order.symbol,
            side = %order.side,
            quantity = %order.quantity,
            "Assessing order risk"
        );

        let profile = self.get_user_risk_profile(user_id).await?;
        let market_data = self.market_data();
        let ticker = market_data
            .get_ticker(&order.symbol)
            .await
            .map_err(|e| RiskError::market_data("ticker", e))?;
        let order_value = order.quantity * ticker.price;

        let mut assessments = Vec::new();

        if order_value > profile.max_position_size {
            assessments.push(
                RiskAssessment::new(
                    user_id,
                    RiskType::Position,
                    RiskLevel::High,
                    format!(
                        "Order value {:.2} exceeds maximum position size {:.2}",
                        order_value, profile.max_position_size
                    ),
                )
                .with_symbol(&order.symbol)
                .with_recommendation(format!(
                    "Reduce order size to below {:.2}",
                    profile.max_position_size
                )),
            );
        }

        match self.portfolio_value(market_data.as_ref(), user_id).await {
            Ok(total_value) if total_value > Decimal::ZERO => {
                let concentration = order_value / total_value;
                if concentration > profile.max_concentration {
                    assessments.push(
                        RiskAssessment::new(
                            user_id,
                            RiskType::Concentration,
                            RiskLevel::Medium,
                            format!(
                                "Order would result in {:.2}% concentration in {}, exceeding limit of {:.2}%",
                                concentration * Decimal::ONE_HUNDRED,
                                order.symbol,
                                profile.max_concentration * Decimal::ONE_HUNDRED
                            ),
                        )
                        .with_symbol(&order.symbol)
                        .with_recommendation(
                            "Diversify portfolio by reducing position size or adding positions in other assets",
                        ),
                    );
                }
            }
            Ok(_) => {}
            Err(e) => warn!(user_id = %user_id, "Failed to calculate portfolio value: {}", e),
        }

        let usd_volume = ticker.usd_volume();
        if usd_volume < profile.min_liquidity {
            assessments.push(
                RiskAssessment::new(
                    user_id,
                    RiskType::Liquidity,
                    RiskLevel::Medium,
                    format!(
                        "Symbol {} has low liquidity ({:.2})",
                        order.symbol, usd_volume
                    ),
                )
                .with_symbol(&order.symbol)
                .with_recommendation("Consider trading assets with higher liquidity"),
            );
        }

        // 24h change is in percent, the threshold is a fraction
        let change = ticker.price_change_pct.abs();
        let limit_pct = to_f64(profile.volatility_threshold) * 100.0;
        if change > limit_pct {
            let level = if change > limit_pct * 2.0 {
                RiskLevel::High
            } else {
                RiskLevel::Medium
            };
            assessments.push(
                RiskAssessment::new(
                    user_id,
                    RiskType::Volatility,
                    level,
                    format!(
                        "Symbol {} has high volatility ({:.2}%)",
                        order.symbol, change
                    ),
                )
                .with_symbol(&order.symbol)
                .with_recommendation("Consider reducing position size or using limit orders"),
            );
        }

        match self.current_exposure(market_data.as_ref(), user_id).await {
            Ok(exposure) => {
                let new_exposure = exposure + order_value;
                if new_exposure > profile.max_total_exposure {
                    assessments.push(
                        RiskAssessment::new(
                            user_id,
                            RiskType::Exposure,
                            RiskLevel::High,
                            format!(
                                "Order would increase total exposure to {:.2}, exceeding limit of {:.2}",
                                new_exposure, profile.max_total_exposure
                            ),
                        )
                        .with_recommendation("Close existing positions or reduce order size"),
                    );
                }
            }
            Err(e) => warn!(user_id = %user_id, "Failed to calculate total exposure: {}", e),
        }

        debug!(user_id = %user_id, count = assessments.len(), "Order risk assessed");
        Ok(assessments)
    }

    /// Wallet balances in quote currency plus open positions at the last
    /// price. Balances and positions without a price are left out.
    async fn portfolio_value(
        &self,
        market_data: &dyn MarketDataService,
        user_id: &str,
    ) -> RiskResult<Decimal> {
        let wallet = self
            .ports
            .wallets
            .get_by_user_id(user_id)
            .await
            .map_err(|e| RiskError::repository("wallet", e))?;

        let mut total = Decimal::ZERO;
        for (asset, balance) in wallet.iter().flat_map(|w| w.balances.iter()) {
            if balance.total <= Decimal::ZERO {
                continue;
            }
            if QUOTE_ASSETS.contains(&asset.as_str()) {
                total += balance.total;
                continue;
            }
            match market_data.get_ticker(&format!("{}USDT", asset)).await {
                Ok(ticker) => total += balance.total * ticker.price,
                Err(e) => debug!(asset = %asset, "Skipping balance without price: {}", e),
            }
        }

        Ok(total + self.current_exposure(market_data, user_id).await?)
    }

    /// Open positions at the last price.
    async fn current_exposure(
        &self,
        market_data: &dyn MarketDataService,
        user_id: &str,
    ) -> RiskResult<Decimal> {
        let positions = self
            .ports
            .positions
            .get_active_by_user(user_id)
            .await
            .map_err(|e| RiskError::repository("positions", e))?;

        let mut exposure = Decimal::ZERO;
        for position in &positions {
            match market_data.get_ticker(&position.symbol).await {
                Ok(ticker) => exposure += position.quantity * ticker.price,
                Err(e) => {
                    debug!(symbol = %position.symbol, "Skipping position without ticker: {}", e)
                }
            }
        }
        Ok(exposure)
    }
}
