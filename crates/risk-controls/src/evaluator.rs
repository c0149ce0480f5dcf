//! Runs the registered controls for a user and aggregates their findings.

use futures::future::join_all;
use risk_core::{RiskAssessment, RiskError, RiskProfile, RiskResult, RiskType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::control::{RiskControl, RiskPorts, DEFAULT_PAGE_SIZE};
use crate::{
    ConcentrationControl, DrawdownControl, ExposureControl, LiquidityControl, PositionSizeControl,
    VolatilityControl,
};

/// How the evaluator schedules its controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// One control at a time, stopping at the first failure.
    #[default]
    Sequential,
    /// All controls concurrently. The first failure in registration order is
    /// reported and every other result is discarded.
    Parallel,
}

/// Ordered set of risk controls.
///
/// Evaluation is all-or-nothing: if any control fails, no assessments are
/// returned.
pub struct RiskEvaluator {
    controls: Vec<Arc<dyn RiskControl>>,
    mode: EvaluationMode,
}

impl RiskEvaluator {
    /// Evaluator with the six built-in controls.
    pub fn new(ports: &RiskPorts) -> Self {
        Self::with_page_size(ports, DEFAULT_PAGE_SIZE)
    }

    /// Built-in controls, reading paged repositories `page_size` rows at a time.
    pub fn with_page_size(ports: &RiskPorts, page_size: usize) -> Self {
        let controls: Vec<Arc<dyn RiskControl>> = vec![
            Arc::new(
                PositionSizeControl::new(ports.market_data.clone(), ports.orders.clone())
                    .with_page_size(page_size),
            ),
            Arc::new(ConcentrationControl::new(
                ports.market_data.clone(),
                ports.positions.clone(),
                ports.wallets.clone(),
            )),
            Arc::new(LiquidityControl::new(ports.market_data.clone())),
            Arc::new(VolatilityControl::new(ports.market_data.clone())),
            Arc::new(
                ExposureControl::new(ports.market_data.clone(), ports.positions.clone())
                    .with_page_size(page_size),
            ),
            Arc::new(DrawdownControl::new(
                ports.market_data.clone(),
                ports.positions.clone(),
            )),
        ];

        Self {
            controls,
            mode: EvaluationMode::default(),
        }
    }

    /// Evaluator with no controls.
    pub fn empty() -> Self {
        Self {
            controls: Vec::new(),
            mode: EvaluationMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Register an additional control after the existing ones.
    pub fn add_control(&mut self, control: Arc<dyn RiskControl>) {
        self.controls.push(control);
    }

    /// First registered control of the given type.
    pub fn get_control_by_type(&self, risk_type: RiskType) -> Option<&Arc<dyn RiskControl>> {
        self.controls.iter().find(|c| c.risk_type() == risk_type)
    }

    /// Registered controls, in registration order.
    pub fn controls(&self) -> &[Arc<dyn RiskControl>] {
        &self.controls
    }

    /// Run every control for the user and concatenate the results in
    /// registration order.
    pub async fn evaluate_all_risks(
        &self,
        user_id: &str,
        profile: &RiskProfile,
    ) -> RiskResult<Vec<RiskAssessment>> {
        let assessments = match self.mode {
            EvaluationMode::Sequential => self.evaluate_sequential(user_id, profile).await?,
            EvaluationMode::Parallel => self.evaluate_parallel(user_id, profile).await?,
        };

        info!(
            user_id = %user_id,
            controls = self.controls.len(),
            count = assessments.len(),
            "Risk evaluation complete"
        );
        Ok(assessments)
    }

    async fn evaluate_sequential(
        &self,
        user_id: &str,
        profile: &RiskProfile,
    ) -> RiskResult<Vec<RiskAssessment>> {
        let mut all = Vec::new();
        for control in &self.controls {
            match control.evaluate(user_id, profile).await {
                Ok(mut assessments) => {
                    debug!(control = control.name(), count = assessments.len(), "Control evaluated");
                    all.append(&mut assessments);
                }
                Err(e) => return Err(Self::control_failed(control.as_ref(), user_id, e)),
            }
        }
        Ok(all)
    }

    async fn evaluate_parallel(
        &self,
        user_id: &str,
        profile: &RiskProfile,
    ) -> RiskResult<Vec<RiskAssessment>> {
        let results = join_all(
            self.controls
                .iter()
                .map(|control| control.evaluate(user_id, profile)),
        )
        .await;

        let mut all = Vec::new();
        for (control, result) in self.controls.iter().zip(results) {
            match result {
                Ok(mut assessments) => {
                    debug!(control = control.name(), count = assessments.len(), "Control evaluated");
                    all.append(&mut assessments);
                }
                Err(e) => return Err(Self::control_failed(control.as_ref(), user_id, e)),
            }
        }
        Ok(all)
    }

    fn control_failed(control: &dyn RiskControl, user_id: &str, error: RiskError) -> RiskError {
        warn!(user_id = %user_id, control = control.name(), "Risk control failed: {}", error);
        RiskError::control(control.name(), error)
    }
}
