//! Account and risk persistence ports.

use crate::error::RepositoryError;
use crate::types::{Order, Position, RiskAssessment, RiskProfile, Wallet};
use async_trait::async_trait;
use uuid::Uuid;

/// Read access to a user's positions.
#[async_trait]
pub trait PositionRepository: Send + Sync {
    /// Open positions of a user.
    async fn get_active_by_user(&self, user_id: &str) -> Result<Vec<Position>, RepositoryError>;

    /// All positions of a user regardless of status, one page at a time.
    async fn get_by_user_id(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Position>, RepositoryError>;
}

/// Read access to a user's orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// All orders of a user regardless of status, one page at a time.
    async fn get_by_user_id(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>, RepositoryError>;
}

/// Read access to a user's wallet.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// The user's wallet, or `None` if the user has none.
    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<Wallet>, RepositoryError>;
}

/// Persistence for risk assessments.
#[async_trait]
pub trait RiskAssessmentRepository: Send + Sync {
    /// Insert or replace an assessment by id.
    async fn save(&self, assessment: &RiskAssessment) -> Result<(), RepositoryError>;

    /// Insert or replace a batch in a single write. On error nothing from
    /// the batch is stored.
    async fn save_all(&self, assessments: &[RiskAssessment]) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<RiskAssessment>, RepositoryError>;

    /// Active assessments of a user, oldest first.
    async fn get_active_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<RiskAssessment>, RepositoryError>;
}

/// Persistence for risk profiles.
#[async_trait]
pub trait RiskProfileRepository: Send + Sync {
    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<RiskProfile>, RepositoryError>;

    /// Insert or replace the profile of `profile.user_id`.
    async fn save(&self, profile: &RiskProfile) -> Result<(), RepositoryError>;
}
