//! Error types for the risk engine.

use thiserror::Error;

/// Top-level risk engine error.
#[derive(Error, Debug)]
pub enum RiskError {
    /// A read of the user's own account data failed.
    #[error("failed to get {resource}: {source}")]
    Repository {
        resource: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// A market-wide lookup failed (e.g. the symbol list).
    #[error("failed to get {resource}: {source}")]
    MarketData {
        resource: &'static str,
        #[source]
        source: MarketDataError,
    },

    /// A write through a persistence port failed.
    #[error("failed to save {resource}: {source}")]
    Persist {
        resource: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// A registered control failed; carries the control's name.
    #[error("risk control '{control}' failed: {source}")]
    Control {
        control: String,
        #[source]
        source: Box<RiskError>,
    },

    #[error("Risk assessment not found: {0}")]
    NotFound(String),

    #[error("Evaluation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RiskError {
    pub fn repository(resource: &'static str, source: RepositoryError) -> Self {
        RiskError::Repository { resource, source }
    }

    pub fn market_data(resource: &'static str, source: MarketDataError) -> Self {
        RiskError::MarketData { resource, source }
    }

    pub fn persist(resource: &'static str, source: RepositoryError) -> Self {
        RiskError::Persist { resource, source }
    }

    /// Wrap an error with the name of the control that produced it.
    pub fn control(control: impl Into<String>, source: RiskError) -> Self {
        RiskError::Control {
            control: control.into(),
            source: Box::new(source),
        }
    }

    /// Name of the failing control, if this error came out of an evaluation.
    pub fn control_name(&self) -> Option<&str> {
        match self {
            RiskError::Control { control, .. } => Some(control),
            _ => None,
        }
    }

    /// The innermost risk error, skipping control wrappers.
    pub fn root(&self) -> &RiskError {
        match self {
            RiskError::Control { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Market data port errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for {0}")]
    NoDataAvailable(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Market data error: {0}")]
    Internal(String),
}

/// Repository port errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Repository error: {0}")]
    Internal(String),
}

/// Result type alias for risk engine operations.
pub type RiskResult<T> = Result<T, RiskError>;
