use thiserror::Error;

/// Main error type for optidrive
#[derive(Error, Debug)]
pub enum OdError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Objective error: {0}")]
    Objective(String),
}

/// Search strategy errors
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Strategy not found: {name}")]
    NotFound { name: String },

    #[error("Strategy {strategy} failed: {message}")]
    ExecutionFailed { strategy: String, message: String },

    #[error("Strategy {strategy} produced no finite evaluations")]
    NoResults { strategy: String },

    #[error("Numerical failure in {strategy}: {message}")]
    NumericalFailure { strategy: String, message: String },
}

/// Coarse classification of a failed run, as seen by the caller of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad gene bounds, empty parameter space or unusable strategy knobs.
    Configuration,
    /// The strategy token did not name a known strategy.
    StrategyNotFound,
    /// The strategy or the objective failed while the run was in progress.
    StrategyExecution,
}

impl OdError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OdError::Config(_) => ErrorCategory::Configuration,
            OdError::Strategy(StrategyError::NotFound { .. }) => ErrorCategory::StrategyNotFound,
            OdError::Strategy(_) | OdError::Objective(_) => ErrorCategory::StrategyExecution,
        }
    }
}

/// Result type alias for optidrive operations
pub type OdResult<T> = Result<T, OdError>;

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::OdError::Config(format!($($arg)*))
    };
}

/// Macro for creating objective errors from inside an adapter
#[macro_export]
macro_rules! objective_error {
    ($($arg:tt)*) => {
        $crate::OdError::Objective(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = StrategyError::NotFound {
            name: "NotARealStrategy".to_string(),
        };
        assert_eq!(error.to_string(), "Strategy not found: NotARealStrategy");

        let error: OdError = error.into();
        assert!(error.to_string().starts_with("Strategy error:"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            config_error!("gene {} has no bounds", "x").category(),
            ErrorCategory::Configuration
        );

        let not_found: OdError = StrategyError::NotFound { name: "x".into() }.into();
        assert_eq!(not_found.category(), ErrorCategory::StrategyNotFound);

        let failed: OdError = StrategyError::NumericalFailure {
            strategy: "Bayesian".into(),
            message: "singular kernel".into(),
        }
        .into();
        assert_eq!(failed.category(), ErrorCategory::StrategyExecution);

        assert_eq!(
            objective_error!("backtest crashed").category(),
            ErrorCategory::StrategyExecution
        );
    }
}
