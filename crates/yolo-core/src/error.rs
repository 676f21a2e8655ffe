//! Error taxonomy of the compilation pipeline.
//!
//! Classification and unsupported-action failures are expected, user-facing
//! conditions. An empty plan is always a defect. Provider failures never reach
//! this level; the ABI resolver absorbs them as "not found".

use thiserror::Error;

/// The language service was unreachable or returned content that is not a
/// structured intent.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("classification service unavailable: {0}")]
    Upstream(String),
    #[error("classification returned malformed intent: {0}")]
    Malformed(String),
}

/// No step template exists for the classified action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported action: {action}")]
pub struct UnsupportedActionError {
    pub action: String,
}

impl UnsupportedActionError {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
        }
    }
}

/// A template matched but produced no steps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no executable steps were produced for action '{action}'")]
pub struct EmptyPlanError {
    pub action: String,
}

/// Step builder failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepBuildError {
    #[error(transparent)]
    UnsupportedAction(#[from] UnsupportedActionError),
    #[error("invalid amount '{value}' for '{name}': {reason}")]
    InvalidAmount {
        name: String,
        value: String,
        reason: String,
    },
    #[error("missing required parameter '{name}' for action '{action}'")]
    MissingParameter { action: String, name: String },
    #[error("unknown token '{symbol}'")]
    UnknownToken { symbol: String },
    #[error("action '{action}' needs an ERC-20 token; the native currency is not one")]
    NativeCurrency { action: String },
}

/// Internal fault inside the ABI resolver. Absent ABIs are not errors.
#[derive(Debug, Error)]
pub enum AbiResolveError {
    #[error("abi cache unavailable: {0}")]
    Cache(String),
}

/// Failure of a single ABI provider. Always absorbed by the resolver.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(String),
    #[error("response error: {0}")]
    Response(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

/// Request-level failure of the whole pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error(transparent)]
    Build(#[from] StepBuildError),
    #[error(transparent)]
    EmptyPlan(#[from] EmptyPlanError),
    #[error(transparent)]
    Abi(#[from] AbiResolveError),
}

impl PipelineError {
    /// Whether the failure describes a limitation the end user can act on,
    /// as opposed to an internal defect.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Classification(_) | Self::Build(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_action_message_carries_action() {
        let err = PipelineError::from(StepBuildError::from(UnsupportedActionError::new(
            "levitate",
        )));
        assert_eq!(err.to_string(), "unsupported action: levitate");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_empty_plan_is_not_user_facing() {
        let err = PipelineError::from(EmptyPlanError {
            action: "swap".to_string(),
        });
        assert!(!err.is_user_facing());
    }
}
