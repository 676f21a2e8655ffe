//! # Yolo Core
//!
//! Compiles a natural-language blockchain request into an ordered,
//! human-reviewable transaction package.
//!
//! ```text
//! message + wallet
//!    ↓
//! IntentClassifier  (external language service)
//!    ↓
//! StructuredIntent
//!    ↓
//! StepBuilder ──── AbiResolver (providers + cache)
//!    ↓
//! CostEstimator
//!    ↓
//! assemble → TransactionPackage
//! ```
//!
//! This crate does NOT sign, simulate or broadcast anything, and does not care
//! how requests arrive. Concrete classifiers and providers live in
//! `yolo-llm` and `yolo-providers`.

pub mod abi;
pub mod assembler;
pub mod builder;
pub mod classifier;
pub mod error;
pub mod estimator;
pub mod pipeline;
pub mod types;
pub mod units;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::abi::{Abi, AbiProvider, AbiResolver};
    pub use crate::assembler::assemble;
    pub use crate::builder::{BuilderSettings, StepBuilder, TemplateRegistry};
    pub use crate::classifier::IntentClassifier;
    pub use crate::error::{
        ClassificationError, EmptyPlanError, PipelineError, ProviderError, StepBuildError,
        UnsupportedActionError,
    };
    pub use crate::estimator::{CostEstimator, EstimatorSettings, GasPriceSource};
    pub use crate::pipeline::IntentPipeline;
    pub use crate::types::{
        CostEstimate, StructuredIntent, TransactionPackage, TransactionParameter, TransactionStep,
    };
}

// Re-export key types at crate root
pub use abi::{Abi, AbiProvider, AbiResolver};
pub use builder::StepBuilder;
pub use classifier::IntentClassifier;
pub use error::PipelineError;
pub use pipeline::IntentPipeline;
pub use types::{StructuredIntent, TransactionPackage};
