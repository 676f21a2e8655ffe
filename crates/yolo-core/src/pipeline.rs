//! Request-scoped pipeline: classify → build → estimate → assemble.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::abi::{Abi, AbiResolver};
use crate::assembler::assemble;
use crate::builder::StepBuilder;
use crate::classifier::IntentClassifier;
use crate::error::{AbiResolveError, PipelineError};
use crate::estimator::CostEstimator;
use crate::types::TransactionPackage;

/// The compilation pipeline. Stateless apart from the shared ABI cache, so one
/// instance serves all concurrent requests.
pub struct IntentPipeline {
    classifier: Arc<dyn IntentClassifier>,
    builder: StepBuilder,
    estimator: Arc<dyn CostEstimator>,
    abi_resolver: Arc<AbiResolver>,
}

impl IntentPipeline {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        builder: StepBuilder,
        estimator: Arc<dyn CostEstimator>,
        abi_resolver: Arc<AbiResolver>,
    ) -> Self {
        Self {
            classifier,
            builder,
            estimator,
            abi_resolver,
        }
    }

    pub fn builder(&self) -> &StepBuilder {
        &self.builder
    }

    /// Compile `message` into a reviewable package for `wallet_address`.
    ///
    /// Both arguments are expected to be present and non-empty.
    pub async fn process_intent(
        &self,
        message: &str,
        wallet_address: &str,
    ) -> Result<TransactionPackage, PipelineError> {
        let result = self.run(message, wallet_address).await;
        match &result {
            Ok(package) => info!(
                package_id = %package.id,
                step_count = package.steps.len(),
                estimated_gas_eth = %package.estimated_gas_eth,
                "transaction package assembled"
            ),
            Err(err @ PipelineError::EmptyPlan(_)) => {
                error!(defect = true, error = %err, "template produced an empty plan")
            }
            Err(err) if err.is_user_facing() => {
                warn!(error = %err, "intent could not be compiled")
            }
            Err(err) => error!(error = %err, "intent pipeline failed"),
        }
        result
    }

    async fn run(
        &self,
        message: &str,
        wallet_address: &str,
    ) -> Result<TransactionPackage, PipelineError> {
        let intent = self.classifier.classify(message).await?;
        info!(
            action = %intent.action,
            parameter_count = intent.parameters.len(),
            "intent classified"
        );
        let steps = self.builder.build(&intent, wallet_address).await?;
        let estimate = self.estimator.estimate(&steps, wallet_address).await;
        Ok(assemble(&intent, steps, estimate)?)
    }

    /// Look up a contract ABI through the shared resolver.
    pub async fn get_abi(&self, contract_address: &str) -> Result<Option<Abi>, AbiResolveError> {
        self.abi_resolver.resolve(contract_address).await
    }
}
