//! Step builder
//!
//! Expands a classified intent into ordered contract-call steps:
//! 1. look up the action's template (unknown actions fail fast)
//! 2. expand it against the intent, the caller's wallet and the build time
//! 3. number the steps 1..N in execution order
//! 4. optionally check each call against its contract ABI and refine
//!    parameter types; an unavailable ABI never blocks the build

mod context;
mod registry;
mod settings;
mod templates;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::abi::AbiResolver;
use crate::error::{StepBuildError, UnsupportedActionError};
use crate::types::{StructuredIntent, TransactionStep};

pub use context::{
    NormalizedAmount, Precision, PrecisionSource, ResolvedToken, TemplateContext,
};
pub use registry::{FnTemplate, StepTemplate, TemplateRegistry};
pub use settings::{
    BuilderSettings, ContractBook, KnownToken, TokenRegistry, DEFAULT_DECIMALS, NATIVE_SYMBOL,
    ZERO_ADDRESS,
};
pub use templates::{
    approve_steps, default_registry, stake_steps, swap_steps, transfer_steps, unstake_steps,
};

/// Outcome of checking one step against its contract ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiCheck {
    /// The function exists with matching arity; parameter types were refined.
    Verified,
    /// The ABI resolved but does not expose the function as called.
    FunctionMissing,
    /// No ABI could be resolved; template types were kept.
    Unavailable,
}

pub struct StepBuilder {
    registry: TemplateRegistry,
    settings: BuilderSettings,
    abi_resolver: Option<Arc<AbiResolver>>,
}

impl StepBuilder {
    /// Builder with every built-in template.
    pub fn new(settings: BuilderSettings) -> Self {
        Self::with_registry(default_registry(), settings)
    }

    pub fn with_registry(registry: TemplateRegistry, settings: BuilderSettings) -> Self {
        Self {
            registry,
            settings,
            abi_resolver: None,
        }
    }

    /// Enable ABI-dependent enrichment.
    pub fn with_abi_resolver(mut self, resolver: Arc<AbiResolver>) -> Self {
        self.abi_resolver = Some(resolver);
        self
    }

    pub fn supported_actions(&self) -> Vec<String> {
        self.registry.actions()
    }

    pub fn settings(&self) -> &BuilderSettings {
        &self.settings
    }

    pub async fn build(
        &self,
        intent: &StructuredIntent,
        wallet_address: &str,
    ) -> Result<Vec<TransactionStep>, StepBuildError> {
        self.build_at(intent, wallet_address, Utc::now()).await
    }

    /// Build with an explicit clock, used for time-derived parameters.
    pub async fn build_at(
        &self,
        intent: &StructuredIntent,
        wallet_address: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<TransactionStep>, StepBuildError> {
        let template = self
            .registry
            .get(&intent.action)
            .ok_or_else(|| UnsupportedActionError::new(intent.action.clone()))?;

        let ctx = TemplateContext::new(intent, wallet_address, now, &self.settings);
        let mut steps = template.expand(&ctx)?;
        for (index, step) in steps.iter_mut().enumerate() {
            step.order = (index + 1) as u32;
        }

        if let Some(resolver) = &self.abi_resolver {
            for step in steps.iter_mut() {
                let check = enrich_step(resolver, step).await;
                debug!(
                    order = step.order,
                    contract = %step.contract_address,
                    function = %step.function_name,
                    check = ?check,
                    "step abi check"
                );
            }
        }

        info!(
            action = %template.action(),
            step_count = steps.len(),
            "steps built"
        );
        Ok(steps)
    }
}

/// Refine `step` against its contract ABI. Never fails: any resolution problem
/// leaves the step as the template produced it.
pub async fn enrich_step(resolver: &AbiResolver, step: &mut TransactionStep) -> AbiCheck {
    let abi = match resolver.resolve(&step.contract_address).await {
        Ok(Some(abi)) => abi,
        Ok(None) => return AbiCheck::Unavailable,
        Err(err) => {
            warn!(
                contract = %step.contract_address,
                error = %err,
                "abi lookup failed; keeping template parameter types"
            );
            return AbiCheck::Unavailable;
        }
    };

    let Some(function) = abi.function(&step.function_name, step.parameters.len()) else {
        warn!(
            contract = %step.contract_address,
            function = %step.function_name,
            arity = step.parameters.len(),
            "contract abi does not expose the called function"
        );
        return AbiCheck::FunctionMissing;
    };

    for (param, abi_type) in step.parameters.iter_mut().zip(function.input_types) {
        if param.kind != abi_type {
            debug!(
                param = %param.name,
                from = %param.kind,
                to = %abi_type,
                "parameter type refined from abi"
            );
            param.kind = abi_type;
        }
    }
    AbiCheck::Verified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{Abi, AbiProvider};
    use crate::error::ProviderError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;

    const WALLET: &str = "0x1234567890abcdef1234567890abcdef12345678";
    const TOKEN: &str = "0x00000000000000000000000000000000000000aa";
    const RECIPIENT: &str = "0x00000000000000000000000000000000000000bb";

    fn builder() -> StepBuilder {
        StepBuilder::new(BuilderSettings::default())
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    fn assert_contiguous(steps: &[TransactionStep]) {
        for (index, step) in steps.iter().enumerate() {
            assert_eq!(step.order as usize, index + 1);
        }
    }

    #[tokio::test]
    async fn test_transfer_binds_intent_values() {
        let intent = StructuredIntent::new("transfer", "Send 5 tokens")
            .with_param("tokenAddress", TOKEN)
            .with_param("to", RECIPIENT)
            .with_param("amount", "5");

        let steps = builder().build(&intent, WALLET).await.unwrap();

        assert_eq!(steps.len(), 1);
        let step = &steps[0];
        assert_eq!(step.order, 1);
        assert_eq!(step.function_name, "transfer");
        assert_eq!(step.contract_address, TOKEN);
        assert_eq!(step.param("recipient").unwrap().value, RECIPIENT);
        assert_eq!(step.param("amount").unwrap().value, "5");
        assert!(!step.is_expanded);
    }

    #[tokio::test]
    async fn test_transfer_defaults_for_missing_keys() {
        let intent = StructuredIntent::new("TRANSFER", "Send something");

        let steps = builder().build(&intent, WALLET).await.unwrap();

        let step = &steps[0];
        assert_eq!(
            step.contract_address,
            BuilderSettings::default().contracts.default_stable
        );
        assert_eq!(step.param("recipient").unwrap().value, ZERO_ADDRESS);
        assert_eq!(step.param("amount").unwrap().value, "0");
    }

    #[tokio::test]
    async fn test_transfer_rejects_fractional_amount() {
        let intent = StructuredIntent::new("transfer", "Send 0.5 USDC")
            .with_param("tokenAddress", "USDC")
            .with_param("to", RECIPIENT)
            .with_param("amount", "0.5");

        let err = builder().build(&intent, WALLET).await.unwrap_err();

        assert!(matches!(
            err,
            StepBuildError::InvalidAmount { ref name, ref value, .. }
                if name == "amount" && value == "0.5"
        ));
    }

    #[tokio::test]
    async fn test_transfer_of_known_token_states_human_amount() {
        let intent = StructuredIntent::new("transfer", "Send 5 USDC")
            .with_param("tokenAddress", "USDC")
            .with_param("to", RECIPIENT)
            .with_param("amount", "5000000");

        let steps = builder().build(&intent, WALLET).await.unwrap();

        assert_eq!(steps[0].param("amount").unwrap().value, "5000000");
        assert!(steps[0].explanation.starts_with("Send 5 USDC (5000000 smallest units)"));
    }

    #[tokio::test]
    async fn test_native_currency_cannot_be_transferred_or_approved() {
        for action in ["transfer", "approve"] {
            let intent = StructuredIntent::new(action, "Move ETH")
                .with_param("tokenAddress", "ETH")
                .with_param("to", RECIPIENT)
                .with_param("amount", "0.1");

            let err = builder().build(&intent, WALLET).await.unwrap_err();

            assert_eq!(
                err,
                StepBuildError::NativeCurrency {
                    action: action.to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_swap_approves_the_router_it_calls() {
        let intent = StructuredIntent::new("swap", "Swap 0.1 ETH for USDC")
            .with_param("amount", "0.1")
            .with_param("tokenOut", "USDC");

        let steps = builder().build_at(&intent, WALLET, fixed_now()).await.unwrap();

        assert_eq!(steps.len(), 2);
        assert_contiguous(&steps);
        assert_eq!(steps[0].function_name, "approve");
        assert_eq!(
            steps[0].param("spender").unwrap().value,
            steps[1].contract_address
        );
        assert_eq!(steps[0].param("amount").unwrap().value, "100000000000000000");
        assert_eq!(steps[1].function_name, "swapExactETHForTokens");
        assert!(steps[1]
            .explanation
            .contains("Attach 100000000000000000 wei as the transaction value"));
        assert_eq!(steps[1].param("to").unwrap().value, WALLET);
        assert_eq!(
            steps[1].param("deadline").unwrap().value,
            (fixed_now().timestamp() + 3600).to_string()
        );
        assert_eq!(
            steps[1].param("path").unwrap().value,
            "[0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2, 0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48]"
        );
        assert_eq!(steps[1].param("path").unwrap().kind, "address[]");
    }

    #[tokio::test]
    async fn test_swap_without_min_output_is_flagged() {
        let intent = StructuredIntent::new("swap", "Swap");

        let steps = builder().build(&intent, WALLET).await.unwrap();

        assert_eq!(steps[1].param("amountOutMin").unwrap().value, "0");
        assert!(steps[1].explanation.contains("no protection against price impact"));
    }

    #[tokio::test]
    async fn test_swap_min_output_uses_output_token_precision() {
        let intent = StructuredIntent::new("swap", "Swap")
            .with_param("tokenIn", "DAI")
            .with_param("tokenOut", "USDC")
            .with_param("amount", "100")
            .with_param("amountOutMin", "99.5");

        let steps = builder().build(&intent, WALLET).await.unwrap();

        assert_eq!(steps[1].function_name, "swapExactTokensForTokens");
        assert!(!steps[1].explanation.contains("wei"));
        assert_eq!(
            steps[1].param("amountIn").unwrap().value,
            "100000000000000000000"
        );
        assert_eq!(steps[1].param("amountOutMin").unwrap().value, "99500000");
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_unprotected_swap() {
        let settings = BuilderSettings {
            allow_zero_min_output: false,
            ..BuilderSettings::default()
        };
        let intent = StructuredIntent::new("swap", "Swap");

        let err = StepBuilder::new(settings)
            .build(&intent, WALLET)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            StepBuildError::MissingParameter {
                action: "swap".to_string(),
                name: "amountOutMin".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unsupported_action_carries_exact_string() {
        let intent = StructuredIntent::new("levitate", "Float");

        let err = builder().build(&intent, WALLET).await.unwrap_err();

        assert_eq!(
            err,
            StepBuildError::UnsupportedAction(UnsupportedActionError::new("levitate"))
        );
    }

    #[tokio::test]
    async fn test_unstake_requests_withdrawal_for_wallet() {
        let intent = StructuredIntent::new("unstake", "Unstake 2 stETH").with_param("amount", "2");

        let steps = builder().build(&intent, WALLET).await.unwrap();

        assert_eq!(steps.len(), 2);
        assert_contiguous(&steps);
        let queue = &BuilderSettings::default().contracts.withdrawal_queue;
        assert_eq!(&steps[0].param("spender").unwrap().value, queue);
        assert_eq!(&steps[1].contract_address, queue);
        assert_eq!(
            steps[1].param("_amounts").unwrap().value,
            "[2000000000000000000]"
        );
        assert_eq!(steps[1].param("_owner").unwrap().value, WALLET);
    }

    #[tokio::test]
    async fn test_stake_states_value_to_attach() {
        let intent = StructuredIntent::new("stake", "Stake 1 ETH").with_param("amount", 1);

        let steps = builder().build(&intent, WALLET).await.unwrap();

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].function_name, "submit");
        assert!(steps[0].explanation.contains("1000000000000000000 wei"));
    }

    #[tokio::test]
    async fn test_approve_notes_assumed_precision() {
        let intent = StructuredIntent::new("approve", "Approve")
            .with_param("tokenAddress", TOKEN)
            .with_param("spender", RECIPIENT)
            .with_param("amount", "1");

        let steps = builder().build(&intent, WALLET).await.unwrap();

        assert_eq!(steps[0].param("amount").unwrap().value, "1000000000000000000");
        assert!(steps[0].explanation.contains("assumed default"));
    }

    #[tokio::test]
    async fn test_custom_template_is_pluggable() {
        let mut registry = default_registry();
        registry.register_fn("wrap", |ctx| {
            Ok(vec![TransactionStep::new(
                "Wrap ETH",
                ctx.settings.contracts.wrapped_native.clone(),
                "deposit",
            )])
        });
        let builder = StepBuilder::with_registry(registry, BuilderSettings::default());

        let steps = builder
            .build(&StructuredIntent::new("wrap", "Wrap"), WALLET)
            .await
            .unwrap();

        assert_eq!(steps[0].order, 1);
        assert!(builder.supported_actions().contains(&"wrap".to_string()));
    }

    struct StaticProvider(Option<Abi>);

    #[async_trait]
    impl AbiProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch(&self, _address: &str) -> Result<Option<Abi>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl AbiProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, _address: &str) -> Result<Option<Abi>, ProviderError> {
            Err(ProviderError::Http("timeout".to_string()))
        }
    }

    #[tokio::test]
    async fn test_abi_types_refine_parameters() {
        let abi = Abi::new(json!([{
            "type": "function",
            "name": "transfer",
            "inputs": [{"name": "_to", "type": "address"}, {"name": "_value", "type": "uint128"}]
        }]));
        let provider: Arc<dyn AbiProvider> = Arc::new(StaticProvider(Some(abi)));
        let resolver = Arc::new(AbiResolver::new(vec![provider]));
        let builder = builder().with_abi_resolver(resolver);
        let intent = StructuredIntent::new("transfer", "Send").with_param("tokenAddress", TOKEN);

        let steps = builder.build(&intent, WALLET).await.unwrap();

        assert_eq!(steps[0].param("amount").unwrap().kind, "uint128");
        assert_eq!(steps[0].param("recipient").unwrap().kind, "address");
    }

    #[tokio::test]
    async fn test_unresolvable_abi_does_not_block_build() {
        let provider: Arc<dyn AbiProvider> = Arc::new(FailingProvider);
        let resolver = Arc::new(AbiResolver::new(vec![provider]));
        let builder = builder().with_abi_resolver(resolver);
        let intent = StructuredIntent::new("swap", "Swap");

        let steps = builder.build(&intent, WALLET).await.unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].param("amount").unwrap().kind, "uint256");
    }

    #[tokio::test]
    async fn test_enrich_reports_missing_function() {
        let abi = Abi::new(json!([{"type": "function", "name": "balanceOf", "inputs": []}]));
        let provider: Arc<dyn AbiProvider> = Arc::new(StaticProvider(Some(abi)));
        let resolver = AbiResolver::new(vec![provider]);
        let mut step = TransactionStep::new("t", TOKEN, "transfer");

        assert_eq!(
            enrich_step(&resolver, &mut step).await,
            AbiCheck::FunctionMissing
        );
    }
}
