//! Built-in step templates.
//!
//! Token-spending actions always emit the ERC-20 approval before the call that
//! consumes the allowance.

use tracing::warn;

use crate::error::StepBuildError;
use crate::types::{TransactionParameter, TransactionStep};
use crate::units::format_units;

use super::context::{NormalizedAmount, ResolvedToken, TemplateContext};
use super::registry::TemplateRegistry;
use super::settings::{NATIVE_SYMBOL, ZERO_ADDRESS};

const TOKEN_KEYS: &[&str] = &["tokenAddress", "token", "tokenSymbol"];
const AMOUNT_KEYS: &[&str] = &["amount", "value"];
const DECIMAL_KEYS: &[&str] = &["decimals", "tokenDecimals"];

/// Registry with every built-in action.
pub fn default_registry() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();
    registry.register_fn("swap", swap_steps);
    registry.register_fn("transfer", transfer_steps);
    registry.register_fn("approve", approve_steps);
    registry.register_fn("stake", stake_steps);
    registry.register_fn("unstake", unstake_steps);
    registry
}

fn approval_step(
    token: &ResolvedToken,
    spender: &str,
    amount: &NormalizedAmount,
    title: impl Into<String>,
    purpose: &str,
) -> TransactionStep {
    TransactionStep::new(title, token.address.clone(), "approve")
        .with_explanation(format!(
            "Allow {} to spend {} {} from your wallet {}. {}",
            spender,
            amount.human,
            token.label,
            purpose,
            amount.describe()
        ))
        .with_param(TransactionParameter::address("spender", spender))
        .with_param(TransactionParameter::uint256("amount", amount.value()))
}

/// Approve the router, then swap through it.
///
/// Defaults: input ETH, output the configured stable coin, amount 0.1.
pub fn swap_steps(ctx: &TemplateContext<'_>) -> Result<Vec<TransactionStep>, StepBuildError> {
    let contracts = &ctx.settings.contracts;
    let router = ctx.text_or(&["router", "routerAddress"], &contracts.swap_router);
    let token_in = ctx.token(
        &["tokenIn", "fromToken", "tokenInAddress", "sellToken"],
        NATIVE_SYMBOL,
    )?;
    let token_out = ctx.token(
        &["tokenOut", "toToken", "tokenOutAddress", "buyToken"],
        &contracts.default_stable,
    )?;
    let amount_in = ctx.amount(
        &["amount", "amountIn"],
        "0.1",
        &token_in,
        &["decimals", "tokenInDecimals"],
    )?;

    let (min_out_value, min_out_note) = match ctx.text(&["amountOutMin", "minAmountOut"]) {
        Some(_) => {
            let min_out = ctx.amount(
                &["amountOutMin", "minAmountOut"],
                "0",
                &token_out,
                &["tokenOutDecimals"],
            )?;
            let note = format!("You will receive at least {} {}.", min_out.human, token_out.label);
            (min_out.value(), note)
        }
        None if ctx.settings.allow_zero_min_output => {
            warn!(
                token_in = %token_in.label,
                token_out = %token_out.label,
                "swap built without minimum output; no price-impact protection"
            );
            (
                "0".to_string(),
                "No minimum output was specified, so this swap has no protection against price impact."
                    .to_string(),
            )
        }
        None => {
            return Err(StepBuildError::MissingParameter {
                action: ctx.intent.action.clone(),
                name: "amountOutMin".to_string(),
            });
        }
    };

    let path = format!("[{}, {}]", token_in.address, token_out.address);
    let approve = approval_step(
        &token_in,
        &router,
        &amount_in,
        "Approve Swap Router",
        "so the router can execute the swap",
    );

    let value_note = if token_in.is_native {
        format!(" Attach {} wei as the transaction value.", amount_in.value())
    } else {
        String::new()
    };
    let swap = if token_in.is_native {
        TransactionStep::new("Execute Swap", router.clone(), "swapExactETHForTokens")
            .with_param(TransactionParameter::uint256("amountOutMin", min_out_value))
    } else {
        TransactionStep::new("Execute Swap", router.clone(), "swapExactTokensForTokens")
            .with_param(TransactionParameter::uint256("amountIn", amount_in.value()))
            .with_param(TransactionParameter::uint256("amountOutMin", min_out_value))
    };
    let swap = swap
        .with_param(TransactionParameter::new("path", path, "address[]"))
        .with_param(TransactionParameter::address("to", ctx.wallet_address))
        .with_param(TransactionParameter::uint256("deadline", ctx.deadline()))
        .with_explanation(format!(
            "Swap {} {} for {} through the router; proceeds go to your wallet.{} {}",
            amount_in.human, token_in.label, token_out.label, value_note, min_out_note
        ));

    Ok(vec![approve, swap])
}

/// Single ERC-20 transfer. The amount is already in smallest units and is
/// bound as given; fractional amounts are rejected.
pub fn transfer_steps(ctx: &TemplateContext<'_>) -> Result<Vec<TransactionStep>, StepBuildError> {
    let token = ctx.erc20_token(TOKEN_KEYS, &ctx.settings.contracts.default_stable)?;
    let recipient = ctx.text_or(&["to", "recipient", "toAddress"], ZERO_ADDRESS);
    let amount = ctx.base_units(AMOUNT_KEYS, "0")?;
    let precision = ctx.precision(&token, DECIMAL_KEYS);

    let explanation = if precision.source.is_assumed() {
        format!(
            "Send {} smallest units of {} to {}. The token's precision is unknown; check the amount.",
            amount, token.label, recipient
        )
    } else {
        format!(
            "Send {} {} ({} smallest units) to {}.",
            format_units(amount, precision.decimals),
            token.label,
            amount,
            recipient
        )
    };

    let step = TransactionStep::new("Transfer Tokens", token.address.clone(), "transfer")
        .with_explanation(explanation)
        .with_param(TransactionParameter::address("recipient", recipient))
        .with_param(TransactionParameter::uint256("amount", amount.to_string()));
    Ok(vec![step])
}

/// Single ERC-20 approval. A missing amount approves zero, which revokes.
pub fn approve_steps(ctx: &TemplateContext<'_>) -> Result<Vec<TransactionStep>, StepBuildError> {
    let token = ctx.erc20_token(TOKEN_KEYS, &ctx.settings.contracts.default_stable)?;
    let spender = ctx.text_or(
        &["spender", "spenderAddress"],
        &ctx.settings.contracts.swap_router,
    );
    let amount = ctx.amount(AMOUNT_KEYS, "0", &token, DECIMAL_KEYS)?;
    let title = format!("Approve {}", token.label);
    Ok(vec![approval_step(
        &token,
        &spender,
        &amount,
        title,
        "until the allowance is used or changed",
    )])
}

/// Deposit ETH into the liquid staking contract.
pub fn stake_steps(ctx: &TemplateContext<'_>) -> Result<Vec<TransactionStep>, StepBuildError> {
    let native = ctx.token(&[], NATIVE_SYMBOL)?;
    let amount = ctx.amount(AMOUNT_KEYS, "0", &native, &[])?;
    let referral = ctx.text_or(&["referral"], ZERO_ADDRESS);

    let step = TransactionStep::new(
        "Stake ETH",
        ctx.settings.contracts.liquid_staking.clone(),
        "submit",
    )
    .with_explanation(format!(
        "Deposit {} ETH for staking; attach {} wei as the transaction value. You receive the staked token in return.",
        amount.human,
        amount.value()
    ))
    .with_param(TransactionParameter::address("_referral", referral));
    Ok(vec![step])
}

/// Approve the withdrawal queue, then request the withdrawal.
pub fn unstake_steps(ctx: &TemplateContext<'_>) -> Result<Vec<TransactionStep>, StepBuildError> {
    let contracts = &ctx.settings.contracts;
    let staked = ctx.token(TOKEN_KEYS, &contracts.liquid_staking)?;
    let amount = ctx.amount(AMOUNT_KEYS, "0", &staked, DECIMAL_KEYS)?;

    let approve = approval_step(
        &staked,
        &contracts.withdrawal_queue,
        &amount,
        "Approve Withdrawal Queue",
        "so the queue can take the staked tokens",
    );
    let request = TransactionStep::new(
        "Request Withdrawal",
        contracts.withdrawal_queue.clone(),
        "requestWithdrawals",
    )
    .with_explanation(format!(
        "Queue {} {} for withdrawal; the claim is issued to your wallet.",
        amount.human, staked.label
    ))
    .with_param(TransactionParameter::new(
        "_amounts",
        format!("[{}]", amount.value()),
        "uint256[]",
    ))
    .with_param(TransactionParameter::address("_owner", ctx.wallet_address));

    Ok(vec![approve, request])
}
