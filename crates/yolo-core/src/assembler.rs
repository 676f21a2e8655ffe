//! Package assembly.

use crate::error::EmptyPlanError;
use crate::types::{new_id, CostEstimate, StructuredIntent, TransactionPackage, TransactionStep};

/// Combine the pipeline outputs into a package with a fresh id.
///
/// A plan without steps is never assembled.
pub fn assemble(
    intent: &StructuredIntent,
    steps: Vec<TransactionStep>,
    estimate: CostEstimate,
) -> Result<TransactionPackage, EmptyPlanError> {
    if steps.is_empty() {
        return Err(EmptyPlanError {
            action: intent.action.clone(),
        });
    }
    Ok(TransactionPackage {
        id: new_id(),
        summary: intent.summary.clone(),
        explanation: intent.explanation.clone(),
        steps,
        estimated_gas_eth: estimate.native_amount,
        estimated_gas_usd: estimate.fiat_amount,
    })
}
