//! Core type definitions
//!
//! - StructuredIntent: classifier output, the only input of the step builder
//! - TransactionStep / TransactionParameter: one reviewable contract call
//! - TransactionPackage: the assembled, ordered plan handed to the signing client

mod intent;
mod package;
mod step;

pub use intent::{IntentParameters, StructuredIntent};
pub use package::{CostEstimate, TransactionPackage};
pub use step::{TransactionParameter, TransactionStep};

/// Fresh opaque identifier for packages, steps and parameters.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
