//! Natural-language classification capability.

use async_trait::async_trait;

use crate::error::ClassificationError;
use crate::types::StructuredIntent;

/// Turns a user message into a structured intent.
///
/// Implementations must not validate `action`; the step builder decides what
/// is supported. No retries happen at this level.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, message: &str) -> Result<StructuredIntent, ClassificationError>;
}
