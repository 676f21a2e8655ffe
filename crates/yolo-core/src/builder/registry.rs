//! Action tag → step template registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::StepBuildError;
use crate::types::TransactionStep;

use super::context::TemplateContext;

/// Expands one action into its ordered contract calls.
///
/// Templates return steps in execution order; the builder assigns `order`.
pub trait StepTemplate: Send + Sync {
    /// Lower-case action tag this template handles.
    fn action(&self) -> &str;

    fn expand(&self, ctx: &TemplateContext<'_>) -> Result<Vec<TransactionStep>, StepBuildError>;
}

type ExpandFn =
    dyn Fn(&TemplateContext<'_>) -> Result<Vec<TransactionStep>, StepBuildError> + Send + Sync;

/// Template backed by a plain function or closure.
pub struct FnTemplate {
    action: String,
    expand: Box<ExpandFn>,
}

impl FnTemplate {
    pub fn new<F>(action: impl Into<String>, expand: F) -> Self
    where
        F: Fn(&TemplateContext<'_>) -> Result<Vec<TransactionStep>, StepBuildError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            action: action.into().trim().to_ascii_lowercase(),
            expand: Box::new(expand),
        }
    }
}

impl StepTemplate for FnTemplate {
    fn action(&self) -> &str {
        &self.action
    }

    fn expand(&self, ctx: &TemplateContext<'_>) -> Result<Vec<TransactionStep>, StepBuildError> {
        (self.expand)(ctx)
    }
}

/// Registry of supported actions. It is the sole authority on what the
/// pipeline can build.
#[derive(Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<dyn StepTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Register a template, replacing any previous one for the same action.
    pub fn register(&mut self, template: Arc<dyn StepTemplate>) {
        self.templates
            .insert(template.action().to_ascii_lowercase(), template);
    }

    pub fn register_fn<F>(&mut self, action: impl Into<String>, expand: F)
    where
        F: Fn(&TemplateContext<'_>) -> Result<Vec<TransactionStep>, StepBuildError>
            + Send
            + Sync
            + 'static,
    {
        self.register(Arc::new(FnTemplate::new(action, expand)));
    }

    /// Case-insensitive lookup.
    pub fn get(&self, action: &str) -> Option<Arc<dyn StepTemplate>> {
        self.templates
            .get(&action.trim().to_ascii_lowercase())
            .cloned()
    }

    /// Supported action tags, sorted.
    pub fn actions(&self) -> Vec<String> {
        let mut actions: Vec<String> = self.templates.keys().cloned().collect();
        actions.sort_unstable();
        actions
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
