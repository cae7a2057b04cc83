//! Template registry and proto-views.

use std::collections::HashMap;
use std::sync::Arc;

use vellum_core::{BuildError, TemplateCmd, TemplateId};

/// An immutable, compiled template: the unit a view is created from.
///
/// Cloning is cheap; many views may be built from one proto-view.
#[derive(Debug, Clone)]
pub struct ProtoView {
    commands: Arc<[TemplateCmd]>,
}

impl ProtoView {
    /// Wrap a command list.
    pub fn new(commands: Vec<TemplateCmd>) -> Self {
        Self {
            commands: commands.into(),
        }
    }

    /// Shared handle to the command list.
    pub fn commands(&self) -> Arc<[TemplateCmd]> {
        Arc::clone(&self.commands)
    }
}

/// Registry of component templates, keyed by template id.
///
/// One registry exists per renderer instance; it is populated before any view
/// referencing a template is created and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<TemplateId, Arc<[TemplateCmd]>>,
}

impl TemplateRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Register a component template. A duplicate id silently replaces the
    /// previous command list.
    pub fn register(&mut self, id: TemplateId, commands: Vec<TemplateCmd>) {
        tracing::debug!(template = %id, commands = commands.len(), "registering component template");
        self.templates.insert(id, commands.into());
    }

    /// Resolve a template id to its command list.
    pub fn resolve(&self, id: TemplateId) -> Result<Arc<[TemplateCmd]>, BuildError> {
        self.templates
            .get(&id)
            .map(Arc::clone)
            .ok_or(BuildError::UnknownTemplate { id })
    }

    /// Check if a template is registered.
    pub fn contains(&self, id: TemplateId) -> bool {
        self.templates.contains_key(&id)
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
