//! Registered models, resolved once at startup.

use crate::model::ModelDescriptor;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: Vec<Arc<ModelDescriptor>>,
    by_name: HashMap<String, usize>,
}

impl ModelRegistry {
    /// Returns false when a model with the same name is already registered.
    pub fn insert(&mut self, model: ModelDescriptor) -> bool {
        if self.by_name.contains_key(model.name()) {
            return false;
        }
        self.by_name.insert(model.name().to_string(), self.models.len());
        self.models.push(Arc::new(model));
        true
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ModelDescriptor>> {
        self.by_name.get(name).map(|&i| &self.models[i])
    }

    /// Models in registration order.
    pub fn models(&self) -> &[Arc<ModelDescriptor>] {
        &self.models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
