use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{AttributeId, UniformValue};

/// Zero-argument value provider.
///
/// Providers are evaluated on the render thread every time the owning shader
/// is enabled; whatever state they read must be shareable across threads.
pub type Provider = Arc<dyn Fn() -> UniformValue + Send + Sync>;

/// Implemented by anything that contributes uniform providers
/// (camera/frame matrices, lights, materials).
pub trait ProvideAttributes {
    fn provide_attributes(&self, dst: &mut AttributeRegistry);
}

/// Maps attribute ids to value providers.
#[derive(Clone, Default)]
pub struct AttributeRegistry {
    providers: HashMap<AttributeId, Provider>,
}

impl AttributeRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under `id`, returning the provider it replaced.
    pub fn register<F>(&mut self, id: AttributeId, provider: F) -> Option<Provider>
    where
        F: Fn() -> UniformValue + Send + Sync + 'static,
    {
        self.insert(id, Arc::new(provider))
    }

    /// Registers an already shared provider.
    pub fn insert(&mut self, id: AttributeId, provider: Provider) -> Option<Provider> {
        let replaced = self.providers.insert(id.clone(), provider);
        if replaced.is_some() {
            log::debug!("attribute provider `{id}` replaced");
        }
        replaced
    }

    /// Registers a provider that always yields `value`.
    pub fn register_constant(&mut self, id: AttributeId, value: UniformValue) -> Option<Provider> {
        self.register(id, move || value.clone())
    }

    #[inline]
    pub fn get(&self, id: &AttributeId) -> Option<&Provider> {
        self.providers.get(id)
    }

    #[inline]
    pub fn contains(&self, id: &AttributeId) -> bool {
        self.providers.contains_key(id)
    }

    /// Evaluates the provider registered under `id`.
    pub fn evaluate(&self, id: &AttributeId) -> Option<UniformValue> {
        self.providers.get(id).map(|p| p())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &AttributeId> {
        self.providers.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributeId, &Provider)> {
        self.providers.iter()
    }

    /// Copies every provider of `other` into this registry.
    pub fn extend_from(&mut self, other: &AttributeRegistry) {
        for (id, provider) in other.iter() {
            self.insert(id.clone(), Arc::clone(provider));
        }
    }

    /// Collects the providers of `source` into this registry.
    pub fn collect_from(&mut self, source: &dyn ProvideAttributes) {
        source.provide_attributes(self);
    }
}

impl fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.providers.keys().map(AttributeId::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("AttributeRegistry").field("ids", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::builtin;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn register_and_evaluate() {
        let mut reg = AttributeRegistry::new();
        reg.register_constant(builtin::LIGHT_COUNT, UniformValue::Int(3));
        assert_eq!(reg.evaluate(&builtin::LIGHT_COUNT), Some(UniformValue::Int(3)));
        assert_eq!(reg.evaluate(&builtin::LIGHTS), None);
    }

    #[test]
    fn register_replaces_and_returns_previous() {
        let mut reg = AttributeRegistry::new();
        assert!(reg.register_constant(builtin::MATERIAL_COLOR, [1.0; 4].into()).is_none());
        assert!(reg.register_constant(builtin::MATERIAL_COLOR, [0.0; 4].into()).is_some());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.evaluate(&builtin::MATERIAL_COLOR), Some(UniformValue::Vec4([0.0; 4])));
    }

    #[test]
    fn providers_are_reevaluated() {
        let counter = Arc::new(AtomicI32::new(0));
        let mut reg = AttributeRegistry::new();
        let c = Arc::clone(&counter);
        reg.register(AttributeId::new("test.counter"), move || {
            UniformValue::Int(c.fetch_add(1, Ordering::Relaxed))
        });

        let id = AttributeId::new("test.counter");
        assert_eq!(reg.evaluate(&id), Some(UniformValue::Int(0)));
        assert_eq!(reg.evaluate(&id), Some(UniformValue::Int(1)));
    }

    #[test]
    fn owned_and_static_ids_compare_equal() {
        let mut reg = AttributeRegistry::new();
        reg.register_constant(AttributeId::new("builtin.light_count"), UniformValue::Int(1));
        assert!(reg.contains(&builtin::LIGHT_COUNT));
    }
}
