use std::sync::Arc;

use crate::{
    CachingAdapter, ComponentAdapter, ComponentKey, ComponentMonitor, ComponentRecipe,
    ConstructorAdapter, HidingAdapter,
};

/// Creates the adapter chain for a component registered from a recipe.
pub trait AdapterFactory: Send + Sync {
    fn create_adapter(
        &self,
        key: ComponentKey,
        recipe: ComponentRecipe,
        monitor: Arc<dyn ComponentMonitor>,
    ) -> Arc<dyn ComponentAdapter>;
}

/// Produces bare [`ConstructorAdapter`]s: every resolve constructs a new instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstructorAdapterFactory;

impl AdapterFactory for ConstructorAdapterFactory {
    fn create_adapter(
        &self,
        key: ComponentKey,
        recipe: ComponentRecipe,
        monitor: Arc<dyn ComponentMonitor>,
    ) -> Arc<dyn ComponentAdapter> {
        ConstructorAdapter::from_recipe(key, recipe, monitor)
    }
}

/// Wraps the adapters of another factory in a [`CachingAdapter`].
pub struct CachingAdapterFactory {
    inner: Arc<dyn AdapterFactory>,
}

impl CachingAdapterFactory {
    pub fn new(inner: Arc<dyn AdapterFactory>) -> Self {
        Self { inner }
    }
}

impl Default for CachingAdapterFactory {
    fn default() -> Self {
        Self::new(Arc::new(ConstructorAdapterFactory))
    }
}

impl AdapterFactory for CachingAdapterFactory {
    fn create_adapter(
        &self,
        key: ComponentKey,
        recipe: ComponentRecipe,
        monitor: Arc<dyn ComponentMonitor>,
    ) -> Arc<dyn ComponentAdapter> {
        let delegate = self.inner.create_adapter(key, recipe, monitor);
        Arc::new(CachingAdapter::caching(delegate))
    }
}

/// Wraps the adapters of another factory in a [`HidingAdapter`].
pub struct HidingAdapterFactory {
    inner: Arc<dyn AdapterFactory>,
    strict: bool,
}

impl HidingAdapterFactory {
    /// Strict hiding: components must be registered with interface keys.
    pub fn new(inner: Arc<dyn AdapterFactory>) -> Self {
        Self {
            inner,
            strict: true,
        }
    }

    /// Components registered with other keys are served unhidden.
    pub fn non_strict(inner: Arc<dyn AdapterFactory>) -> Self {
        Self {
            inner,
            strict: false,
        }
    }
}

impl AdapterFactory for HidingAdapterFactory {
    fn create_adapter(
        &self,
        key: ComponentKey,
        recipe: ComponentRecipe,
        monitor: Arc<dyn ComponentMonitor>,
    ) -> Arc<dyn ComponentAdapter> {
        let delegate = self.inner.create_adapter(key, recipe, monitor);
        Arc::new(HidingAdapter::hiding(delegate, self.strict))
    }
}
