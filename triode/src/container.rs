use std::collections::{HashMap, hash_map};
use std::fmt;
use std::mem::take;
use std::sync::Arc;

use crate::constructor::find_dependency;
use crate::{
    AdapterFactory, AdapterVisitor, CachingAdapterFactory, Component, ComponentAdapter,
    ComponentKey, ComponentMonitor, ComponentRecipe, ContainerError, Instance, InstanceAdapter,
    LifecyclePhase, LifecycleTarget, MonitorAware, MonitorSlot, NullMonitor, TypeKey,
};

/// Identity of a container, stable for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(usize);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// The lookup surface adapters see while resolving.
pub trait Container: Send + Sync + fmt::Display {
    fn id(&self) -> ContainerId;

    /// Adapter registered under `key` in this container or one of its ancestors.
    fn find_adapter(&self, key: &ComponentKey) -> Option<Arc<dyn ComponentAdapter>>;

    /// Adapters registered directly in this container, in registration order.
    fn adapters(&self) -> Vec<Arc<dyn ComponentAdapter>>;

    fn parent(&self) -> Option<Arc<dyn Container>>;

    /// Parent, grandparent and so on, nearest first.
    fn ancestors(&self) -> Vec<Arc<dyn Container>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(container) = current {
            current = container.parent();
            ancestors.push(container);
        }
        ancestors
    }

    /// Owned handle to this container.
    fn handle(&self) -> Arc<dyn Container>;
}

struct Inner {
    name: Option<String>,
    adapters: Vec<Arc<dyn ComponentAdapter>>,
    index: HashMap<ComponentKey, usize>,
    parent: Option<Arc<dyn Container>>,
    monitor: MonitorSlot,
}

/// Container holding a fixed set of adapters, optionally nested in a parent.
///
/// Cloning is cheap: clones share the same adapters.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use triode::{Component, DefaultContainer};
///
/// #[derive(Component)]
/// struct Clock;
///
/// let container = DefaultContainer::builder()
///     .with_name("app")
///     .add_component::<Clock>()
///     .build();
///
/// let first = container.get::<Clock>().unwrap().unwrap();
/// let second = container.get::<Clock>().unwrap().unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Clone)]
pub struct DefaultContainer {
    inner: Arc<Inner>,
}

impl DefaultContainer {
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Builder for a container nested in this one.
    pub fn child(&self) -> ContainerBuilder {
        let mut builder = ContainerBuilder::new();
        builder.with_parent(self);
        builder
    }

    /// Resolves the component registered under `key`.
    ///
    /// Returns `Ok(None)` when no adapter is registered under `key`.
    pub fn instance(
        &self,
        key: impl Into<ComponentKey>,
    ) -> Result<Option<Instance>, ContainerError> {
        let key = key.into();
        match self.find_adapter(&key) {
            Some(adapter) => adapter.resolve(self).map(Some),
            None => Ok(None),
        }
    }

    /// Resolves the component of concrete type `T`.
    ///
    /// Hidden components are never returned by concrete type.
    pub fn get<T>(&self) -> Result<Option<Arc<T>>, ContainerError>
    where
        T: Send + Sync + 'static,
    {
        let instance = self.resolve_type(&TypeKey::of::<T>())?;
        Ok(instance.and_then(|v| v.downcast::<T>()))
    }

    /// Resolves the component exposing the interface `I`.
    pub fn get_interface<I>(&self) -> Result<Option<Arc<I>>, ContainerError>
    where
        I: ?Sized + 'static,
    {
        let instance = self.resolve_type(&TypeKey::interface::<I>())?;
        Ok(instance.and_then(|v| v.interface::<I>()))
    }

    /// Visits this container, then every adapter chain in registration order.
    pub fn accept(&self, visitor: &mut dyn AdapterVisitor) {
        visitor.visit_container(self);
        for adapter in &self.inner.adapters {
            adapter.accept(visitor);
        }
    }

    /// Checks that every registered component can be satisfied.
    pub fn verify(&self) -> Result<(), ContainerError> {
        let errors: Vec<_> = self
            .inner
            .adapters
            .iter()
            .filter_map(|v| v.verify(self).err())
            .collect();
        if errors.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            container = %self,
            failures = errors.len(),
            "Container verification failed",
        );
        Err(ContainerError::Verification(errors))
    }

    /// Starts lifecycle-aware components in registration order.
    pub fn start(&self) -> Result<(), ContainerError> {
        self.lifecycle(LifecyclePhase::Start)
    }

    /// Stops lifecycle-aware components in reverse registration order.
    pub fn stop(&self) -> Result<(), ContainerError> {
        self.lifecycle(LifecyclePhase::Stop)
    }

    /// Disposes lifecycle-aware components in reverse registration order.
    pub fn dispose(&self) -> Result<(), ContainerError> {
        self.lifecycle(LifecyclePhase::Dispose)
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    fn lifecycle(&self, phase: LifecyclePhase) -> Result<(), ContainerError> {
        tracing::debug!(container = %self, %phase, "Running lifecycle phase");
        let adapters: Box<dyn Iterator<Item = &Arc<dyn ComponentAdapter>>> = match phase {
            LifecyclePhase::Start => Box::new(self.inner.adapters.iter()),
            LifecyclePhase::Stop | LifecyclePhase::Dispose => {
                Box::new(self.inner.adapters.iter().rev())
            }
        };
        for adapter in adapters {
            if let Some(lifecycle) = adapter.as_lifecycle() {
                tracing::trace!(adapter = %adapter, %phase, "Applying lifecycle");
                lifecycle.lifecycle(phase, LifecycleTarget::Container(self))?;
            }
        }
        Ok(())
    }

    fn resolve_type(&self, ty: &TypeKey) -> Result<Option<Instance>, ContainerError> {
        match find_dependency(self, ty)? {
            Some(adapter) => {
                tracing::trace!(container = %self, component = %ty, "Resolving component");
                adapter.resolve(self).map(Some)
            }
            None => Ok(None),
        }
    }
}

impl Container for DefaultContainer {
    fn id(&self) -> ContainerId {
        ContainerId(Arc::as_ptr(&self.inner) as usize)
    }

    fn find_adapter(&self, key: &ComponentKey) -> Option<Arc<dyn ComponentAdapter>> {
        match self.inner.index.get(key) {
            Some(&index) => Some(self.inner.adapters[index].clone()),
            None => self.inner.parent.as_ref()?.find_adapter(key),
        }
    }

    fn adapters(&self) -> Vec<Arc<dyn ComponentAdapter>> {
        self.inner.adapters.clone()
    }

    fn parent(&self) -> Option<Arc<dyn Container>> {
        self.inner.parent.clone()
    }

    fn handle(&self) -> Arc<dyn Container> {
        Arc::new(self.clone())
    }
}

/// Monitor changes are forwarded to every monitor-aware adapter of this container.
impl MonitorAware for DefaultContainer {
    fn change_monitor(&self, monitor: Arc<dyn ComponentMonitor>) {
        self.inner.monitor.set(monitor.clone());
        for adapter in &self.inner.adapters {
            if let Some(aware) = adapter.as_monitor_aware() {
                aware.change_monitor(monitor.clone());
            }
        }
    }

    fn current_monitor(&self) -> Result<Arc<dyn ComponentMonitor>, ContainerError> {
        self.inner
            .monitor
            .get()
            .ok_or_else(|| ContainerError::introspection("No component monitor found in container"))
    }
}

impl fmt::Display for DefaultContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.name {
            Some(name) => f.write_str(name),
            None => write!(f, "DefaultContainer{}", self.id()),
        }
    }
}

impl fmt::Debug for DefaultContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultContainer")
            .field("id", &self.id())
            .field("name", &self.inner.name)
            .field("adapters", &self.inner.adapters)
            .finish()
    }
}

/// Builder registering the components of a [`DefaultContainer`].
///
/// Components registered from recipes are created by the configured
/// [`AdapterFactory`] (caching over constructor injection by default) and get
/// the monitor configured at the time of registration.
pub struct ContainerBuilder {
    name: Option<String>,
    monitor: Arc<dyn ComponentMonitor>,
    factory: Arc<dyn AdapterFactory>,
    parent: Option<Arc<dyn Container>>,
    adapters: Vec<Arc<dyn ComponentAdapter>>,
    index: HashMap<ComponentKey, usize>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            monitor: Arc::new(NullMonitor),
            factory: Arc::new(CachingAdapterFactory::default()),
            parent: None,
            adapters: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Monitor given to adapters created by subsequent registrations.
    pub fn with_monitor(&mut self, monitor: Arc<dyn ComponentMonitor>) -> &mut Self {
        self.monitor = monitor;
        self
    }

    /// Factory used by subsequent registrations.
    pub fn with_factory(&mut self, factory: Arc<dyn AdapterFactory>) -> &mut Self {
        self.factory = factory;
        self
    }

    pub fn with_parent(&mut self, parent: &dyn Container) -> &mut Self {
        self.parent = Some(parent.handle());
        self
    }

    /// Registers a ready-made adapter chain.
    ///
    /// # Panics
    ///
    /// Panics if an adapter with the same key has already been added.
    pub fn add_adapter(&mut self, adapter: Arc<dyn ComponentAdapter>) -> &mut Self {
        let key = adapter.key().clone();
        match self.index.entry(key) {
            hash_map::Entry::Occupied(v) => panic!("Component {} already added", v.key()),
            hash_map::Entry::Vacant(v) => {
                tracing::trace!(key = %v.key(), adapter = %adapter, "Registering component");
                v.insert(self.adapters.len());
                self.adapters.push(adapter);
            }
        };
        self
    }

    /// Registers `T` under its own type.
    pub fn add_component<T>(&mut self) -> &mut Self
    where
        T: Component,
    {
        self.add_component_with_key::<T>(ComponentKey::of::<T>())
    }

    pub fn add_component_with_key<T>(&mut self, key: impl Into<ComponentKey>) -> &mut Self
    where
        T: Component,
    {
        self.add_recipe(key, ComponentRecipe::of::<T>())
    }

    pub fn add_recipe(
        &mut self,
        key: impl Into<ComponentKey>,
        recipe: ComponentRecipe,
    ) -> &mut Self {
        let adapter = self
            .factory
            .create_adapter(key.into(), recipe, self.monitor.clone());
        self.add_adapter(adapter)
    }

    /// Registers a pre-built value under its own type.
    pub fn add_instance<T>(&mut self, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.add_instance_with_key(ComponentKey::of::<T>(), Instance::new(value))
    }

    pub fn add_instance_with_key(
        &mut self,
        key: impl Into<ComponentKey>,
        instance: Instance,
    ) -> &mut Self {
        self.add_adapter(InstanceAdapter::new(key, instance))
    }

    pub fn has_adapter(&self, key: &ComponentKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn build(&mut self) -> DefaultContainer {
        let inner = Inner {
            name: take(&mut self.name),
            adapters: take(&mut self.adapters),
            index: take(&mut self.index),
            parent: take(&mut self.parent),
            monitor: MonitorSlot::new(self.monitor.clone()),
        };
        let container = DefaultContainer {
            inner: Arc::new(inner),
        };
        tracing::debug!(
            container = %container,
            components = container.inner.adapters.len(),
            "Container built",
        );
        container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
