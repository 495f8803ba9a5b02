use std::any::{Any, type_name};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::Instant;

use crate::key::{InterfaceTable, Object};
use crate::{
    AdapterVisitor, ComponentAdapter, ComponentKey, ComponentMonitor, Constructor, Container,
    ContainerError, Disposable, Instance, Interfaces, LifecycleAware, LifecyclePhase,
    LifecycleTarget, Method, MonitorAware, MonitorSlot, NullMonitor, Startable, StdError, TypeKey,
    UnsatisfiableDependencies,
};

/// Trait for types the container can construct by injecting their dependencies.
///
/// Usually derived:
///
/// ```rust
/// use std::sync::Arc;
/// use triode::{Component, DefaultContainer};
///
/// #[derive(Component)]
/// struct Database;
///
/// #[derive(Component)]
/// struct Repository {
///     database: Arc<Database>,
/// }
///
/// let container = DefaultContainer::builder()
///     .add_component::<Database>()
///     .add_component::<Repository>()
///     .build();
/// let repository = container.get::<Repository>().unwrap().unwrap();
/// # let _ = &repository.database;
/// ```
pub trait Component: Send + Sync + Sized + 'static {
    /// Parameter types of the constructor, in order.
    fn dependencies() -> Vec<TypeKey> {
        Vec::new()
    }

    /// Builds the component from its resolved parameters.
    fn construct(args: &Arguments) -> Result<Self, StdError>;

    /// Interfaces instances of this component can be viewed as.
    fn interfaces() -> Interfaces<Self> {
        Interfaces::new()
    }
}

/// Resolved constructor parameters, in declaration order.
pub struct Arguments {
    values: Vec<Instance>,
}

impl Arguments {
    pub fn new(values: Vec<Instance>) -> Self {
        Self { values }
    }

    /// Returns the concrete value of parameter `index`.
    pub fn get<T>(&self, index: usize) -> Result<Arc<T>, StdError>
    where
        T: Send + Sync + 'static,
    {
        let instance = self.instance(index)?;
        instance.downcast::<T>().ok_or_else(|| {
            format!("argument {index} ({instance}) is not a {}", type_name::<T>()).into()
        })
    }

    /// Returns parameter `index` viewed as the interface `I`.
    pub fn interface<I>(&self, index: usize) -> Result<Arc<I>, StdError>
    where
        I: ?Sized + 'static,
    {
        let instance = self.instance(index)?;
        instance.interface::<I>().ok_or_else(|| {
            format!("argument {index} ({instance}) does not expose {}", type_name::<I>()).into()
        })
    }

    pub fn instances(&self) -> &[Instance] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn instance(&self, index: usize) -> Result<&Instance, StdError> {
        self.values
            .get(index)
            .ok_or_else(|| format!("missing argument {index}").into())
    }
}

type Build = Arc<dyn Fn(&Arguments) -> Result<Object, StdError> + Send + Sync>;

/// Type-erased description of how to construct one component.
#[derive(Clone)]
pub struct ComponentRecipe {
    constructor: Constructor,
    build: Build,
    interfaces: Arc<InterfaceTable>,
}

impl ComponentRecipe {
    pub fn of<T>() -> Self
    where
        T: Component,
    {
        Self::from_fn(T::dependencies(), T::construct).with_interfaces(T::interfaces())
    }

    /// Recipe from a plain constructor function.
    pub fn from_fn<T, F>(dependencies: Vec<TypeKey>, build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> Result<T, StdError> + Send + Sync + 'static,
    {
        Self {
            constructor: Constructor::new(TypeKey::of::<T>(), dependencies),
            build: Arc::new(move |args| build(args).map(|v| Arc::new(v) as Object)),
            interfaces: Arc::default(),
        }
    }

    /// Replaces the interfaces of the recipe.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not the type the recipe constructs.
    pub fn with_interfaces<T>(mut self, interfaces: Interfaces<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        assert_eq!(
            self.constructor.declaring(),
            TypeKey::of::<T>(),
            "interfaces declared for another type",
        );
        self.interfaces = Arc::new(interfaces.into_table());
        self
    }

    pub fn implementation(&self) -> TypeKey {
        self.constructor.declaring()
    }

    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }
}

/// Base adapter that constructs a component, injecting constructor parameters
/// resolved from the container.
pub struct ConstructorAdapter {
    key: ComponentKey,
    recipe: ComponentRecipe,
    monitor: MonitorSlot,
    this: Weak<ConstructorAdapter>,
}

impl ConstructorAdapter {
    pub fn new<T>(key: impl Into<ComponentKey>) -> Arc<Self>
    where
        T: Component,
    {
        Self::from_recipe(key, ComponentRecipe::of::<T>(), Arc::new(NullMonitor))
    }

    pub fn from_recipe(
        key: impl Into<ComponentKey>,
        recipe: ComponentRecipe,
        monitor: Arc<dyn ComponentMonitor>,
    ) -> Arc<Self> {
        let key = key.into();
        Arc::new_cyclic(|this| Self {
            key,
            recipe,
            monitor: MonitorSlot::new(monitor),
            this: this.clone(),
        })
    }

    pub fn constructor(&self) -> &Constructor {
        self.recipe.constructor()
    }

    fn monitor(&self) -> Arc<dyn ComponentMonitor> {
        self.monitor.get().unwrap_or_else(|| Arc::new(NullMonitor))
    }

    fn has_lifecycle(&self) -> bool {
        let interfaces = &self.recipe.interfaces;
        interfaces.contains(&TypeKey::interface::<dyn Startable>())
            || interfaces.contains(&TypeKey::interface::<dyn Disposable>())
    }

    /// Finds the adapter of every constructor parameter.
    fn dependencies(
        &self,
        container: &dyn Container,
    ) -> Result<Vec<Arc<dyn ComponentAdapter>>, ContainerError> {
        let parameters = self.recipe.constructor.parameters();
        let mut adapters = Vec::with_capacity(parameters.len());
        let mut unsatisfiable = BTreeSet::new();
        for ty in parameters {
            match find_dependency(container, ty)? {
                Some(adapter) => adapters.push(adapter),
                None => {
                    unsatisfiable.insert(*ty);
                }
            }
        }
        if unsatisfiable.is_empty() {
            return Ok(adapters);
        }
        tracing::debug!(
            implementation = %self.implementation(),
            container = %container,
            "Component has unsatisfiable dependencies",
        );
        let this: Arc<dyn ComponentAdapter> = self
            .this
            .upgrade()
            .ok_or_else(|| ContainerError::introspection("Adapter dropped while resolving"))?;
        let leaf = container.handle();
        let report = match (unsatisfiable.len(), unsatisfiable.first().copied()) {
            (1, Some(ty)) => {
                UnsatisfiableDependencies::with_unsatisfied(this, ty, unsatisfiable, leaf)
            }
            _ => UnsatisfiableDependencies::new(this, unsatisfiable, leaf),
        };
        Err(report.into())
    }

    fn invoke(&self, phase: LifecyclePhase, instance: &Instance) -> Result<(), ContainerError> {
        let call: Box<dyn FnOnce() -> Result<(), StdError>> = match phase {
            LifecyclePhase::Start => match instance.managed_interface::<dyn Startable>() {
                Some(v) => Box::new(move || v.start()),
                None => return Ok(()),
            },
            LifecyclePhase::Stop => match instance.managed_interface::<dyn Startable>() {
                Some(v) => Box::new(move || v.stop()),
                None => return Ok(()),
            },
            LifecyclePhase::Dispose => match instance.managed_interface::<dyn Disposable>() {
                Some(v) => Box::new(move || v.dispose()),
                None => return Ok(()),
            },
        };
        let method = Method::new(self.implementation(), phase.method_name());
        let monitor = self.monitor();
        monitor.invoking(&method, instance);
        let started = Instant::now();
        match panic::catch_unwind(AssertUnwindSafe(call)) {
            Ok(Ok(())) => {
                monitor.invoked(&method, instance, started.elapsed());
                Ok(())
            }
            Ok(Err(err)) => {
                monitor.invocation_failed(&method, instance, &*err);
                Err(ContainerError::Invocation {
                    method,
                    source: err,
                })
            }
            Err(payload) => {
                let cause: StdError = panic_message(payload.as_ref()).into();
                monitor.lifecycle_invocation_failed(&method, instance, &*cause);
                Err(ContainerError::Introspection {
                    message: format!("Lifecycle method {method} panicked"),
                    source: Some(cause),
                })
            }
        }
    }
}

impl ComponentAdapter for ConstructorAdapter {
    fn key(&self) -> &ComponentKey {
        &self.key
    }

    fn implementation(&self) -> TypeKey {
        self.recipe.implementation()
    }

    fn interfaces(&self) -> Vec<TypeKey> {
        let mut interfaces: Vec<_> = self.recipe.interfaces.keys().collect();
        interfaces.sort();
        interfaces
    }

    fn resolve(&self, container: &dyn Container) -> Result<Instance, ContainerError> {
        let _guard = CycleGuard::enter(self)?;
        let mut values = Vec::new();
        for adapter in self.dependencies(container)? {
            values.push(adapter.resolve(container)?);
        }
        let arguments = Arguments::new(values);
        let constructor = self.recipe.constructor();
        let monitor = self.monitor();
        monitor.instantiating(constructor);
        let started = Instant::now();
        let built = panic::catch_unwind(AssertUnwindSafe(|| (self.recipe.build)(&arguments)))
            .unwrap_or_else(|payload| {
                Err(format!("constructor panicked: {}", panic_message(payload.as_ref())).into())
            });
        match built {
            Ok(object) => {
                let instance = Instance::from_parts(
                    object,
                    self.implementation(),
                    self.recipe.interfaces.clone(),
                );
                monitor.instantiated_with(
                    constructor,
                    &instance,
                    arguments.instances(),
                    started.elapsed(),
                );
                Ok(instance)
            }
            Err(err) => {
                monitor.instantiation_failed(constructor, &*err);
                Err(ContainerError::Initialization {
                    implementation: self.implementation(),
                    source: err,
                })
            }
        }
    }

    fn verify(&self, container: &dyn Container) -> Result<(), ContainerError> {
        let _guard = CycleGuard::enter(self)?;
        for adapter in self.dependencies(container)? {
            adapter.verify(container)?;
        }
        Ok(())
    }

    fn accept(&self, visitor: &mut dyn AdapterVisitor) {
        visitor.visit_adapter(self);
    }

    fn as_monitor_aware(&self) -> Option<&dyn MonitorAware> {
        Some(self)
    }

    fn as_lifecycle(&self) -> Option<&dyn LifecycleAware> {
        if self.has_lifecycle() {
            Some(self)
        } else {
            None
        }
    }
}

impl MonitorAware for ConstructorAdapter {
    fn change_monitor(&self, monitor: Arc<dyn ComponentMonitor>) {
        self.monitor.set(monitor);
    }

    fn current_monitor(&self) -> Result<Arc<dyn ComponentMonitor>, ContainerError> {
        Ok(self.monitor())
    }
}

impl LifecycleAware for ConstructorAdapter {
    fn lifecycle(
        &self,
        phase: LifecyclePhase,
        target: LifecycleTarget<'_>,
    ) -> Result<(), ContainerError> {
        match target {
            // Nothing is retained at this layer, so there is no instance to manage.
            LifecycleTarget::Container(_) => Ok(()),
            LifecycleTarget::Instance(instance) => self.invoke(phase, instance),
        }
    }
}

impl fmt::Display for ConstructorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor[{}]", self.key)
    }
}

/// Looks up the adapter satisfying a parameter of type `ty`.
///
/// An exact key match wins. Otherwise the nearest container with adapters
/// producing, listing or declaring `ty` is used; several such adapters are
/// ambiguous.
pub(crate) fn find_dependency(
    container: &dyn Container,
    ty: &TypeKey,
) -> Result<Option<Arc<dyn ComponentAdapter>>, ContainerError> {
    if let Some(adapter) = container.find_adapter(&ComponentKey::Type(*ty)) {
        return Ok(Some(adapter));
    }
    let ancestors = container.ancestors();
    let mut scopes: Vec<&dyn Container> = vec![container];
    scopes.extend(ancestors.iter().map(|v| &**v as &dyn Container));
    for scope in scopes {
        let mut candidates: Vec<_> = scope
            .adapters()
            .into_iter()
            .filter(|v| satisfies(&**v, ty))
            .collect();
        match candidates.len() {
            0 => continue,
            1 => return Ok(candidates.pop()),
            n => {
                return Err(ContainerError::introspection(format!(
                    "Ambiguous dependency {ty}: {n} components in {scope} satisfy it"
                )));
            }
        }
    }
    Ok(None)
}

fn satisfies(adapter: &dyn ComponentAdapter, ty: &TypeKey) -> bool {
    adapter.implementation() == *ty
        || adapter.key().covers(ty)
        || (ty.is_interface() && adapter.interfaces().contains(ty))
}

thread_local! {
    static RESOLVING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// Marks an adapter as being resolved on the current thread.
struct CycleGuard(usize);

impl CycleGuard {
    fn enter(adapter: &ConstructorAdapter) -> Result<Self, ContainerError> {
        let id = std::ptr::from_ref(adapter) as usize;
        if !RESOLVING.with(|v| v.borrow_mut().insert(id)) {
            return Err(ContainerError::introspection(format!(
                "Cyclic dependency detected while resolving {}",
                adapter.implementation(),
            )));
        }
        Ok(Self(id))
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        RESOLVING.with(|v| {
            v.borrow_mut().remove(&self.0);
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(v) = payload.downcast_ref::<&str>() {
        (*v).to_owned()
    } else if let Some(v) = payload.downcast_ref::<String>() {
        v.clone()
    } else {
        "unknown panic".to_owned()
    }
}
