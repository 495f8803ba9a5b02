//! The adapter contract shared by every layer of a component's adapter chain.
//!
//! A registered component is served by a linear chain of adapters. Each
//! decorating layer owns exactly one delegate and behaves like it except for
//! the one concern it adds. Optional capabilities are queried explicitly
//! through [`ComponentAdapter::as_monitor_aware`] and
//! [`ComponentAdapter::as_lifecycle`] instead of runtime type tests.

use std::fmt;

use crate::{ComponentKey, Container, ContainerError, Instance, MonitorAware, StdError, TypeKey};

/// A node in an adapter chain responsible for producing instances of one component.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use triode::{ComponentAdapter, ComponentKey, DecoratingAdapter, DefaultContainer, Instance, InstanceAdapter};
///
/// let base = InstanceAdapter::new("greeting", Instance::new(String::from("hello")));
/// let adapter = DecoratingAdapter::new(base);
/// assert_eq!(adapter.key(), &ComponentKey::name("greeting"));
///
/// let container = DefaultContainer::builder().build();
/// let instance = adapter.resolve(&container).unwrap();
/// assert_eq!(instance.downcast::<String>().unwrap().as_str(), "hello");
/// ```
pub trait ComponentAdapter: Send + Sync + fmt::Display {
    /// Key under which the component is registered.
    fn key(&self) -> &ComponentKey;

    /// Concrete type this chain produces.
    fn implementation(&self) -> TypeKey;

    /// Interfaces the produced instances can be viewed as, sorted.
    fn interfaces(&self) -> Vec<TypeKey> {
        Vec::new()
    }

    /// Returns an instance of the component, looking dependencies up in `container`.
    fn resolve(&self, container: &dyn Container) -> Result<Instance, ContainerError>;

    /// Proves the component is satisfiable without instantiating it.
    fn verify(&self, container: &dyn Container) -> Result<(), ContainerError>;

    /// Visits this adapter, then its delegate.
    fn accept(&self, visitor: &mut dyn AdapterVisitor);

    fn as_monitor_aware(&self) -> Option<&dyn MonitorAware> {
        None
    }

    fn as_lifecycle(&self) -> Option<&dyn LifecycleAware> {
        None
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            monitor_aware: self.as_monitor_aware().is_some(),
            lifecycle: self.as_lifecycle().is_some(),
        }
    }
}

impl fmt::Debug for dyn ComponentAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Optional capabilities an adapter opted into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub monitor_aware: bool,
    pub lifecycle: bool,
}

/// Visitor walking containers and adapter chains in pre-order.
pub trait AdapterVisitor {
    fn visit_container(&mut self, _container: &dyn Container) {}

    fn visit_adapter(&mut self, adapter: &dyn ComponentAdapter);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    Start,
    Stop,
    Dispose,
}

impl LifecyclePhase {
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Dispose => "dispose",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// What a lifecycle call is applied to.
#[derive(Clone, Copy)]
pub enum LifecycleTarget<'a> {
    /// The container owning the component; the adapter finds the instance itself.
    Container(&'a dyn Container),
    /// A specific component instance.
    Instance(&'a Instance),
}

impl<'a> From<&'a Instance> for LifecycleTarget<'a> {
    fn from(value: &'a Instance) -> Self {
        Self::Instance(value)
    }
}

impl<'a, C> From<&'a C> for LifecycleTarget<'a>
where
    C: Container,
{
    fn from(value: &'a C) -> Self {
        Self::Container(value)
    }
}

/// Capability of adapters that can start, stop and dispose components.
pub trait LifecycleAware: Send + Sync {
    fn lifecycle(
        &self,
        phase: LifecyclePhase,
        target: LifecycleTarget<'_>,
    ) -> Result<(), ContainerError>;

    fn start(&self, target: LifecycleTarget<'_>) -> Result<(), ContainerError> {
        self.lifecycle(LifecyclePhase::Start, target)
    }

    fn stop(&self, target: LifecycleTarget<'_>) -> Result<(), ContainerError> {
        self.lifecycle(LifecyclePhase::Stop, target)
    }

    fn dispose(&self, target: LifecycleTarget<'_>) -> Result<(), ContainerError> {
        self.lifecycle(LifecyclePhase::Dispose, target)
    }
}

/// Components that can be started and stopped by the container.
///
/// Declare it with `#[implements(dyn Startable)]` so the container can see it.
pub trait Startable: Send + Sync {
    fn start(&self) -> Result<(), StdError>;

    fn stop(&self) -> Result<(), StdError>;
}

/// Components holding resources released when the container is disposed.
pub trait Disposable: Send + Sync {
    fn dispose(&self) -> Result<(), StdError>;
}
