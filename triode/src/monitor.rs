use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::{ContainerError, Instance, MonitorAware, MonitorSlot, TypeKey};

/// Failure reported to a monitor.
pub type Cause<'a> = &'a (dyn Error + Send + Sync + 'static);

/// Describes the constructor a base adapter invokes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constructor {
    declaring: TypeKey,
    parameters: Vec<TypeKey>,
}

impl Constructor {
    pub fn new(declaring: TypeKey, parameters: Vec<TypeKey>) -> Self {
        Self {
            declaring,
            parameters,
        }
    }

    pub fn declaring(&self) -> TypeKey {
        self.declaring
    }

    pub fn parameters(&self) -> &[TypeKey] {
        &self.parameters
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.declaring)?;
        for (i, ty) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

/// Describes a method the container invokes on a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Method {
    declaring: TypeKey,
    name: &'static str,
}

impl Method {
    pub fn new(declaring: TypeKey, name: &'static str) -> Self {
        Self { declaring, name }
    }

    pub fn declaring(&self) -> TypeKey {
        self.declaring
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring, self.name)
    }
}

/// Observer of construction and invocation events.
///
/// Every method has an empty default body. A monitor that wraps another
/// monitor must forward each event to it exactly once with the same
/// arguments.
pub trait ComponentMonitor: Send + Sync {
    /// Called right before the constructor runs.
    fn instantiating(&self, _constructor: &Constructor) {}

    fn instantiated(&self, _constructor: &Constructor, _duration: Duration) {}

    /// Called after a successful construction with the actual parameters.
    ///
    /// Defaults to [`ComponentMonitor::instantiated`].
    fn instantiated_with(
        &self,
        constructor: &Constructor,
        _instance: &Instance,
        _parameters: &[Instance],
        duration: Duration,
    ) {
        self.instantiated(constructor, duration);
    }

    fn instantiation_failed(&self, _constructor: &Constructor, _cause: Cause<'_>) {}

    fn invoking(&self, _method: &Method, _instance: &Instance) {}

    fn invoked(&self, _method: &Method, _instance: &Instance, _duration: Duration) {}

    /// The invoked method returned an error.
    fn invocation_failed(&self, _method: &Method, _instance: &Instance, _cause: Cause<'_>) {}

    /// A lifecycle method panicked.
    fn lifecycle_invocation_failed(
        &self,
        _method: &Method,
        _instance: &Instance,
        _cause: Cause<'_>,
    ) {
    }
}

/// Monitor that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMonitor;

impl ComponentMonitor for NullMonitor {}

/// Monitor that forwards every event to a replaceable delegate.
pub struct DelegatingMonitor {
    delegate: MonitorSlot,
}

impl DelegatingMonitor {
    pub fn new(delegate: Arc<dyn ComponentMonitor>) -> Self {
        Self {
            delegate: MonitorSlot::new(delegate),
        }
    }

    fn delegate(&self) -> Arc<dyn ComponentMonitor> {
        self.delegate.get().unwrap_or_else(|| Arc::new(NullMonitor))
    }
}

impl Default for DelegatingMonitor {
    fn default() -> Self {
        Self::new(Arc::new(NullMonitor))
    }
}

impl MonitorAware for DelegatingMonitor {
    fn change_monitor(&self, monitor: Arc<dyn ComponentMonitor>) {
        self.delegate.set(monitor);
    }

    fn current_monitor(&self) -> Result<Arc<dyn ComponentMonitor>, ContainerError> {
        Ok(self.delegate())
    }
}

impl ComponentMonitor for DelegatingMonitor {
    fn instantiating(&self, constructor: &Constructor) {
        self.delegate().instantiating(constructor);
    }

    fn instantiated(&self, constructor: &Constructor, duration: Duration) {
        self.delegate().instantiated(constructor, duration);
    }

    fn instantiated_with(
        &self,
        constructor: &Constructor,
        instance: &Instance,
        parameters: &[Instance],
        duration: Duration,
    ) {
        self.delegate()
            .instantiated_with(constructor, instance, parameters, duration);
    }

    fn instantiation_failed(&self, constructor: &Constructor, cause: Cause<'_>) {
        self.delegate().instantiation_failed(constructor, cause);
    }

    fn invoking(&self, method: &Method, instance: &Instance) {
        self.delegate().invoking(method, instance);
    }

    fn invoked(&self, method: &Method, instance: &Instance, duration: Duration) {
        self.delegate().invoked(method, instance, duration);
    }

    fn invocation_failed(&self, method: &Method, instance: &Instance, cause: Cause<'_>) {
        self.delegate().invocation_failed(method, instance, cause);
    }

    fn lifecycle_invocation_failed(&self, method: &Method, instance: &Instance, cause: Cause<'_>) {
        self.delegate()
            .lifecycle_invocation_failed(method, instance, cause);
    }
}
