use std::sync::Arc;
use std::time::Duration;

use triode::{Cause, ComponentMonitor, Constructor, Instance, Method, NullMonitor, TypeKey};

/// One observed `component -> dependency` relation.
///
/// `dependency` is `None` for components constructed without parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub component: TypeKey,
    pub dependency: Option<TypeKey>,
}

pub trait DependencyListener: Send + Sync {
    fn on_dependency(&self, dependency: Dependency);
}

/// Monitor reporting the actual constructor parameters of every instantiation
/// to a [`DependencyListener`].
pub struct DependencyMonitor {
    listener: Arc<dyn DependencyListener>,
    delegate: Arc<dyn ComponentMonitor>,
}

impl DependencyMonitor {
    pub fn new(listener: Arc<dyn DependencyListener>) -> Self {
        Self {
            listener,
            delegate: Arc::new(NullMonitor),
        }
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn ComponentMonitor>) -> Self {
        self.delegate = delegate;
        self
    }
}

impl ComponentMonitor for DependencyMonitor {
    fn instantiating(&self, constructor: &Constructor) {
        self.delegate.instantiating(constructor);
    }

    fn instantiated(&self, constructor: &Constructor, duration: Duration) {
        self.delegate.instantiated(constructor, duration);
    }

    fn instantiated_with(
        &self,
        constructor: &Constructor,
        instance: &Instance,
        parameters: &[Instance],
        duration: Duration,
    ) {
        let component = instance.implementation();
        if parameters.is_empty() {
            self.listener.on_dependency(Dependency {
                component,
                dependency: None,
            });
        }
        for parameter in parameters {
            self.listener.on_dependency(Dependency {
                component,
                dependency: Some(parameter.implementation()),
            });
        }
        self.delegate
            .instantiated_with(constructor, instance, parameters, duration);
    }

    fn instantiation_failed(&self, constructor: &Constructor, cause: Cause<'_>) {
        self.delegate.instantiation_failed(constructor, cause);
    }

    fn invoking(&self, method: &Method, instance: &Instance) {
        self.delegate.invoking(method, instance);
    }

    fn invoked(&self, method: &Method, instance: &Instance, duration: Duration) {
        self.delegate.invoked(method, instance, duration);
    }

    fn invocation_failed(&self, method: &Method, instance: &Instance, cause: Cause<'_>) {
        self.delegate.invocation_failed(method, instance, cause);
    }

    fn lifecycle_invocation_failed(&self, method: &Method, instance: &Instance, cause: Cause<'_>) {
        self.delegate
            .lifecycle_invocation_failed(method, instance, cause);
    }
}
