use std::fmt;
use std::sync::Arc;

use crate::{
    AdapterVisitor, ComponentAdapter, ComponentKey, ComponentMonitor, Container, ContainerError,
    Instance, LifecycleAware, LifecyclePhase, LifecycleTarget, MonitorAware, MonitorSlot, TypeKey,
};

/// The one concern a [`DecoratingAdapter`] adds on top of its delegate.
///
/// Every hook defaults to plain delegation, so a decoration only overrides
/// what it intercepts.
pub trait Decoration: Send + Sync + 'static {
    /// Short name used when displaying the adapter chain.
    const NAME: &'static str;

    fn resolve(
        &self,
        delegate: &Arc<dyn ComponentAdapter>,
        container: &dyn Container,
    ) -> Result<Instance, ContainerError> {
        delegate.resolve(container)
    }

    fn verify(
        &self,
        delegate: &Arc<dyn ComponentAdapter>,
        container: &dyn Container,
    ) -> Result<(), ContainerError> {
        delegate.verify(container)
    }

    fn interfaces(&self, delegate: &Arc<dyn ComponentAdapter>) -> Vec<TypeKey> {
        delegate.interfaces()
    }

    /// Whether the decorated adapter advertises the lifecycle capability.
    fn manages_lifecycle(&self, delegate: &Arc<dyn ComponentAdapter>) -> bool {
        delegate.as_lifecycle().is_some()
    }

    fn lifecycle(
        &self,
        delegate: &Arc<dyn ComponentAdapter>,
        phase: LifecyclePhase,
        target: LifecycleTarget<'_>,
    ) -> Result<(), ContainerError> {
        match delegate.as_lifecycle() {
            Some(v) => v.lifecycle(phase, target),
            None => Ok(()),
        }
    }
}

/// Decoration that adds nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl Decoration for PassThrough {
    const NAME: &'static str = "Decorating";
}

/// Adapter that wraps another adapter and behaves like it, apart from its decoration.
///
/// The decorating adapter is always monitor-aware. A monitor change is
/// forwarded to the delegate only if the delegate is monitor-aware itself,
/// so layers that did not opt in are never touched.
pub struct DecoratingAdapter<D = PassThrough> {
    delegate: Arc<dyn ComponentAdapter>,
    monitor: MonitorSlot,
    decoration: D,
}

impl DecoratingAdapter<PassThrough> {
    pub fn new(delegate: Arc<dyn ComponentAdapter>) -> Self {
        Self::with_decoration(delegate, PassThrough)
    }
}

impl<D> DecoratingAdapter<D>
where
    D: Decoration,
{
    pub fn with_decoration(delegate: Arc<dyn ComponentAdapter>, decoration: D) -> Self {
        Self {
            delegate,
            monitor: MonitorSlot::empty(),
            decoration,
        }
    }

    /// Gives this layer a monitor of its own.
    pub fn with_monitor(self, monitor: Arc<dyn ComponentMonitor>) -> Self {
        self.monitor.set(monitor);
        self
    }

    pub fn delegate(&self) -> &Arc<dyn ComponentAdapter> {
        &self.delegate
    }

    pub fn decoration(&self) -> &D {
        &self.decoration
    }
}

impl<D> ComponentAdapter for DecoratingAdapter<D>
where
    D: Decoration,
{
    fn key(&self) -> &ComponentKey {
        self.delegate.key()
    }

    fn implementation(&self) -> TypeKey {
        self.delegate.implementation()
    }

    fn interfaces(&self) -> Vec<TypeKey> {
        self.decoration.interfaces(&self.delegate)
    }

    fn resolve(&self, container: &dyn Container) -> Result<Instance, ContainerError> {
        self.decoration.resolve(&self.delegate, container)
    }

    fn verify(&self, container: &dyn Container) -> Result<(), ContainerError> {
        self.decoration.verify(&self.delegate, container)
    }

    fn accept(&self, visitor: &mut dyn AdapterVisitor) {
        visitor.visit_adapter(self);
        self.delegate.accept(visitor);
    }

    fn as_monitor_aware(&self) -> Option<&dyn MonitorAware> {
        Some(self)
    }

    fn as_lifecycle(&self) -> Option<&dyn LifecycleAware> {
        if self.decoration.manages_lifecycle(&self.delegate) {
            Some(self)
        } else {
            None
        }
    }
}

impl<D> MonitorAware for DecoratingAdapter<D>
where
    D: Decoration,
{
    fn change_monitor(&self, monitor: Arc<dyn ComponentMonitor>) {
        self.monitor.replace(monitor.clone());
        if let Some(delegate) = self.delegate.as_monitor_aware() {
            delegate.change_monitor(monitor);
        }
    }

    fn current_monitor(&self) -> Result<Arc<dyn ComponentMonitor>, ContainerError> {
        if let Some(monitor) = self.monitor.get() {
            return Ok(monitor);
        }
        match self.delegate.as_monitor_aware() {
            Some(delegate) => delegate.current_monitor(),
            None => Err(ContainerError::introspection(
                "No component monitor found in delegate",
            )),
        }
    }
}

/// Start, stop and dispose are ignored when the delegate cannot manage lifecycle.
impl<D> LifecycleAware for DecoratingAdapter<D>
where
    D: Decoration,
{
    fn lifecycle(
        &self,
        phase: LifecyclePhase,
        target: LifecycleTarget<'_>,
    ) -> Result<(), ContainerError> {
        self.decoration.lifecycle(&self.delegate, phase, target)
    }
}

impl<D> fmt::Display for DecoratingAdapter<D>
where
    D: Decoration,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", D::NAME, self.delegate)
    }
}
