use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    ComponentAdapter, Container, ContainerError, DecoratingAdapter, Decoration, Instance,
    LifecyclePhase, LifecycleTarget,
};

/// Adapter that keeps the first instance its delegate produces.
pub type CachingAdapter = DecoratingAdapter<Caching>;

#[derive(Default)]
struct State {
    instance: Option<Instance>,
    started: bool,
    disposed: bool,
}

/// Caches one instance and drives its lifecycle when asked with a container target.
#[derive(Default)]
pub struct Caching {
    state: Mutex<State>,
}

impl Caching {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the cached instance so the next resolve constructs a new one.
    pub fn flush(&self) {
        self.lock().instance = None;
    }

    pub fn cached(&self) -> Option<Instance> {
        self.lock().instance.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn instance(
        &self,
        delegate: &Arc<dyn ComponentAdapter>,
        container: &dyn Container,
    ) -> Result<Instance, ContainerError> {
        if let Some(instance) = self.cached() {
            return Ok(instance);
        }
        // The lock is not held while the delegate resolves, so a racing
        // thread may construct too; the first stored instance wins.
        let instance = delegate.resolve(container)?;
        let mut state = self.lock();
        Ok(state.instance.get_or_insert(instance).clone())
    }

    fn check(&self, phase: LifecyclePhase) -> Result<(), ContainerError> {
        let state = self.lock();
        if state.disposed {
            return Err(ContainerError::introspection("Already disposed"));
        }
        match phase {
            LifecyclePhase::Start if state.started => {
                Err(ContainerError::introspection("Already started"))
            }
            LifecyclePhase::Stop if !state.started => {
                Err(ContainerError::introspection("Not started"))
            }
            _ => Ok(()),
        }
    }
}

impl Decoration for Caching {
    const NAME: &'static str = "Caching";

    fn resolve(
        &self,
        delegate: &Arc<dyn ComponentAdapter>,
        container: &dyn Container,
    ) -> Result<Instance, ContainerError> {
        self.instance(delegate, container)
    }

    fn lifecycle(
        &self,
        delegate: &Arc<dyn ComponentAdapter>,
        phase: LifecyclePhase,
        target: LifecycleTarget<'_>,
    ) -> Result<(), ContainerError> {
        let Some(lifecycle) = delegate.as_lifecycle() else {
            return Ok(());
        };
        let container = match target {
            LifecycleTarget::Container(v) => v,
            LifecycleTarget::Instance(_) => return lifecycle.lifecycle(phase, target),
        };
        self.check(phase)?;
        let instance = self.instance(delegate, container)?;
        lifecycle.lifecycle(phase, LifecycleTarget::Instance(&instance))?;
        let mut state = self.lock();
        match phase {
            LifecyclePhase::Start => state.started = true,
            LifecyclePhase::Stop => state.started = false,
            LifecyclePhase::Dispose => state.disposed = true,
        }
        Ok(())
    }
}

impl CachingAdapter {
    pub fn caching(delegate: Arc<dyn ComponentAdapter>) -> Self {
        Self::with_decoration(delegate, Caching::new())
    }

    pub fn flush(&self) {
        self.decoration().flush();
    }
}
