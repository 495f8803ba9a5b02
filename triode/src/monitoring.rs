use std::sync::{Arc, PoisonError, RwLock};

use crate::{ComponentMonitor, ContainerError};

/// Capability of adapters (and monitors) whose monitor can be re-bound at runtime.
pub trait MonitorAware: Send + Sync {
    /// Replaces the monitor of this layer and of every monitor-aware layer below it.
    fn change_monitor(&self, monitor: Arc<dyn ComponentMonitor>);

    /// Returns the monitor currently in effect for this layer.
    fn current_monitor(&self) -> Result<Arc<dyn ComponentMonitor>, ContainerError>;
}

/// Monitor reference held by a monitor-aware layer.
///
/// Readers always observe either the old or the new monitor. Events started
/// under the old monitor finish under it.
#[derive(Default)]
pub struct MonitorSlot {
    monitor: RwLock<Option<Arc<dyn ComponentMonitor>>>,
}

impl MonitorSlot {
    pub fn new(monitor: Arc<dyn ComponentMonitor>) -> Self {
        Self {
            monitor: RwLock::new(Some(monitor)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<dyn ComponentMonitor>> {
        self.monitor
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, monitor: Arc<dyn ComponentMonitor>) {
        *self.monitor.write().unwrap_or_else(PoisonError::into_inner) = Some(monitor);
    }

    /// Replaces the monitor only if one is already stored.
    pub fn replace(&self, monitor: Arc<dyn ComponentMonitor>) -> bool {
        let mut slot = self.monitor.write().unwrap_or_else(PoisonError::into_inner);
        match slot.as_mut() {
            Some(v) => {
                *v = monitor;
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.monitor
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
