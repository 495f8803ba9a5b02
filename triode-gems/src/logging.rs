use std::sync::Arc;
use std::time::Duration;

use triode::{Cause, ComponentMonitor, Constructor, Instance, Method, NullMonitor, TypeKey};

/// Monitor that reports every event through `tracing` and then forwards it.
///
/// Successful events are logged at `DEBUG`, failures at `WARN`. The `logger`
/// field carries the configured logger name or, when none is configured, the
/// type declaring the constructor or method.
pub struct LoggingMonitor {
    logger: Option<String>,
    delegate: Arc<dyn ComponentMonitor>,
}

impl LoggingMonitor {
    pub fn new() -> Self {
        Self {
            logger: None,
            delegate: Arc::new(NullMonitor),
        }
    }

    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn ComponentMonitor>) -> Self {
        self.delegate = delegate;
        self
    }

    fn logger<'a>(&'a self, declaring: &TypeKey) -> &'a str {
        self.logger.as_deref().unwrap_or(declaring.name())
    }
}

impl Default for LoggingMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentMonitor for LoggingMonitor {
    fn instantiating(&self, constructor: &Constructor) {
        tracing::debug!(
            logger = self.logger(&constructor.declaring()),
            %constructor,
            "Instantiating component",
        );
        self.delegate.instantiating(constructor);
    }

    fn instantiated(&self, constructor: &Constructor, duration: Duration) {
        tracing::debug!(
            logger = self.logger(&constructor.declaring()),
            %constructor,
            ?duration,
            "Instantiated component",
        );
        self.delegate.instantiated(constructor, duration);
    }

    fn instantiated_with(
        &self,
        constructor: &Constructor,
        instance: &Instance,
        parameters: &[Instance],
        duration: Duration,
    ) {
        tracing::debug!(
            logger = self.logger(&constructor.declaring()),
            %constructor,
            %instance,
            parameters = ?parameters,
            ?duration,
            "Instantiated component",
        );
        self.delegate
            .instantiated_with(constructor, instance, parameters, duration);
    }

    fn instantiation_failed(&self, constructor: &Constructor, cause: Cause<'_>) {
        tracing::warn!(
            logger = self.logger(&constructor.declaring()),
            %constructor,
            error = %cause,
            "Failed to instantiate component",
        );
        self.delegate.instantiation_failed(constructor, cause);
    }

    fn invoking(&self, method: &Method, instance: &Instance) {
        tracing::debug!(
            logger = self.logger(&method.declaring()),
            %method,
            %instance,
            "Invoking method",
        );
        self.delegate.invoking(method, instance);
    }

    fn invoked(&self, method: &Method, instance: &Instance, duration: Duration) {
        tracing::debug!(
            logger = self.logger(&method.declaring()),
            %method,
            %instance,
            ?duration,
            "Invoked method",
        );
        self.delegate.invoked(method, instance, duration);
    }

    fn invocation_failed(&self, method: &Method, instance: &Instance, cause: Cause<'_>) {
        tracing::warn!(
            logger = self.logger(&method.declaring()),
            %method,
            %instance,
            error = %cause,
            "Method invocation failed",
        );
        self.delegate.invocation_failed(method, instance, cause);
    }

    fn lifecycle_invocation_failed(&self, method: &Method, instance: &Instance, cause: Cause<'_>) {
        tracing::warn!(
            logger = self.logger(&method.declaring()),
            %method,
            %instance,
            error = %cause,
            "Lifecycle method panicked",
        );
        self.delegate
            .lifecycle_invocation_failed(method, instance, cause);
    }
}
