use std::sync::Arc;

use serde::{Deserialize, Serialize};
use triode::{ComponentMonitor, NullMonitor};

use crate::{ConfigSection, DependencyGraph, DependencyMonitor, LoggingMonitor};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logger name used for every event instead of the declaring type.
    #[serde(default)]
    pub logger: Option<String>,
}

/// Configuration of the monitor chain given to registered components.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub record_dependencies: bool,
}

impl ConfigSection for MonitorConfig {
    fn key() -> &'static str {
        "monitor"
    }
}

impl MonitorConfig {
    /// Builds the configured chain. Logging is the outermost monitor and
    /// dependencies are recorded into `graph`.
    pub fn build(&self, graph: &Arc<DependencyGraph>) -> Arc<dyn ComponentMonitor> {
        let mut monitor: Arc<dyn ComponentMonitor> = Arc::new(NullMonitor);
        if self.record_dependencies {
            monitor = Arc::new(DependencyMonitor::new(graph.clone()).with_delegate(monitor));
        }
        if let Some(logging) = &self.logging {
            let mut logging_monitor = LoggingMonitor::new().with_delegate(monitor);
            if let Some(logger) = &logging.logger {
                logging_monitor = logging_monitor.with_logger(logger);
            }
            monitor = Arc::new(logging_monitor);
        }
        monitor
    }
}
