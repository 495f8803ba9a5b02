use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use triode::{ComponentMonitor, StdError};

use crate::{DependencyGraph, MonitorConfig};

/// Container settings read from JSON, split into named sections.
#[derive(Default, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    sections: BTreeMap<String, serde_json::Value>,
}

/// A typed section of [`Config`] stored under a fixed key.
pub trait ConfigSection: DeserializeOwned {
    fn key() -> &'static str;
}

impl Config {
    pub fn parse<T>(text: T) -> Result<Self, StdError>
    where
        T: AsRef<str>,
    {
        Ok(serde_json::from_str(text.as_ref())?)
    }

    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, StdError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Reading container config");
        let text = std::fs::read_to_string(path)?;
        Self::parse(text)
    }

    /// Returns the section `T`, or `None` when the config does not contain it.
    pub fn section<T>(&self) -> Result<Option<T>, StdError>
    where
        T: ConfigSection,
    {
        match self.sections.get(T::key()) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => Ok(Some(T::deserialize(value)?)),
        }
    }

    /// Monitor chain of the `monitor` section, recording into `graph`.
    ///
    /// A config without that section yields a chain that ignores every event.
    pub fn monitor(
        &self,
        graph: &Arc<DependencyGraph>,
    ) -> Result<Arc<dyn ComponentMonitor>, StdError> {
        let section = self.section::<MonitorConfig>()?.unwrap_or_default();
        Ok(section.build(graph))
    }
}
