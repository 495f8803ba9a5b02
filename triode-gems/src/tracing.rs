use std::str::FromStr as _;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing_subscriber::filter::{Directive, EnvFilter};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use triode::StdError;

use crate::ConfigSection;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TracingConfig {
    #[serde(
        serialize_with = "serialize_level",
        deserialize_with = "deserialize_level",
        default = "default_level"
    )]
    pub level: tracing::Level,
    #[serde(default)]
    pub directives: Vec<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directives: Default::default(),
        }
    }
}

impl ConfigSection for TracingConfig {
    fn key() -> &'static str {
        "tracing"
    }
}

impl TracingConfig {
    /// Filter enabling `level` plus every configured directive.
    pub fn env_filter(&self) -> Result<EnvFilter, StdError> {
        let mut filter = EnvFilter::default();
        for directive in &self.directives {
            filter = filter.add_directive(directive.parse::<Directive>()?);
        }
        Ok(filter.add_directive(self.level.into()))
    }

    /// Installs the global subscriber writing formatted events.
    ///
    /// Fails if a global subscriber is already set.
    pub fn init(&self) -> Result<(), StdError> {
        tracing_subscriber::registry()
            .with(self.env_filter()?)
            .with(tracing_subscriber::fmt::Layer::default())
            .try_init()?;
        Ok(())
    }
}

fn serialize_level<S>(v: &tracing::Level, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(v.as_str())
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<tracing::Level, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    String::deserialize(deserializer)
        .and_then(|v| tracing::Level::from_str(&v).map_err(|v| Error::custom(format!("{v}"))))
}

fn default_level() -> tracing::Level {
    tracing::Level::DEBUG
}
