//! # triode-gems
//!
//! Monitors, dependency recording and configuration for triode containers.
//!
//! ## Core Components
//!
//! - **Logging Monitor**: Reports construction and invocation events through `tracing`
//! - **Dependency Recording**: A monitor turning constructor parameters into
//!   dependency notifications, and a graph collecting them
//! - **Configuration System**: JSON configuration with typed sections
//! - **Tracing Integration**: Subscriber setup from the `tracing` config section
//!
//! ## Monitor Chain Example
//!
//! ```rust
//! use std::sync::Arc;
//! use triode::{Component, DefaultContainer, TypeKey};
//! use triode_gems::{Config, DependencyGraph};
//!
//! #[derive(Component)]
//! struct Database;
//!
//! #[derive(Component)]
//! struct Service {
//!     database: Arc<Database>,
//! }
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let config = Config::parse(r#"{"monitor": {"logging": {}, "record_dependencies": true}}"#)?;
//! let graph = Arc::new(DependencyGraph::new());
//! let monitor = config.monitor(&graph)?;
//!
//! let container = DefaultContainer::builder()
//!     .with_monitor(monitor)
//!     .add_component::<Database>()
//!     .add_component::<Service>()
//!     .build();
//! container.get::<Service>()?;
//!
//! assert_eq!(
//!     graph.dependencies_of(&TypeKey::of::<Service>()),
//!     vec![TypeKey::of::<Database>()],
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod config;
mod dependency;
mod graph;
mod logging;
mod monitor;
mod tracing;

pub use config::*;
pub use dependency::*;
pub use graph::*;
pub use logging::*;
pub use monitor::*;
pub use tracing::*;
