//! # triode
//!
//! An inversion-of-control container core built around chains of component
//! adapters.
//!
//! ## Core Concepts
//!
//! - **Component adapter**: Produces instances of one registered component.
//!   Adapters are stacked into a chain where every decorating layer owns one
//!   delegate and adds exactly one concern
//! - **Component monitor**: Observer notified when components are constructed
//!   and when lifecycle methods are invoked
//! - **Implementation hiding**: Serving a component only through the
//!   interfaces it was registered under
//! - **Container**: Where adapters look up the dependencies of the components
//!   they construct
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use triode::{Component, DefaultContainer};
//!
//! #[derive(Component)]
//! struct Config;
//!
//! #[derive(Component)]
//! struct Database {
//!     config: Arc<Config>,
//! }
//!
//! let container = DefaultContainer::builder()
//!     .add_component::<Config>()
//!     .add_component::<Database>()
//!     .build();
//!
//! let database = container.get::<Database>().unwrap().unwrap();
//! let config = container.get::<Config>().unwrap().unwrap();
//! assert!(Arc::ptr_eq(&database.config, &config));
//! ```
//!
//! ## Hiding Implementations
//!
//! Components registered under interface keys can be wrapped in a
//! [`HidingAdapter`]; callers then only see the interfaces:
//!
//! ```rust
//! use std::sync::Arc;
//! use triode::{
//!     CachingAdapterFactory, Component, ComponentKey, DefaultContainer, HidingAdapterFactory,
//! };
//!
//! trait Store: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! #[derive(Component)]
//! #[implements(dyn Store)]
//! struct MemoryStore;
//!
//! impl Store for MemoryStore {
//!     fn name(&self) -> &'static str {
//!         "memory"
//!     }
//! }
//!
//! let factory = HidingAdapterFactory::new(Arc::new(CachingAdapterFactory::default()));
//! let container = DefaultContainer::builder()
//!     .with_factory(Arc::new(factory))
//!     .add_component_with_key::<MemoryStore>(ComponentKey::interface::<dyn Store>())
//!     .build();
//!
//! let store = container.get_interface::<dyn Store>().unwrap().unwrap();
//! assert_eq!(store.name(), "memory");
//! assert!(container.get::<MemoryStore>().unwrap().is_none());
//! ```
//!
//! ## Features
//!
//! - `macros` (default): Enables `#[derive(Component)]`

mod adapter;
mod caching;
mod constructor;
mod container;
mod decorating;
mod error;
mod factory;
mod hiding;
mod instance;
mod key;
mod monitor;
mod monitoring;

pub use adapter::*;
pub use caching::*;
pub use constructor::*;
pub use container::*;
pub use decorating::*;
pub use error::*;
pub use factory::*;
pub use hiding::*;
pub use instance::*;
pub use key::*;
pub use monitor::*;
pub use monitoring::*;

#[cfg(feature = "macros")]
pub use triode_macros::*;
