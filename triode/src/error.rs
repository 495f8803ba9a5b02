use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::key::write_types;
use crate::{ComponentAdapter, Container, Method, TypeKey};

/// Type alias for boxed errors that can be sent across threads.
///
/// Constructors and lifecycle methods of user components report failures
/// with this type.
pub type StdError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by adapters and containers.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Some constructor parameters could not be resolved.
    #[error(transparent)]
    Unsatisfiable(Box<UnsatisfiableDependencies>),
    /// A structural problem in the configuration of a component.
    #[error("{message}")]
    Introspection {
        message: String,
        #[source]
        source: Option<StdError>,
    },
    /// The component constructor returned an error.
    #[error("{implementation} could not be instantiated: {source}")]
    Initialization {
        implementation: TypeKey,
        #[source]
        source: StdError,
    },
    /// A method invoked by the container returned an error.
    #[error("{method} failed: {source}")]
    Invocation {
        method: Method,
        #[source]
        source: StdError,
    },
    /// Container verification found unsatisfiable components.
    #[error("{} component(s) failed verification", .0.len())]
    Verification(Vec<ContainerError>),
}

impl ContainerError {
    pub fn introspection(message: impl Into<String>) -> Self {
        Self::Introspection {
            message: message.into(),
            source: None,
        }
    }

    pub fn is_introspection(&self) -> bool {
        matches!(self, Self::Introspection { .. })
    }

    /// Returns the unsatisfied-dependency report, if that is what this error is.
    pub fn as_unsatisfiable(&self) -> Option<&UnsatisfiableDependencies> {
        match self {
            Self::Unsatisfiable(v) => Some(v),
            _ => None,
        }
    }
}

impl From<UnsatisfiableDependencies> for ContainerError {
    fn from(value: UnsatisfiableDependencies) -> Self {
        Self::Unsatisfiable(Box::new(value))
    }
}

/// Report raised when an adapter cannot resolve constructor parameters.
#[derive(thiserror::Error)]
#[error("{message}")]
pub struct UnsatisfiableDependencies {
    adapter: Arc<dyn ComponentAdapter>,
    unsatisfiable: BTreeSet<TypeKey>,
    unsatisfied: Option<TypeKey>,
    leaf: Arc<dyn Container>,
    message: String,
}

impl UnsatisfiableDependencies {
    pub fn new(
        adapter: Arc<dyn ComponentAdapter>,
        unsatisfiable: BTreeSet<TypeKey>,
        leaf: Arc<dyn Container>,
    ) -> Self {
        let message = format!(
            "{} has unsatisfiable dependencies: {} where {} was the leaf container being asked for deps.",
            adapter.implementation(),
            TypeList(&unsatisfiable),
            leaf,
        );
        Self {
            adapter,
            unsatisfiable,
            unsatisfied: None,
            leaf,
            message,
        }
    }

    /// Same as [`UnsatisfiableDependencies::new`] with the failure pinpointed to one type.
    pub fn with_unsatisfied(
        adapter: Arc<dyn ComponentAdapter>,
        unsatisfied: TypeKey,
        unsatisfiable: BTreeSet<TypeKey>,
        leaf: Arc<dyn Container>,
    ) -> Self {
        let message = format!(
            "{} has unsatisfied dependency: {} among unsatisfiable dependencies: {} where {} was the leaf container being asked for deps.",
            adapter.implementation(),
            unsatisfied,
            TypeList(&unsatisfiable),
            leaf,
        );
        Self {
            adapter,
            unsatisfiable,
            unsatisfied: Some(unsatisfied),
            leaf,
            message,
        }
    }

    /// The adapter that was instantiating the component.
    pub fn adapter(&self) -> &Arc<dyn ComponentAdapter> {
        &self.adapter
    }

    pub fn unsatisfiable(&self) -> &BTreeSet<TypeKey> {
        &self.unsatisfiable
    }

    pub fn unsatisfied(&self) -> Option<TypeKey> {
        self.unsatisfied
    }

    /// The innermost container consulted before the lookup bottomed out.
    pub fn leaf_container(&self) -> &Arc<dyn Container> {
        &self.leaf
    }
}

impl fmt::Debug for UnsatisfiableDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnsatisfiableDependencies")
            .field("adapter", &self.adapter)
            .field("unsatisfiable", &self.unsatisfiable)
            .field("unsatisfied", &self.unsatisfied)
            .field("leaf", &self.leaf.id())
            .finish()
    }
}

struct TypeList<'a>(&'a BTreeSet<TypeKey>);

impl fmt::Display for TypeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_types(f, self.0.iter())
    }
}
