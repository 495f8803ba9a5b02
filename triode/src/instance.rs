use std::fmt;
use std::sync::Arc;

use crate::key::{InterfaceTable, Interfaces, Object, TypeKey, write_types};
use crate::{AdapterVisitor, ComponentAdapter, ComponentKey, Container, ContainerError};

/// A resolved component.
///
/// An instance is a cheap handle: clones share the same underlying object.
/// Instances produced by a [`HidingAdapter`](crate::HidingAdapter) are
/// proxies that only expose the interfaces they were hidden behind.
#[derive(Clone)]
pub struct Instance {
    object: Object,
    implementation: TypeKey,
    interfaces: Arc<InterfaceTable>,
    hidden: Option<Arc<[TypeKey]>>,
}

impl Instance {
    /// Wraps a value without any declared interfaces.
    pub fn new<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T>(value: Arc<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::from_parts(value, TypeKey::of::<T>(), Arc::default())
    }

    /// Wraps a value together with the interfaces it can be viewed as.
    pub fn with_interfaces<T>(value: Arc<T>, interfaces: Interfaces<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::from_parts(
            value,
            TypeKey::of::<T>(),
            Arc::new(interfaces.into_table()),
        )
    }

    pub(crate) fn from_parts(
        object: Object,
        implementation: TypeKey,
        interfaces: Arc<InterfaceTable>,
    ) -> Self {
        Self {
            object,
            implementation,
            interfaces,
            hidden: None,
        }
    }

    /// Concrete type behind this instance, even when it is hidden.
    pub fn implementation(&self) -> TypeKey {
        self.implementation
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.is_some()
    }

    /// Interfaces reachable through this instance.
    pub fn exposed_interfaces(&self) -> Vec<TypeKey> {
        match &self.hidden {
            Some(v) => v.to_vec(),
            None => {
                let mut keys: Vec<_> = self.interfaces.keys().collect();
                keys.sort();
                keys
            }
        }
    }

    /// Returns the concrete value. Hidden instances never expose it.
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        if self.hidden.is_some() {
            return None;
        }
        self.object.clone().downcast::<T>().ok()
    }

    /// Returns the instance viewed as the interface `I`.
    pub fn interface<I>(&self) -> Option<Arc<I>>
    where
        I: ?Sized + 'static,
    {
        if !self.exposes(&TypeKey::interface::<I>()) {
            return None;
        }
        self.interfaces.cast::<I>(&self.object)
    }

    pub fn implements<I>(&self) -> bool
    where
        I: ?Sized + 'static,
    {
        self.exposes(&TypeKey::interface::<I>())
    }

    /// Returns `true` if both handles point at the same object.
    pub fn same_object(&self, other: &Instance) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.object), Arc::as_ptr(&other.object))
    }

    pub(crate) fn exposes(&self, ty: &TypeKey) -> bool {
        if let Some(hidden) = &self.hidden
            && !hidden.contains(ty)
        {
            return false;
        }
        self.interfaces.contains(ty)
    }

    /// Interface view used by the container itself, ignoring any hide set.
    pub(crate) fn managed_interface<I>(&self) -> Option<Arc<I>>
    where
        I: ?Sized + 'static,
    {
        self.interfaces.cast::<I>(&self.object)
    }

    pub(crate) fn hide(&self, interfaces: Vec<TypeKey>) -> Self {
        Self {
            hidden: Some(interfaces.into()),
            ..self.clone()
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hidden {
            Some(v) => {
                f.write_str("Proxy")?;
                write_types(f, v.iter())?;
                write!(f, "({})", self.implementation)
            }
            None => write!(f, "{}", self.implementation),
        }
    }
}

/// Adapter that always returns the same pre-built instance.
pub struct InstanceAdapter {
    key: ComponentKey,
    instance: Instance,
}

impl InstanceAdapter {
    pub fn new(key: impl Into<ComponentKey>, instance: Instance) -> Arc<Self> {
        Arc::new(Self {
            key: key.into(),
            instance,
        })
    }
}

impl ComponentAdapter for InstanceAdapter {
    fn key(&self) -> &ComponentKey {
        &self.key
    }

    fn implementation(&self) -> TypeKey {
        self.instance.implementation()
    }

    fn interfaces(&self) -> Vec<TypeKey> {
        self.instance.exposed_interfaces()
    }

    fn resolve(&self, _container: &dyn Container) -> Result<Instance, ContainerError> {
        Ok(self.instance.clone())
    }

    fn verify(&self, _container: &dyn Container) -> Result<(), ContainerError> {
        Ok(())
    }

    fn accept(&self, visitor: &mut dyn AdapterVisitor) {
        visitor.visit_adapter(self);
    }
}

impl fmt::Display for InstanceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance[{}]", self.key)
    }
}
