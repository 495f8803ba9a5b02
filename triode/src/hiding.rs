use std::sync::Arc;

use crate::{
    ComponentAdapter, ComponentKey, Container, ContainerError, DecoratingAdapter, Decoration,
    Instance, TypeKey,
};

/// Adapter that hides the concrete type of a component behind the interfaces named by its key.
pub type HidingAdapter = DecoratingAdapter<Hiding>;

/// Hides instances behind the interfaces listed in the component key.
///
/// The hide set is taken from the key, not from the implementation: the key
/// states how the component should look from outside.
///
/// * A single interface key hides the instance behind that interface.
/// * A list key must only contain interfaces; the first concrete type fails
///   with an introspection error.
/// * Any other key fails in strict mode and returns the raw instance
///   otherwise.
#[derive(Clone, Copy, Debug)]
pub struct Hiding {
    strict: bool,
}

impl Hiding {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Interfaces to hide behind, or `None` if the instance stays unwrapped.
    fn hide_set(&self, key: &ComponentKey) -> Result<Option<Vec<TypeKey>>, ContainerError> {
        match key {
            ComponentKey::Type(ty) if ty.is_interface() => Ok(Some(vec![*ty])),
            ComponentKey::Types(types) => verify_interfaces_only(types).map(Some),
            key if self.strict => Err(ContainerError::introspection(format!(
                "In strict mode, implementation hiding only allows components registered with interface keys, got {key}"
            ))),
            _ => Ok(None),
        }
    }
}

impl Default for Hiding {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Decoration for Hiding {
    const NAME: &'static str = "Hiding";

    fn resolve(
        &self,
        delegate: &Arc<dyn ComponentAdapter>,
        container: &dyn Container,
    ) -> Result<Instance, ContainerError> {
        let Some(interfaces) = self.hide_set(delegate.key())? else {
            return delegate.resolve(container);
        };
        let instance = delegate.resolve(container)?;
        if let Some(missing) = interfaces.iter().find(|v| !instance.exposes(v)) {
            return Err(ContainerError::introspection(format!(
                "{} does not implement {missing}",
                instance.implementation(),
            )));
        }
        tracing::trace!(
            implementation = %instance.implementation(),
            interfaces = %delegate.key(),
            "Hiding component implementation",
        );
        Ok(instance.hide(interfaces))
    }

    /// Only the hide set is visible once the instance is hidden.
    fn interfaces(&self, delegate: &Arc<dyn ComponentAdapter>) -> Vec<TypeKey> {
        match self.hide_set(delegate.key()) {
            Ok(Some(mut interfaces)) => {
                interfaces.sort();
                interfaces
            }
            Ok(None) => delegate.interfaces(),
            Err(_) => Vec::new(),
        }
    }

    fn verify(
        &self,
        delegate: &Arc<dyn ComponentAdapter>,
        container: &dyn Container,
    ) -> Result<(), ContainerError> {
        self.hide_set(delegate.key())?;
        delegate.verify(container)
    }
}

impl HidingAdapter {
    /// Hiding adapter over `delegate`, rejecting non-interface keys when `strict`.
    pub fn hiding(delegate: Arc<dyn ComponentAdapter>, strict: bool) -> Self {
        Self::with_decoration(delegate, Hiding::new(strict))
    }
}

fn verify_interfaces_only(types: &[TypeKey]) -> Result<Vec<TypeKey>, ContainerError> {
    if types.is_empty() {
        return Err(ContainerError::introspection(
            "Implementation hiding requires at least one interface key",
        ));
    }
    if let Some(ty) = types.iter().find(|v| !v.is_interface()) {
        return Err(ContainerError::introspection(format!(
            "Type keys must be interfaces. {ty} is not."
        )));
    }
    Ok(types.to_vec())
}
