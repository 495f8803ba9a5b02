use std::any::{Any, TypeId, type_name};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Shared, type-erased component value.
pub type Object = Arc<dyn Any + Send + Sync>;

/// Whether a [`TypeKey`] names a concrete type or an interface (trait object).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Concrete,
    Interface,
}

/// Runtime identity of a Rust type.
///
/// Interfaces are trait-object types such as `dyn Listener` and must be
/// created with [`TypeKey::interface`]. Equality and hashing only look at the
/// underlying [`TypeId`].
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
}

impl TypeKey {
    /// Key of a concrete type.
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind: TypeKind::Concrete,
        }
    }

    /// Key of an interface, e.g. `TypeKey::interface::<dyn Listener>()`.
    pub fn interface<I>() -> Self
    where
        I: ?Sized + 'static,
    {
        Self {
            id: TypeId::of::<I>(),
            name: type_name::<I>(),
            kind: TypeKind::Interface,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity under which an adapter is registered and looked up.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKey {
    /// A single type, concrete or interface.
    Type(TypeKey),
    /// A list of types, typically the interfaces a component is hidden behind.
    Types(Vec<TypeKey>),
    /// Any user supplied name.
    Name(String),
}

impl ComponentKey {
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self::Type(TypeKey::of::<T>())
    }

    pub fn interface<I>() -> Self
    where
        I: ?Sized + 'static,
    {
        Self::Type(TypeKey::interface::<I>())
    }

    pub fn types(types: impl IntoIterator<Item = TypeKey>) -> Self {
        Self::Types(types.into_iter().collect())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Returns `true` if the key names `ty` directly or lists it.
    pub fn covers(&self, ty: &TypeKey) -> bool {
        match self {
            Self::Type(v) => v == ty,
            Self::Types(v) => v.contains(ty),
            Self::Name(_) => false,
        }
    }
}

impl From<TypeKey> for ComponentKey {
    fn from(value: TypeKey) -> Self {
        Self::Type(value)
    }
}

impl From<Vec<TypeKey>> for ComponentKey {
    fn from(value: Vec<TypeKey>) -> Self {
        Self::Types(value)
    }
}

impl From<&str> for ComponentKey {
    fn from(value: &str) -> Self {
        Self::Name(value.to_owned())
    }
}

impl From<String> for ComponentKey {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(v) => write!(f, "{v}"),
            Self::Types(v) => write_types(f, v),
            Self::Name(v) => write!(f, "{v:?}"),
        }
    }
}

pub(crate) fn write_types<'a>(
    f: &mut fmt::Formatter<'_>,
    types: impl IntoIterator<Item = &'a TypeKey>,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, ty) in types.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    f.write_str("]")
}

type Cast = Arc<dyn Fn(Object) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// Dispatch table from interface type to a cast of the component object.
#[derive(Clone, Default)]
pub(crate) struct InterfaceTable {
    casts: HashMap<TypeId, (TypeKey, Cast)>,
}

impl InterfaceTable {
    pub(crate) fn contains(&self, ty: &TypeKey) -> bool {
        self.casts.contains_key(&ty.id())
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.casts.values().map(|(key, _)| *key)
    }

    pub(crate) fn cast<I>(&self, object: &Object) -> Option<Arc<I>>
    where
        I: ?Sized + 'static,
    {
        let (_, cast) = self.casts.get(&TypeId::of::<I>())?;
        cast(object.clone())?
            .downcast::<Arc<I>>()
            .ok()
            .map(|v| *v)
    }
}

/// Interfaces a component of type `T` can be viewed as.
///
/// ```rust
/// use std::sync::Arc;
/// use triode::Interfaces;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// let interfaces = Interfaces::<English>::new().with::<dyn Greeter>(|v| v);
/// assert_eq!(interfaces.len(), 1);
/// ```
pub struct Interfaces<T> {
    table: InterfaceTable,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Interfaces<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            table: InterfaceTable::default(),
            _marker: PhantomData,
        }
    }

    /// Declares that `T` can be viewed as `I` through `cast`.
    pub fn with<I>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let erased: Cast = Arc::new(move |object: Object| {
            object
                .downcast::<T>()
                .ok()
                .map(|v| Box::new(cast(v)) as Box<dyn Any + Send + Sync>)
        });
        self.table
            .casts
            .insert(TypeId::of::<I>(), (TypeKey::interface::<I>(), erased));
        self
    }

    pub fn len(&self) -> usize {
        self.table.casts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.casts.is_empty()
    }

    pub(crate) fn into_table(self) -> InterfaceTable {
        self.table
    }
}

impl<T> Default for Interfaces<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
