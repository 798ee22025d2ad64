//! Deferred type references.
//!
//! Types that reference each other cannot all exist when the first of them
//! is declared. A [`TypeSpec`] is either a concrete [`TypeRef`] or a
//! zero-argument thunk that produces one; thunks are only invoked when a
//! descriptor's field map is requested, never at declaration time.
//!
//! [`TypeSlot`] is a forward declaration: hand out its deferred spec first,
//! fill it once the referenced type exists.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use async_graphql::dynamic::TypeRef;

use crate::error::SchemaError;

/// A zero-argument producer of a concrete type handle.
pub type Thunk = Rc<dyn Fn() -> Result<TypeRef, SchemaError>>;

/// A type handle that is either known now or resolved later.
#[derive(Clone)]
pub enum TypeSpec {
    /// A concrete type handle.
    Resolved(TypeRef),
    /// A thunk evaluated at materialization time.
    Deferred(Thunk),
}

impl TypeSpec {
    /// Wraps an infallible producer.
    pub fn lazy<F>(producer: F) -> Self
    where
        F: Fn() -> TypeRef + 'static,
    {
        Self::Deferred(Rc::new(move || Ok(producer())))
    }

    /// Wraps a producer that may fail, e.g. a slot lookup.
    pub fn try_lazy<F>(producer: F) -> Self
    where
        F: Fn() -> Result<TypeRef, SchemaError> + 'static,
    {
        Self::Deferred(Rc::new(producer))
    }

    /// Returns `true` if this spec has not been resolved yet.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Returns the concrete handle, invoking the thunk if there is one.
    ///
    /// # Errors
    ///
    /// Propagates the thunk's failure (an unfilled [`TypeSlot`]).
    pub fn resolve(&self) -> Result<TypeRef, SchemaError> {
        match self {
            Self::Resolved(ty) => Ok(ty.clone()),
            Self::Deferred(thunk) => thunk(),
        }
    }

    /// Wraps this spec in a list, staying deferred if it was deferred.
    #[must_use]
    pub fn list(self) -> Self {
        self.map(|ty| TypeRef::List(Box::new(ty)))
    }

    /// Wraps this spec in non-null, staying deferred if it was deferred.
    #[must_use]
    pub fn non_null(self) -> Self {
        self.map(|ty| TypeRef::NonNull(Box::new(ty)))
    }

    fn map(self, wrap: fn(TypeRef) -> TypeRef) -> Self {
        match self {
            Self::Resolved(ty) => Self::Resolved(wrap(ty)),
            Self::Deferred(thunk) => Self::Deferred(Rc::new(move || thunk().map(wrap))),
        }
    }
}

impl From<TypeRef> for TypeSpec {
    fn from(ty: TypeRef) -> Self {
        Self::Resolved(ty)
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(ty) => f.debug_tuple("Resolved").field(&ty.to_string()).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// A forward-declared type handle.
///
/// ```ignore
/// let droid = TypeSlot::new("Droid");
/// let human = object("Human", None, &[])?
///     .field(("bestFriend", droid.spec()))?
///     .materialize();
/// let droid_type = object("Droid", None, &[])?.materialize();
/// droid.fill(droid_type.type_ref())?;
/// ```
#[derive(Clone)]
pub struct TypeSlot {
    name: String,
    cell: Rc<OnceCell<TypeRef>>,
}

impl TypeSlot {
    /// Creates an empty slot for the named type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cell: Rc::new(OnceCell::new()),
        }
    }

    /// Returns the name this slot was declared with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fills the slot.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the slot was already filled.
    pub fn fill(&self, ty: TypeRef) -> Result<(), SchemaError> {
        self.cell.set(ty).map_err(|_| {
            SchemaError::validation("fill", format!("slot '{}' is already filled", self.name))
        })
    }

    /// Returns `true` once the slot has been filled.
    pub fn is_filled(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Returns a deferred spec reading this slot.
    pub fn spec(&self) -> TypeSpec {
        let name = self.name.clone();
        let cell = Rc::clone(&self.cell);
        TypeSpec::try_lazy(move || {
            cell.get()
                .cloned()
                .ok_or_else(|| SchemaError::UnresolvedReference(name.clone()))
        })
    }
}

impl fmt::Debug for TypeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSlot")
            .field("name", &self.name)
            .field("filled", &self.is_filled())
            .finish()
    }
}
