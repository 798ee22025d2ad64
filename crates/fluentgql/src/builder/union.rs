//! Union type descriptor.
//!
//! Unions declare no fields, so there is nothing to accumulate: the
//! descriptor is complete as soon as it is constructed.

use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{TypeRef, Union};
use tracing::trace;

use crate::error::SchemaError;
use crate::field::TypeResolver;

/// The optional third argument of [`UnionDescriptor::new`]: either the
/// type-resolution callback or the description.
#[derive(Clone, Default)]
pub enum ResolveOrDescription {
    /// Neither.
    #[default]
    None,
    /// The type-resolution callback.
    Resolver(TypeResolver),
    /// The description.
    Description(String),
}

impl ResolveOrDescription {
    /// Wraps a type-resolution callback.
    pub fn resolver<F>(resolve_type: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        Self::Resolver(Arc::new(resolve_type))
    }
}

impl From<&str> for ResolveOrDescription {
    fn from(description: &str) -> Self {
        Self::Description(description.to_owned())
    }
}

impl From<String> for ResolveOrDescription {
    fn from(description: String) -> Self {
        Self::Description(description)
    }
}

impl From<TypeResolver> for ResolveOrDescription {
    fn from(resolve_type: TypeResolver) -> Self {
        Self::Resolver(resolve_type)
    }
}

/// A union of object types.
#[derive(Clone)]
pub struct UnionDescriptor {
    name: String,
    types: Vec<String>,
    resolve_type: Option<TypeResolver>,
    description: Option<String>,
}

impl UnionDescriptor {
    /// Creates a union.
    ///
    /// A description given as `third` is used only when `description` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `types` is empty or contains a list or
    /// non-null wrapper instead of a named type.
    pub fn new(
        name: impl Into<String>,
        types: impl IntoIterator<Item = TypeRef>,
        third: impl Into<ResolveOrDescription>,
        description: Option<&str>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let types = types
            .into_iter()
            .map(|ty| match ty {
                TypeRef::Named(member) => Ok(member.into_owned()),
                wrapped => Err(SchemaError::validation(
                    "union",
                    format!("'{name}' member '{wrapped}' must be a named object type"),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if types.is_empty() {
            return Err(SchemaError::validation(
                "union",
                format!("'{name}' is missing its member types"),
            ));
        }

        let (resolve_type, third_description) = match third.into() {
            ResolveOrDescription::None => (None, None),
            ResolveOrDescription::Resolver(f) => (Some(f), None),
            ResolveOrDescription::Description(text) => (None, Some(text)),
        };

        trace!(union = %name, members = ?types, "Declared union");
        Ok(Self {
            name,
            types,
            resolve_type,
            description: description.map(str::to_owned).or(third_description),
        })
    }

    /// Sets or overrides the type-resolution callback.
    #[must_use]
    pub fn resolve<F>(mut self, resolve_type: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(resolve_type));
        self
    }

    /// The union name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The union description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Member type names, in declaration order.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// The type-resolution callback, if one was set.
    pub fn resolve_type(&self) -> Option<&TypeResolver> {
        self.resolve_type.as_ref()
    }

    /// A nullable handle to this type.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::named(self.name.clone())
    }

    /// Builds the engine's union type.
    pub fn to_engine(&self) -> Union {
        let mut union = Union::new(self.name.as_str());
        if let Some(description) = &self.description {
            union = union.description(description.as_str());
        }
        for member in &self.types {
            union = union.possible_type(member.as_str());
        }
        union
    }
}

impl fmt::Debug for UnionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionDescriptor")
            .field("name", &self.name)
            .field("types", &self.types)
            .field("resolve_type", &self.resolve_type.is_some())
            .field("description", &self.description)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members() -> Vec<TypeRef> {
        vec![TypeRef::named("Droid"), TypeRef::named("Human")]
    }

    #[test]
    fn test_third_argument_as_description() {
        let union =
            UnionDescriptor::new("HumanDroid", members(), "Union of human and droid", None)
                .unwrap();
        assert_eq!(union.description(), Some("Union of human and droid"));
        assert!(union.resolve_type().is_none());
        assert_eq!(union.types(), ["Droid", "Human"]);
    }

    #[test]
    fn test_explicit_description_wins() {
        let union = UnionDescriptor::new(
            "HumanDroid",
            members(),
            "from third",
            Some("explicit"),
        )
        .unwrap();
        assert_eq!(union.description(), Some("explicit"));
    }

    #[test]
    fn test_third_argument_as_resolver() {
        let union = UnionDescriptor::new(
            "HumanDroid",
            members(),
            ResolveOrDescription::resolver(|_| Some("Human".to_owned())),
            Some("Union of human and droid"),
        )
        .unwrap();
        let resolve = union.resolve_type().unwrap();
        assert_eq!(resolve(&Value::Null).as_deref(), Some("Human"));
        assert_eq!(union.description(), Some("Union of human and droid"));
    }

    #[test]
    fn test_resolve_overrides() {
        let union = UnionDescriptor::new(
            "HumanDroid",
            members(),
            ResolveOrDescription::resolver(|_| Some("Human".to_owned())),
            None,
        )
        .unwrap()
        .resolve(|_| Some("Droid".to_owned()));
        let resolve = union.resolve_type().unwrap();
        assert_eq!(resolve(&Value::Null).as_deref(), Some("Droid"));
    }

    #[test]
    fn test_members_must_be_named_types() {
        let err = UnionDescriptor::new(
            "HumanDroid",
            vec![TypeRef::named_list("Droid")],
            ResolveOrDescription::None,
            None,
        )
        .unwrap_err();
        assert!(err.is_validation());

        let err = UnionDescriptor::new("Empty", Vec::new(), ResolveOrDescription::None, None)
            .unwrap_err();
        assert!(err.is_validation());
    }
}
