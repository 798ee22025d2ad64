//! Interface type builder.

use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::TypeRef;
use indexmap::IndexMap;

use super::base::{TypeBuilder, TypeDescriptor};
use crate::error::SchemaError;
use crate::field::{ArgDecl, ArgumentDraft, FieldDecl, ResolvedField, TypeResolver};

/// Builder for GraphQL interface types.
#[derive(Clone)]
pub struct InterfaceTypeBuilder {
    base: TypeBuilder,
    resolve_type: Option<TypeResolver>,
}

impl InterfaceTypeBuilder {
    /// Creates an empty interface builder.
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            base: TypeBuilder::new(name, description),
            resolve_type: None,
        }
    }

    /// Enables a trace event whenever the `id` field is edited.
    #[must_use]
    pub fn trace_edits(mut self, enabled: bool) -> Self {
        self.base = self.base.trace_edits(enabled);
        self
    }

    /// Creates a field or re-opens an existing one.
    ///
    /// # Errors
    ///
    /// See [`crate::builder::FieldAccumulator::start_or_edit_field`].
    pub fn field(mut self, decl: impl Into<FieldDecl>) -> Result<Self, SchemaError> {
        self.base = self.base.field(decl)?;
        Ok(self)
    }

    /// Replaces the open field's arguments.
    ///
    /// # Errors
    ///
    /// Fails if no field is open.
    pub fn args(
        mut self,
        args: impl IntoIterator<Item = ArgumentDraft>,
    ) -> Result<Self, SchemaError> {
        self.base = self.base.args(args)?;
        Ok(self)
    }

    /// Adds an argument to the open field.
    ///
    /// # Errors
    ///
    /// Fails if no field is open or a by-name argument already exists.
    pub fn arg(mut self, decl: impl Into<ArgDecl>) -> Result<Self, SchemaError> {
        self.base = self.base.arg(decl)?;
        Ok(self)
    }

    /// Deprecates the open field.
    ///
    /// # Errors
    ///
    /// Fails if no field is open.
    pub fn deprecated(mut self, reason: impl Into<String>) -> Result<Self, SchemaError> {
        self.base = self.base.deprecated(reason)?;
        Ok(self)
    }

    /// Sets the callback that picks the concrete object type for a value.
    #[must_use]
    pub fn resolve<F>(mut self, resolve_type: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(resolve_type));
        self
    }

    /// Commits the open field and snapshots the builder.
    pub fn materialize(self) -> InterfaceDescriptor {
        InterfaceDescriptor {
            base: self.base.materialize(),
            resolve_type: self.resolve_type,
        }
    }
}

impl fmt::Debug for InterfaceTypeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceTypeBuilder")
            .field("base", &self.base)
            .field("resolve_type", &self.resolve_type.is_some())
            .finish()
    }
}

/// A materialized interface type.
#[derive(Clone)]
pub struct InterfaceDescriptor {
    base: TypeDescriptor,
    resolve_type: Option<TypeResolver>,
}

impl InterfaceDescriptor {
    /// The interface name.
    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// The interface description.
    pub fn description(&self) -> Option<&str> {
        self.base.description()
    }

    /// A nullable handle to this type.
    pub fn type_ref(&self) -> TypeRef {
        self.base.type_ref()
    }

    /// Resolves every field and argument type.
    ///
    /// # Errors
    ///
    /// Propagates thunk failures.
    pub fn fields(&self) -> Result<IndexMap<String, ResolvedField>, SchemaError> {
        self.base.fields()
    }

    /// The type-resolution callback, if one was set.
    pub fn resolve_type(&self) -> Option<&TypeResolver> {
        self.resolve_type.as_ref()
    }
}

impl fmt::Debug for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceDescriptor")
            .field("base", &self.base)
            .field("resolve_type", &self.resolve_type.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sets_callback() {
        let iface = InterfaceTypeBuilder::new("Character", None)
            .field(("id", TypeRef::named_nn(TypeRef::ID)))
            .unwrap()
            .resolve(|value| match value {
                Value::Object(obj) if obj.contains_key("primaryFunction") => {
                    Some("Droid".to_owned())
                }
                _ => Some("Human".to_owned()),
            })
            .materialize();

        let resolve = iface.resolve_type().unwrap();
        let droid = Value::from_json(serde_json::json!({ "primaryFunction": "Astromech" })).unwrap();
        assert_eq!(resolve(&droid).as_deref(), Some("Droid"));
        assert_eq!(resolve(&Value::Null).as_deref(), Some("Human"));
        assert_eq!(iface.fields().unwrap().len(), 1);
    }

    #[test]
    fn test_arg_without_field_fails() {
        let err = InterfaceTypeBuilder::new("Character", None)
            .arg(("first", TypeRef::named(TypeRef::INT)))
            .unwrap_err();
        assert!(err.is_validation());
    }
}
