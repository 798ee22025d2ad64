//! The base type builder and its materialized descriptor.

use async_graphql::dynamic::TypeRef;
use indexmap::IndexMap;

use super::accumulator::FieldAccumulator;
use crate::error::SchemaError;
use crate::field::{ArgDecl, ArgumentDraft, FieldDecl, FieldDraft, ResolvedField};

/// Name, description and an accumulated field map.
///
/// Every other type builder wraps one of these.
#[derive(Clone, Debug)]
pub struct TypeBuilder {
    name: String,
    description: Option<String>,
    pub(crate) fields: FieldAccumulator,
}

impl TypeBuilder {
    /// Creates an empty builder.
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        let name = name.into();
        Self {
            fields: FieldAccumulator::new(name.clone()),
            name,
            description: description.map(str::to_owned),
        }
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Enables a trace event whenever the `id` field is edited.
    #[must_use]
    pub fn trace_edits(mut self, enabled: bool) -> Self {
        self.fields.set_trace_edits(enabled);
        self
    }

    /// Creates a field or re-opens an existing one.
    ///
    /// # Errors
    ///
    /// See [`FieldAccumulator::start_or_edit_field`].
    pub fn field(mut self, decl: impl Into<FieldDecl>) -> Result<Self, SchemaError> {
        self.fields.start_or_edit_field(decl.into())?;
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
        self.fields.set_args(args)?;
        Ok(self)
    }

    /// Adds an argument to the open field.
    ///
    /// # Errors
    ///
    /// Fails if no field is open or a by-name argument already exists.
    pub fn arg(mut self, decl: impl Into<ArgDecl>) -> Result<Self, SchemaError> {
        self.fields.add_arg(decl.into())?;
        Ok(self)
    }

    /// Deprecates the open field.
    ///
    /// # Errors
    ///
    /// Fails if no field is open.
    pub fn deprecated(mut self, reason: impl Into<String>) -> Result<Self, SchemaError> {
        self.fields.set_deprecated(reason)?;
        Ok(self)
    }

    /// Commits the open field and snapshots the builder.
    pub fn materialize(mut self) -> TypeDescriptor {
        TypeDescriptor {
            fields: self.fields.finish(),
            name: self.name,
            description: self.description,
        }
    }
}

/// A materialized type: name, description and a lazily resolved field map.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    name: String,
    description: Option<String>,
    fields: IndexMap<String, FieldDraft>,
}

impl TypeDescriptor {
    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// A nullable handle to this type.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::named(self.name.clone())
    }

    /// Resolves every field and argument type.
    ///
    /// Each call runs the thunks again; the stored drafts are not touched,
    /// so this can be called as often as the engine needs.
    ///
    /// # Errors
    ///
    /// Propagates thunk failures.
    pub fn fields(&self) -> Result<IndexMap<String, ResolvedField>, SchemaError> {
        self.fields
            .iter()
            .map(|(name, draft)| Ok((name.clone(), draft.resolve()?)))
            .collect()
    }

    /// The raw drafts, with thunks unresolved.
    pub fn drafts(&self) -> &IndexMap<String, FieldDraft> {
        &self.fields
    }
}
