//! Field and argument drafts.
//!
//! A [`FieldDraft`] is a field as the builders see it: its type may still be
//! a thunk. Materialization turns drafts into [`ResolvedField`]s, which carry
//! concrete [`TypeRef`]s and are what the schema assembly hands to the
//! engine.

use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::TypeRef;
use async_graphql::{Name, Value};
use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::lazy::TypeSpec;

/// Arguments passed to a field resolver, keyed by argument name.
pub type Args = IndexMap<Name, Value>;

/// Computes a field value from its parent value and arguments.
pub type Resolver = Arc<dyn Fn(&Value, &Args) -> async_graphql::Result<Value> + Send + Sync>;

/// Maps a runtime value to the name of the concrete object type for it.
pub type TypeResolver = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Decides whether a runtime value belongs to an object type.
pub type TypePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// An argument on a field.
#[derive(Clone, Debug)]
pub struct ArgumentDraft {
    /// Argument name, unique within its field.
    pub name: String,
    /// Argument type; may be deferred.
    pub ty: TypeSpec,
    /// Value used when the argument is omitted.
    pub default_value: Option<Value>,
    /// Argument description.
    pub description: Option<String>,
}

impl ArgumentDraft {
    /// Creates an argument with no default and no description.
    pub fn new(name: impl Into<String>, ty: impl Into<TypeSpec>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            default_value: None,
            description: None,
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn resolve(&self) -> Result<ResolvedArgument, SchemaError> {
        Ok(ResolvedArgument {
            name: self.name.clone(),
            ty: self.ty.resolve()?,
            default_value: self.default_value.clone(),
            description: self.description.clone(),
        })
    }
}

/// A complete field definition given in one piece.
///
/// This is the descriptor form of a field declaration: it replaces any
/// field of the same name wholesale instead of merging into it.
#[derive(Clone, Default)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Field type; required.
    pub ty: Option<TypeSpec>,
    /// Field description.
    pub description: Option<String>,
    /// Field resolver; `None` reads the same-named key of the parent.
    pub resolver: Option<Resolver>,
    /// Deprecation reason.
    pub deprecation_reason: Option<String>,
    /// Arguments, keyed by name.
    pub args: IndexMap<String, ArgumentDraft>,
}

impl FieldSpec {
    /// Creates a field spec with a name and type.
    pub fn new(name: impl Into<String>, ty: impl Into<TypeSpec>) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty.into()),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the resolver.
    #[must_use]
    pub fn resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&Value, &Args) -> async_graphql::Result<Value> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Adds an argument, replacing one of the same name.
    #[must_use]
    pub fn argument(mut self, arg: ArgumentDraft) -> Self {
        self.args.insert(arg.name.clone(), arg);
        self
    }

    /// Checks the spec and turns it into a draft.
    pub(crate) fn into_draft(self) -> Result<FieldDraft, SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::validation(
                "field",
                "must supply a name for a GraphQL field",
            ));
        }
        let Some(ty) = self.ty else {
            return Err(SchemaError::validation(
                "field",
                format!("'{}' must supply a GraphQL compatible type", self.name),
            ));
        };

        Ok(FieldDraft {
            name: self.name,
            ty,
            description: self.description,
            resolver: self.resolver,
            deprecation_reason: self.deprecation_reason,
            args: self.args,
            is_type_of: None,
        })
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("description", &self.description)
            .field("resolver", &self.resolver.is_some())
            .field("args", &self.args.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A field declaration passed to the builders' `field` method.
///
/// `ByName` creates a new field or re-opens an existing one, merging only
/// the attributes that are given. `ByDescriptor` replaces the field.
///
/// Conversions exist for the common shorthand forms:
///
/// ```ignore
/// builder.field("friends")?;                                  // re-open
/// builder.field(("name", string()))?;                         // name + type
/// builder.field(("name", string(), "The name of the human."))?; // + description
/// builder.field(relay::global_id_field("Human"))?;            // descriptor
/// ```
#[derive(Clone, Debug)]
pub enum FieldDecl {
    /// Create or edit a field by name.
    ByName {
        /// Field name.
        name: String,
        /// New type, if any.
        ty: Option<TypeSpec>,
        /// New description, if any.
        description: Option<String>,
        /// New resolver, if any.
        resolver: Option<ResolverSlot>,
    },
    /// Replace a field with a complete definition.
    ByDescriptor(FieldSpec),
}

impl FieldDecl {
    /// Starts a by-name declaration.
    pub fn named(name: impl Into<String>) -> Self {
        Self::ByName {
            name: name.into(),
            ty: None,
            description: None,
            resolver: None,
        }
    }

    /// Sets the type of a by-name declaration.
    #[must_use]
    pub fn ty(mut self, spec: impl Into<TypeSpec>) -> Self {
        if let Self::ByName { ty, .. } = &mut self {
            *ty = Some(spec.into());
        }
        self
    }

    /// Sets the description of a by-name declaration.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        if let Self::ByName { description, .. } = &mut self {
            *description = Some(text.into());
        }
        self
    }

    /// Sets the resolver of a by-name declaration.
    #[must_use]
    pub fn resolver<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Args) -> async_graphql::Result<Value> + Send + Sync + 'static,
    {
        if let Self::ByName { resolver, .. } = &mut self {
            *resolver = Some(ResolverSlot(Arc::new(f)));
        }
        self
    }
}

impl From<&str> for FieldDecl {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for FieldDecl {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl<N, T> From<(N, T)> for FieldDecl
where
    N: Into<String>,
    T: Into<TypeSpec>,
{
    fn from((name, ty): (N, T)) -> Self {
        Self::named(name).ty(ty)
    }
}

impl<N, T, D> From<(N, T, D)> for FieldDecl
where
    N: Into<String>,
    T: Into<TypeSpec>,
    D: Into<String>,
{
    fn from((name, ty, description): (N, T, D)) -> Self {
        Self::named(name).ty(ty).description(description)
    }
}

impl From<FieldSpec> for FieldDecl {
    fn from(spec: FieldSpec) -> Self {
        Self::ByDescriptor(spec)
    }
}

/// A resolver held by a declaration.
#[derive(Clone)]
pub struct ResolverSlot(pub Resolver);

impl fmt::Debug for ResolverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

/// An argument declaration passed to the builders' `arg` method.
///
/// `ByName` refuses to overwrite an existing argument; `ByDescriptor`
/// upserts by the draft's own name.
#[derive(Clone, Debug)]
pub enum ArgDecl {
    /// Add a new argument.
    ByName(ArgumentDraft),
    /// Add or replace an argument.
    ByDescriptor(ArgumentDraft),
}

impl<N, T> From<(N, T)> for ArgDecl
where
    N: Into<String>,
    T: Into<TypeSpec>,
{
    fn from((name, ty): (N, T)) -> Self {
        Self::ByName(ArgumentDraft::new(name, ty))
    }
}

impl<N, T, D> From<(N, T, D)> for ArgDecl
where
    N: Into<String>,
    T: Into<TypeSpec>,
    D: Into<String>,
{
    fn from((name, ty, description): (N, T, D)) -> Self {
        Self::ByName(ArgumentDraft::new(name, ty).description(description))
    }
}

impl From<ArgumentDraft> for ArgDecl {
    fn from(arg: ArgumentDraft) -> Self {
        Self::ByDescriptor(arg)
    }
}

/// A field under construction or committed to a type's field map.
#[derive(Clone)]
pub struct FieldDraft {
    /// Field name.
    pub name: String,
    /// Field type; may be deferred.
    pub ty: TypeSpec,
    /// Field description.
    pub description: Option<String>,
    /// Field resolver.
    pub resolver: Option<Resolver>,
    /// Deprecation reason.
    pub deprecation_reason: Option<String>,
    /// Arguments, keyed by name.
    pub args: IndexMap<String, ArgumentDraft>,
    /// Type-membership predicate attached while this field was open.
    pub is_type_of: Option<TypePredicate>,
}

impl FieldDraft {
    pub(crate) fn new(name: String, ty: TypeSpec) -> Self {
        Self {
            name,
            ty,
            description: None,
            resolver: None,
            deprecation_reason: None,
            args: IndexMap::new(),
            is_type_of: None,
        }
    }

    /// Resolves the field type and every argument type.
    ///
    /// # Errors
    ///
    /// Propagates thunk failures.
    pub fn resolve(&self) -> Result<ResolvedField, SchemaError> {
        let args = self
            .args
            .iter()
            .map(|(name, arg)| Ok((name.clone(), arg.resolve()?)))
            .collect::<Result<IndexMap<_, _>, SchemaError>>()?;

        Ok(ResolvedField {
            name: self.name.clone(),
            ty: self.ty.resolve()?,
            description: self.description.clone(),
            resolver: self.resolver.clone(),
            deprecation_reason: self.deprecation_reason.clone(),
            args,
            is_type_of: self.is_type_of.clone(),
        })
    }
}

impl fmt::Debug for FieldDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDraft")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("description", &self.description)
            .field("resolver", &self.resolver.is_some())
            .field("deprecation_reason", &self.deprecation_reason)
            .field("args", &self.args)
            .finish()
    }
}

/// A resolved argument.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedArgument {
    /// Argument name.
    pub name: String,
    /// Concrete argument type.
    pub ty: TypeRef,
    /// Value used when the argument is omitted.
    pub default_value: Option<Value>,
    /// Argument description.
    pub description: Option<String>,
}

/// A field with every type reference resolved.
#[derive(Clone)]
pub struct ResolvedField {
    /// Field name.
    pub name: String,
    /// Concrete field type.
    pub ty: TypeRef,
    /// Field description.
    pub description: Option<String>,
    /// Field resolver; `None` reads the same-named key of the parent.
    pub resolver: Option<Resolver>,
    /// Deprecation reason.
    pub deprecation_reason: Option<String>,
    /// Arguments, keyed by name.
    pub args: IndexMap<String, ResolvedArgument>,
    /// Predicate marking values of the owning object type.
    pub is_type_of: Option<TypePredicate>,
}

impl ResolvedField {
    /// Turns the field back into a draft with a concrete type.
    pub(crate) fn to_draft(&self) -> FieldDraft {
        FieldDraft {
            name: self.name.clone(),
            ty: TypeSpec::Resolved(self.ty.clone()),
            description: self.description.clone(),
            resolver: self.resolver.clone(),
            deprecation_reason: self.deprecation_reason.clone(),
            args: self
                .args
                .values()
                .map(|arg| {
                    let draft = ArgumentDraft {
                        name: arg.name.clone(),
                        ty: TypeSpec::Resolved(arg.ty.clone()),
                        default_value: arg.default_value.clone(),
                        description: arg.description.clone(),
                    };
                    (arg.name.clone(), draft)
                })
                .collect(),
            is_type_of: self.is_type_of.clone(),
        }
    }
}

impl fmt::Debug for ResolvedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedField")
            .field("name", &self.name)
            .field("ty", &self.ty.to_string())
            .field("description", &self.description)
            .field("resolver", &self.resolver.is_some())
            .field("deprecation_reason", &self.deprecation_reason)
            .field("args", &self.args.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_shorthand() {
        let decl = FieldDecl::from(("name", TypeRef::named(TypeRef::STRING), "The name."));
        match decl {
            FieldDecl::ByName {
                name,
                ty,
                description,
                resolver,
            } => {
                assert_eq!(name, "name");
                assert!(ty.is_some());
                assert_eq!(description.as_deref(), Some("The name."));
                assert!(resolver.is_none());
            }
            FieldDecl::ByDescriptor(_) => panic!("expected a by-name declaration"),
        }
    }

    #[test]
    fn test_spec_requires_name_and_type() {
        let nameless = FieldSpec::new("", TypeRef::named(TypeRef::STRING));
        assert!(nameless.into_draft().unwrap_err().is_validation());

        let typeless = FieldSpec {
            name: "id".into(),
            ..FieldSpec::default()
        };
        assert!(typeless.into_draft().unwrap_err().is_validation());
    }

    #[test]
    fn test_draft_resolves_argument_thunks() {
        let mut draft = FieldDraft::new("hero".into(), TypeSpec::lazy(|| TypeRef::named("Character")));
        draft.args.insert(
            "episode".into(),
            ArgumentDraft::new("episode", TypeSpec::lazy(|| TypeRef::named("Episode")))
                .default_value(Value::Enum(Name::new("JEDI"))),
        );

        let resolved = draft.resolve().unwrap();
        assert_eq!(resolved.ty, TypeRef::named("Character"));
        assert_eq!(resolved.args["episode"].ty, TypeRef::named("Episode"));
        assert_eq!(
            resolved.args["episode"].default_value,
            Some(Value::Enum(Name::new("JEDI")))
        );

        // Raw thunks stay in place for the next materialization.
        assert!(draft.ty.is_deferred());
        assert!(draft.args["episode"].ty.is_deferred());
    }
}
