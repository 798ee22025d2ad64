//! Object type builder.
//!
//! An object built with a list of interfaces starts out with every field
//! those interfaces declare. Inherited descriptions are reworded for the
//! object: the first occurrence of the interface name is replaced with the
//! object name, falling back to the lower-cased interface name.
//!
//! The `Node` interface is special: instead of copying its `id` field the
//! object gets a global identifier field (see [`crate::relay`]).

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::TypeRef;
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::base::{TypeBuilder, TypeDescriptor};
use super::interface::InterfaceDescriptor;
use crate::error::SchemaError;
use crate::field::{
    ArgDecl, ArgumentDraft, Args, FieldDecl, FieldDraft, ResolvedField, TypePredicate,
};
use crate::relay;

/// Builder for GraphQL object types.
#[derive(Clone, Debug)]
pub struct ObjectTypeBuilder {
    base: TypeBuilder,
    interfaces: Vec<String>,
}

impl ObjectTypeBuilder {
    /// Creates an object builder and copies in the fields of `interfaces`,
    /// in order.
    ///
    /// # Errors
    ///
    /// Fails if an interface's field map cannot be resolved.
    pub fn new(
        name: impl Into<String>,
        description: Option<&str>,
        interfaces: &[&InterfaceDescriptor],
    ) -> Result<Self, SchemaError> {
        let mut builder = Self {
            base: TypeBuilder::new(name, description),
            interfaces: interfaces.iter().map(|i| i.name().to_owned()).collect(),
        };

        for interface in interfaces {
            builder.inherit(interface)?;
        }
        builder.base.fields.commit();

        Ok(builder)
    }

    fn inherit(&mut self, interface: &InterfaceDescriptor) -> Result<(), SchemaError> {
        let fields = interface.fields()?;
        let owner = self.base.name().to_owned();

        if is_node_interface(interface.name(), &fields) {
            debug!(object = %owner, "Synthesizing global id field for Node interface");
            self.base
                .fields
                .start_or_edit_field(relay::global_id_field(&owner).into())?;
            return Ok(());
        }

        debug!(
            object = %owner,
            interface = %interface.name(),
            count = fields.len(),
            "Inheriting interface fields"
        );
        for (name, field) in &fields {
            let mut draft: FieldDraft = field.to_draft();
            draft.description = field
                .description
                .as_deref()
                .map(|text| reword(text, interface.name(), &owner));
            trace!(object = %owner, field = %name, "Inherited field");
            self.base.fields.insert_committed(draft);
        }

        Ok(())
    }

    /// The object name.
    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// Enables a trace event whenever the `id` field is edited.
    #[must_use]
    pub fn trace_edits(mut self, enabled: bool) -> Self {
        self.base = self.base.trace_edits(enabled);
        self
    }

    /// Creates a field or re-opens an existing (possibly inherited) one.
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

    /// Sets the open field's description.
    ///
    /// # Errors
    ///
    /// Fails if no field is open.
    pub fn describe(mut self, description: impl Into<String>) -> Result<Self, SchemaError> {
        self.base.fields.set_description(description)?;
        Ok(self)
    }

    /// Sets the open field's resolver.
    ///
    /// # Errors
    ///
    /// Fails if no field is open.
    pub fn resolve<F>(mut self, resolver: F) -> Result<Self, SchemaError>
    where
        F: Fn(&Value, &Args) -> async_graphql::Result<Value> + Send + Sync + 'static,
    {
        self.base.fields.set_resolver(Arc::new(resolver))?;
        Ok(self)
    }

    /// Attaches a type-membership predicate while a field is open.
    ///
    /// The predicate is recorded on the open field and becomes the
    /// object's predicate when the schema picks a concrete type for an
    /// interface or union value.
    ///
    /// # Errors
    ///
    /// Fails if no field is open.
    pub fn is_type_of<F>(mut self, predicate: F) -> Result<Self, SchemaError>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.base.fields.set_is_type_of(Arc::new(predicate))?;
        Ok(self)
    }

    /// Commits the open field and snapshots the builder.
    pub fn materialize(self) -> ObjectDescriptor {
        ObjectDescriptor {
            base: self.base.materialize(),
            interfaces: self.interfaces,
        }
    }
}

/// A materialized object type.
#[derive(Clone, Debug)]
pub struct ObjectDescriptor {
    base: TypeDescriptor,
    interfaces: Vec<String>,
}

impl ObjectDescriptor {
    /// The object name.
    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// The object description.
    pub fn description(&self) -> Option<&str> {
        self.base.description()
    }

    /// Names of the implemented interfaces, in declaration order.
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
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

    /// The first type-membership predicate attached to any field.
    pub fn is_type_of(&self) -> Option<TypePredicate> {
        self.base
            .drafts()
            .values()
            .find_map(|draft| draft.is_type_of.clone())
    }

    /// The underlying type descriptor.
    pub fn base(&self) -> &TypeDescriptor {
        &self.base
    }
}

fn is_node_interface(name: &str, fields: &IndexMap<String, ResolvedField>) -> bool {
    name == relay::NODE_INTERFACE && fields.contains_key(relay::NODE_ID_FIELD)
}

/// Replaces the first occurrence of `interface` in `text` with `object`,
/// retrying with the lower-cased interface name if nothing matched.
fn reword(text: &str, interface: &str, object: &str) -> String {
    let replaced = text.replacen(interface, object, 1);
    if replaced != text {
        return replaced;
    }
    text.replacen(&interface.to_lowercase(), object, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::interface::InterfaceTypeBuilder;
    use crate::lazy::TypeSpec;

    fn character() -> InterfaceDescriptor {
        InterfaceTypeBuilder::new("Character", Some("A character in the Star Wars Trilogy"))
            .field((
                "id",
                TypeRef::named_nn(TypeRef::STRING),
                "The id of the character.",
            ))
            .unwrap()
            .field(("name", TypeRef::named(TypeRef::STRING), "The name of the Character."))
            .unwrap()
            .field((
                "friends",
                TypeSpec::lazy(|| TypeRef::named_list("Character")),
                "The friends of the character, or an empty list if they have none.",
            ))
            .unwrap()
            .materialize()
    }

    #[test]
    fn test_reword_prefers_exact_case() {
        assert_eq!(
            reword("The name of the Character.", "Character", "Human"),
            "The name of the Human."
        );
        assert_eq!(
            reword("The id of the character.", "Character", "Human"),
            "The id of the Human."
        );
        assert_eq!(reword("Unrelated.", "Character", "Human"), "Unrelated.");
    }

    #[test]
    fn test_reword_replaces_first_occurrence_only() {
        assert_eq!(
            reword("Character of a Character", "Character", "Droid"),
            "Droid of a Character"
        );
    }

    #[test]
    fn test_inherits_interface_fields() {
        let iface = character();
        let human = ObjectTypeBuilder::new("Human", None, &[&iface])
            .unwrap()
            .field(("homePlanet", TypeRef::named(TypeRef::STRING)))
            .unwrap()
            .materialize();

        let fields = human.fields().unwrap();
        assert_eq!(
            fields.keys().map(String::as_str).collect::<Vec<_>>(),
            ["id", "name", "friends", "homePlanet"]
        );
        assert_eq!(fields["id"].description.as_deref(), Some("The id of the Human."));
        assert_eq!(fields["name"].description.as_deref(), Some("The name of the Human."));
        assert_eq!(fields["friends"].ty, TypeRef::named_list("Character"));
        assert_eq!(human.interfaces(), ["Character"]);
    }

    #[test]
    fn test_inherited_field_can_be_edited() {
        let iface = character();
        let human = ObjectTypeBuilder::new("Human", None, &[&iface])
            .unwrap()
            .field("friends")
            .unwrap()
            .resolve(|_, _| Ok(Value::List(vec![])))
            .unwrap()
            .materialize();

        let fields = human.fields().unwrap();
        assert!(fields["friends"].resolver.is_some());
        assert_eq!(fields["friends"].ty, TypeRef::named_list("Character"));
    }

    #[test]
    fn test_node_interface_gets_global_id() {
        let iface = character();
        let node = relay::node_interface().unwrap().materialize();
        let droid = ObjectTypeBuilder::new("Droid", None, &[&iface, &node])
            .unwrap()
            .materialize();

        let fields = droid.fields().unwrap();
        let id = &fields["id"];
        assert_eq!(id.ty, TypeRef::named_nn(TypeRef::ID));
        assert_eq!(id.description.as_deref(), Some("The ID of an object"));
        assert!(id.resolver.is_some());
        // Still in the position the Character interface gave it.
        assert_eq!(fields.get_index_of("id"), Some(0));
    }

    #[test]
    fn test_nothing_open_after_construction() {
        let iface = character();
        let err = ObjectTypeBuilder::new("Human", None, &[&iface])
            .unwrap()
            .describe("text")
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_is_type_of_requires_open_field() {
        let err = ObjectTypeBuilder::new("Human", None, &[])
            .unwrap()
            .is_type_of(|_| true)
            .unwrap_err();
        assert!(err.is_validation());

        let human = ObjectTypeBuilder::new("Human", None, &[])
            .unwrap()
            .field(("homePlanet", TypeRef::named(TypeRef::STRING)))
            .unwrap()
            .is_type_of(|value| matches!(value, Value::Object(obj) if obj.contains_key("homePlanet")))
            .unwrap()
            .materialize();
        assert!(human.is_type_of().is_some());
    }
}
