//! Relay-style object identification.
//!
//! A global id is the base64 encoding of `"<Type>:<id>"`, the format used
//! by graphql-relay. Objects implementing the [`NODE_INTERFACE`] get an `id`
//! field that produces such ids from the parent's own `id` key.

use async_graphql::dynamic::TypeRef;
use async_graphql::{Error, Value};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::builder::{InterfaceDescriptor, InterfaceTypeBuilder};
use crate::error::SchemaError;
use crate::field::{ArgumentDraft, FieldSpec};

/// Name of the distinguished Node interface.
pub const NODE_INTERFACE: &str = "Node";

/// Name of the identifying field on Node.
pub const NODE_ID_FIELD: &str = "id";

/// Encodes a type name and a type-local id as a global id.
pub fn to_global_id(type_name: &str, id: &str) -> String {
    STANDARD.encode(format!("{type_name}:{id}"))
}

/// A decoded global id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalId {
    pub type_name: String,
    pub id: String,
}

/// Decodes a global id.
///
/// Returns `None` if `global_id` is not base64 of `"<Type>:<id>"`.
pub fn from_global_id(global_id: &str) -> Option<GlobalId> {
    let bytes = STANDARD.decode(global_id).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let (type_name, id) = decoded.split_once(':')?;
    Some(GlobalId {
        type_name: type_name.to_owned(),
        id: id.to_owned(),
    })
}

/// A complete `id: ID!` field producing global ids for `type_name`.
pub fn global_id_field(type_name: &str) -> FieldSpec {
    let type_name = type_name.to_owned();
    FieldSpec::new(NODE_ID_FIELD, TypeRef::named_nn(TypeRef::ID))
        .description("The ID of an object")
        .resolver(move |parent, _| {
            let local = match parent {
                Value::Object(obj) => obj.get(NODE_ID_FIELD),
                _ => None,
            };
            match local {
                Some(Value::String(id)) => Ok(Value::String(to_global_id(&type_name, id))),
                Some(Value::Number(id)) => {
                    Ok(Value::String(to_global_id(&type_name, &id.to_string())))
                }
                _ => Err(Error::new(format!(
                    "{type_name} value has no '{NODE_ID_FIELD}' to build a global id from"
                ))),
            }
        })
}

/// The Node interface: a single `id: ID!` field.
///
/// # Errors
///
/// Propagates builder validation failures.
pub fn node_interface() -> Result<InterfaceTypeBuilder, SchemaError> {
    InterfaceTypeBuilder::new(NODE_INTERFACE, Some("An object with an ID")).field((
        NODE_ID_FIELD,
        TypeRef::named_nn(TypeRef::ID),
        "The id of the object.",
    ))
}

/// The Node interface and the `node(id:)` root field that goes with it.
pub struct NodeDefinitions {
    pub interface: InterfaceDescriptor,
    pub field: FieldSpec,
}

/// A `node(id: ID!)` root field.
///
/// The field decodes its global id and hands the type name and local id to
/// `fetch`. Ids that do not decode resolve to null.
pub fn node_field<F>(fetch: F) -> FieldSpec
where
    F: Fn(&str, &str) -> Option<Value> + Send + Sync + 'static,
{
    FieldSpec::new("node", TypeRef::named(NODE_INTERFACE))
        .description("Fetches an object given its ID")
        .argument(
            ArgumentDraft::new("id", TypeRef::named_nn(TypeRef::ID))
                .description("The ID of an object"),
        )
        .resolver(move |_, args| {
            let Some(Value::String(global_id)) = args.get("id") else {
                return Ok(Value::Null);
            };
            Ok(from_global_id(global_id)
                .and_then(|gid| fetch(&gid.type_name, &gid.id))
                .unwrap_or(Value::Null))
        })
}

/// Builds the Node interface and a `node` root field.
///
/// `fetch` receives the decoded type name and local id; `resolve_type`
/// picks the concrete type of whatever `fetch` returned.
///
/// # Errors
///
/// Fails if the interface cannot be built.
pub fn node_definitions<F, R>(fetch: F, resolve_type: R) -> Result<NodeDefinitions, SchemaError>
where
    F: Fn(&str, &str) -> Option<Value> + Send + Sync + 'static,
    R: Fn(&Value) -> Option<String> + Send + Sync + 'static,
{
    Ok(NodeDefinitions {
        interface: node_interface()?.resolve(resolve_type).materialize(),
        field: node_field(fetch),
    })
}
