//! # fluentgql
//!
//! Fluent schema builders for async-graphql's dynamic schema API.
//!
//! Types are declared with chained calls instead of nested configuration
//! literals. Field types may be deferred behind a thunk, which lets types
//! that reference each other be declared in any order.
//!
//! ## Overview
//!
//! ```ignore
//! use fluentgql::{interface, list, object, required, schema, string};
//! use fluentgql::lazy::TypeSpec;
//!
//! let character = interface("Character", Some("A character in the Star Wars Trilogy"))
//!     .field(("id", required(string()), "The id of the character."))?
//!     .field(("name", string(), "The name of the character."))?
//!     .field(("friends", list(TypeSpec::lazy(|| fluentgql::named("Character")))))?
//!     .materialize();
//!
//! let human = object("Human", None, &[&character])?
//!     .field(("homePlanet", string()))?
//!     .materialize();
//! ```
//!
//! The `human` object starts out with `id`, `name` and `friends`, and the
//! inherited descriptions read "The id of the Human." and so on.
//!
//! ## Configuration
//!
//! Execution limits can be loaded from TOML:
//!
//! ```toml
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```
//!
//! ## Modules
//!
//! - [`builder`] - Object, interface, union and enum builders
//! - [`field`] - Field and argument declarations
//! - [`lazy`] - Deferred type references
//! - [`relay`] - Global ids and the Node interface
//! - [`scalar`] - Validated string scalars
//! - [`schema`] - Assembly into an executable schema
//! - [`config`] - Execution limits
//! - [`error`] - Error types

pub mod builder;
pub mod config;
pub mod error;
pub mod field;
pub mod lazy;
pub mod relay;
pub mod scalar;
pub mod schema;
pub mod types;

// Re-export main types
pub use builder::{
    EnumBuilder, EnumDescriptor, InterfaceDescriptor, InterfaceTypeBuilder, ObjectDescriptor,
    ObjectTypeBuilder, ResolveOrDescription, TypeBuilder, TypeDescriptor, UnionDescriptor,
};
pub use config::SchemaConfig;
pub use error::SchemaError;
pub use field::{ArgDecl, ArgumentDraft, FieldDecl, FieldSpec};
pub use lazy::{TypeSlot, TypeSpec};
pub use scalar::{ScalarError, ScalarErrorKind, StringScalar, StringScalarConfig, email};
pub use schema::{Registration, SchemaAssembly};
pub use types::{boolean, float, id, int, list, named, required, string};

use async_graphql::dynamic::TypeRef;

/// Result type for schema construction.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Starts an object type that implements `interfaces`.
///
/// # Errors
///
/// Fails if an interface's field map cannot be resolved.
pub fn object(
    name: impl Into<String>,
    description: Option<&str>,
    interfaces: &[&InterfaceDescriptor],
) -> Result<ObjectTypeBuilder> {
    ObjectTypeBuilder::new(name, description, interfaces)
}

/// Starts an interface type.
pub fn interface(name: impl Into<String>, description: Option<&str>) -> InterfaceTypeBuilder {
    InterfaceTypeBuilder::new(name, description)
}

/// Declares a union.
///
/// # Errors
///
/// Fails if `types` is empty or holds anything but named types.
pub fn union(
    name: impl Into<String>,
    types: impl IntoIterator<Item = TypeRef>,
    resolve_or_description: impl Into<ResolveOrDescription>,
    description: Option<&str>,
) -> Result<UnionDescriptor> {
    UnionDescriptor::new(name, types, resolve_or_description, description)
}

/// Starts an enum type.
pub fn enumeration(name: impl Into<String>, description: Option<&str>) -> EnumBuilder {
    EnumBuilder::new(name, description)
}

/// Builds a string scalar from its configuration.
pub fn string_scalar(config: StringScalarConfig) -> StringScalar {
    config.into()
}

/// Starts schema assembly with the given root types.
pub fn schema(query: ObjectDescriptor, mutation: Option<ObjectDescriptor>) -> SchemaAssembly {
    SchemaAssembly::new(query, mutation)
}
