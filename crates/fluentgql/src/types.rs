//! Type handle helpers.
//!
//! Thin wrappers over [`TypeRef`] that also accept deferred specs, so a
//! thunk can be wrapped in a list or non-null without being evaluated.

use async_graphql::dynamic::TypeRef;

use crate::lazy::TypeSpec;

/// `[T]`
pub fn list(ty: impl Into<TypeSpec>) -> TypeSpec {
    ty.into().list()
}

/// `T!`
pub fn required(ty: impl Into<TypeSpec>) -> TypeSpec {
    ty.into().non_null()
}

/// A nullable reference to a type by name.
pub fn named(name: impl Into<String>) -> TypeRef {
    TypeRef::named(name.into())
}

/// The built-in `String` scalar.
pub fn string() -> TypeRef {
    TypeRef::named(TypeRef::STRING)
}

/// The built-in `Int` scalar.
pub fn int() -> TypeRef {
    TypeRef::named(TypeRef::INT)
}

/// The built-in `Float` scalar.
pub fn float() -> TypeRef {
    TypeRef::named(TypeRef::FLOAT)
}

/// The built-in `Boolean` scalar.
pub fn boolean() -> TypeRef {
    TypeRef::named(TypeRef::BOOLEAN)
}

/// The built-in `ID` scalar.
pub fn id() -> TypeRef {
    TypeRef::named(TypeRef::ID)
}
