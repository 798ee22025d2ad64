//! Fluent type builders.
//!
//! ## Components
//!
//! - [`FieldAccumulator`] - the open-field state machine behind every builder
//! - [`TypeBuilder`] - name, description and fields
//! - [`ObjectTypeBuilder`] - adds interface inheritance and field resolvers
//! - [`InterfaceTypeBuilder`] - adds a type-resolution callback
//! - [`UnionDescriptor`] - eager, field-less union
//! - [`EnumBuilder`] - labelled values

mod accumulator;
mod base;
mod enumeration;
mod interface;
mod object;
mod union;

pub use accumulator::FieldAccumulator;
pub use base::{TypeBuilder, TypeDescriptor};
pub use enumeration::{EnumBuilder, EnumDescriptor, EnumValue};
pub use interface::{InterfaceDescriptor, InterfaceTypeBuilder};
pub use object::{ObjectDescriptor, ObjectTypeBuilder};
pub use union::{ResolveOrDescription, UnionDescriptor};
