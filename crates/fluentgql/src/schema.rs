//! Schema assembly.
//!
//! [`SchemaAssembly`] takes materialized descriptors and builds an executable
//! schema with async-graphql's dynamic schema API. Field types are resolved
//! here (this is where thunks finally run), and resolvers are wrapped so
//! that:
//! - a field without a resolver reads the same-named key of its parent
//! - values returned for interface or union typed fields are tagged with
//!   their concrete object type, chosen by the abstract type's callback or,
//!   failing that, by the member objects' `is_type_of` predicates
//! - registered enums translate between labels and underlying values, both
//!   for arguments on the way in and for results on the way out
//! - literals written for a registered string scalar's arguments are
//!   checked before the resolver runs; variables pass through unchanged

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputValue, Interface, InterfaceField, Object,
    ResolverContext, Schema, TypeRef,
};
use async_graphql::{Error, Value};
use tracing::{debug, trace};

use crate::builder::{EnumDescriptor, InterfaceDescriptor, ObjectDescriptor, UnionDescriptor};
use crate::config::SchemaConfig;
use crate::error::SchemaError;
use crate::field::{
    Args, ResolvedArgument, ResolvedField, Resolver, TypePredicate, TypeResolver,
};
use crate::scalar::StringScalar;

/// A type registered with the schema besides the root operation types.
#[derive(Clone, Debug)]
pub enum Registration {
    Object(ObjectDescriptor),
    Interface(InterfaceDescriptor),
    Union(UnionDescriptor),
    Enum(EnumDescriptor),
    Scalar(StringScalar),
}

impl From<ObjectDescriptor> for Registration {
    fn from(ty: ObjectDescriptor) -> Self {
        Self::Object(ty)
    }
}

impl From<InterfaceDescriptor> for Registration {
    fn from(ty: InterfaceDescriptor) -> Self {
        Self::Interface(ty)
    }
}

impl From<UnionDescriptor> for Registration {
    fn from(ty: UnionDescriptor) -> Self {
        Self::Union(ty)
    }
}

impl From<EnumDescriptor> for Registration {
    fn from(ty: EnumDescriptor) -> Self {
        Self::Enum(ty)
    }
}

impl From<StringScalar> for Registration {
    fn from(ty: StringScalar) -> Self {
        Self::Scalar(ty)
    }
}

/// Collects root types and registered types into an executable schema.
///
/// # Example
///
/// ```ignore
/// let schema = schema(query, None)
///     .register(character)
///     .register(human)
///     .register(episode)
///     .finish()?;
/// let response = schema.execute("{ hero { name } }").await;
/// ```
#[derive(Debug)]
pub struct SchemaAssembly {
    query: ObjectDescriptor,
    mutation: Option<ObjectDescriptor>,
    types: Vec<Registration>,
    config: SchemaConfig,
}

impl SchemaAssembly {
    /// Starts an assembly with the given root types.
    pub fn new(query: ObjectDescriptor, mutation: Option<ObjectDescriptor>) -> Self {
        Self {
            query,
            mutation,
            types: Vec::new(),
            config: SchemaConfig::default(),
        }
    }

    /// Registers a type.
    #[must_use]
    pub fn register(mut self, ty: impl Into<Registration>) -> Self {
        self.types.push(ty.into());
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a deferred type
    /// cannot be resolved, or the engine rejects the schema.
    pub fn finish(self) -> Result<Schema, SchemaError> {
        self.config.validate()?;
        debug!(query = %self.query.name(), types = self.types.len(), "Starting schema assembly");

        let objects: Vec<&ObjectDescriptor> = std::iter::once(&self.query)
            .chain(self.mutation.as_ref())
            .chain(self.types.iter().filter_map(|ty| match ty {
                Registration::Object(object) => Some(object),
                _ => None,
            }))
            .collect();
        let abstract_types = self.abstract_types(&objects);
        let leaves = self.leaf_types();

        let mut builder = Schema::build(
            self.query.name(),
            self.mutation.as_ref().map(ObjectDescriptor::name),
            None,
        );

        for object in &objects {
            builder = builder.register(object_to_engine(object, &abstract_types, &leaves)?);
        }
        for ty in &self.types {
            builder = match ty {
                Registration::Object(_) => builder,
                Registration::Interface(interface) => {
                    builder.register(interface_to_engine(interface, &leaves)?)
                }
                Registration::Union(union) => builder.register(union.to_engine()),
                Registration::Enum(enumeration) => builder.register(enumeration.to_engine()),
                Registration::Scalar(scalar) => builder.register(scalar.to_engine()),
            };
        }

        let mut builder = builder
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);
        if !self.config.introspection {
            builder = builder.disable_introspection();
        }

        let schema = builder.finish()?;
        debug!("Schema assembly complete");
        Ok(schema)
    }

    /// Indexes interfaces and unions by name with the candidates that can
    /// stand in for them at runtime.
    fn abstract_types(&self, objects: &[&ObjectDescriptor]) -> AbstractTypes {
        let mut index = AbstractTypes::new();

        for ty in &self.types {
            let (name, resolve_type, members): (&str, _, Vec<&ObjectDescriptor>) = match ty {
                Registration::Interface(interface) => (
                    interface.name(),
                    interface.resolve_type().cloned(),
                    objects
                        .iter()
                        .copied()
                        .filter(|o| o.interfaces().iter().any(|i| i == interface.name()))
                        .collect(),
                ),
                Registration::Union(union) => (
                    union.name(),
                    union.resolve_type().cloned(),
                    objects
                        .iter()
                        .copied()
                        .filter(|o| union.types().iter().any(|t| t == o.name()))
                        .collect(),
                ),
                _ => continue,
            };

            let candidates = members
                .into_iter()
                .filter_map(|o| o.is_type_of().map(|p| (o.name().to_owned(), p)))
                .collect();
            index.insert(
                name.to_owned(),
                Arc::new(AbstractType {
                    name: name.to_owned(),
                    resolve_type,
                    candidates,
                }),
            );
        }

        index
    }

    /// Indexes registered enums and string scalars by name.
    fn leaf_types(&self) -> LeafTypes {
        let mut leaves = LeafTypes::default();
        for ty in &self.types {
            match ty {
                Registration::Enum(enumeration) => {
                    leaves
                        .enums
                        .insert(enumeration.name().to_owned(), Arc::new(enumeration.clone()));
                }
                Registration::Scalar(scalar) => {
                    leaves
                        .scalars
                        .insert(scalar.name().to_owned(), Arc::new(scalar.clone()));
                }
                _ => {}
            }
        }
        leaves
    }
}

type AbstractTypes = HashMap<String, Arc<AbstractType>>;

/// An interface or union as seen from a field returning it.
struct AbstractType {
    name: String,
    resolve_type: Option<TypeResolver>,
    candidates: Vec<(String, TypePredicate)>,
}

impl AbstractType {
    fn concrete_type(&self, value: &Value) -> async_graphql::Result<String> {
        if let Some(resolve) = &self.resolve_type
            && let Some(name) = resolve(value)
        {
            return Ok(name);
        }
        self.candidates
            .iter()
            .find(|(_, is_type_of)| is_type_of(value))
            .map(|(name, _)| name.clone())
            .ok_or_else(|| {
                Error::new(format!(
                    "Abstract type {} must resolve to an object type at runtime",
                    self.name
                ))
            })
    }
}

impl fmt::Debug for AbstractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbstractType")
            .field("name", &self.name)
            .field("resolve_type", &self.resolve_type.is_some())
            .field(
                "candidates",
                &self.candidates.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Enum and scalar types the assembly translates values for.
#[derive(Debug, Default)]
struct LeafTypes {
    enums: HashMap<String, Arc<EnumDescriptor>>,
    scalars: HashMap<String, Arc<StringScalar>>,
}

/// An argument whose value needs work before the resolver sees it.
#[derive(Debug)]
enum LeafArgument {
    /// Labels are replaced by the enum's underlying values.
    Enum(String, Arc<EnumDescriptor>),
    /// Literals are checked against the scalar's rules.
    Scalar(String, Arc<StringScalar>),
}

/// Everything a field's resolver closure needs at execution time.
struct FieldRuntime {
    name: String,
    ty: TypeRef,
    resolver: Option<Resolver>,
    tag: Option<Arc<AbstractType>>,
    output_enum: Option<Arc<EnumDescriptor>>,
    arguments: Vec<LeafArgument>,
}

impl FieldRuntime {
    fn new(field: &ResolvedField, abstract_types: &AbstractTypes, leaves: &LeafTypes) -> Self {
        let arguments = field
            .args
            .values()
            .filter_map(|arg| {
                let ty = arg.ty.type_name();
                if let Some(enumeration) = leaves.enums.get(ty) {
                    Some(LeafArgument::Enum(arg.name.clone(), Arc::clone(enumeration)))
                } else {
                    leaves
                        .scalars
                        .get(ty)
                        .map(|scalar| LeafArgument::Scalar(arg.name.clone(), Arc::clone(scalar)))
                }
            })
            .collect();

        Self {
            name: field.name.clone(),
            ty: field.ty.clone(),
            resolver: field.resolver.clone(),
            tag: abstract_types.get(field.ty.type_name()).cloned(),
            output_enum: leaves.enums.get(field.ty.type_name()).cloned(),
            arguments,
        }
    }

    fn resolve<'a>(
        &self,
        ctx: &ResolverContext<'a>,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        self.check_literals(ctx)?;

        let null = Value::Null;
        let parent = ctx.parent_value.as_value().unwrap_or(&null);
        let value = match &self.resolver {
            Some(resolve) => {
                let args = self.arguments_for(ctx.args.as_index_map());
                resolve(parent, &*args)?
            }
            None => default_resolve(parent, &self.name),
        };
        to_field_value(
            value,
            &self.ty,
            self.tag.as_deref(),
            self.output_enum.as_deref(),
        )
    }

    /// Checks scalar arguments as written in the query document.
    fn check_literals(&self, ctx: &ResolverContext<'_>) -> async_graphql::Result<()> {
        for argument in &self.arguments {
            let LeafArgument::Scalar(name, scalar) = argument else {
                continue;
            };
            if let Some(literal) = ctx.ctx.item.node.get_argument(name) {
                scalar
                    .check_argument(literal)
                    .map_err(|err| err.into_field_error())?;
            }
        }
        Ok(())
    }

    /// Replaces enum labels with underlying values. Borrows when the field
    /// takes no enum arguments.
    fn arguments_for<'b>(&self, args: &'b Args) -> Cow<'b, Args> {
        let mut enums = self
            .arguments
            .iter()
            .filter_map(|argument| match argument {
                LeafArgument::Enum(name, enumeration) => Some((name, enumeration)),
                LeafArgument::Scalar(..) => None,
            })
            .peekable();
        if enums.peek().is_none() {
            return Cow::Borrowed(args);
        }

        let mut mapped = args.clone();
        for (name, enumeration) in enums {
            if let Some(value) = mapped.get_mut(name.as_str()) {
                *value = to_underlying(enumeration, std::mem::replace(value, Value::Null));
            }
        }
        Cow::Owned(mapped)
    }
}

impl fmt::Debug for FieldRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRuntime")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("resolver", &self.resolver.is_some())
            .field("tag", &self.tag)
            .field("output_enum", &self.output_enum.as_ref().map(|e| e.name()))
            .field("arguments", &self.arguments)
            .finish()
    }
}

fn object_to_engine(
    object: &ObjectDescriptor,
    abstract_types: &AbstractTypes,
    leaves: &LeafTypes,
) -> Result<Object, SchemaError> {
    let mut engine = Object::new(object.name());
    if let Some(description) = object.description() {
        engine = engine.description(description);
    }
    for interface in object.interfaces() {
        engine = engine.implement(interface.as_str());
    }

    for field in object.fields()?.into_values() {
        trace!(object = %object.name(), field = %field.name, ty = %field.ty, "Registering field");
        engine = engine.field(field_to_engine(field, abstract_types, leaves));
    }
    Ok(engine)
}

fn field_to_engine(
    field: ResolvedField,
    abstract_types: &AbstractTypes,
    leaves: &LeafTypes,
) -> Field {
    let runtime = Arc::new(FieldRuntime::new(&field, abstract_types, leaves));

    let mut engine = Field::new(field.name.as_str(), field.ty.clone(), move |ctx| {
        let outcome = runtime.resolve(&ctx);
        FieldFuture::new(async move { outcome })
    });
    if let Some(description) = &field.description {
        engine = engine.description(description.as_str());
    }
    if let Some(reason) = &field.deprecation_reason {
        engine = engine.deprecation(Some(reason.as_str()));
    }
    for arg in field.args.values() {
        engine = engine.argument(input_value(arg, leaves));
    }
    engine
}

fn interface_to_engine(
    interface: &InterfaceDescriptor,
    leaves: &LeafTypes,
) -> Result<Interface, SchemaError> {
    let mut engine = Interface::new(interface.name());
    if let Some(description) = interface.description() {
        engine = engine.description(description);
    }

    for field in interface.fields()?.into_values() {
        let mut engine_field = InterfaceField::new(field.name.as_str(), field.ty.clone());
        if let Some(description) = &field.description {
            engine_field = engine_field.description(description.as_str());
        }
        if let Some(reason) = &field.deprecation_reason {
            engine_field = engine_field.deprecation(Some(reason.as_str()));
        }
        for arg in field.args.values() {
            engine_field = engine_field.argument(input_value(arg, leaves));
        }
        engine = engine.field(engine_field);
    }
    Ok(engine)
}

/// Enum-typed defaults are given as underlying values and published as labels.
fn input_value(arg: &ResolvedArgument, leaves: &LeafTypes) -> InputValue {
    let mut input = InputValue::new(arg.name.as_str(), arg.ty.clone());
    if let Some(description) = &arg.description {
        input = input.description(description.as_str());
    }
    if let Some(default) = &arg.default_value {
        let default = match leaves.enums.get(arg.ty.type_name()) {
            Some(enumeration) => to_label(enumeration, default.clone()),
            None => default.clone(),
        };
        input = input.default_value(default);
    }
    input
}

/// Reads the same-named key from an object parent.
fn default_resolve(parent: &Value, name: &str) -> Value {
    match parent {
        Value::Object(obj) => obj.get(name).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Maps labels, including labels inside lists, to underlying values.
/// Variables may carry a label as a plain string.
fn to_underlying(enumeration: &EnumDescriptor, value: Value) -> Value {
    match value {
        Value::Enum(label) => enumeration
            .value_of(label.as_str())
            .cloned()
            .unwrap_or(Value::Enum(label)),
        Value::String(label) => enumeration
            .value_of(&label)
            .cloned()
            .unwrap_or(Value::String(label)),
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| to_underlying(enumeration, item))
                .collect(),
        ),
        other => other,
    }
}

/// Maps underlying values to labels. Values that match no entry are kept,
/// so a resolver may also return the label itself.
fn to_label(enumeration: &EnumDescriptor, value: Value) -> Value {
    match value {
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| to_label(enumeration, item))
                .collect(),
        ),
        value => enumeration.serialize(&value).unwrap_or(value),
    }
}

/// Shapes a resolved value for the engine, walking list wrappers, tagging
/// abstract-typed values with their concrete type and turning enum values
/// into labels.
fn to_field_value<'a>(
    value: Value,
    ty: &TypeRef,
    tag: Option<&AbstractType>,
    enumeration: Option<&EnumDescriptor>,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    match (ty, value) {
        (_, Value::Null) => Ok(None),
        (TypeRef::NonNull(inner), value) => to_field_value(value, inner, tag, enumeration),
        (TypeRef::List(inner), Value::List(items)) => {
            let items = items
                .into_iter()
                .map(|item| {
                    Ok(to_field_value(item, inner, tag, enumeration)?.unwrap_or(FieldValue::NULL))
                })
                .collect::<async_graphql::Result<Vec<_>>>()?;
            Ok(Some(FieldValue::list(items)))
        }
        (_, value) => match (tag, enumeration) {
            (Some(abstract_type), _) => {
                let concrete = abstract_type.concrete_type(&value)?;
                Ok(Some(FieldValue::value(value).with_type(concrete)))
            }
            (None, Some(enumeration)) => Ok(Some(FieldValue::value(to_label(enumeration, value)))),
            (None, None) => Ok(Some(FieldValue::value(value))),
        },
    }
}
