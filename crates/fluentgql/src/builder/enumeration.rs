//! Enum type builder.

use async_graphql::dynamic::{Enum, EnumItem, TypeRef};
use async_graphql::{Name, Value};

use crate::error::SchemaError;

/// One enum value: the GraphQL label and the value it stands for.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    pub label: String,
    pub value: Value,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

/// Builder for GraphQL enum types.
#[derive(Clone, Debug)]
pub struct EnumBuilder {
    name: String,
    description: Option<String>,
    values: Vec<EnumValue>,
}

impl EnumBuilder {
    /// Creates an enum with no values.
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_owned),
            values: Vec::new(),
        }
    }

    /// Adds a value.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `label` is already defined.
    pub fn value(
        mut self,
        label: impl Into<String>,
        value: impl Into<Value>,
        description: Option<&str>,
    ) -> Result<Self, SchemaError> {
        let label = label.into();
        if self.values.iter().any(|v| v.label == label) {
            return Err(SchemaError::validation(
                "value",
                format!("'{label}' is already defined by {}", self.name),
            ));
        }
        self.values.push(EnumValue {
            label,
            value: value.into(),
            description: description.map(str::to_owned),
            deprecation_reason: None,
        });
        Ok(self)
    }

    /// Deprecates the most recently added value.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no value has been added yet.
    pub fn deprecated(mut self, reason: impl Into<String>) -> Result<Self, SchemaError> {
        let last = self.values.last_mut().ok_or_else(|| {
            SchemaError::validation("deprecated", "deprecations must appear under a value")
        })?;
        last.deprecation_reason = Some(reason.into());
        Ok(self)
    }

    /// Snapshots the builder.
    pub fn materialize(self) -> EnumDescriptor {
        EnumDescriptor {
            name: self.name,
            description: self.description,
            values: self.values,
        }
    }
}

/// A materialized enum type.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumDescriptor {
    name: String,
    description: Option<String>,
    values: Vec<EnumValue>,
}

impl EnumDescriptor {
    /// The enum name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The enum description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The values, in declaration order.
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    /// A nullable handle to this type.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::named(self.name.clone())
    }

    /// Returns the label of the value equal to `value`.
    pub fn label_of(&self, value: &Value) -> Option<&str> {
        self.values
            .iter()
            .find(|v| &v.value == value)
            .map(|v| v.label.as_str())
    }

    /// Returns the value behind `label`.
    pub fn value_of(&self, label: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|v| v.label == label)
            .map(|v| &v.value)
    }

    /// Serializes `value` as an enum output value.
    pub fn serialize(&self, value: &Value) -> Option<Value> {
        self.label_of(value).map(|label| Value::Enum(Name::new(label)))
    }

    /// Builds the engine's enum type.
    pub fn to_engine(&self) -> Enum {
        let mut ty = Enum::new(self.name.as_str());
        if let Some(description) = &self.description {
            ty = ty.description(description.as_str());
        }
        for value in &self.values {
            let mut item = EnumItem::new(value.label.as_str());
            if let Some(description) = &value.description {
                item = item.description(description.as_str());
            }
            if let Some(reason) = &value.deprecation_reason {
                item = item.deprecation(Some(reason.as_str()));
            }
            ty = ty.item(item);
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode() -> EnumDescriptor {
        EnumBuilder::new("Episode", Some("One of the films in the Star Wars Trilogy"))
            .value("NEWHOPE", 4, Some("Released in 1977."))
            .unwrap()
            .value("EMPIRE", 5, Some("Released in 1980."))
            .unwrap()
            .value("JEDI", 6, Some("Released in 1983."))
            .unwrap()
            .materialize()
    }

    #[test]
    fn test_values_keep_order() {
        let labels: Vec<_> = episode().values().iter().map(|v| v.label.clone()).collect();
        assert_eq!(labels, ["NEWHOPE", "EMPIRE", "JEDI"]);
    }

    #[test]
    fn test_label_and_value_lookup() {
        let episode = episode();
        assert_eq!(episode.label_of(&Value::from(5)), Some("EMPIRE"));
        assert_eq!(episode.value_of("JEDI"), Some(&Value::from(6)));
        assert_eq!(
            episode.serialize(&Value::from(4)),
            Some(Value::Enum(Name::new("NEWHOPE")))
        );
        assert_eq!(episode.label_of(&Value::from(1)), None);
    }

    #[test]
    fn test_duplicate_label_fails() {
        let err = EnumBuilder::new("Episode", None)
            .value("JEDI", 6, None)
            .unwrap()
            .value("JEDI", 7, None)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_deprecated_applies_to_last_value() {
        let err = EnumBuilder::new("Episode", None).deprecated("gone").unwrap_err();
        assert!(err.is_validation());

        let episode = EnumBuilder::new("Episode", None)
            .value("NEWHOPE", 4, None)
            .unwrap()
            .value("HOLIDAY", 0, None)
            .unwrap()
            .deprecated("We do not talk about it")
            .unwrap()
            .materialize();
        assert_eq!(episode.values()[0].deprecation_reason, None);
        assert_eq!(
            episode.values()[1].deprecation_reason.as_deref(),
            Some("We do not talk about it")
        );
    }
}
