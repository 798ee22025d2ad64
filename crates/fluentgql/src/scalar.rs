//! Validated string scalars.
//!
//! A [`StringScalar`] passes values through unchanged on output and on
//! variable input, and checks literals written in a query when the field
//! taking them is resolved:
//! - the literal must be a string ([`ScalarErrorKind::Syntax`])
//! - its length must be within the configured bounds ([`ScalarErrorKind::Range`])
//! - it must match the configured pattern ([`ScalarErrorKind::Format`])
//!
//! Every failure carries the literal's position so the engine can report it.

use std::fmt;
use std::sync::LazyLock;

use async_graphql::dynamic::{Scalar, TypeRef};
use async_graphql::{Error, ErrorExtensions, ServerError};
use async_graphql_parser::{Pos, Positioned};
use async_graphql_value::{ConstValue, Value as Literal};
use regex::Regex;
use tracing::trace;

// =============================================================================
// Patterns
// =============================================================================

/// E-mail address, case-insensitive.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([\w-]+(?:\.[\w-]+)*)@((?:[\w-]+\.)*\w[\w-]{0,66})\.([a-z]{2,6}(?:\.[a-z]{2})?)$",
    )
    .expect("Invalid email regex")
});

// =============================================================================
// Errors
// =============================================================================

/// Why a literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarErrorKind {
    /// The literal is not a string.
    Syntax,
    /// The literal is too short or too long.
    Range,
    /// The literal does not match the pattern.
    Format,
}

/// A rejected literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarError {
    pub kind: ScalarErrorKind,
    pub message: String,
    pub locations: Vec<Pos>,
}

impl ScalarErrorKind {
    /// Machine-readable code reported in the `kind` error extension.
    pub fn code(self) -> &'static str {
        match self {
            Self::Syntax => "SYNTAX_ERROR",
            Self::Range => "RANGE_ERROR",
            Self::Format => "FORMAT_ERROR",
        }
    }
}

impl ScalarError {
    fn new(kind: ScalarErrorKind, message: String, pos: Pos) -> Self {
        Self {
            kind,
            message,
            locations: vec![pos],
        }
    }

    /// Converts into a field error. The kind and the literal's position are
    /// reported as `kind`, `line` and `column` extensions.
    pub fn into_field_error(self) -> Error {
        let kind = self.kind.code();
        let pos = self.locations.first().copied();
        Error::new(self.message).extend_with(move |_, extensions| {
            extensions.set("kind", kind);
            if let Some(pos) = pos {
                extensions.set("line", pos.line as u64);
                extensions.set("column", pos.column as u64);
            }
        })
    }
}

impl fmt::Display for ScalarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ScalarError {}

impl From<ScalarError> for ServerError {
    fn from(err: ScalarError) -> Self {
        let mut server = ServerError::new(err.message, None);
        server.locations = err.locations;
        server
    }
}

// =============================================================================
// StringScalar
// =============================================================================

/// A string scalar with optional length bounds and pattern.
///
/// # Example
///
/// ```ignore
/// let username = StringScalar::new("Username")
///     .min_len(3)
///     .max_len(32)
///     .pattern(Regex::new("^[a-z0-9_]+$")?);
/// ```
#[derive(Debug, Clone)]
pub struct StringScalar {
    name: String,
    description: Option<String>,
    min: Option<usize>,
    max: Option<usize>,
    regex: Option<Regex>,
}

impl StringScalar {
    /// Creates an unconstrained string scalar.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            min: None,
            max: None,
            regex: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the minimum length, in characters.
    #[must_use]
    pub fn min_len(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the maximum length, in characters.
    #[must_use]
    pub fn max_len(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Sets the pattern literals must match.
    #[must_use]
    pub fn pattern(mut self, regex: Regex) -> Self {
        self.regex = Some(regex);
        self
    }

    /// The scalar name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A nullable handle to this type.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::named(self.name.clone())
    }

    /// Output values pass through unchanged.
    pub fn serialize(&self, value: ConstValue) -> ConstValue {
        value
    }

    /// Variable values pass through unchanged.
    pub fn parse_value(&self, value: ConstValue) -> ConstValue {
        value
    }

    /// Checks a literal from a query document.
    ///
    /// # Errors
    ///
    /// Returns a [`ScalarError`] located at the literal.
    pub fn parse_literal(
        &self,
        literal: &Positioned<ConstValue>,
    ) -> Result<ConstValue, ScalarError> {
        let pos = literal.pos;
        let ConstValue::String(text) = &literal.node else {
            return Err(ScalarError::new(
                ScalarErrorKind::Syntax,
                format!(
                    "Query error: Can only parse strings got a: {}",
                    literal_kind(&literal.node)
                ),
                pos,
            ));
        };

        self.check(text).map_err(|(kind, message)| {
            trace!(scalar = %self.name, ?kind, line = pos.line, column = pos.column, "Rejected literal");
            ScalarError::new(kind, message, pos)
        })?;
        Ok(literal.node.clone())
    }

    fn check(&self, text: &str) -> Result<(), (ScalarErrorKind, String)> {
        let len = text.chars().count();
        if let Some(min) = self.min
            && len < min
        {
            return Err((
                ScalarErrorKind::Range,
                format!("Query error: minimum length of {min} required"),
            ));
        }
        if let Some(max) = self.max
            && len > max
        {
            return Err((
                ScalarErrorKind::Range,
                format!("Query error: maximum length is {max}"),
            ));
        }
        if let Some(regex) = &self.regex
            && !regex.is_match(text)
        {
            return Err((
                ScalarErrorKind::Format,
                format!("Query error: Not a valid {}", self.name),
            ));
        }
        Ok(())
    }

    /// Checks an argument as written in a query document.
    ///
    /// Variables and `null` are not literals and pass. List literals are
    /// checked item by item at the list's position.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScalarError`] found.
    pub fn check_argument(&self, argument: &Positioned<Literal>) -> Result<(), ScalarError> {
        match &argument.node {
            Literal::Variable(_) | Literal::Null => Ok(()),
            Literal::List(items) => items.iter().try_for_each(|item| {
                self.check_argument(&Positioned::new(item.clone(), argument.pos))
            }),
            literal => match literal.clone().into_const() {
                Some(value) => self
                    .parse_literal(&Positioned::new(value, argument.pos))
                    .map(|_| ()),
                None => Ok(()),
            },
        }
    }

    /// Builds the engine's scalar type.
    ///
    /// The engine accepts any value; literals are checked by the schema
    /// assembly when the field taking them resolves, so that the error kind
    /// and message survive.
    pub fn to_engine(&self) -> Scalar {
        let mut scalar = Scalar::new(self.name.as_str());
        if let Some(description) = &self.description {
            scalar = scalar.description(description.as_str());
        }
        scalar
    }
}

/// Plain-data form of a [`StringScalar`].
#[derive(Debug, Clone, Default)]
pub struct StringScalarConfig {
    pub name: String,
    pub description: Option<String>,
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub regex: Option<Regex>,
}

impl From<StringScalarConfig> for StringScalar {
    fn from(config: StringScalarConfig) -> Self {
        Self {
            name: config.name,
            description: config.description,
            min: config.min,
            max: config.max,
            regex: config.regex,
        }
    }
}

/// The built-in `Email` scalar: 4 to 254 characters, e-mail shaped.
pub fn email() -> StringScalar {
    StringScalar::new("Email")
        .description("An e-mail address")
        .min_len(4)
        .max_len(254)
        .pattern(EMAIL_REGEX.clone())
}

fn literal_kind(value: &ConstValue) -> &'static str {
    match value {
        ConstValue::Null => "NullValue",
        ConstValue::Number(n) if n.is_f64() => "FloatValue",
        ConstValue::Number(_) => "IntValue",
        ConstValue::String(_) => "StringValue",
        ConstValue::Boolean(_) => "BooleanValue",
        ConstValue::Binary(_) => "BinaryValue",
        ConstValue::Enum(_) => "EnumValue",
        ConstValue::List(_) => "ListValue",
        ConstValue::Object(_) => "ObjectValue",
    }
}
