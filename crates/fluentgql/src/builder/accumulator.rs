//! The field/argument state machine shared by every type builder.
//!
//! At most one field is open at a time. Chained calls act on the open
//! field; opening another field (or materializing) commits it into the
//! field map. A committed field keeps its position in the map when it is
//! re-opened and committed again.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::SchemaError;
use crate::field::{ArgDecl, ArgumentDraft, FieldDecl, FieldDraft, Resolver, TypePredicate};

/// Field name that gets an extra trace event when edited.
const RESERVED_ID_FIELD: &str = "id";

/// Tracks committed fields and the one currently being edited.
#[derive(Clone, Debug, Default)]
pub struct FieldAccumulator {
    /// Name of the owning type, for messages.
    owner: String,
    fields: IndexMap<String, FieldDraft>,
    open: Option<FieldDraft>,
    trace_edits: bool,
}

impl FieldAccumulator {
    /// Creates an empty accumulator for the named type.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    /// Enables the `fluentgql::edits` trace event for edits of `id`.
    pub fn set_trace_edits(&mut self, enabled: bool) {
        self.trace_edits = enabled;
    }

    /// Returns the committed fields. The open field is not included.
    pub fn committed(&self) -> &IndexMap<String, FieldDraft> {
        &self.fields
    }

    /// Returns the name of the open field, if any.
    pub fn open_field(&self) -> Option<&str> {
        self.open.as_ref().map(|draft| draft.name.as_str())
    }

    /// Commits the open field, if any.
    pub fn commit(&mut self) {
        if let Some(draft) = self.open.take() {
            trace!(owner = %self.owner, field = %draft.name, "Committing field");
            self.fields.insert(draft.name.clone(), draft);
        }
    }

    /// Commits a complete field without touching the open draft.
    pub(crate) fn insert_committed(&mut self, draft: FieldDraft) {
        self.fields.insert(draft.name.clone(), draft);
    }

    /// Opens a field for editing, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a new by-name field without a type,
    /// or for a descriptor lacking a name or type.
    pub fn start_or_edit_field(&mut self, decl: FieldDecl) -> Result<(), SchemaError> {
        self.commit();

        match decl {
            FieldDecl::ByDescriptor(spec) => {
                let draft = spec.into_draft()?;
                if self.fields.contains_key(&draft.name) {
                    debug!(
                        owner = %self.owner,
                        field = %draft.name,
                        "Replacing field with a complete definition"
                    );
                }
                self.fields.insert(draft.name.clone(), draft.clone());
                self.open = Some(draft);
            }
            FieldDecl::ByName {
                name,
                ty,
                description,
                resolver,
            } => {
                if let Some(existing) = self.fields.get(&name) {
                    let mut draft = existing.clone();
                    let changed = ty.is_some() || description.is_some() || resolver.is_some();
                    if let Some(ty) = ty {
                        draft.ty = ty;
                    }
                    if let Some(description) = description {
                        draft.description = Some(description);
                    }
                    if let Some(resolver) = resolver {
                        draft.resolver = Some(resolver.0);
                    }
                    if self.trace_edits && changed && name == RESERVED_ID_FIELD {
                        trace!(
                            target: "fluentgql::edits",
                            owner = %self.owner,
                            field = ?draft,
                            "Edited reserved field"
                        );
                    }
                    self.open = Some(draft);
                } else {
                    let Some(ty) = ty else {
                        return Err(SchemaError::validation(
                            "field",
                            format!(
                                "'{name}' has no type. If you are trying to refer to '{}' \
                                 then you should use a deferred type",
                                self.owner
                            ),
                        ));
                    };
                    let mut draft = FieldDraft::new(name, ty);
                    draft.description = description;
                    draft.resolver = resolver.map(|slot| slot.0);
                    self.open = Some(draft);
                }
            }
        }

        Ok(())
    }

    /// Replaces the open field's argument map.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no field is open.
    pub fn set_args(
        &mut self,
        args: impl IntoIterator<Item = ArgumentDraft>,
    ) -> Result<(), SchemaError> {
        let draft = self.open_mut("args", "must appear under a field")?;
        draft.args = args
            .into_iter()
            .map(|arg| (arg.name.clone(), arg))
            .collect();
        Ok(())
    }

    /// Adds an argument to the open field.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no field is open, or if a by-name
    /// argument is already defined on the open field.
    pub fn add_arg(&mut self, decl: ArgDecl) -> Result<(), SchemaError> {
        let (arg, upsert) = match decl {
            ArgDecl::ByName(arg) => (arg, false),
            ArgDecl::ByDescriptor(arg) => (arg, true),
        };
        let draft = self.open_mut("arg", format!("'{}' must appear under a field", arg.name))?;

        if arg.name.is_empty() {
            return Err(SchemaError::validation("arg", "must supply a name"));
        }
        if !upsert && draft.args.contains_key(&arg.name) {
            return Err(SchemaError::validation(
                "arg",
                format!("'{}' is already defined by {}", arg.name, draft.name),
            ));
        }
        draft.args.insert(arg.name.clone(), arg);
        Ok(())
    }

    /// Marks the open field as deprecated.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no field is open.
    pub fn set_deprecated(&mut self, reason: impl Into<String>) -> Result<(), SchemaError> {
        let draft = self.open_mut("deprecated", "deprecations must appear under a field")?;
        draft.deprecation_reason = Some(reason.into());
        Ok(())
    }

    /// Sets the open field's description.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no field is open.
    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), SchemaError> {
        let draft = self.open_mut("describe", "description must appear under a field")?;
        draft.description = Some(description.into());
        Ok(())
    }

    /// Sets the open field's resolver.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no field is open.
    pub fn set_resolver(&mut self, resolver: Resolver) -> Result<(), SchemaError> {
        let draft = self.open_mut("resolve", "resolve must appear under a field")?;
        draft.resolver = Some(resolver);
        Ok(())
    }

    /// Attaches a type-membership predicate to the open field.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no field is open.
    pub fn set_is_type_of(&mut self, predicate: TypePredicate) -> Result<(), SchemaError> {
        let draft = self.open_mut("isTypeOf", "isTypeOf must appear under a field")?;
        draft.is_type_of = Some(predicate);
        Ok(())
    }

    /// Commits the open field and returns a snapshot of the field map.
    pub fn finish(&mut self) -> IndexMap<String, FieldDraft> {
        self.commit();
        debug!(owner = %self.owner, fields = self.fields.len(), "Materializing fields");
        self.fields.clone()
    }

    fn open_mut(
        &mut self,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Result<&mut FieldDraft, SchemaError> {
        self.open
            .as_mut()
            .ok_or_else(|| SchemaError::validation(operation, message))
    }
}
