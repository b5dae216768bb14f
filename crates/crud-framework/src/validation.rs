//! # Validation
//!
//! Field-level error collection shared by binding and business validation.
//!
//! Binding errors come from turning raw input into an entity (deserialisation plus
//! [`Entity::check_constraints`]); business errors come from a service's
//! `validate` hook. Both land in the same ordered [`Errors`] list so a controller
//! can report them together.

use crate::persistence::Entity;
use serde::{Deserialize, Serialize};

/// A single failed check on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Ordered collection of field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Errors {
    entries: Vec<FieldError>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.entries.push(FieldError::new(field, message));
    }

    /// Records `message` against `field` unless `condition` holds.
    pub fn state(&mut self, condition: bool, field: &str, message: &str) {
        if !condition {
            self.add(field, message);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn has_errors_for(&self, field: &str) -> bool {
        self.entries.iter().any(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.entries.iter()
    }

    /// Appends every error of `other`, keeping order.
    pub fn merge(&mut self, other: Errors) {
        self.entries.extend(other.entries);
    }

    // --- Structural constraints ---

    pub fn not_blank(&mut self, field: &str, value: &str) {
        self.state(!value.trim().is_empty(), field, "must not be blank");
    }

    /// Character length in `min..=max`. Blank values are left to [`Errors::not_blank`].
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        if value.is_empty() {
            return;
        }
        let len = value.chars().count();
        if len < min || len > max {
            self.add(field, format!("length must be between {min} and {max}"));
        }
    }

    /// Absolute http(s) URL. Empty values pass.
    pub fn url(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        let host = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"))
            .map(|rest| rest.split('/').next().unwrap_or_default());
        let valid = matches!(host, Some(h) if !h.is_empty()) && !value.contains(char::is_whitespace);
        self.state(valid, field, "must be a valid URL");
    }
}

impl IntoIterator for Errors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<FieldError> for Errors {
    fn from_iter<T: IntoIterator<Item = FieldError>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// The result of binding a request body to an entity: the entity, if one could be
/// built, and the structural errors found on the way.
#[derive(Debug)]
pub struct Bound<E> {
    pub entity: Option<E>,
    pub errors: Errors,
}

impl<E: Entity> Bound<E> {
    /// No body was sent.
    pub fn empty() -> Self {
        Self {
            entity: None,
            errors: Errors::new(),
        }
    }

    /// Runs the entity's structural constraints.
    pub fn from_entity(entity: E) -> Self {
        let mut errors = Errors::new();
        entity.check_constraints(&mut errors);
        Self {
            entity: Some(entity),
            errors,
        }
    }

    /// Deserialises a JSON body. An all-whitespace body counts as no body; a body
    /// that does not parse yields a single error on the `body` field.
    pub fn from_json(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::empty();
        }
        match serde_json::from_slice::<E>(body) {
            Ok(entity) => Self::from_entity(entity),
            Err(e) => {
                let mut errors = Errors::new();
                errors.add("body", e.to_string());
                Self {
                    entity: None,
                    errors,
                }
            }
        }
    }
}
