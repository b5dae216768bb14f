//! # Model
//!
//! An ordered map of named JSON attributes. Command controllers read request
//! parameters from a [`Model`] (binding) and write entity attributes back into one
//! for the response (unbinding). Only the fields a service names are ever copied,
//! so a request can never set an attribute the service did not open up.

use crate::validation::{Errors, FieldError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model {
    attributes: Map<String, Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from string pairs such as a decoded query string.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let attributes = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self { attributes }
    }

    /// Parses a JSON object body. Anything but an object is a binding error on `body`.
    pub fn from_json(body: &[u8]) -> Result<Self, Errors> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(attributes)) => Ok(Self { attributes }),
            Ok(_) => Err(Errors::from_iter([FieldError::new(
                "body",
                "expected a JSON object",
            )])),
            Err(e) => Err(Errors::from_iter([FieldError::new("body", e.to_string())])),
        }
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Reads an integer attribute, accepting both JSON numbers and numeric strings.
    pub fn get_u32(&self, name: &str) -> Option<u32> {
        match self.attributes.get(name)? {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Adds every attribute of `other`, overriding existing names.
    pub fn merge(&mut self, other: Model) {
        self.attributes.extend(other.attributes);
    }

    /// Copies the named attributes of this model onto `entity`.
    ///
    /// Each field is tried on its own so a bad value is reported against its field
    /// and leaves the entity's current value in place. String values that fail are
    /// retried as JSON literals, which is how numbers and booleans arrive from a
    /// query string.
    pub fn bind<E>(&self, entity: &mut E, errors: &mut Errors, fields: &[&str])
    where
        E: Serialize + DeserializeOwned,
    {
        let mut target = match serde_json::to_value(&*entity) {
            Ok(Value::Object(target)) => target,
            _ => {
                errors.add("", "entity cannot be bound");
                return;
            }
        };

        for &field in fields {
            let Some(raw) = self.attributes.get(field) else {
                continue;
            };
            let previous = target.insert(field.to_owned(), raw.clone());
            if accepts::<E>(&target) {
                continue;
            }
            if let Value::String(text) = raw {
                if let Ok(literal) = serde_json::from_str::<Value>(text) {
                    target.insert(field.to_owned(), literal);
                    if accepts::<E>(&target) {
                        continue;
                    }
                }
            }
            match previous {
                Some(value) => target.insert(field.to_owned(), value),
                None => target.remove(field),
            };
            errors.add(field, "invalid value");
        }

        match serde_json::from_value(Value::Object(target)) {
            Ok(bound) => *entity = bound,
            Err(e) => errors.add("", e.to_string()),
        }
    }

    /// Copies the named attributes of `entity` into this model.
    pub fn unbind<E: Serialize>(&mut self, entity: &E, fields: &[&str]) {
        let Ok(Value::Object(mut source)) = serde_json::to_value(entity) else {
            return;
        };
        for &field in fields {
            if let Some(value) = source.remove(field) {
                self.attributes.insert(field.to_owned(), value);
            }
        }
    }
}

fn accepts<E: DeserializeOwned>(candidate: &Map<String, Value>) -> bool {
    serde_json::from_value::<E>(Value::Object(candidate.clone())).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Company {
        name: String,
        employees: u32,
        secret: String,
    }

    #[test]
    fn test_bind_copies_only_listed_fields() {
        let mut params = Model::new();
        params.set_attribute("name", "Acme");
        params.set_attribute("secret", "stolen");

        let mut company = Company::default();
        let mut errors = Errors::new();
        params.bind(&mut company, &mut errors, &["name", "employees"]);

        assert!(errors.is_empty());
        assert_eq!(company.name, "Acme");
        assert_eq!(company.secret, "");
    }

    #[test]
    fn test_bind_parses_query_strings() {
        let params = Model::from_pairs([("employees", "42")]);
        let mut company = Company::default();
        let mut errors = Errors::new();
        params.bind(&mut company, &mut errors, &["employees"]);

        assert!(errors.is_empty());
        assert_eq!(company.employees, 42);
    }

    #[test]
    fn test_bind_reports_bad_field_and_keeps_old_value() {
        let params = Model::from_pairs([("employees", "many"), ("name", "Acme")]);
        let mut company = Company {
            employees: 7,
            ..Company::default()
        };
        let mut errors = Errors::new();
        params.bind(&mut company, &mut errors, &["employees", "name"]);

        assert_eq!(errors.len(), 1);
        assert!(errors.has_errors_for("employees"));
        assert_eq!(company.employees, 7);
        assert_eq!(company.name, "Acme");
    }

    #[test]
    fn test_unbind_exposes_listed_fields() {
        let company = Company {
            name: "Acme".into(),
            employees: 3,
            secret: "hidden".into(),
        };
        let mut model = Model::new();
        model.unbind(&company, &["name", "employees"]);

        assert_eq!(model.get_str("name"), Some("Acme"));
        assert_eq!(model.get_u32("employees"), Some(3));
        assert!(!model.has_attribute("secret"));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Model::from_json(b"").unwrap().is_empty());
        assert_eq!(Model::from_json(br#"{"id": 4}"#).unwrap().get_u32("id"), Some(4));

        let errors = Model::from_json(b"[1, 2]").unwrap_err();
        assert!(errors.has_errors_for("body"));
        assert!(Model::from_json(b"{oops").is_err());
    }
}
