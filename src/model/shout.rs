use chrono::{DateTime, Utc};
use crud_framework::persistence::Entity;
use crud_framework::Errors;
use serde::{Deserialize, Serialize};

/// A short public message.
///
/// `moment` is stamped by the server when the shout is saved; whatever the
/// client sends in that field is overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shout {
    pub id: Option<u32>,
    pub moment: Option<DateTime<Utc>>,
    pub author: String,
    pub text: String,
    /// Optional link to more information.
    pub info: Option<String>,
}

impl Shout {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }
}

impl Entity for Shout {
    type Id = u32;

    fn id(&self) -> Option<u32> {
        self.id
    }

    fn assign_id(&mut self, id: u32) {
        self.id = Some(id);
    }

    fn check_constraints(&self, errors: &mut Errors) {
        errors.not_blank("author", &self.author);
        errors.length("author", &self.author, 5, 25);
        errors.not_blank("text", &self.text);
        errors.length("text", &self.text, 1, 100);
        if let Some(info) = &self.info {
            errors.url("info", info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(shout: &Shout) -> Vec<String> {
        let mut errors = Errors::new();
        shout.check_constraints(&mut errors);
        errors.into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_valid_shout_passes() {
        let shout = Shout::new("John Doe", "Hello").with_info("https://example.org");
        assert!(fields(&shout).is_empty());
    }

    #[test]
    fn test_constraints_report_each_field() {
        assert_eq!(fields(&Shout::new("", "")), ["author", "text"]);
        assert_eq!(fields(&Shout::new("Al", "hi")), ["author"]);
        assert_eq!(fields(&Shout::new("John Doe", "x".repeat(101))), ["text"]);
        assert_eq!(
            fields(&Shout::new("John Doe", "hi").with_info("not a url")),
            ["info"]
        );
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let shout: Shout = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(shout.author, "");
        assert!(shout.id.is_none());
        assert!(shout.moment.is_none());
    }
}
