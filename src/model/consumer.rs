use crud_framework::persistence::Entity;
use crud_framework::{Errors, Role};
use serde::{Deserialize, Serialize};

/// A user registered as a consumer, with the company they work for.
///
/// `Consumer` is both an entity and a role: registering one grants the user the
/// `Consumer` role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Consumer {
    pub id: Option<u32>,
    pub username: String,
    pub company: String,
    pub sector: String,
}

impl Consumer {
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }
}

impl Role for Consumer {
    const NAME: &'static str = "Consumer";
}

impl Entity for Consumer {
    type Id = u32;

    fn id(&self) -> Option<u32> {
        self.id
    }

    fn assign_id(&mut self, id: u32) {
        self.id = Some(id);
    }

    fn check_constraints(&self, errors: &mut Errors) {
        errors.not_blank("company", &self.company);
        errors.not_blank("sector", &self.sector);
    }
}
