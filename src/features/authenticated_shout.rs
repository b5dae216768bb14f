//! Members' shout board: only authenticated users, and no spam.

use super::moment::MomentClock;
use crate::model::Shout;
use async_trait::async_trait;
use crud_framework::{Authenticated, Errors, Repository, Request, RestService, ServiceError};

pub const BASE_PATH: &str = "/api/authenticated/shout/";

pub struct AuthenticatedShoutService {
    shouts: Repository<Shout>,
    clock: MomentClock,
    spam_words: Vec<String>,
}

impl AuthenticatedShoutService {
    pub fn new(shouts: Repository<Shout>, clock: MomentClock, spam_words: &[String]) -> Self {
        Self {
            shouts,
            clock,
            spam_words: spam_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    fn is_spam(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.spam_words.iter().any(|w| !w.is_empty() && text.contains(w.as_str()))
    }
}

#[async_trait]
impl RestService<Authenticated, Shout> for AuthenticatedShoutService {
    async fn authorise(&self, request: &Request) -> Result<bool, ServiceError> {
        Ok(request.principal().has_role::<Authenticated>())
    }

    async fn get_all(&self, _request: &Request) -> Result<Vec<Shout>, ServiceError> {
        Ok(self.shouts.find_all().await?)
    }

    async fn validate(
        &self,
        _request: &Request,
        shout: &Shout,
        errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        errors.state(!self.is_spam(&shout.text), "text", "must not contain spam");
        Ok(())
    }

    async fn save(&self, request: &Request, shout: &mut Shout) -> Result<(), ServiceError> {
        shout.moment = Some(self.clock.now());
        self.shouts.insert(request.session(), shout.clone())?;
        Ok(())
    }
}
