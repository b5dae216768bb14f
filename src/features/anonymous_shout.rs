//! Public shout board: anyone may list and post.

use super::moment::MomentClock;
use crate::model::Shout;
use async_trait::async_trait;
use crud_framework::{Anonymous, Repository, Request, RestService, ServiceError};
use tracing::debug;

pub const BASE_PATH: &str = "/api/anonymous/shout/";

pub struct AnonymousShoutService {
    shouts: Repository<Shout>,
    clock: MomentClock,
}

impl AnonymousShoutService {
    pub fn new(shouts: Repository<Shout>, clock: MomentClock) -> Self {
        Self { shouts, clock }
    }
}

#[async_trait]
impl RestService<Anonymous, Shout> for AnonymousShoutService {
    async fn authorise(&self, _request: &Request) -> Result<bool, ServiceError> {
        Ok(true)
    }

    async fn get_all(&self, _request: &Request) -> Result<Vec<Shout>, ServiceError> {
        Ok(self.shouts.find_all().await?)
    }

    async fn save(&self, request: &Request, shout: &mut Shout) -> Result<(), ServiceError> {
        shout.moment = Some(self.clock.now());
        debug!(author = %shout.author, "Saving anonymous shout");
        self.shouts.insert(request.session(), shout.clone())?;
        Ok(())
    }
}
