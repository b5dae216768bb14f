use super::FIELDS;
use crate::auth::RoleGrants;
use crate::model::Consumer;
use async_trait::async_trait;
use crud_framework::{
    Authenticated, Capabilities, Errors, Model, Repository, Request, Response, Role, Service,
    ServiceError,
};
use tracing::info;

pub struct ConsumerCreateService {
    consumers: Repository<Consumer>,
    grants: RoleGrants,
}

impl ConsumerCreateService {
    pub fn new(consumers: Repository<Consumer>, grants: RoleGrants) -> Self {
        Self { consumers, grants }
    }
}

#[async_trait]
impl Service<Authenticated, Consumer> for ConsumerCreateService {
    fn capabilities(&self) -> Capabilities {
        Capabilities::AUTHORISE
            | Capabilities::BIND
            | Capabilities::UNBIND
            | Capabilities::INSTANTIATE
            | Capabilities::VALIDATE
            | Capabilities::CREATE
            | Capabilities::ON_SUCCESS
    }

    async fn authorise(&self, request: &Request) -> Result<bool, ServiceError> {
        let principal = request.principal();
        Ok(principal.has_role::<Authenticated>() && !principal.has_role::<Consumer>())
    }

    fn bind(
        &self,
        request: &Request,
        consumer: &mut Consumer,
        errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        request.bind(consumer, errors, FIELDS);
        Ok(())
    }

    fn unbind(
        &self,
        _request: &Request,
        consumer: &Consumer,
        model: &mut Model,
    ) -> Result<(), ServiceError> {
        model.unbind(consumer, FIELDS);
        Ok(())
    }

    fn instantiate(&self, request: &Request) -> Result<Consumer, ServiceError> {
        let username = request
            .principal()
            .username()
            .ok_or_else(|| ServiceError::Rejected("anonymous caller".to_owned()))?;
        Ok(Consumer::for_user(username))
    }

    /// Reports an existing registration as a field error. Two requests racing
    /// past this check are settled at commit by the unique insert in `create`.
    async fn validate(
        &self,
        _request: &Request,
        consumer: &Consumer,
        errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        let username = consumer.username.clone();
        let existing = self
            .consumers
            .find_first(move |c: &Consumer| c.username == username)
            .await?;
        errors.state(existing.is_none(), "username", "is already registered");
        Ok(())
    }

    async fn create(&self, request: &Request, consumer: &mut Consumer) -> Result<(), ServiceError> {
        self.consumers
            .insert_unique(request.session(), consumer.clone(), same_user)?;
        Ok(())
    }

    /// The role is granted once the registration is committed.
    fn on_success(&self, request: &Request, response: &Response<Consumer>) -> Result<(), ServiceError> {
        let Some(consumer) = response.entity() else {
            return Ok(());
        };
        let grants = self.grants.clone();
        let username = consumer.username.clone();
        let company = consumer.company.clone();
        request.session().after_commit(move || {
            info!(username = %username, company = %company, "Consumer registered");
            grants.grant(&username, Consumer::NAME);
        })?;
        Ok(())
    }
}

fn same_user(stored: &Consumer, new: &Consumer) -> bool {
    stored.username == new.username
}
