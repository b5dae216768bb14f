use super::FIELDS;
use crate::model::Consumer;
use async_trait::async_trait;
use crud_framework::{
    Authenticated, Capabilities, Errors, Model, Repository, Request, Service, ServiceError,
};

pub struct ConsumerUpdateService {
    consumers: Repository<Consumer>,
}

impl ConsumerUpdateService {
    pub fn new(consumers: Repository<Consumer>) -> Self {
        Self { consumers }
    }
}

#[async_trait]
impl Service<Authenticated, Consumer> for ConsumerUpdateService {
    fn capabilities(&self) -> Capabilities {
        Capabilities::AUTHORISE
            | Capabilities::BIND
            | Capabilities::UNBIND
            | Capabilities::FIND_ONE
            | Capabilities::VALIDATE
            | Capabilities::UPDATE
    }

    async fn authorise(&self, request: &Request) -> Result<bool, ServiceError> {
        Ok(request.principal().has_role::<Consumer>())
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

    /// The caller's own record; the `id` parameter is ignored.
    async fn find_one(&self, request: &Request) -> Result<Consumer, ServiceError> {
        let username = request.principal().username().unwrap_or_default().to_owned();
        self.consumers
            .find_first({
                let username = username.clone();
                move |c: &Consumer| c.username == username
            })
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("consumer {username}")))
    }

    async fn validate(
        &self,
        _request: &Request,
        _consumer: &Consumer,
        _errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn update(&self, request: &Request, consumer: &mut Consumer) -> Result<(), ServiceError> {
        self.consumers.update(request.session(), consumer.clone())?;
        Ok(())
    }
}
