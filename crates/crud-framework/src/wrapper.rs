//! # Service Wrapper
//!
//! Uniform call-through access to a [`Service`] for controllers.
//!
//! Each method asserts that the wrapped service declared the matching capability.
//! Calling an undeclared hook is a wiring mistake, so it panics with the service
//! and capability names rather than returning an error a caller might swallow.
//!
//! Reads are detached by construction: the store hands out owned copies, so
//! whatever a caller does to an entity returned by [`ServiceWrapper::find_one`] or
//! [`ServiceWrapper::find_many`] stays local until it is explicitly saved.

use crate::capability::{Capabilities, Service};
use crate::error::ServiceError;
use crate::model::Model;
use crate::persistence::{entity_type, Entity};
use crate::request::{Request, Response};
use crate::role::Role;
use crate::validation::Errors;
use std::sync::Arc;
use tracing::debug;

pub struct ServiceWrapper<R: Role, E: Entity> {
    service: Arc<dyn Service<R, E>>,
    capabilities: Capabilities,
}

impl<R: Role, E: Entity> Clone for ServiceWrapper<R, E> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            capabilities: self.capabilities,
        }
    }
}

impl<R: Role, E: Entity> ServiceWrapper<R, E> {
    /// Wraps `service`, reading its capability declaration once.
    pub fn new(service: Arc<dyn Service<R, E>>) -> Self {
        let capabilities = service.capabilities();
        Self {
            service,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn supports(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    fn require(&self, capability: Capabilities) {
        assert!(
            self.supports(capability),
            "service for ({}, {}) does not support {capability:?}",
            R::NAME,
            entity_type::<E>(),
        );
    }

    pub async fn authorise(&self, request: &Request) -> Result<bool, ServiceError> {
        self.require(Capabilities::AUTHORISE);
        self.service.authorise(request).await
    }

    pub fn bind(
        &self,
        request: &Request,
        entity: &mut E,
        errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        self.require(Capabilities::BIND);
        self.service.bind(request, entity, errors)
    }

    pub fn unbind(&self, request: &Request, entity: &E, model: &mut Model) -> Result<(), ServiceError> {
        self.require(Capabilities::UNBIND);
        self.service.unbind(request, entity, model)
    }

    pub async fn find_one(&self, request: &Request) -> Result<E, ServiceError> {
        self.require(Capabilities::FIND_ONE);
        let entity = self.service.find_one(request).await?;
        debug!(entity_type = entity_type::<E>(), id = ?entity.id(), "Read one");
        Ok(entity)
    }

    pub async fn find_many(&self, request: &Request) -> Result<Vec<E>, ServiceError> {
        self.require(Capabilities::FIND_MANY);
        let entities = self.service.find_many(request).await?;
        debug!(entity_type = entity_type::<E>(), count = entities.len(), "Read many");
        Ok(entities)
    }

    pub fn instantiate(&self, request: &Request) -> Result<E, ServiceError> {
        self.require(Capabilities::INSTANTIATE);
        self.service.instantiate(request)
    }

    pub async fn validate(
        &self,
        request: &Request,
        entity: &E,
        errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        self.require(Capabilities::VALIDATE);
        self.service.validate(request, entity, errors).await
    }

    pub async fn perform(
        &self,
        request: &Request,
        entity: &mut E,
        errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        self.require(Capabilities::PERFORM);
        self.service.perform(request, entity, errors).await
    }

    pub async fn create(&self, request: &Request, entity: &mut E) -> Result<(), ServiceError> {
        self.require(Capabilities::CREATE);
        self.service.create(request, entity).await
    }

    pub async fn update(&self, request: &Request, entity: &mut E) -> Result<(), ServiceError> {
        self.require(Capabilities::UPDATE);
        self.service.update(request, entity).await
    }

    pub async fn delete(&self, request: &Request, entity: &E) -> Result<(), ServiceError> {
        self.require(Capabilities::DELETE);
        self.service.delete(request, entity).await
    }

    pub fn on_success(&self, request: &Request, response: &Response<E>) -> Result<(), ServiceError> {
        self.require(Capabilities::ON_SUCCESS);
        self.service.on_success(request, response)
    }

    pub fn on_failure(
        &self,
        request: &Request,
        response: Option<&Response<E>>,
        error: Option<&ServiceError>,
    ) -> Result<(), ServiceError> {
        self.require(Capabilities::ON_FAILURE);
        self.service.on_failure(request, response, error)
    }
}
