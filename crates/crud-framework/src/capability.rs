//! # Service Capabilities
//!
//! A feature service implements only the lifecycle hooks its use case needs. It
//! says which ones through [`Service::capabilities`]; the
//! [`ServiceWrapper`](crate::ServiceWrapper) checks that declaration before every
//! call, so calling an undeclared hook is caught at the call site instead of
//! silently doing nothing.
//!
//! Every hook has a default body returning [`ServiceError::Unimplemented`]. A
//! service that declares a capability but forgets to override the hook therefore
//! fails the request rather than pretending it succeeded.

use crate::error::ServiceError;
use crate::model::Model;
use crate::persistence::Entity;
use crate::request::{Request, Response};
use crate::role::Role;
use crate::validation::Errors;
use async_trait::async_trait;

bitflags::bitflags! {
    /// The set of hooks a service implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u16 {
        const AUTHORISE = 1 << 0;
        const BIND = 1 << 1;
        const UNBIND = 1 << 2;
        const FIND_ONE = 1 << 3;
        const FIND_MANY = 1 << 4;
        const INSTANTIATE = 1 << 5;
        const VALIDATE = 1 << 6;
        const PERFORM = 1 << 7;
        const CREATE = 1 << 8;
        const UPDATE = 1 << 9;
        const DELETE = 1 << 10;
        const ON_SUCCESS = 1 << 11;
        const ON_FAILURE = 1 << 12;
    }
}

/// Lifecycle hooks of a feature service serving role `R` on entity `E`.
///
/// `R` never appears in a signature; it pins the service to one kind of caller so a
/// controller for `(Anonymous, Shout)` cannot be wired to a service written for
/// `(Administrator, Shout)`.
#[async_trait]
pub trait Service<R: Role, E: Entity>: Send + Sync + 'static {
    /// The hooks this service overrides.
    fn capabilities(&self) -> Capabilities;

    /// Whether the caller may use this service at all.
    async fn authorise(&self, _request: &Request) -> Result<bool, ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::AUTHORISE))
    }

    /// Copies request parameters onto the entity.
    fn bind(
        &self,
        _request: &Request,
        _entity: &mut E,
        _errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::BIND))
    }

    /// Copies entity attributes into the response model.
    fn unbind(&self, _request: &Request, _entity: &E, _model: &mut Model) -> Result<(), ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::UNBIND))
    }

    async fn find_one(&self, _request: &Request) -> Result<E, ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::FIND_ONE))
    }

    async fn find_many(&self, _request: &Request) -> Result<Vec<E>, ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::FIND_MANY))
    }

    /// Builds a fresh entity for a create or perform command.
    fn instantiate(&self, _request: &Request) -> Result<E, ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::INSTANTIATE))
    }

    /// Business-rule validation. Adds to `errors`; an `Err` means the check itself failed.
    async fn validate(
        &self,
        _request: &Request,
        _entity: &E,
        _errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::VALIDATE))
    }

    async fn perform(
        &self,
        _request: &Request,
        _entity: &mut E,
        _errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::PERFORM))
    }

    async fn create(&self, _request: &Request, _entity: &mut E) -> Result<(), ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::CREATE))
    }

    async fn update(&self, _request: &Request, _entity: &mut E) -> Result<(), ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::UPDATE))
    }

    async fn delete(&self, _request: &Request, _entity: &E) -> Result<(), ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::DELETE))
    }

    fn on_success(&self, _request: &Request, _response: &Response<E>) -> Result<(), ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::ON_SUCCESS))
    }

    /// Called after a failed write. Either argument may be missing: validation
    /// failures carry a response, faults carry an error.
    fn on_failure(
        &self,
        _request: &Request,
        _response: Option<&Response<E>>,
        _error: Option<&ServiceError>,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::Unimplemented(Capabilities::ON_FAILURE))
    }
}
