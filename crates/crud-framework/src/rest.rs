//! # REST Controller
//!
//! JSON endpoints for one `(Role, Entity)` pair: `GET {base}list` returns every
//! entity and `POST {base}create` validates and saves one. Each request runs in its
//! own transaction; a validation failure rolls it back and anything else commits.
//!
//! A feature supplies a [`RestService`], which the controller adapts to the
//! capability model so dispatch goes through the same [`ServiceWrapper`] the
//! command controller uses.

use crate::capability::{Capabilities, Service};
use crate::error::{DispatchError, ServiceError};
use crate::http::locale;
use crate::model::Model;
use crate::outcome::{resolve, Outcome};
use crate::persistence::{entity_type, Entity, TransactionManager};
use crate::principal::Principal;
use crate::request::Request;
use crate::role::Role;
use crate::validation::{Bound, Errors};
use crate::wrapper::ServiceWrapper;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use std::sync::Arc;
use tracing::debug;

/// The four operations a REST feature provides.
#[async_trait]
pub trait RestService<R: Role, E: Entity>: Send + Sync + 'static {
    async fn authorise(&self, request: &Request) -> Result<bool, ServiceError>;

    async fn get_all(&self, request: &Request) -> Result<Vec<E>, ServiceError>;

    /// Business validation on top of the entity's own constraints. Defaults to none.
    async fn validate(
        &self,
        _request: &Request,
        _entity: &E,
        _errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Stages the entity for insertion in the request's session.
    async fn save(&self, request: &Request, entity: &mut E) -> Result<(), ServiceError>;
}

struct RestAdapter<S>(S);

#[async_trait]
impl<R, E, S> Service<R, E> for RestAdapter<S>
where
    R: Role,
    E: Entity,
    S: RestService<R, E>,
{
    fn capabilities(&self) -> Capabilities {
        Capabilities::AUTHORISE
            | Capabilities::FIND_MANY
            | Capabilities::VALIDATE
            | Capabilities::CREATE
    }

    async fn authorise(&self, request: &Request) -> Result<bool, ServiceError> {
        self.0.authorise(request).await
    }

    async fn find_many(&self, request: &Request) -> Result<Vec<E>, ServiceError> {
        self.0.get_all(request).await
    }

    async fn validate(
        &self,
        request: &Request,
        entity: &E,
        errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        self.0.validate(request, entity, errors).await
    }

    async fn create(&self, request: &Request, entity: &mut E) -> Result<(), ServiceError> {
        self.0.save(request, entity).await
    }
}

pub struct RestController<R: Role, E: Entity> {
    service: ServiceWrapper<R, E>,
    transactions: TransactionManager,
}

impl<R: Role, E: Entity> RestController<R, E> {
    pub fn new<S: RestService<R, E>>(service: S, transactions: TransactionManager) -> Self {
        Self {
            service: ServiceWrapper::new(Arc::new(RestAdapter(service))),
            transactions,
        }
    }

    /// Runs one request from transaction start to commit or rollback.
    ///
    /// `bound` is the request body after deserialisation and structural checks;
    /// it is ignored for anything but POST.
    pub async fn handle_request(
        &self,
        bound: Bound<E>,
        method: Method,
        principal: Principal,
        locale: impl Into<String>,
    ) -> Outcome<E> {
        let tx = self.transactions.begin();
        debug!(role = R::NAME, entity_type = entity_type::<E>(), tx = tx.id(), %method, "REST request");
        let request = Request::new(principal, method, locale, Model::new(), tx.session());
        let result = self.dispatch(&request, bound).await;
        resolve(tx, result, R::NAME, entity_type::<E>()).await
    }

    async fn dispatch(&self, request: &Request, bound: Bound<E>) -> Result<Outcome<E>, DispatchError> {
        if !self.service.authorise(request).await? {
            return Err(DispatchError::Denied);
        }
        match *request.method() {
            Method::GET => Ok(Outcome::Listed(self.service.find_many(request).await?)),
            Method::POST => self.create(request, bound).await,
            _ => Ok(Outcome::NotImplemented),
        }
    }

    async fn create(&self, request: &Request, bound: Bound<E>) -> Result<Outcome<E>, DispatchError> {
        let Bound {
            entity,
            errors: mut binding,
        } = bound;
        let Some(mut entity) = entity else {
            binding.state(binding.has_errors(), "body", "must not be null");
            return Ok(Outcome::ValidationFailed(binding));
        };

        let mut business = Errors::new();
        self.service.validate(request, &entity, &mut business).await?;
        if binding.has_errors() || business.has_errors() {
            binding.merge(business);
            return Ok(Outcome::ValidationFailed(binding));
        }

        self.service.create(request, &mut entity).await?;
        Ok(Outcome::Created)
    }

    /// Routes `{base}list` and `{base}create`, accepting any method.
    pub fn routes<S>(self: Arc<Self>, base: &str) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        Router::new()
            .route(&format!("{base}list"), any(handle::<R, E>))
            .route(&format!("{base}create"), any(handle::<R, E>))
            .with_state(self)
    }
}

async fn handle<R: Role, E: Entity>(
    State(controller): State<Arc<RestController<R, E>>>,
    method: Method,
    principal: Principal,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let bound = if method == Method::POST {
        Bound::from_json(&body)
    } else {
        Bound::empty()
    };
    controller
        .handle_request(bound, method, principal, locale(&headers))
        .await
        .into_response()
}
