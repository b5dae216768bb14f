//! # Mock Services
//!
//! [`MockService`] implements every hook of [`Service`] from a script set up with a
//! builder, and records which hooks were called. Use it to test controller
//! behaviour without writing a feature service:
//!
//! ```rust
//! use crud_framework::mock::{MockService, Note};
//! use crud_framework::{Anonymous, BasicCommand, Capabilities, Controller, Principal, TransactionManager};
//! use axum::http::Method;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = MockService::<Anonymous, Note>::new(BasicCommand::List.required())
//!         .authorise(true)
//!         .with_entities([Note::new(1, "groceries")]);
//!     let calls = service.log();
//!
//!     let mut controller = Controller::<Anonymous, Note>::new(TransactionManager::new());
//!     controller.add_basic_command(BasicCommand::List, service);
//!
//!     let outcome = controller
//!         .handle_command(BasicCommand::List, Method::GET, Principal::anonymous(), "en", Ok(Default::default()))
//!         .await;
//!     assert_eq!(outcome.status(), 200);
//!     assert_eq!(calls.count(Capabilities::FIND_MANY), 1);
//! }
//! ```
//!
//! | Builder | Effect |
//! |---------|--------|
//! | `authorise(bool)` | answer of the `authorise` hook |
//! | `with_entities` | what `find_many` returns; `find_one` picks by the `id` parameter |
//! | `with_instance` | what `instantiate` returns |
//! | `reject(field, message)` | error added by `validate` |
//! | `failing(capability)` | that hook returns [`ServiceError::Rejected`] |
//! | `fields` | attributes copied by `bind` and `unbind` |

use crate::capability::{Capabilities, Service};
use crate::error::ServiceError;
use crate::model::Model;
use crate::persistence::Entity;
use crate::request::{Request, Response};
use crate::role::Role;
use crate::validation::{Errors, FieldError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// Minimal entity for exercising controllers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub title: String,
}

impl Note {
    pub fn new(id: u32, title: &str) -> Self {
        Self {
            id: Some(id),
            title: title.to_string(),
        }
    }
}

impl Entity for Note {
    type Id = u32;

    fn id(&self) -> Option<u32> {
        self.id
    }

    fn assign_id(&mut self, id: u32) {
        self.id = Some(id);
    }

    fn check_constraints(&self, errors: &mut Errors) {
        errors.not_blank("title", &self.title);
    }
}

struct Recorded<E> {
    calls: Vec<Capabilities>,
    persisted: Vec<E>,
}

/// Shared record of the hooks a [`MockService`] served.
pub struct CallLog<E> {
    inner: Arc<Mutex<Recorded<E>>>,
}

impl<E> Clone for CallLog<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Clone> CallLog<E> {
    fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Recorded {
                calls: Vec::new(),
                persisted: Vec::new(),
            })),
        }
    }

    /// Hooks called so far, in order.
    pub fn calls(&self) -> Vec<Capabilities> {
        self.inner.lock().calls.clone()
    }

    pub fn count(&self, capability: Capabilities) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| **c == capability)
            .count()
    }

    /// Entities handed to `create`, `update`, `delete` or `perform`.
    pub fn persisted(&self) -> Vec<E> {
        self.inner.lock().persisted.clone()
    }

    fn record(&self, capability: Capabilities) {
        self.inner.lock().calls.push(capability);
    }

    fn persist(&self, entity: &E) {
        self.inner.lock().persisted.push(entity.clone());
    }
}

pub struct MockService<R, E: Entity> {
    capabilities: Capabilities,
    authorised: bool,
    entities: Vec<E>,
    instance: Option<E>,
    rejections: Vec<FieldError>,
    failing: Capabilities,
    fields: Vec<&'static str>,
    log: CallLog<E>,
    _role: PhantomData<fn() -> R>,
}

impl<R: Role, E: Entity> MockService<R, E> {
    /// A service declaring `capabilities` that denies every caller until told otherwise.
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            authorised: false,
            entities: Vec::new(),
            instance: None,
            rejections: Vec::new(),
            failing: Capabilities::empty(),
            fields: Vec::new(),
            log: CallLog::new(),
            _role: PhantomData,
        }
    }

    pub fn authorise(mut self, authorised: bool) -> Self {
        self.authorised = authorised;
        self
    }

    pub fn with_entities(mut self, entities: impl IntoIterator<Item = E>) -> Self {
        self.entities = entities.into_iter().collect();
        self
    }

    pub fn with_instance(mut self, instance: E) -> Self {
        self.instance = Some(instance);
        self
    }

    pub fn reject(mut self, field: &str, message: &str) -> Self {
        self.rejections.push(FieldError::new(field, message));
        self
    }

    pub fn failing(mut self, capability: Capabilities) -> Self {
        self.failing |= capability;
        self
    }

    pub fn fields(mut self, fields: &[&'static str]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    /// Handle on the call record; stays valid after the service is moved.
    pub fn log(&self) -> CallLog<E> {
        self.log.clone()
    }

    fn enter(&self, capability: Capabilities) -> Result<(), ServiceError> {
        self.log.record(capability);
        if self.failing.contains(capability) {
            return Err(ServiceError::Rejected(format!("{capability:?} scripted to fail")));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Role, E: Entity> Service<R, E> for MockService<R, E> {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn authorise(&self, _request: &Request) -> Result<bool, ServiceError> {
        self.enter(Capabilities::AUTHORISE)?;
        Ok(self.authorised)
    }

    fn bind(&self, request: &Request, entity: &mut E, errors: &mut Errors) -> Result<(), ServiceError> {
        self.enter(Capabilities::BIND)?;
        request.bind(entity, errors, &self.fields);
        Ok(())
    }

    fn unbind(&self, _request: &Request, entity: &E, model: &mut Model) -> Result<(), ServiceError> {
        self.enter(Capabilities::UNBIND)?;
        model.unbind(entity, &self.fields);
        Ok(())
    }

    async fn find_one(&self, request: &Request) -> Result<E, ServiceError> {
        self.enter(Capabilities::FIND_ONE)?;
        let wanted = request.params().get_u32("id").map(E::Id::from);
        self.entities
            .iter()
            .find(|e| wanted.is_none() || e.id() == wanted)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("{wanted:?}")))
    }

    async fn find_many(&self, _request: &Request) -> Result<Vec<E>, ServiceError> {
        self.enter(Capabilities::FIND_MANY)?;
        Ok(self.entities.clone())
    }

    fn instantiate(&self, _request: &Request) -> Result<E, ServiceError> {
        self.enter(Capabilities::INSTANTIATE)?;
        self.instance
            .clone()
            .ok_or_else(|| ServiceError::Rejected("no instance scripted".to_string()))
    }

    async fn validate(&self, _request: &Request, _entity: &E, errors: &mut Errors) -> Result<(), ServiceError> {
        self.enter(Capabilities::VALIDATE)?;
        errors.merge(self.rejections.iter().cloned().collect());
        Ok(())
    }

    async fn perform(&self, _request: &Request, entity: &mut E, _errors: &mut Errors) -> Result<(), ServiceError> {
        self.enter(Capabilities::PERFORM)?;
        self.log.persist(entity);
        Ok(())
    }

    async fn create(&self, _request: &Request, entity: &mut E) -> Result<(), ServiceError> {
        self.enter(Capabilities::CREATE)?;
        self.log.persist(entity);
        Ok(())
    }

    async fn update(&self, _request: &Request, entity: &mut E) -> Result<(), ServiceError> {
        self.enter(Capabilities::UPDATE)?;
        self.log.persist(entity);
        Ok(())
    }

    async fn delete(&self, _request: &Request, entity: &E) -> Result<(), ServiceError> {
        self.enter(Capabilities::DELETE)?;
        self.log.persist(entity);
        Ok(())
    }

    fn on_success(&self, _request: &Request, _response: &Response<E>) -> Result<(), ServiceError> {
        self.enter(Capabilities::ON_SUCCESS)
    }

    fn on_failure(
        &self,
        _request: &Request,
        _response: Option<&Response<E>>,
        _error: Option<&ServiceError>,
    ) -> Result<(), ServiceError> {
        self.enter(Capabilities::ON_FAILURE)
    }
}
