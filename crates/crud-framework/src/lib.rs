//! # CRUD Framework
//!
//! Generic controllers that run create/read/update/delete requests for one
//! `(Role, Entity)` pair, delegating every domain decision to a feature service.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`Entity`](persistence::Entity), [`Role`]) - your domain types and the kinds of
//!    caller that may touch them
//! 2. **Service Layer** ([`Service`], [`RestService`]) - per-feature lifecycle hooks:
//!    authorise, bind, unbind, find, instantiate, validate, perform, create, update,
//!    delete, on_success, on_failure
//! 3. **Dispatch Layer** ([`RestController`], [`Controller`], [`ServiceWrapper`]) -
//!    transactions, verb routing, validation and status codes
//! 4. **Persistence Layer** ([`persistence`]) - one store actor per entity type, a
//!    [`Repository`] client and request-scoped [`Transaction`]s
//!
//! A feature is a service plus one line of wiring:
//!
//! ```rust
//! use crud_framework::persistence::{Entity, StoreActor};
//! use crud_framework::{Anonymous, Errors, Repository, Request, RestController, RestService, ServiceError, TransactionManager};
//! use async_trait::async_trait;
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Tag { #[serde(default)] id: Option<u32>, label: String }
//!
//! impl Entity for Tag {
//!     type Id = u32;
//!     fn id(&self) -> Option<u32> { self.id }
//!     fn assign_id(&mut self, id: u32) { self.id = Some(id) }
//!     fn check_constraints(&self, errors: &mut Errors) { errors.not_blank("label", &self.label) }
//! }
//!
//! struct PublicTags(Repository<Tag>);
//!
//! #[async_trait]
//! impl RestService<Anonymous, Tag> for PublicTags {
//!     async fn authorise(&self, _: &Request) -> Result<bool, ServiceError> { Ok(true) }
//!     async fn get_all(&self, _: &Request) -> Result<Vec<Tag>, ServiceError> { Ok(self.0.find_all().await?) }
//!     async fn save(&self, request: &Request, tag: &mut Tag) -> Result<(), ServiceError> {
//!         Ok(self.0.save(request.session(), tag.clone())?)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (store, tags) = StoreActor::<Tag>::new(16);
//!     tokio::spawn(store.run());
//!
//!     let controller = Arc::new(RestController::<Anonymous, Tag>::new(PublicTags(tags), TransactionManager::new()));
//!     let app: axum::Router = controller.routes("/api/tags/");
//!     # let _ = app;
//! }
//! ```
//!
//! ## Request Lifecycle
//!
//! Every request begins exactly one transaction and ends it exactly once:
//!
//! - a validation failure (203) rolls back,
//! - any other answer commits, and a failed commit becomes 401,
//! - an authorisation denial or a fault rolls back and answers 401.
//!
//! Reads hand out owned copies of stored entities, so changing a fetched entity
//! never reaches the store unless the service stages a write.
//!
//! ## Testing
//!
//! The [`mock`] module provides [`mock::MockService`], a scripted service that
//! records the hooks it served.

pub mod capability;
pub mod controller;
pub mod error;
pub mod http;
pub mod mock;
pub mod model;
pub mod outcome;
pub mod persistence;
pub mod principal;
pub mod request;
pub mod rest;
pub mod role;
pub mod validation;
pub mod wrapper;

pub use capability::{Capabilities, Service};
pub use controller::{BasicCommand, Controller};
pub use error::{DispatchError, PersistenceError, ServiceError};
pub use model::Model;
pub use outcome::Outcome;
pub use persistence::{Repository, Transaction, TransactionManager, TransactionStats};
pub use principal::Principal;
pub use request::{Request, Response};
pub use rest::{RestController, RestService};
pub use role::{Administrator, Anonymous, Authenticated, Role};
pub use validation::{Bound, Errors, FieldError};
pub use wrapper::ServiceWrapper;
