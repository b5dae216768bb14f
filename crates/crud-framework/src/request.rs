//! Per-request context handed to every service hook, and the response record
//! handed to the success/failure hooks.

use crate::model::Model;
use crate::persistence::Session;
use crate::principal::Principal;
use crate::validation::Errors;
use axum::http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Everything a service may need to know about the call it is serving.
#[derive(Debug)]
pub struct Request {
    principal: Principal,
    method: Method,
    locale: String,
    params: Model,
    session: Session,
}

impl Request {
    pub fn new(
        principal: Principal,
        method: Method,
        locale: impl Into<String>,
        params: Model,
        session: Session,
    ) -> Self {
        Self {
            principal,
            method,
            locale: locale.into(),
            params,
            session,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn is_method(&self, method: &Method) -> bool {
        self.method == *method
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn params(&self) -> &Model {
        &self.params
    }

    /// Staging area of the transaction this request runs in.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Binds the named request parameters onto `entity`.
    pub fn bind<E>(&self, entity: &mut E, errors: &mut Errors, fields: &[&str])
    where
        E: Serialize + DeserializeOwned,
    {
        self.params.bind(entity, errors, fields);
    }
}

/// The outcome of a write command, as seen by `on_success` and `on_failure`.
#[derive(Debug)]
pub struct Response<E> {
    entity: Option<E>,
    model: Model,
    errors: Errors,
}

impl<E> Response<E> {
    pub fn new(entity: Option<E>, model: Model, errors: Errors) -> Self {
        Self {
            entity,
            model,
            errors,
        }
    }

    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_parts(self) -> (Option<E>, Model, Errors) {
        (self.entity, self.model, self.errors)
    }
}
