//! # Outcomes
//!
//! What a controller answers, and the single rule that ends a request's
//! transaction.

use crate::error::DispatchError;
use crate::model::Model;
use crate::persistence::Transaction;
use crate::validation::Errors;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug)]
pub enum Outcome<E> {
    /// 200 with the entities as a JSON array.
    Listed(Vec<E>),
    /// 201 with a fixed message.
    Created,
    /// 200 with an unbound model.
    Model(Model),
    /// 200 with one unbound model per entity.
    Models(Vec<Model>),
    /// 203 ("review") with the field errors; nothing was written.
    ValidationFailed(Errors),
    /// 501.
    NotImplemented,
    /// 401. Also used for every fault so callers learn nothing about internals.
    Unauthorised,
}

impl<E> Outcome<E> {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Listed(_) | Outcome::Model(_) | Outcome::Models(_) => StatusCode::OK,
            Outcome::Created => StatusCode::CREATED,
            Outcome::ValidationFailed(_) => StatusCode::NON_AUTHORITATIVE_INFORMATION,
            Outcome::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Outcome::Unauthorised => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Outcome::ValidationFailed(_))
    }
}

impl<E: Serialize> IntoResponse for Outcome<E> {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Outcome::Listed(items) => (status, Json(items)).into_response(),
            Outcome::Created => (status, "Successful creation").into_response(),
            Outcome::Model(model) => (status, Json(model)).into_response(),
            Outcome::Models(models) => (status, Json(models)).into_response(),
            Outcome::ValidationFailed(errors) => (status, Json(errors)).into_response(),
            Outcome::NotImplemented => (status, "Method not implemented").into_response(),
            Outcome::Unauthorised => (status, "Not authorised").into_response(),
        }
    }
}

/// Ends `tx` according to how the request went.
///
/// Validation failures roll back. Every other outcome commits, and a failed commit
/// turns into `Unauthorised`. Errors roll back and answer `Unauthorised`; denials are
/// logged at `warn`, anything else at `error`.
pub(crate) async fn resolve<E: Send>(
    tx: Transaction,
    result: Result<Outcome<E>, DispatchError>,
    role: &'static str,
    entity_type: &'static str,
) -> Outcome<E> {
    let id = tx.id();
    match result {
        Ok(outcome) if outcome.is_validation_failure() => {
            tx.rollback();
            outcome
        }
        Ok(outcome) => match tx.commit().await {
            Ok(()) => outcome,
            Err(e) => {
                error!(role, entity_type, tx = id, error = %e, "Commit failed");
                Outcome::Unauthorised
            }
        },
        Err(DispatchError::Denied) => {
            tx.rollback();
            warn!(role, entity_type, tx = id, "Not authorised");
            Outcome::Unauthorised
        }
        Err(e) => {
            tx.rollback();
            error!(role, entity_type, tx = id, error = %e, "Request failed");
            Outcome::Unauthorised
        }
    }
}
