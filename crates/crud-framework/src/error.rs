//! # Framework Errors
//!
//! This module defines the error types shared by the store, the services and the
//! controllers. Each layer gets its own enum so callers can match on the failures
//! that layer can actually produce.

use crate::capability::Capabilities;

/// Errors raised by the persistence layer.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflicting item: {0}")]
    Conflict(String),
    #[error("Transaction {0} is no longer active")]
    TransactionClosed(u64),
}

/// Errors a service hook may return.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The entity the request refers to does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The service refused the request for a reason of its own.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The service declared a capability but kept the default hook body.
    #[error("Capability {0:?} is declared but not implemented")]
    Unimplemented(Capabilities),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Why a controller gave up on a request.
///
/// Every variant is answered with the same external status; the distinction
/// only exists so the logs can tell a denial from a fault.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Caller is not authorised")]
    Denied,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
