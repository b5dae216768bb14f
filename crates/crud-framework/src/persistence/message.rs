//! Messages exchanged between a [`Repository`](super::Repository) and its
//! [`StoreActor`](super::StoreActor).

use super::entity::Entity;
use crate::error::PersistenceError;
use tokio::sync::oneshot;

/// One-shot reply channel used by the store.
pub type Reply<T> = oneshot::Sender<Result<T, PersistenceError>>;

/// Predicate for [`StoreRequest::FindFirst`].
pub type Filter<E> = Box<dyn Fn(&E) -> bool + Send>;

/// A single mutation applied to a table.
#[derive(Debug, Clone)]
pub enum WriteOp<E: Entity> {
    /// Stores a new entity under a fresh id, ignoring any id it already carries.
    Insert(E),
    /// Like `Insert`, but fails with a conflict if `conflicts(stored, new)` holds
    /// for any stored entity. Check and insert happen in one store step.
    InsertUnique {
        entity: E,
        conflicts: fn(&E, &E) -> bool,
    },
    /// Replaces the stored entity with the same id.
    Update(E),
    Delete(E::Id),
}

impl<E: Entity> WriteOp<E> {
    pub fn kind(&self) -> &'static str {
        match self {
            WriteOp::Insert(_) => "insert",
            WriteOp::InsertUnique { .. } => "insert unique",
            WriteOp::Update(_) => "update",
            WriteOp::Delete(_) => "delete",
        }
    }
}

pub enum StoreRequest<E: Entity> {
    FindAll {
        respond_to: Reply<Vec<E>>,
    },
    FindOne {
        id: E::Id,
        respond_to: Reply<Option<E>>,
    },
    FindFirst {
        filter: Filter<E>,
        respond_to: Reply<Option<E>>,
    },
    Write {
        op: WriteOp<E>,
        respond_to: Reply<E::Id>,
    },
}
