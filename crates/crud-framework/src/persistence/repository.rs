//! # Repository
//!
//! Cloneable client of a [`StoreActor`](super::StoreActor).
//!
//! Reads go straight to the store and return owned copies. Writes made on behalf
//! of a request are staged into that request's [`Session`] and only reach the
//! store when the transaction commits.

use super::entity::{entity_type, Entity};
use super::message::{StoreRequest, WriteOp};
use super::transaction::{PendingWrite, Session};
use crate::error::PersistenceError;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

pub struct Repository<E: Entity> {
    sender: mpsc::Sender<StoreRequest<E>>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(sender: mpsc::Sender<StoreRequest<E>>) -> Self {
        Self { sender }
    }

    pub async fn find_all(&self) -> Result<Vec<E>, PersistenceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::FindAll { respond_to })
            .await
            .map_err(|_| PersistenceError::StoreClosed)?;
        response.await.map_err(|_| PersistenceError::StoreDropped)?
    }

    pub async fn find_one(&self, id: E::Id) -> Result<Option<E>, PersistenceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::FindOne { id, respond_to })
            .await
            .map_err(|_| PersistenceError::StoreClosed)?;
        response.await.map_err(|_| PersistenceError::StoreDropped)?
    }

    /// First entity, in id order, matching `filter`.
    pub async fn find_first<F>(&self, filter: F) -> Result<Option<E>, PersistenceError>
    where
        F: Fn(&E) -> bool + Send + 'static,
    {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::FindFirst {
                filter: Box::new(filter),
                respond_to,
            })
            .await
            .map_err(|_| PersistenceError::StoreClosed)?;
        response.await.map_err(|_| PersistenceError::StoreDropped)?
    }

    /// Applies a write immediately, outside any transaction.
    pub async fn write(&self, op: WriteOp<E>) -> Result<E::Id, PersistenceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Write { op, respond_to })
            .await
            .map_err(|_| PersistenceError::StoreClosed)?;
        response.await.map_err(|_| PersistenceError::StoreDropped)?
    }

    pub fn insert(&self, session: &Session, entity: E) -> Result<(), PersistenceError> {
        self.stage(session, WriteOp::Insert(entity))
    }

    /// Stages an insert that fails the commit if `conflicts(stored, &entity)`
    /// holds for any entity stored by then.
    pub fn insert_unique(
        &self,
        session: &Session,
        entity: E,
        conflicts: fn(&E, &E) -> bool,
    ) -> Result<(), PersistenceError> {
        self.stage(session, WriteOp::InsertUnique { entity, conflicts })
    }

    pub fn update(&self, session: &Session, entity: E) -> Result<(), PersistenceError> {
        self.stage(session, WriteOp::Update(entity))
    }

    /// Inserts an entity without an id, updates one that has one.
    pub fn save(&self, session: &Session, entity: E) -> Result<(), PersistenceError> {
        if entity.id().is_some() {
            self.update(session, entity)
        } else {
            self.insert(session, entity)
        }
    }

    pub fn delete(&self, session: &Session, id: E::Id) -> Result<(), PersistenceError> {
        self.stage(session, WriteOp::Delete(id))
    }

    fn stage(&self, session: &Session, op: WriteOp<E>) -> Result<(), PersistenceError> {
        debug!(
            entity_type = entity_type::<E>(),
            tx = session.transaction_id(),
            op = op.kind(),
            "Staged"
        );
        session.stage(Box::new(StagedWrite {
            repository: self.clone(),
            op,
        }))
    }
}

struct StagedWrite<E: Entity> {
    repository: Repository<E>,
    op: WriteOp<E>,
}

#[async_trait]
impl<E: Entity> PendingWrite for StagedWrite<E> {
    async fn apply(self: Box<Self>) -> Result<(), PersistenceError> {
        self.repository.write(self.op).await.map(|_| ())
    }

    fn describe(&self) -> String {
        format!("{} {}", self.op.kind(), entity_type::<E>())
    }
}
