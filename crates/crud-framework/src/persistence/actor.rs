//! # Store Actor
//!
//! The server half of an entity table. One `StoreActor` runs per entity type in
//! its own tokio task and owns the table outright, so requests are processed
//! one at a time and the table needs no lock.
//!
//! ```rust
//! use crud_framework::persistence::{Entity, StoreActor, WriteOp};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Tag { id: Option<u32>, label: String }
//!
//! impl Entity for Tag {
//!     type Id = u32;
//!     fn id(&self) -> Option<u32> { self.id }
//!     fn assign_id(&mut self, id: u32) { self.id = Some(id) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, tags) = StoreActor::<Tag>::new(8);
//!     tokio::spawn(actor.run());
//!
//!     let id = tags.write(WriteOp::Insert(Tag { id: None, label: "rust".into() })).await.unwrap();
//!     assert_eq!(tags.find_one(id).await.unwrap().unwrap().label, "rust");
//! }
//! ```

use super::entity::{entity_type, Entity};
use super::message::{StoreRequest, WriteOp};
use super::repository::Repository;
use crate::error::PersistenceError;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct StoreActor<E: Entity> {
    receiver: mpsc::Receiver<StoreRequest<E>>,
    table: BTreeMap<E::Id, E>,
    next_id: u32,
}

impl<E: Entity> StoreActor<E> {
    /// Creates the actor and the repository that talks to it.
    ///
    /// `buffer_size` bounds the request channel; callers wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, Repository<E>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            table: BTreeMap::new(),
            next_id: 1,
        };
        (actor, Repository::new(sender))
    }

    /// Processes requests until every repository handle is dropped.
    pub async fn run(mut self) {
        let entity_type = entity_type::<E>();
        info!(entity_type, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::FindAll { respond_to } => {
                    let items: Vec<E> = self.table.values().cloned().collect();
                    debug!(entity_type, count = items.len(), "Find all");
                    let _ = respond_to.send(Ok(items));
                }
                StoreRequest::FindOne { id, respond_to } => {
                    let item = self.table.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Find one");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::FindFirst { filter, respond_to } => {
                    let item = self.table.values().find(|e| filter(e)).cloned();
                    debug!(entity_type, found = item.is_some(), "Find first");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::Write { op, respond_to } => {
                    let result = self.apply(op);
                    if let Err(e) = &result {
                        warn!(entity_type, error = %e, "Write failed");
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.table.len(), "Shutdown");
    }

    fn apply(&mut self, op: WriteOp<E>) -> Result<E::Id, PersistenceError> {
        let entity_type = entity_type::<E>();
        match op {
            WriteOp::Insert(item) => Ok(self.insert(item)),
            WriteOp::InsertUnique { entity, conflicts } => {
                let clash = self
                    .table
                    .iter()
                    .find(|(_, stored)| conflicts(stored, &entity))
                    .map(|(id, _)| *id);
                match clash {
                    Some(id) => Err(PersistenceError::Conflict(format!("{entity_type} {id}"))),
                    None => Ok(self.insert(entity)),
                }
            }
            WriteOp::Update(item) => {
                let id = item
                    .id()
                    .ok_or_else(|| PersistenceError::NotFound(format!("{entity_type} without id")))?;
                match self.table.get_mut(&id) {
                    Some(slot) => {
                        *slot = item;
                        info!(entity_type, %id, "Updated");
                        Ok(id)
                    }
                    None => Err(PersistenceError::NotFound(format!("{entity_type} {id}"))),
                }
            }
            WriteOp::Delete(id) => match self.table.remove(&id) {
                Some(_) => {
                    info!(entity_type, %id, size = self.table.len(), "Deleted");
                    Ok(id)
                }
                None => Err(PersistenceError::NotFound(format!("{entity_type} {id}"))),
            },
        }
    }

    fn insert(&mut self, mut item: E) -> E::Id {
        let id = E::Id::from(self.next_id);
        self.next_id += 1;
        item.assign_id(id);
        self.table.insert(id, item);
        info!(entity_type = entity_type::<E>(), %id, size = self.table.len(), "Inserted");
        id
    }
}
