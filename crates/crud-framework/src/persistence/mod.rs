//! In-memory persistence: one store actor per entity type, repositories as
//! clients, and request-scoped transactions.

mod actor;
mod entity;
mod message;
mod repository;
mod transaction;

pub use actor::StoreActor;
pub use entity::{entity_type, Entity};
pub use message::{Filter, Reply, StoreRequest, WriteOp};
pub use repository::Repository;
pub use transaction::{
    AfterCommit, PendingWrite, Session, Transaction, TransactionManager, TransactionState, TransactionStats,
};
