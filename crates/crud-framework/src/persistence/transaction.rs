//! # Transactions
//!
//! A [`Transaction`] brackets one inbound request. Writes are staged into its
//! [`Session`] and applied in order on [`Transaction::commit`]; a rollback or a
//! drop discards them. The controller owns the transaction value and services
//! only see the session, so a request can never open a second one.

use crate::error::PersistenceError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// A write waiting for its transaction to commit.
#[async_trait]
pub trait PendingWrite: Send {
    async fn apply(self: Box<Self>) -> Result<(), PersistenceError>;

    fn describe(&self) -> String;
}

/// Lifecycle counters, as returned by [`TransactionManager::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    pub begun: u64,
    pub committed: u64,
    pub rolled_back: u64,
    pub active: u64,
}

#[derive(Default)]
struct Counters {
    next_id: AtomicU64,
    begun: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
}

/// Issues transactions and keeps count of how they ended.
#[derive(Clone, Default)]
pub struct TransactionManager {
    counters: Arc<Counters>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Transaction {
        let id = self.counters.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.counters.begun.fetch_add(1, Ordering::Release);
        debug!(tx = id, "Transaction begun");
        Transaction {
            id,
            session: Session::open(id),
            manager: self.clone(),
            state: TransactionState::Active,
        }
    }

    /// A snapshot of the counters. `begun` is read last so a transaction that
    /// ends between the loads is never counted as finished but not begun.
    pub fn stats(&self) -> TransactionStats {
        let committed = self.counters.committed.load(Ordering::Acquire);
        let rolled_back = self.counters.rolled_back.load(Ordering::Acquire);
        let begun = self.counters.begun.load(Ordering::Acquire);
        TransactionStats {
            begun,
            committed,
            rolled_back,
            active: begun.saturating_sub(committed + rolled_back),
        }
    }

    fn record(&self, state: TransactionState) {
        let counter = match state {
            TransactionState::Committed => &self.counters.committed,
            TransactionState::RolledBack => &self.counters.rolled_back,
            TransactionState::Active => return,
        };
        counter.fetch_add(1, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    RolledBack,
}

/// Request-scoped unit of work. Ends exactly once, as committed or rolled back.
pub struct Transaction {
    id: u64,
    session: Session,
    manager: TransactionManager,
    state: TransactionState,
}

impl Transaction {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Handle services use to stage writes.
    pub fn session(&self) -> Session {
        self.session.clone()
    }

    /// Applies the staged writes in order.
    ///
    /// The first failing write stops the commit; the lifecycle then counts as
    /// rolled back and the error is returned. Writes applied before the failure
    /// stay applied.
    ///
    /// Hooks registered with [`Session::after_commit`] run once every write has
    /// been applied, and never when the commit fails.
    pub async fn commit(mut self) -> Result<(), PersistenceError> {
        let Staged { writes, after_commit } = self.session.close();
        let total = writes.len();
        for (applied, write) in writes.into_iter().enumerate() {
            let what = write.describe();
            if let Err(e) = write.apply().await {
                warn!(tx = self.id, applied, total, write = %what, error = %e, "Commit aborted");
                self.finish(TransactionState::RolledBack);
                return Err(e);
            }
        }
        debug!(tx = self.id, writes = total, "Transaction committed");
        self.finish(TransactionState::Committed);
        for hook in after_commit {
            hook();
        }
        Ok(())
    }

    pub fn rollback(mut self) {
        let discarded = self.session.close().writes.len();
        debug!(tx = self.id, discarded, "Transaction rolled back");
        self.finish(TransactionState::RolledBack);
    }

    fn finish(&mut self, state: TransactionState) {
        self.state = state;
        self.manager.record(state);
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.is_active() {
            let discarded = self.session.close().writes.len();
            warn!(tx = self.id, discarded, "Transaction dropped while active, rolling back");
            self.finish(TransactionState::RolledBack);
        }
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish()
    }
}

/// Work to run after a successful commit.
pub type AfterCommit = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Staged {
    writes: Vec<Box<dyn PendingWrite>>,
    after_commit: Vec<AfterCommit>,
}

struct SessionInner {
    transaction_id: u64,
    staged: Mutex<Option<Staged>>,
}

/// Staging area of one transaction. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    fn open(transaction_id: u64) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                transaction_id,
                staged: Mutex::new(Some(Staged::default())),
            }),
        }
    }

    pub fn transaction_id(&self) -> u64 {
        self.inner.transaction_id
    }

    pub fn is_open(&self) -> bool {
        self.inner.staged.lock().is_some()
    }

    pub fn staged_len(&self) -> usize {
        self.inner.staged.lock().as_ref().map_or(0, |s| s.writes.len())
    }

    /// Queues a write. Fails once the owning transaction has ended.
    pub fn stage(&self, write: Box<dyn PendingWrite>) -> Result<(), PersistenceError> {
        self.with_open(|staged| staged.writes.push(write))
    }

    /// Runs `hook` once the owning transaction has committed. Dropped on
    /// rollback or on a failed commit.
    pub fn after_commit<F>(&self, hook: F) -> Result<(), PersistenceError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.with_open(|staged| staged.after_commit.push(Box::new(hook)))
    }

    fn with_open(&self, f: impl FnOnce(&mut Staged)) -> Result<(), PersistenceError> {
        match self.inner.staged.lock().as_mut() {
            Some(staged) => {
                f(staged);
                Ok(())
            }
            None => Err(PersistenceError::TransactionClosed(self.inner.transaction_id)),
        }
    }

    fn close(&self) -> Staged {
        self.inner.staged.lock().take().unwrap_or_default()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("transaction_id", &self.transaction_id())
            .field("staged", &self.staged_len())
            .finish()
    }
}
