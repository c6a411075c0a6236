use futures::future::try_join_all;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::cancellation::{run_cancellable, CancellationToken};
use crate::errors::CoreError;

use super::collection::Collection;
use super::document::Document;
use super::store::{DocumentStore, Operation};

/// Queue of deferred mutations committed together against a [`DocumentStore`].
///
/// Repositories only enqueue [`Operation`]s; nothing reaches the store
/// until [`UnitOfWork::save_changes`] runs. A commit opens one session,
/// applies every queued operation concurrently and commits only if all
/// of them succeeded. Operations in one batch therefore must not depend
/// on each other.
///
/// The queue is drained as soon as a commit starts, so it is empty again
/// after both a successful and a failed commit.
pub struct UnitOfWork {
    store: Arc<dyn DocumentStore>,
    commands: Mutex<Vec<Operation>>,
}

impl UnitOfWork {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            commands: Mutex::new(Vec::new()),
        }
    }

    /// The underlying store, for anything the repositories do not cover.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn collection<T: Document>(&self, name: &str) -> Collection<T> {
        Collection::new(self.store.clone(), name)
    }

    pub fn add_command(&self, operation: Operation) {
        log::debug!(
            "queued {} of {} in {}",
            operation.verb(),
            operation.id(),
            operation.collection()
        );
        self.commands.lock().push(operation);
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.lock().len()
    }

    /// Drop everything queued so far. Returns how many operations were discarded.
    pub fn discard_changes(&self) -> usize {
        let mut commands = self.commands.lock();
        let discarded = commands.len();
        commands.clear();
        discarded
    }

    /// Commit every queued operation atomically.
    ///
    /// Returns the number of operations executed. If any operation fails, or
    /// `cancel` fires before the commit, the session is aborted and none of
    /// the operations become visible.
    pub async fn save_changes(&self, cancel: &CancellationToken) -> Result<usize, CoreError> {
        let commands = std::mem::take(&mut *self.commands.lock());
        if commands.is_empty() {
            return Ok(0);
        }
        let count = commands.len();

        let session = run_cancellable(cancel, self.store.start_session()).await?;

        let applied = run_cancellable(
            cancel,
            try_join_all(commands.iter().map(|op| session.apply(op))),
        )
        .await;

        match applied {
            Ok(_) => {
                run_cancellable(cancel, session.commit()).await?;
                log::info!("committed {count} commands to {} store", self.store.name());
                Ok(count)
            }
            Err(e) => {
                if let Err(abort_err) = session.abort().await {
                    log::warn!("abort after failed unit of work also failed: {abort_err}");
                }
                log::warn!("rolled back {count} commands: {e}");
                match e {
                    CoreError::Cancelled => Err(CoreError::Cancelled),
                    other => Err(CoreError::Transaction {
                        commands: count,
                        source: Box::new(other),
                    }),
                }
            }
        }
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        let pending = self.commands.get_mut().len();
        if pending > 0 {
            log::warn!("unit of work dropped with {pending} uncommitted commands");
        }
    }
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("store", &self.store.name())
            .field("pending", &self.pending_commands())
            .finish()
    }
}
