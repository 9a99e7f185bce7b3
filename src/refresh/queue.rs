//! Debounced, deduplicating refresh queue

use crate::core::settings::RefreshSettings;
use crate::core::sync::handle_mutex_poison;
use crate::refresh::error::{RefreshError, RefreshResult};
use crate::refresh::executor::OperationExecutor;
use crate::refresh::operation::{EnqueueOptions, OperationKind, QueuedOperation};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tokio::time::{sleep, Instant};

#[derive(Default)]
struct QueueState {
    /// Insertion order; at most one entry per kind
    operations: Vec<QueuedOperation>,
    debounce_generation: u64,
    refreshing: bool,
    /// Forced refreshes waiting for the busy flag
    forced_waiting: usize,
}

impl QueueState {
    fn is_idle(&self) -> bool {
        self.operations.is_empty() && !self.refreshing && self.forced_waiting == 0
    }

    fn take_kind(&mut self, kind: OperationKind) -> Option<QueuedOperation> {
        let index = self.operations.iter().position(|op| op.name == kind)?;
        Some(self.operations.remove(index))
    }
}

struct QueueInner {
    settings: RefreshSettings,
    executor: Arc<dyn OperationExecutor>,
    state: Mutex<QueueState>,
    settled: Notify,
}

/// Priority queue of named refresh operations
///
/// Enqueueing the same kind twice before a drain keeps a single entry.
/// Draining starts once the queue has been quiet for the debounce period and
/// runs strictly one operation at a time; a drain that finds a batch already
/// running waits and tries again.
///
/// Must be used from within a tokio runtime: timers run as spawned tasks.
#[derive(Clone)]
pub struct RefreshQueue {
    inner: Arc<QueueInner>,
}

impl RefreshQueue {
    pub fn new(settings: RefreshSettings, executor: Arc<dyn OperationExecutor>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                settings,
                executor,
                state: Mutex::new(QueueState::default()),
                settled: Notify::new(),
            }),
        }
    }

    fn lock(&self) -> RefreshResult<MutexGuard<'_, QueueState>> {
        handle_mutex_poison(self.inner.state.lock(), |message| RefreshError::State {
            message,
        })
    }

    /// Insert or replace the operation for `kind` and restart the debounce
    pub fn enqueue(&self, kind: OperationKind, options: EnqueueOptions) -> RefreshResult<()> {
        let generation = {
            let mut state = self.lock()?;
            match state.operations.iter_mut().find(|op| op.name == kind) {
                Some(existing) => {
                    if let Some(priority) = options.priority {
                        existing.priority = priority;
                    }
                    existing.payload = options.payload;
                    existing.enqueued_at = Instant::now();
                    log::trace!("Replaced queued '{}'", kind);
                }
                None => {
                    let priority = options
                        .priority
                        .unwrap_or_else(|| self.inner.settings.priority_for(kind));
                    state
                        .operations
                        .push(QueuedOperation::new(kind, priority, options.payload));
                    log::trace!("Queued '{}' (priority {})", kind, priority);
                }
            }
            state.debounce_generation += 1;
            state.debounce_generation
        };

        let queue = self.clone();
        tokio::spawn(async move {
            sleep(queue.inner.settings.debounce()).await;
            let current = match queue.lock() {
                Ok(state) => state.debounce_generation == generation,
                Err(e) => {
                    log::warn!("Refresh queue unavailable: {}", e);
                    false
                }
            };
            if current {
                queue.drain().await;
            }
        });
        Ok(())
    }

    /// Run `kinds` now, in the given order, skipping the debounce
    ///
    /// Queued entries for these kinds are consumed so they do not run twice.
    /// Waits for a running batch to finish first; retries apply as usual.
    pub async fn force_refresh(&self, kinds: &[OperationKind]) -> RefreshResult<()> {
        if kinds.is_empty() {
            return Ok(());
        }
        let _waiting = ForcedWait::register(self)?;
        log::debug!("Forced refresh of {} operation(s)", kinds.len());

        let settings = &self.inner.settings;
        self.acquire(|state| {
            Some(
                kinds
                    .iter()
                    .map(|kind| {
                        state.take_kind(*kind).unwrap_or_else(|| {
                            QueuedOperation::new(*kind, settings.priority_for(*kind), None)
                        })
                    })
                    .collect(),
            )
        })
        .await
    }

    pub fn is_currently_refreshing(&self) -> RefreshResult<bool> {
        Ok(self.lock()?.refreshing)
    }

    /// Queued operations in the order a drain would run them
    pub fn pending(&self) -> RefreshResult<Vec<QueuedOperation>> {
        let mut operations = self.lock()?.operations.clone();
        operations.sort_by_key(|op| op.priority);
        Ok(operations)
    }

    /// Wait until nothing is queued and no batch is running
    pub async fn settled(&self) -> RefreshResult<()> {
        loop {
            let notified = self.inner.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.lock()?.is_idle() {
                return Ok(());
            }
            notified.await;
        }
    }

    async fn drain(&self) {
        let result = self
            .acquire(|state| {
                if state.operations.is_empty() {
                    return None;
                }
                let mut operations = std::mem::take(&mut state.operations);
                // Stable: equal priorities keep insertion order
                operations.sort_by_key(|op| op.priority);
                Some(operations.into())
            })
            .await;
        if let Err(e) = result {
            log::warn!("Refresh drain aborted: {}", e);
        }
    }

    /// Claim the busy flag, taking the batch under the same lock, then run it
    ///
    /// While another batch runs, re-check after the busy retry delay.
    async fn acquire<F>(&self, take: F) -> RefreshResult<()>
    where
        F: FnOnce(&mut QueueState) -> Option<VecDeque<QueuedOperation>>,
    {
        let mut take = Some(take);
        let batch = loop {
            {
                let mut state = self.lock()?;
                if !state.refreshing {
                    let Some(take) = take.take() else {
                        return Ok(());
                    };
                    match take(&mut state) {
                        Some(batch) => {
                            state.refreshing = true;
                            break batch;
                        }
                        None => return Ok(()),
                    }
                }
            }
            log::trace!(
                "Batch already running, retrying in {:?}",
                self.inner.settings.busy_retry()
            );
            sleep(self.inner.settings.busy_retry()).await;
        };

        self.run_batch(batch).await;

        let mut state = self.lock()?;
        state.refreshing = false;
        if state.is_idle() {
            self.inner.settled.notify_waiters();
        }
        Ok(())
    }

    async fn run_batch(&self, mut batch: VecDeque<QueuedOperation>) {
        let settings = &self.inner.settings;
        log::debug!("Draining {} refresh operation(s)", batch.len());

        while let Some(mut operation) = batch.pop_front() {
            match self.inner.executor.execute(&operation).await {
                Ok(()) => {
                    log::trace!("Completed '{}'", operation.name);
                    if !batch.is_empty() {
                        sleep(settings.pacing()).await;
                    }
                }
                Err(e) => {
                    operation.retry_count += 1;
                    if operation.retry_count <= settings.max_retries {
                        log::debug!(
                            "'{}' failed (attempt {}/{}), retrying: {}",
                            operation.name,
                            operation.retry_count,
                            settings.max_retries + 1,
                            e
                        );
                        batch.push_front(operation);
                    } else {
                        log::warn!(
                            "Dropping '{}' after {} attempts: {}",
                            operation.name,
                            operation.retry_count,
                            e
                        );
                    }
                }
            }
        }
    }
}

/// Keeps `settled` waiting while a forced refresh queues for the busy flag
struct ForcedWait<'a> {
    queue: &'a RefreshQueue,
}

impl<'a> ForcedWait<'a> {
    fn register(queue: &'a RefreshQueue) -> RefreshResult<Self> {
        queue.lock()?.forced_waiting += 1;
        Ok(Self { queue })
    }
}

impl Drop for ForcedWait<'_> {
    fn drop(&mut self) {
        let Ok(mut state) = self.queue.inner.state.lock() else {
            return;
        };
        state.forced_waiting = state.forced_waiting.saturating_sub(1);
        if state.is_idle() {
            self.queue.inner.settled.notify_waiters();
        }
    }
}
