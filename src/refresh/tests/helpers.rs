//! Shared fixtures for refresh queue tests

use crate::core::settings::RefreshSettings;
use crate::refresh::error::{RefreshError, RefreshResult};
use crate::refresh::executor::OperationExecutor;
use crate::refresh::operation::{OperationKind, QueuedOperation};
use crate::refresh::queue::RefreshQueue;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Executor that records every attempt and fails on demand
#[derive(Default)]
pub struct RecordingExecutor {
    attempts: Mutex<Vec<(OperationKind, Option<String>)>>,
    failures: Mutex<HashMap<OperationKind, u32>>,
    delay: Mutex<Duration>,
    running: AtomicUsize,
    max_concurrent: AtomicUsize,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the next `count` attempts of `kind` (`u32::MAX`: always)
    pub fn fail(&self, kind: OperationKind, count: u32) {
        self.failures.lock().unwrap().insert(kind, count);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn kinds(&self) -> Vec<OperationKind> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn payloads(&self) -> Vec<Option<String>> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OperationExecutor for RecordingExecutor {
    async fn execute(&self, operation: &QueuedOperation) -> RefreshResult<()> {
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(running, Ordering::SeqCst);
        self.attempts
            .lock()
            .unwrap()
            .push((operation.name, operation.payload.clone()));

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.running.fetch_sub(1, Ordering::SeqCst);

        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&operation.name) {
            Some(remaining) if *remaining > 0 => {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                Err(RefreshError::Execution {
                    kind: operation.name,
                    message: "simulated failure".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

pub fn queue_with(executor: Arc<RecordingExecutor>) -> RefreshQueue {
    RefreshQueue::new(RefreshSettings::default(), executor)
}
