//! In-flight coupon attempts, one per normalized code

use crate::core::sync::handle_mutex_poison;
use crate::coupon::error::{CouponError, CouponResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CouponAttempt {
    started_at: Instant,
    retry_count: u32,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Begin {
    /// A new attempt was recorded; clear it with this generation
    Started(u64),
    /// A live attempt for the same code exists
    InFlight,
}

pub(crate) struct AttemptRegistry {
    processing_timeout: Duration,
    next_generation: AtomicU64,
    attempts: Mutex<HashMap<String, CouponAttempt>>,
}

impl AttemptRegistry {
    pub(crate) fn new(processing_timeout: Duration) -> Self {
        Self {
            processing_timeout,
            next_generation: AtomicU64::new(1),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> CouponResult<MutexGuard<'_, HashMap<String, CouponAttempt>>> {
        handle_mutex_poison(self.attempts.lock(), |message| CouponError::State {
            message,
        })
    }

    /// Record an attempt for `code` unless a live one exists
    ///
    /// An attempt older than the processing timeout is considered abandoned
    /// and replaced.
    pub(crate) fn begin(&self, code: &str) -> CouponResult<Begin> {
        let mut attempts = self.lock()?;
        let now = Instant::now();

        let retry_count = match attempts.get(code) {
            Some(existing) if now.duration_since(existing.started_at) < self.processing_timeout => {
                return Ok(Begin::InFlight);
            }
            Some(stale) => {
                log::debug!(
                    "Discarding stale attempt for coupon '{}' (started {:?} ago)",
                    code,
                    now.duration_since(stale.started_at)
                );
                stale.retry_count + 1
            }
            None => 0,
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        attempts.insert(
            code.to_string(),
            CouponAttempt {
                started_at: now,
                retry_count,
                generation,
            },
        );
        Ok(Begin::Started(generation))
    }

    /// Remove the attempt for `code` if it is still `generation`
    pub(crate) fn clear(&self, code: &str, generation: u64) -> CouponResult<bool> {
        let mut attempts = self.lock()?;
        match attempts.get(code) {
            Some(attempt) if attempt.generation == generation => {
                attempts.remove(code);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub(crate) fn is_in_flight(&self, code: &str) -> CouponResult<bool> {
        let attempts = self.lock()?;
        Ok(attempts
            .get(code)
            .is_some_and(|a| Instant::now().duration_since(a.started_at) < self.processing_timeout))
    }

    pub(crate) fn retry_count(&self, code: &str) -> CouponResult<Option<u32>> {
        Ok(self.lock()?.get(code).map(|a| a.retry_count))
    }
}
