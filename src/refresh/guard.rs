//! Per-kind "already fired recently" guard
//!
//! Some storefront listeners (cart drawers opening on `added_to_cart`,
//! analytics beacons) misbehave when a signal fires twice in quick
//! succession. Guarded kinds fire at most once per window.

use crate::core::sync::handle_mutex_poison;
use crate::refresh::error::{RefreshError, RefreshResult};
use crate::refresh::operation::OperationKind;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub struct RecentFireGuard {
    window: Duration,
    kinds: HashSet<OperationKind>,
    last_fired: Mutex<HashMap<OperationKind, Instant>>,
}

impl RecentFireGuard {
    pub fn new(window: Duration, kinds: impl IntoIterator<Item = OperationKind>) -> Self {
        Self {
            window,
            kinds: kinds.into_iter().collect(),
            last_fired: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_guarded(&self, kind: OperationKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Record a firing; false when the kind already fired inside the window
    pub fn try_fire(&self, kind: OperationKind) -> RefreshResult<bool> {
        if !self.is_guarded(kind) {
            return Ok(true);
        }

        let mut last_fired = handle_mutex_poison(self.last_fired.lock(), |message| {
            RefreshError::State { message }
        })?;
        let now = Instant::now();
        match last_fired.get(&kind) {
            Some(at) if now.duration_since(*at) < self.window => Ok(false),
            _ => {
                last_fired.insert(kind, now);
                Ok(true)
            }
        }
    }
}
