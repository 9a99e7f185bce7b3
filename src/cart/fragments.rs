//! Client-side copy of the cart fragments
//!
//! Responses can arrive out of order when several cart requests overlap.
//! Every request takes a ticket from [`FragmentStore::begin`] before it is
//! sent; a response is applied only if its ticket is newer than the last one
//! applied, so an old response can never overwrite newer markup.

use crate::cart::error::{CartError, CartResult};
use crate::core::sync::handle_mutex_poison;
use crate::remote::api::Fragments;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Request sequence number handed out by [`FragmentStore::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FragmentTicket(u64);

impl FragmentTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Default)]
struct StoreState {
    fragments: BTreeMap<String, String>,
    cart_hash: Option<String>,
    last_applied: u64,
}

#[derive(Default)]
pub struct FragmentStore {
    next_sequence: AtomicU64,
    state: Mutex<StoreState>,
}

impl FragmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CartResult<MutexGuard<'_, StoreState>> {
        handle_mutex_poison(self.state.lock(), |message| CartError::State { message })
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _state = self.state.lock();
            panic!("poisoning fragment store");
        }));
    }

    pub fn begin(&self) -> FragmentTicket {
        FragmentTicket(self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Merge a response into the store; returns false if it was stale
    pub fn apply(&self, ticket: FragmentTicket, response: &Fragments) -> CartResult<bool> {
        let mut state = self.lock()?;
        if ticket.0 <= state.last_applied {
            log::debug!(
                "Discarding stale fragments (request #{}, already applied #{})",
                ticket.0,
                state.last_applied
            );
            return Ok(false);
        }

        state.last_applied = ticket.0;
        for (selector, html) in &response.fragments {
            state.fragments.insert(selector.clone(), html.clone());
        }
        if response.cart_hash.is_some() {
            state.cart_hash = response.cart_hash.clone();
        }
        log::trace!(
            "Applied {} fragments from request #{}",
            response.fragments.len(),
            ticket.0
        );
        Ok(true)
    }

    pub fn get(&self, selector: &str) -> CartResult<Option<String>> {
        Ok(self.lock()?.fragments.get(selector).cloned())
    }

    pub fn cart_hash(&self) -> CartResult<Option<String>> {
        Ok(self.lock()?.cart_hash.clone())
    }

    pub fn snapshot(&self) -> CartResult<Fragments> {
        let state = self.lock()?;
        Ok(Fragments {
            fragments: state.fragments.clone(),
            cart_hash: state.cart_hash.clone(),
        })
    }
}
