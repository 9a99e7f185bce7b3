//! Public API for cart actions

pub use crate::cart::actions::{CartActions, CartOutcome};
pub use crate::cart::error::{CartError, CartResult};
pub use crate::cart::fragments::{FragmentStore, FragmentTicket};
