//! Public API for the notification system
//!
//! External modules should import from here rather than directly from internal modules.
//! There is no global instance: the composition root creates one
//! [`SharedNotificationManager`] and hands it to every service.

pub use crate::notifications::event::{
    CartEvent, CartSignal, CouponEvent, CouponEventType, Event, EventFilter, ToastEvent,
    ToastEventType,
};

pub use crate::notifications::error::{NotificationError, NotificationResult};
pub use crate::notifications::manager::{
    publish_or_log, run_subscriber, AsyncNotificationManager, EventReceiver,
    SharedNotificationManager,
};

pub use crate::notifications::traits::{Subscriber, SubscriberStatistics};
