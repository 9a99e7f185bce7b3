//! AsyncNotificationManager implementation

use crate::notifications::error::{NotificationError, NotificationResult};
use crate::notifications::event::{Event, EventFilter};
use crate::notifications::traits::{Subscriber, SubscriberStatistics};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

// Queue size at which a subscriber is considered to be falling behind
const HIGH_WATER_MARK: usize = 10000;

/// Shared handle every service publishes through
pub type SharedNotificationManager = Arc<Mutex<AsyncNotificationManager>>;

struct SubscriberInfo {
    filter: EventFilter,
    source: String,
    sender: UnboundedSender<Event>,
    statistics: Arc<SubscriberStatistics>,
}

/// Receiving end of a subscription
///
/// Keeps the subscriber's queue statistics in step with what has actually
/// been consumed.
pub struct EventReceiver {
    receiver: UnboundedReceiver<Event>,
    statistics: Arc<SubscriberStatistics>,
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Option<Event> {
        let event = self.receiver.recv().await?;
        self.statistics.decrement_queue_size();
        self.statistics.record_message_processed();
        Some(event)
    }

    /// Non-blocking receive; `None` when nothing is pending
    pub fn try_recv(&mut self) -> Option<Event> {
        let event = self.receiver.try_recv().ok()?;
        self.statistics.decrement_queue_size();
        self.statistics.record_message_processed();
        Some(event)
    }

    pub fn statistics(&self) -> &SubscriberStatistics {
        &self.statistics
    }
}

#[derive(Default)]
pub struct AsyncNotificationManager {
    subscribers: HashMap<String, SubscriberInfo>,
}

impl AsyncNotificationManager {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Wrap a fresh manager in the shared handle services expect
    pub fn shared() -> SharedNotificationManager {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn subscribe(
        &mut self,
        subscriber_id: String,
        filter: EventFilter,
        source: String,
    ) -> EventReceiver {
        let (sender, receiver) = unbounded_channel();
        let statistics = Arc::new(SubscriberStatistics::new());

        let subscriber_info = SubscriberInfo {
            filter,
            source: source.clone(),
            sender,
            statistics: Arc::clone(&statistics),
        };

        if let Some(existing) = self.subscribers.insert(subscriber_id.clone(), subscriber_info) {
            log::warn!(
                "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                subscriber_id,
                existing.source,
                source
            );
        }

        EventReceiver {
            receiver,
            statistics,
        }
    }

    pub fn unsubscribe(&mut self, subscriber_id: &str) -> NotificationResult<()> {
        self.subscribers
            .remove(subscriber_id)
            .map(|_| ())
            .ok_or_else(|| NotificationError::SubscriberNotFound {
                subscriber_id: subscriber_id.to_string(),
            })
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers.contains_key(subscriber_id)
    }

    pub fn get_subscriber_statistics(&self, subscriber_id: &str) -> Option<&SubscriberStatistics> {
        self.subscribers
            .get(subscriber_id)
            .map(|info| info.statistics.as_ref())
    }

    pub fn check_high_water_marks(&self) -> Vec<String> {
        self.subscribers
            .iter()
            .filter(|(_, info)| info.statistics.queue_size() >= HIGH_WATER_MARK)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub async fn publish(&mut self, event: Event) -> NotificationResult<()> {
        let mut failed_subscribers = Vec::new();

        for (subscriber_id, subscriber_info) in &self.subscribers {
            if subscriber_info.filter.accepts(&event) {
                subscriber_info.statistics.increment_queue_size();

                if subscriber_info.sender.send(event.clone()).is_err() {
                    // Receiver dropped
                    failed_subscribers.push(subscriber_id.clone());
                }
            }
        }

        for subscriber_id in &failed_subscribers {
            self.subscribers.remove(subscriber_id);
            log::debug!("Removed closed subscriber '{}'", subscriber_id);
        }

        if !failed_subscribers.is_empty() {
            return Err(NotificationError::PublishFailed {
                event_type: event.type_name().to_string(),
                failed_subscribers,
            });
        }

        Ok(())
    }
}

/// Publish and log failures instead of propagating them
///
/// Closed subscribers are a listener problem, never a reason to fail the
/// operation that raised the event.
pub async fn publish_or_log(manager: &SharedNotificationManager, event: Event) {
    let mut guard = manager.lock().await;
    if let Err(e) = guard.publish(event).await {
        log::debug!("Event publication incomplete: {}", e);
    }
}

/// Drive a subscriber until its channel closes
pub async fn run_subscriber(mut receiver: EventReceiver, subscriber: Arc<dyn Subscriber>) {
    while let Some(event) = receiver.recv().await {
        if let Err(e) = subscriber.handle_event(event).await {
            receiver.statistics().record_error();
            log::warn!(
                "Subscriber '{}' failed to handle event: {}",
                subscriber.subscriber_id(),
                e
            );
        }
    }
    log::trace!("Subscriber '{}' finished", subscriber.subscriber_id());
}
