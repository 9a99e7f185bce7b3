//! Positioned, deduplicating toast stacks

use crate::core::settings::ToastSettings;
use crate::core::strings::truncate_graphemes;
use crate::core::sync::handle_mutex_poison;
use crate::notifications::api::{
    publish_or_log, Event, SharedNotificationManager, ToastEvent, ToastEventType,
};
use crate::toast::error::{ToastError, ToastResult};
use crate::toast::timer::DismissTimer;
use crate::toast::types::{Position, Severity, ToastId, ToastOptions, ToastSnapshot};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::time::Instant;

struct ActiveToast {
    id: ToastId,
    text: String,
    severity: Severity,
    count: u32,
    last_shown: Instant,
    dedupe_window: Duration,
    pause_on_hover: bool,
    timer: DismissTimer,
}

impl ActiveToast {
    fn snapshot(&self, position: Position) -> ToastSnapshot {
        ToastSnapshot {
            id: self.id,
            text: self.text.clone(),
            severity: self.severity,
            position,
            count: self.count,
            paused: self.timer.is_paused(),
        }
    }
}

struct PendingToast {
    id: ToastId,
    text: String,
    severity: Severity,
    duration: Duration,
    dedupe_window: Duration,
    pause_on_hover: bool,
}

impl PendingToast {
    fn activate(self, now: Instant) -> ActiveToast {
        ActiveToast {
            id: self.id,
            text: self.text,
            severity: self.severity,
            count: 1,
            last_shown: now,
            dedupe_window: self.dedupe_window,
            pause_on_hover: self.pause_on_hover,
            timer: DismissTimer::started(self.duration, now),
        }
    }

    fn snapshot(&self, position: Position) -> ToastSnapshot {
        ToastSnapshot {
            id: self.id,
            text: self.text.clone(),
            severity: self.severity,
            position,
            count: 1,
            paused: false,
        }
    }
}

/// One stack of toasts anchored at a screen position
struct Container {
    max_visible: usize,
    visible: Vec<ActiveToast>,
    queued: VecDeque<PendingToast>,
}

impl Container {
    fn new(max_visible: usize) -> Self {
        Self {
            max_visible,
            visible: Vec::new(),
            queued: VecDeque::new(),
        }
    }

    fn find_mut(&mut self, id: ToastId) -> Option<&mut ActiveToast> {
        self.visible.iter_mut().find(|toast| toast.id == id)
    }
}

/// Work to do once the state lock is released
#[derive(Default)]
struct Effects {
    events: Vec<ToastEvent>,
    timers: Vec<(Position, ToastId, u64, Instant)>,
}

impl Effects {
    fn event(&mut self, event_type: ToastEventType, toast: ToastSnapshot) {
        self.events.push(ToastEvent::new(event_type, toast));
    }

    fn arm(&mut self, position: Position, toast: &ActiveToast) {
        if let Some(deadline) = toast.timer.deadline() {
            self.timers
                .push((position, toast.id, toast.timer.generation(), deadline));
        }
    }
}

struct Inner {
    settings: ToastSettings,
    containers: Mutex<HashMap<Position, Container>>,
    next_id: AtomicU64,
    notifications: Option<SharedNotificationManager>,
}

/// Toast notification surface
///
/// Cheap to clone; clones share the same stacks. Every toast carries its own
/// auto-dismiss timer, run as a tokio task that holds only a weak reference
/// back to the notifier.
#[derive(Clone)]
pub struct ToastNotifier {
    inner: Arc<Inner>,
}

impl ToastNotifier {
    pub fn new(settings: ToastSettings, notifications: Option<SharedNotificationManager>) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                containers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                notifications,
            }),
        }
    }

    fn lock(&self) -> ToastResult<MutexGuard<'_, HashMap<Position, Container>>> {
        handle_mutex_poison(self.inner.containers.lock(), |message| {
            ToastError::State { message }
        })
    }

    /// Show a message, merging it into a visible duplicate or queueing it
    /// when its position is full
    pub async fn show(&self, message: &str, options: ToastOptions) -> ToastResult<ToastId> {
        let settings = &self.inner.settings;
        let text = truncate_graphemes(message.trim(), settings.max_text_graphemes);
        if text.is_empty() {
            return Err(ToastError::EmptyMessage);
        }

        let position = options.position.unwrap_or(settings.position);
        let duration = options
            .duration
            .unwrap_or_else(|| Duration::from_millis(settings.duration_ms));
        let dedupe_window = options
            .dedupe_window
            .unwrap_or_else(|| Duration::from_millis(settings.dedupe_window_ms));
        let pause_on_hover = options.pause_on_hover.unwrap_or(settings.pause_on_hover);

        let now = Instant::now();
        let mut effects = Effects::default();

        let id = {
            let mut containers = self.lock()?;
            let container = containers
                .entry(position)
                .or_insert_with(|| Container::new(settings.max_visible));
            if let Some(max_visible) = options.max_visible {
                container.max_visible = max_visible.max(1);
            }

            let duplicate = container.visible.iter_mut().find(|toast| {
                toast.text == text && now.duration_since(toast.last_shown) <= toast.dedupe_window
            });

            if let Some(toast) = duplicate {
                toast.count += 1;
                toast.last_shown = now;
                toast.timer.restart(now);
                log::trace!("Toast {} repeated ({}x)", toast.id, toast.count);
                effects.arm(position, toast);
                effects.event(ToastEventType::Updated, toast.snapshot(position));
                toast.id
            } else {
                let pending = PendingToast {
                    id: ToastId(self.inner.next_id.fetch_add(1, Ordering::Relaxed)),
                    text,
                    severity: options.severity,
                    duration,
                    dedupe_window,
                    pause_on_hover,
                };
                let id = pending.id;

                if container.visible.len() >= container.max_visible {
                    log::debug!("Toast position {} full, queueing {}", position, id);
                    effects.event(ToastEventType::Queued, pending.snapshot(position));
                    container.queued.push_back(pending);
                } else {
                    let toast = pending.activate(now);
                    effects.arm(position, &toast);
                    effects.event(ToastEventType::Shown, toast.snapshot(position));
                    container.visible.push(toast);
                }
                id
            }
        };

        self.apply(effects).await;
        Ok(id)
    }

    pub async fn success(&self, message: &str, options: ToastOptions) -> ToastResult<ToastId> {
        self.show(message, ToastOptions { severity: Severity::Success, ..options })
            .await
    }

    pub async fn error(&self, message: &str, options: ToastOptions) -> ToastResult<ToastId> {
        self.show(message, ToastOptions { severity: Severity::Error, ..options })
            .await
    }

    pub async fn warning(&self, message: &str, options: ToastOptions) -> ToastResult<ToastId> {
        self.show(message, ToastOptions { severity: Severity::Warning, ..options })
            .await
    }

    pub async fn info(&self, message: &str, options: ToastOptions) -> ToastResult<ToastId> {
        self.show(message, ToastOptions { severity: Severity::Info, ..options })
            .await
    }

    /// Close a toast (visible or still queued); returns false if unknown
    pub async fn dismiss(&self, id: ToastId) -> ToastResult<bool> {
        let mut effects = Effects::default();
        let found = {
            let mut containers = self.lock()?;
            let mut found = false;
            for (position, container) in containers.iter_mut() {
                if let Some(index) = container.visible.iter().position(|t| t.id == id) {
                    let toast = container.visible.remove(index);
                    effects.event(ToastEventType::Dismissed, toast.snapshot(*position));
                    promote(*position, container, Instant::now(), &mut effects);
                    found = true;
                    break;
                }
                if let Some(index) = container.queued.iter().position(|t| t.id == id) {
                    if let Some(pending) = container.queued.remove(index) {
                        effects.event(ToastEventType::Dismissed, pending.snapshot(*position));
                    }
                    found = true;
                    break;
                }
            }
            found
        };

        self.apply(effects).await;
        Ok(found)
    }

    /// Pause the countdown of a toast that opted into hover pausing
    pub async fn pointer_enter(&self, id: ToastId) -> ToastResult<()> {
        let mut effects = Effects::default();
        {
            let mut containers = self.lock()?;
            for (position, container) in containers.iter_mut() {
                if let Some(toast) = container.find_mut(id) {
                    if toast.pause_on_hover && toast.timer.pause(Instant::now()) {
                        effects.event(ToastEventType::Updated, toast.snapshot(*position));
                    }
                    break;
                }
            }
        }
        self.apply(effects).await;
        Ok(())
    }

    /// Resume a paused countdown with the time that was left
    pub async fn pointer_leave(&self, id: ToastId) -> ToastResult<()> {
        let mut effects = Effects::default();
        {
            let mut containers = self.lock()?;
            for (position, container) in containers.iter_mut() {
                if let Some(toast) = container.find_mut(id) {
                    if toast.timer.resume(Instant::now()).is_some() {
                        effects.arm(*position, toast);
                        effects.event(ToastEventType::Updated, toast.snapshot(*position));
                    }
                    break;
                }
            }
        }
        self.apply(effects).await;
        Ok(())
    }

    pub fn visible(&self, position: Position) -> ToastResult<Vec<ToastSnapshot>> {
        let containers = self.lock()?;
        Ok(containers
            .get(&position)
            .map(|c| c.visible.iter().map(|t| t.snapshot(position)).collect())
            .unwrap_or_default())
    }

    pub fn queued_len(&self, position: Position) -> ToastResult<usize> {
        let containers = self.lock()?;
        Ok(containers.get(&position).map_or(0, |c| c.queued.len()))
    }

    /// Drop every toast, visible and queued
    pub async fn clear(&self) -> ToastResult<()> {
        let mut effects = Effects::default();
        {
            let mut containers = self.lock()?;
            for (position, container) in containers.drain() {
                for toast in container.visible {
                    effects.event(ToastEventType::Dismissed, toast.snapshot(position));
                }
                for pending in container.queued {
                    effects.event(ToastEventType::Dismissed, pending.snapshot(position));
                }
            }
        }
        self.apply(effects).await;
        Ok(())
    }

    async fn expire(&self, position: Position, id: ToastId, generation: u64) -> ToastResult<()> {
        let mut effects = Effects::default();
        {
            let mut containers = self.lock()?;
            let Some(container) = containers.get_mut(&position) else {
                return Ok(());
            };
            let index = container.visible.iter().position(|t| {
                t.id == id && t.timer.generation() == generation && !t.timer.is_paused()
            });
            if let Some(index) = index {
                let toast = container.visible.remove(index);
                log::trace!("Toast {} expired", id);
                effects.event(ToastEventType::Dismissed, toast.snapshot(position));
                promote(position, container, Instant::now(), &mut effects);
            }
        }
        self.apply(effects).await;
        Ok(())
    }

    async fn apply(&self, effects: Effects) {
        for (position, id, generation, deadline) in effects.timers {
            let notifier = Arc::downgrade(&self.inner);
            tokio::spawn(run_dismiss_timer(notifier, position, id, generation, deadline));
        }

        if let Some(notifications) = &self.inner.notifications {
            for event in effects.events {
                publish_or_log(notifications, Event::Toast(event)).await;
            }
        }
    }
}

/// Fill free slots from the position's FIFO
fn promote(position: Position, container: &mut Container, now: Instant, effects: &mut Effects) {
    while container.visible.len() < container.max_visible {
        let Some(pending) = container.queued.pop_front() else {
            break;
        };
        let toast = pending.activate(now);
        effects.arm(position, &toast);
        effects.event(ToastEventType::Shown, toast.snapshot(position));
        container.visible.push(toast);
    }
}

fn run_dismiss_timer(
    inner: Weak<Inner>,
    position: Position,
    id: ToastId,
    generation: u64,
    deadline: Instant,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
    Box::pin(async move {
        tokio::time::sleep_until(deadline).await;
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let notifier = ToastNotifier { inner };
        if let Err(e) = notifier.expire(position, id, generation).await {
            log::warn!("Failed to expire toast {}: {}", id, e);
        }
    })
}
