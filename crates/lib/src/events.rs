//! Map object lifecycle notifications.
//!
//! The registry publishes an [`MapObjectEvent`] after every successful
//! registration and removal. Each subscriber gets its own unbounded queue and
//! delivery thread, so an observer that is slow, returns an error or panics
//! only affects itself: the registry operation that produced the event has
//! already returned and other observers keep receiving events.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{Result, object::MapObject};

/// A committed change to the registry.
#[derive(Debug, Clone)]
pub enum MapObjectEvent {
    /// The object was registered and is visible through lookups.
    Added(Arc<MapObject>),
    /// The object was unregistered; its bitmap has already been detached.
    Removed(Arc<MapObject>),
}

impl MapObjectEvent {
    /// The object this event is about.
    pub fn object(&self) -> &Arc<MapObject> {
        match self {
            MapObjectEvent::Added(object) | MapObjectEvent::Removed(object) => object,
        }
    }

    /// Identifier of the object this event is about.
    pub fn id(&self) -> i64 {
        self.object().id()
    }

    pub fn is_added(&self) -> bool {
        matches!(self, MapObjectEvent::Added(_))
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, MapObjectEvent::Removed(_))
    }
}

/// Receives registry events on a dedicated delivery thread.
pub trait MapObjectObserver: Send + Sync {
    /// Called once per event, in the order the registry committed them.
    ///
    /// Errors are logged and otherwise ignored; they never reach the registry.
    fn on_event(&self, event: &MapObjectEvent) -> Result<()>;
}

impl<F> MapObjectObserver for F
where
    F: Fn(&MapObjectEvent) -> Result<()> + Send + Sync,
{
    fn on_event(&self, event: &MapObjectEvent) -> Result<()> {
        self(event)
    }
}

#[derive(Debug, Default)]
struct NotifierInner {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, UnboundedSender<MapObjectEvent>>>,
}

impl NotifierInner {
    fn subscribers(&self) -> MutexGuard<'_, HashMap<u64, UnboundedSender<MapObjectEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fan-out of registry events to subscribed observers.
///
/// Cheap to clone; clones share the same subscriber set.
#[derive(Debug, Clone, Default)]
pub struct EventNotifier {
    inner: Arc<NotifierInner>,
}

impl EventNotifier {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer.
    ///
    /// The observer receives every event published after this call returns,
    /// until the returned [`Subscription`] is unsubscribed or dropped.
    pub fn subscribe(&self, observer: Arc<dyn MapObjectObserver>) -> Result<Subscription> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = thread::Builder::new()
            .name(format!("waypost-observer-{id}"))
            .spawn(move || deliver(id, observer, rx))?;
        self.inner.subscribers().insert(id, tx);
        tracing::debug!(subscriber = id, "Observer subscribed");

        Ok(Subscription {
            id,
            notifier: Arc::downgrade(&self.inner),
            worker: Some(worker),
        })
    }

    /// Queue an event for every current subscriber.
    ///
    /// Never blocks on observers. Subscribers whose delivery thread is gone
    /// are pruned.
    pub fn publish(&self, event: MapObjectEvent) {
        let mut subscribers = self.inner.subscribers();
        subscribers.retain(|id, tx| {
            let queued = tx.send(event.clone()).is_ok();
            if !queued {
                tracing::warn!(subscriber = id, "Dropping observer with closed queue");
            }
            queued
        });
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers().len()
    }
}

fn deliver(id: u64, observer: Arc<dyn MapObjectObserver>, mut rx: UnboundedReceiver<MapObjectEvent>) {
    while let Some(event) = rx.blocking_recv() {
        match panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(&event))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(subscriber = id, object = event.id(), "Map object observer failed: {e}");
            }
            Err(_) => {
                tracing::error!(subscriber = id, object = event.id(), "Map object observer panicked");
            }
        }
    }
    tracing::debug!(subscriber = id, "Observer delivery stopped");
}

/// Handle for an active subscription.
///
/// Dropping the handle unsubscribes; events already queued are still
/// delivered in the background.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    notifier: Weak<NotifierInner>,
    worker: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Subscription identifier, unique per notifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unsubscribe and wait until every already-queued event was delivered.
    ///
    /// Called from the observer's own delivery thread this does not wait.
    pub fn unsubscribe(mut self) {
        self.detach();
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }

    fn detach(&self) {
        if let Some(inner) = self.notifier.upgrade() {
            if inner.subscribers().remove(&self.id).is_some() {
                tracing::debug!(subscriber = self.id, "Observer unsubscribed");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc as std_mpsc;
    use std::time::Duration;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn registered(id: i64, name: &str) -> Arc<MapObject> {
        let mut object = MapObject::new(name, 0.0, 0.0);
        object.id = id;
        Arc::new(object)
    }

    fn forwarding_observer() -> (Arc<dyn MapObjectObserver>, std_mpsc::Receiver<(bool, i64)>) {
        let (tx, rx) = std_mpsc::channel();
        let tx = Mutex::new(tx);
        let observer = move |event: &MapObjectEvent| -> Result<()> {
            let _ = tx.lock().unwrap().send((event.is_added(), event.id()));
            Ok(())
        };
        (Arc::new(observer), rx)
    }

    #[test]
    fn test_event_accessors() {
        let added = MapObjectEvent::Added(registered(7, "a"));
        assert!(added.is_added());
        assert!(!added.is_removed());
        assert_eq!(added.id(), 7);
        let removed = MapObjectEvent::Removed(registered(8, "b"));
        assert!(removed.is_removed());
        assert_eq!(removed.object().name(), "b");
    }

    #[test]
    fn test_events_delivered_in_publish_order() {
        let notifier = EventNotifier::new();
        let (observer, rx) = forwarding_observer();
        let subscription = notifier.subscribe(observer).unwrap();

        let object = registered(1, "pin");
        notifier.publish(MapObjectEvent::Added(object.clone()));
        notifier.publish(MapObjectEvent::Removed(object));

        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), (true, 1));
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), (false, 1));
        subscription.unsubscribe();
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let notifier = EventNotifier::new();
        let (observer, rx) = forwarding_observer();
        let subscription = notifier.subscribe(observer).unwrap();
        assert_eq!(notifier.subscriber_count(), 1);

        notifier.publish(MapObjectEvent::Added(registered(1, "a")));
        subscription.unsubscribe();
        assert_eq!(notifier.subscriber_count(), 0);

        // Queued before unsubscribe, so still delivered
        assert_eq!(rx.try_recv().unwrap(), (true, 1));

        notifier.publish(MapObjectEvent::Added(registered(2, "b")));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let notifier = EventNotifier::new();
        let (observer, _rx) = forwarding_observer();
        drop(notifier.subscribe(observer).unwrap());
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_failing_observer_does_not_affect_others() {
        let notifier = EventNotifier::new();
        let failing = |_: &MapObjectEvent| -> Result<()> {
            Err(crate::Error::Io(std::io::Error::other("observer rejected event")))
        };
        let _failing = notifier.subscribe(Arc::new(failing)).unwrap();
        let (observer, rx) = forwarding_observer();
        let _good = notifier.subscribe(observer).unwrap();

        notifier.publish(MapObjectEvent::Added(registered(3, "c")));
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), (true, 3));
        assert_eq!(notifier.subscriber_count(), 2);
    }

    #[test]
    fn test_panicking_observer_keeps_receiving() {
        let notifier = EventNotifier::new();
        let (tx, rx) = std_mpsc::channel();
        let tx = Mutex::new(tx);
        let observer = move |event: &MapObjectEvent| -> Result<()> {
            if event.id() == 1 {
                panic!("observer bug");
            }
            let _ = tx.lock().unwrap().send(event.id());
            Ok(())
        };
        let _subscription = notifier.subscribe(Arc::new(observer)).unwrap();

        notifier.publish(MapObjectEvent::Added(registered(1, "boom")));
        notifier.publish(MapObjectEvent::Added(registered(2, "fine")));
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), 2);
    }

    #[test]
    fn test_slow_observer_does_not_block_publish() {
        let notifier = EventNotifier::new();
        let slow = |_: &MapObjectEvent| -> Result<()> {
            thread::sleep(Duration::from_millis(200));
            Ok(())
        };
        let _subscription = notifier.subscribe(Arc::new(slow)).unwrap();

        let start = std::time::Instant::now();
        for id in 1..=10 {
            notifier.publish(MapObjectEvent::Added(registered(id, "pin")));
        }
        assert!(start.elapsed() < Duration::from_millis(200));
    }
}
