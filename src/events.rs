//! Intake lifecycle events.
//!
//! Deleting an intake publishes an [`IntakeDeleted`] value through
//! [`IntakeEvents`]. Listeners are registered explicitly at startup (the
//! application builder subscribes the [`DailyIntakeCache`](crate::cache::DailyIntakeCache));
//! any code path that deletes an intake and publishes the event gets cache
//! invalidation without knowing the cache exists.
//!
//! Delivery is synchronous: `publish_deleted` returns after every listener
//! has run, on the publishing thread, in subscription order.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use tracing::debug;

use crate::telemetry;
use crate::types::IntakeId;

/// An intake was removed from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeDeleted {
    /// Email of the intake's owner.
    pub user: String,
    /// Calendar date the intake was recorded for.
    pub date: NaiveDate,
    pub intake_id: IntakeId,
}

/// Receives intake lifecycle events.
pub trait IntakeEventListener: Send + Sync {
    fn on_intake_deleted(&self, event: &IntakeDeleted);
}

/// Explicit listener registry for intake events.
#[derive(Default)]
pub struct IntakeEvents {
    listeners: RwLock<Vec<Arc<dyn IntakeEventListener>>>,
}

impl IntakeEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners are never removed.
    pub fn subscribe(&self, listener: Arc<dyn IntakeEventListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Deliver `event` to every listener. Returns how many were notified.
    ///
    /// The listener list is snapshotted first, so a listener may subscribe
    /// further listeners without deadlocking; those see the next event.
    pub fn publish_deleted(&self, event: &IntakeDeleted) -> usize {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in &listeners {
            listener.on_intake_deleted(event);
        }

        metrics::counter!(telemetry::INTAKE_DELETED_EVENTS_TOTAL).increment(1);
        debug!(
            user = %event.user,
            date = %event.date,
            intake_id = event.intake_id,
            listeners = listeners.len(),
            "published intake deletion"
        );
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for IntakeEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntakeEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<IntakeId>>,
    }

    impl IntakeEventListener for Recorder {
        fn on_intake_deleted(&self, event: &IntakeDeleted) {
            self.seen.lock().unwrap().push(event.intake_id);
        }
    }

    fn event(id: IntakeId) -> IntakeDeleted {
        IntakeDeleted {
            user: "a@x.com".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            intake_id: id,
        }
    }

    #[test]
    fn publish_without_listeners_is_noop() {
        let events = IntakeEvents::new();
        assert_eq!(events.publish_deleted(&event(1)), 0);
    }

    #[test]
    fn every_listener_receives_event() {
        let events = IntakeEvents::new();
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        events.subscribe(a.clone());
        events.subscribe(b.clone());

        assert_eq!(events.publish_deleted(&event(7)), 2);
        assert_eq!(*a.seen.lock().unwrap(), vec![7]);
        assert_eq!(*b.seen.lock().unwrap(), vec![7]);
        assert_eq!(events.listener_count(), 2);
    }

    struct Subscriber {
        events: Arc<IntakeEvents>,
        late: Arc<Recorder>,
    }

    impl IntakeEventListener for Subscriber {
        fn on_intake_deleted(&self, _event: &IntakeDeleted) {
            self.events.subscribe(self.late.clone());
        }
    }

    #[test]
    fn listener_may_subscribe_during_delivery() {
        let events = Arc::new(IntakeEvents::new());
        let late = Arc::new(Recorder::default());
        events.subscribe(Arc::new(Subscriber {
            events: events.clone(),
            late: late.clone(),
        }));

        events.publish_deleted(&event(1));
        assert!(late.seen.lock().unwrap().is_empty());

        events.publish_deleted(&event(2));
        assert_eq!(*late.seen.lock().unwrap(), vec![2]);
    }
}
