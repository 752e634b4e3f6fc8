use std::fmt;

///
/// SubscriptionId
///
/// Handle returned by `ChangeEvent::subscribe`, used to remove the listener again.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SubscriptionId(u64);

///
/// ChangeEvent
///
/// Payload-free observer list backing one generated `…Changed` event.
/// Publishing with no subscribers does nothing.
///

#[derive(Default)]
pub struct ChangeEvent {
    listeners: Vec<(SubscriptionId, Box<dyn FnMut() + Send>)>,
    next_id: u64,
}

impl ChangeEvent {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a listener; it runs on every subsequent `publish`.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut() + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));

        id
    }

    /// Remove a listener. Returns `false` when the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);

        self.listeners.len() != before
    }

    /// Invoke every listener in subscription order.
    pub fn publish(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener();
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl fmt::Debug for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeEvent")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);

        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn publish_without_listeners_is_noop() {
        let mut event = ChangeEvent::new();
        event.publish();

        assert!(event.is_empty());
    }

    #[test]
    fn publish_reaches_every_listener() {
        let mut event = ChangeEvent::new();
        let (a, listener_a) = counter();
        let (b, listener_b) = counter();
        event.subscribe(listener_a);
        event.subscribe(listener_b);

        event.publish();
        event.publish();

        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 2);
        assert_eq!(event.len(), 2);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let mut event = ChangeEvent::new();
        let (a, listener_a) = counter();
        let (b, listener_b) = counter();
        let id_a = event.subscribe(listener_a);
        event.subscribe(listener_b);

        assert!(event.unsubscribe(id_a));
        assert!(!event.unsubscribe(id_a));
        event.publish();

        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn debug_reports_listener_count() {
        let mut event = ChangeEvent::default();
        event.subscribe(|| {});

        assert_eq!(format!("{event:?}"), "ChangeEvent { listeners: 1 }");
    }
}
