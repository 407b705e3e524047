//! Click-outside subscriptions
//!
//! The host forwards pointer clicks to a `PointerHub`. Each editor session
//! holds an `OutsideClickSubscription` for its on-screen region and receives
//! the clicks that land outside it. Dropping the subscription unregisters it.

use log::debug;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// A rectangle in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// A click that landed outside a subscriber's region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutsideClick {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug)]
struct Listener {
    id: u64,
    region: Region,
    /// Clicks delivered and not yet polled
    pending: VecDeque<OutsideClick>,
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<Listener>,
}

impl HubInner {
    fn listener_mut(&mut self, id: u64) -> Option<&mut Listener> {
        self.listeners.iter_mut().find(|listener| listener.id == id)
    }
}

/// Dispatches host clicks to the subscriptions they fall outside of.
#[derive(Debug, Clone, Default)]
pub struct PointerHub {
    inner: Rc<RefCell<HubInner>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start receiving clicks outside `region`.
    pub fn subscribe(&self, region: Region) -> OutsideClickSubscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.push(Listener {
            id,
            region,
            pending: VecDeque::new(),
        });
        debug!("Outside-click subscription {} registered", id);

        OutsideClickSubscription {
            id,
            hub: Rc::downgrade(&self.inner),
        }
    }

    /// Queue a click for every subscription whose region does not contain it.
    /// Returns the number of subscriptions notified.
    pub fn dispatch_click(&self, x: f32, y: f32) -> usize {
        let mut inner = self.inner.borrow_mut();
        let mut notified = 0;
        for listener in inner
            .listeners
            .iter_mut()
            .filter(|listener| !listener.region.contains(x, y))
        {
            listener.pending.push_back(OutsideClick { x, y });
            notified += 1;
        }
        notified
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// A live registration with a `PointerHub`, released on drop. Pending clicks
/// are lost once the hub is gone.
#[derive(Debug)]
pub struct OutsideClickSubscription {
    id: u64,
    hub: Weak<RefCell<HubInner>>,
}

impl OutsideClickSubscription {
    fn with_listener<T>(&self, f: impl FnOnce(&mut Listener) -> T) -> Option<T> {
        let hub = self.hub.upgrade()?;
        let mut inner = hub.borrow_mut();
        inner.listener_mut(self.id).map(f)
    }

    /// Next undelivered outside click, if any.
    pub fn poll(&self) -> Option<OutsideClick> {
        self.with_listener(|listener| listener.pending.pop_front()).flatten()
    }

    /// Drain every pending outside click.
    pub fn drain(&self) -> Vec<OutsideClick> {
        self.with_listener(|listener| listener.pending.drain(..).collect())
            .unwrap_or_default()
    }

    /// Move the watched region, e.g. after a layout change.
    pub fn set_region(&self, region: Region) {
        self.with_listener(|listener| listener.region = region);
    }
}

impl Drop for OutsideClickSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.borrow_mut().listeners.retain(|listener| listener.id != self.id);
            debug!("Outside-click subscription {} released", self.id);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_region() -> Region {
        Region::new(10.0, 10.0, 100.0, 50.0)
    }

    #[test]
    fn test_region_contains() {
        let region = editor_region();
        assert!(region.contains(10.0, 10.0));
        assert!(region.contains(109.0, 59.0));
        assert!(!region.contains(110.0, 30.0));
        assert!(!region.contains(5.0, 30.0));
    }

    #[test]
    fn test_outside_click_is_delivered() {
        let hub = PointerHub::new();
        let subscription = hub.subscribe(editor_region());
        assert_eq!(hub.dispatch_click(200.0, 200.0), 1);
        assert_eq!(subscription.poll(), Some(OutsideClick { x: 200.0, y: 200.0 }));
        assert_eq!(subscription.poll(), None);
    }

    #[test]
    fn test_inside_click_is_not_delivered() {
        let hub = PointerHub::new();
        let subscription = hub.subscribe(editor_region());
        assert_eq!(hub.dispatch_click(20.0, 20.0), 0);
        assert!(subscription.drain().is_empty());
    }

    #[test]
    fn test_drop_releases_subscription() {
        let hub = PointerHub::new();
        let first = hub.subscribe(editor_region());
        let second = hub.subscribe(Region::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(hub.listener_count(), 2);
        drop(first);
        assert_eq!(hub.listener_count(), 1);
        drop(second);
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.dispatch_click(1.0, 1.0), 0);
    }

    #[test]
    fn test_subscription_outlives_hub() {
        let hub = PointerHub::new();
        let subscription = hub.subscribe(editor_region());
        drop(hub);
        assert_eq!(subscription.poll(), None);
        drop(subscription);
    }

    #[test]
    fn test_clicks_queue_in_order_per_subscription() {
        let hub = PointerHub::new();
        let left = hub.subscribe(Region::new(0.0, 0.0, 50.0, 50.0));
        let right = hub.subscribe(Region::new(100.0, 0.0, 50.0, 50.0));
        assert_eq!(hub.dispatch_click(10.0, 10.0), 1);
        assert_eq!(hub.dispatch_click(200.0, 10.0), 2);

        assert_eq!(left.drain(), vec![OutsideClick { x: 200.0, y: 10.0 }]);
        assert_eq!(right.poll(), Some(OutsideClick { x: 10.0, y: 10.0 }));
        assert_eq!(right.poll(), Some(OutsideClick { x: 200.0, y: 10.0 }));
        assert_eq!(right.poll(), None);
    }

    #[test]
    fn test_set_region_moves_watch_area() {
        let hub = PointerHub::new();
        let subscription = hub.subscribe(editor_region());
        subscription.set_region(Region::new(190.0, 190.0, 20.0, 20.0));
        assert_eq!(hub.dispatch_click(200.0, 200.0), 0);
        assert_eq!(hub.dispatch_click(20.0, 20.0), 1);
    }
}
