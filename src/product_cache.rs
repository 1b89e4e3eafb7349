//! Per-event product cache shared between filter instances
//!
//! Several filters running in the same context often request the same
//! derived product. The cache deduplicates requests by key equality at
//! registration time, hands out stable handles, and is refilled once per
//! event: `begin_event` drops every cached value, then the first caller
//! to `load` a slot fetches it and later callers get the cached copy.

use parking_lot::RwLock;

use crate::event::EventId;

/// Stable handle into a [`ProductCache`], issued by `register`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheHandle(usize);

struct Slot<K, V> {
    key: K,
    value: Option<V>,
}

struct Inner<K, V> {
    slots: Vec<Slot<K, V>>,
    event: Option<EventId>,
}

/// Deduplicating per-event cache of derived products.
///
/// `register` happens once per filter at configuration time; `begin_event`,
/// `load`, and `get` run once per event. Interior mutability lets filters
/// share one cache behind a plain reference.
pub struct ProductCache<K, V> {
    inner: RwLock<Inner<K, V>>,
}

impl<K: PartialEq + Clone, V: Clone> ProductCache<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                slots: Vec::new(),
                event: None,
            }),
        }
    }

    /// Register interest in the product identified by `key`. Equal keys
    /// share one slot, so the fetch runs at most once per event.
    pub fn register(&self, key: K) -> CacheHandle {
        let mut inner = self.inner.write();
        if let Some(index) = inner.slots.iter().position(|slot| slot.key == key) {
            return CacheHandle(index);
        }
        inner.slots.push(Slot { key, value: None });
        CacheHandle(inner.slots.len() - 1)
    }

    /// Number of distinct registered keys
    pub fn len(&self) -> usize {
        self.inner.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().slots.is_empty()
    }

    /// Start a new event: drop every cached value wholesale.
    pub fn begin_event(&self, event: EventId) {
        let mut inner = self.inner.write();
        inner.event = Some(event);
        for slot in &mut inner.slots {
            slot.value = None;
        }
    }

    /// Fill every empty slot for the current event using `fetch`. Returns
    /// false when `event` is not the one announced by `begin_event`;
    /// slots already filled this event are left untouched.
    pub fn load(&self, event: EventId, mut fetch: impl FnMut(&K) -> Option<V>) -> bool {
        let mut inner = self.inner.write();
        if inner.event != Some(event) {
            log::warn!("product cache not prepared for event {}", event);
            return false;
        }
        for slot in &mut inner.slots {
            if slot.value.is_none() {
                slot.value = fetch(&slot.key);
            }
        }
        true
    }

    /// Cached value for `handle`, if the fetch produced one this event
    pub fn get(&self, handle: CacheHandle) -> Option<V> {
        let inner = self.inner.read();
        inner.slots.get(handle.0).and_then(|slot| slot.value.clone())
    }
}

impl<K: PartialEq + Clone, V: Clone> Default for ProductCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
