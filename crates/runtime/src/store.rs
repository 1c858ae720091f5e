//! Observable state containers.
//!
//! A [`Store`] always holds a current value. Subscribers are invoked once with
//! that value when they subscribe and again after every write, in subscription
//! order. [`Watch`] projects a store onto a key and reports only when the key
//! changes, which is how consumers react to a single field of a larger state.

use tracing::trace;

pub type SubscriptionId = u64;

type Subscriber<T> = Box<dyn FnMut(&T) + Send>;

pub struct Store<T> {
    name: &'static str,
    value: T,
    version: u64,
    next_subscription: SubscriptionId,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
}

impl<T> Store<T> {
    pub fn new(name: &'static str, initial: T) -> Self {
        Self {
            name,
            value: initial,
            version: 0,
            next_subscription: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Number of writes since creation. Every `set`/`update` bumps it, even
    /// when the new value equals the old one.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.emit();
    }

    /// Mutates the current value in place and emits.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.value);
        self.emit();
        out
    }

    pub fn subscribe(&mut self, mut f: impl FnMut(&T) + Send + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        f(&self.value);
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn emit(&mut self) {
        self.version += 1;
        trace!(
            store = self.name,
            version = self.version,
            subscribers = self.subscribers.len(),
            "store emit"
        );
        for (_, f) in self.subscribers.iter_mut() {
            f(&self.value);
        }
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new("store", T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Distinct-until-changed projection of a store.
///
/// The first `poll` always yields the current key. Later polls yield only when
/// the projected key differs from the last one yielded.
pub struct Watch<T, K> {
    selector: Box<dyn Fn(&T) -> K + Send>,
    last: Option<K>,
    seen_version: Option<u64>,
}

impl<T, K: PartialEq + Clone> Watch<T, K> {
    pub fn new(selector: impl Fn(&T) -> K + Send + 'static) -> Self {
        Self {
            selector: Box::new(selector),
            last: None,
            seen_version: None,
        }
    }

    pub fn poll(&mut self, store: &Store<T>) -> Option<K> {
        if self.seen_version == Some(store.version()) && self.last.is_some() {
            return None;
        }
        self.seen_version = Some(store.version());
        let key = (self.selector)(store.get());
        if self.last.as_ref() == Some(&key) {
            return None;
        }
        self.last = Some(key.clone());
        Some(key)
    }

    /// Last key yielded by `poll`.
    pub fn last(&self) -> Option<&K> {
        self.last.as_ref()
    }

    /// Forget the last key so the next poll yields unconditionally.
    pub fn reset(&mut self) {
        self.last = None;
        self.seen_version = None;
    }
}

impl<T> Store<T> {
    pub fn watch<K: PartialEq + Clone>(
        &self,
        selector: impl Fn(&T) -> K + Send + 'static,
    ) -> Watch<T, K> {
        Watch::new(selector)
    }
}
