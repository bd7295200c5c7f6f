use std::fmt;

/// An event that can be routed by a discriminant.
pub trait Routed {
    type Kind: Copy + Eq + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Disposer handle returned by [`Dispatcher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// Synchronous, single-threaded publish/subscribe table keyed by event kind.
///
/// Listeners for a kind run in subscription order. A listener removed with
/// [`Dispatcher::unsubscribe`] never runs again.
pub struct Dispatcher<E: Routed> {
    next_id: u64,
    listeners: Vec<(E::Kind, Subscription, Listener<E>)>,
}

impl<E: Routed> Dispatcher<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, kind: E::Kind, listener: impl FnMut(&E) + 'static) -> Subscription {
        let handle = Subscription(self.next_id);
        self.next_id += 1;
        self.listeners.push((kind, handle, Box::new(listener)));
        handle
    }

    /// Remove a listener. Returns `false` if the handle was already removed.
    pub fn unsubscribe(&mut self, handle: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(_, h, _)| *h != handle);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        let kind = event.kind();
        for (k, _, listener) in self.listeners.iter_mut() {
            if *k == kind {
                listener(event);
            }
        }
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.iter().filter(|(k, _, _)| *k == kind).count()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E: Routed> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Routed> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<E::Kind> = self.listeners.iter().map(|(k, _, _)| *k).collect();
        f.debug_struct("Dispatcher")
            .field("listeners", &kinds)
            .finish()
    }
}
