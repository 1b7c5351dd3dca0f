//! Control bridge: surfaces control-rate values to observers outside the
//! render context.
//!
//! A [`ControlEvent`] is created by [`crate::Synth::bridge`]. On every control
//! tick the synth sends one [`Notification`] per binding, in tick order, to
//! each subscriber and to each attached [`EventReceiver`] queue.
//!
//! Subscribers run synchronously on the render thread. A slow callback delays
//! the audio buffer being rendered; anything beyond copying the value
//! somewhere should go through [`crate::Synth::event_queue`] instead, which
//! hands notifications to another thread over a lock-free queue.
//!
//! Subscribing and unsubscribing never block the render thread: it reads the
//! subscriber list through an [`ArcSwap`] and never frees a replaced list.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use arc_swap::ArcSwap;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer};

use crate::control::ControlId;

/// Identifies one binding within a synth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// One control tick's output of a bridged control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Notification {
    pub binding: BindingId,
    pub value: f32,
    pub triggered: bool,
    /// Index of the control tick that produced this value.
    pub tick: u64,
}

type Callback = Arc<dyn Fn(Notification) + Send + Sync>;
type Entries = Vec<(SubscriptionId, Callback)>;

struct Subscribers {
    list: ArcSwap<Entries>,
    /// Replaced lists a render-side guard may still hold. The last reference
    /// is always released here, so removed callbacks are never dropped on the
    /// render thread.
    retired: Mutex<Vec<Arc<Entries>>>,
    next_id: AtomicU64,
}

impl Subscribers {
    fn retire(&self, old: Arc<Entries>) {
        let mut retired = self.retired.lock().unwrap_or_else(PoisonError::into_inner);
        retired.retain(|list| Arc::strong_count(list) > 1);
        retired.push(old);
    }
}

/// Subscribable handle to a bridged control. Clones share the same
/// subscriber list and may be moved to other threads.
#[derive(Clone)]
pub struct ControlEvent {
    binding: BindingId,
    instance: u64,
    subscribers: Arc<Subscribers>,
}

impl ControlEvent {
    pub(crate) fn new(binding: BindingId, instance: u64) -> Self {
        Self {
            binding,
            instance,
            subscribers: Arc::new(Subscribers {
                list: ArcSwap::from_pointee(Vec::new()),
                retired: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn binding(&self) -> BindingId {
        self.binding
    }

    pub(crate) fn instance(&self) -> u64 {
        self.instance
    }

    /// Register `callback` for every future notification of this binding.
    /// It is called on the render thread and must return quickly.
    pub fn subscribe(
        &self,
        callback: impl Fn(Notification) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.subscribers.next_id.fetch_add(1, Ordering::Relaxed));
        let callback: Callback = Arc::new(callback);
        let old = self.subscribers.list.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push((id, Arc::clone(&callback)));
            next
        });
        self.subscribers.retire(old);
        id
    }

    /// Returns false if `id` was not subscribed. The callback is dropped on
    /// this thread, by this or a later `subscribe`/`unsubscribe` call once the
    /// render thread has let go of it.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut removed = false;
        let old = self.subscribers.list.rcu(|current| {
            let mut next = Vec::clone(current);
            next.retain(|(sub, _)| *sub != id);
            removed = next.len() != current.len();
            next
        });
        self.subscribers.retire(old);
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.list.load().len()
    }

    pub(crate) fn notify(&self, notification: Notification) {
        let subscribers = self.subscribers.list.load();
        for (_, callback) in subscribers.iter() {
            callback(notification);
        }
    }
}

/// Render-side state of one bridged control.
pub(crate) struct Binding {
    pub(crate) control: ControlId,
    pub(crate) event: ControlEvent,
    #[cfg(feature = "rtrb")]
    pub(crate) queues: Vec<Producer<Notification>>,
}

impl Binding {
    pub(crate) fn new(control: ControlId, event: ControlEvent) -> Self {
        Self {
            control,
            event,
            #[cfg(feature = "rtrb")]
            queues: Vec::new(),
        }
    }
}

/// Receiving end of a bounded notification queue. Notifications that do not
/// fit are dropped and counted in [`crate::synth::Diagnostics::events_dropped`];
/// the render thread never waits for the reader.
#[cfg(feature = "rtrb")]
pub struct EventReceiver {
    pub(crate) rx: Consumer<Notification>,
    pub(crate) binding: BindingId,
}

#[cfg(feature = "rtrb")]
impl EventReceiver {
    pub fn binding(&self) -> BindingId {
        self.binding
    }

    pub fn pop(&mut self) -> Option<Notification> {
        self.rx.pop().ok()
    }

    /// Everything queued so far, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = Notification> + '_ {
        std::iter::from_fn(move || self.rx.pop().ok())
    }

    pub fn len(&self) -> usize {
        self.rx.slots()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
