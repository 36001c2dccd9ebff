use std::collections::VecDeque;
use std::fmt;

use serde_json::Value;

use super::{ModelError, Shape, WatchSet};

/// Upper bound on updates applied by a single [`Model::merge`] call, the
/// initial update included.
pub const DEFAULT_MAX_CASCADE: usize = 32;

pub type ListenFn<S> = Box<dyn FnMut(&S) + Send>;
pub type RespondFn<S> = Box<dyn FnMut(&S) -> Option<<S as Shape>::Patch> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Callback<S: Shape> {
    Listen(ListenFn<S>),
    Respond(RespondFn<S>),
}

struct Subscriber<S: Shape> {
    id: SubscriptionId,
    watch: WatchSet<S::Field>,
    callback: Callback<S>,
}

/// Observable container for a single state value.
///
/// Subscribers declare the fields they care about and are called
/// synchronously, in subscription order, whenever a merged update carries
/// any of those fields. Responders may hand back a follow-up update, which
/// is queued and applied once the current notification pass finishes.
pub struct Model<S: Shape> {
    state: S,
    subscribers: Vec<Subscriber<S>>,
    next_id: u64,
    max_cascade: usize,
}

impl<S: Shape> Model<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: initial,
            subscribers: Vec::new(),
            next_id: 0,
            max_cascade: DEFAULT_MAX_CASCADE,
        }
    }

    /// Limit how many updates one `merge` may apply before it is treated as a
    /// runaway responder chain. Values below one are raised to one.
    pub fn with_max_cascade(mut self, limit: usize) -> Self {
        self.max_cascade = limit.max(1);
        self
    }

    pub fn read(&self) -> &S {
        &self.state
    }

    pub fn snapshot(&self) -> S {
        self.state.clone()
    }

    pub fn listen<F>(&mut self, watch: impl Into<WatchSet<S::Field>>, callback: F) -> SubscriptionId
    where
        F: FnMut(&S) + Send + 'static,
    {
        self.subscribe(watch.into(), Callback::Listen(Box::new(callback)))
    }

    pub fn respond<F>(&mut self, watch: impl Into<WatchSet<S::Field>>, callback: F) -> SubscriptionId
    where
        F: FnMut(&S) -> Option<S::Patch> + Send + 'static,
    {
        self.subscribe(watch.into(), Callback::Respond(Box::new(callback)))
    }

    /// Returns `false` when `id` was not (or is no longer) registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| subscriber.id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Apply `patch`, notify interested subscribers, then drain any updates
    /// responders produced.
    ///
    /// Every subscriber has run before this returns. On
    /// [`ModelError::ReentrantUpdateOverflow`] the updates applied so far
    /// remain in place.
    pub fn merge(&mut self, patch: S::Patch) -> Result<(), ModelError> {
        let mut pending = VecDeque::from([patch]);
        let mut applied = 0usize;

        while let Some(patch) = pending.pop_front() {
            if applied == self.max_cascade {
                return Err(ModelError::ReentrantUpdateOverflow {
                    limit: self.max_cascade,
                });
            }
            applied += 1;

            let changed = S::changed_fields(&patch);
            self.state.apply(patch);

            let state = &self.state;
            for subscriber in self.subscribers.iter_mut() {
                if !subscriber.watch.intersects(&changed) {
                    continue;
                }
                match &mut subscriber.callback {
                    Callback::Listen(callback) => callback(state),
                    Callback::Respond(callback) => {
                        if let Some(next) = callback(state) {
                            pending.push_back(next);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Merge an update given as a JSON object keyed by field name.
    pub fn merge_json(&mut self, value: Value) -> Result<(), ModelError> {
        let patch = S::parse_patch(value)?;
        self.merge(patch)
    }

    fn subscribe(&mut self, watch: WatchSet<S::Field>, callback: Callback<S>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            watch,
            callback,
        });
        id
    }
}

impl<S: Shape + fmt::Debug> fmt::Debug for Model<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .field("max_cascade", &self.max_cascade)
            .finish()
    }
}
