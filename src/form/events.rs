use super::field::FieldId;

/// Handle returned by `EventBus::subscribe`; disposing it removes exactly
/// the listener it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// What to run when a field's value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    /// Index into the dependent-selection edges.
    Dependency(usize),
    /// Index into the visibility rules.
    Visibility(usize),
    ClearError,
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    next_id: u64,
    entries: Vec<(Subscription, FieldId, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, field: FieldId, listener: Listener) -> Subscription {
        self.next_id += 1;
        let subscription = Subscription(self.next_id);
        self.entries.push((subscription, field, listener));
        subscription
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _, _)| *id != subscription);
        before != self.entries.len()
    }

    pub fn dispose(&mut self, subscriptions: impl IntoIterator<Item = Subscription>) {
        for subscription in subscriptions {
            self.unsubscribe(subscription);
        }
    }

    /// Listeners for `field`, in subscription order.
    pub fn listeners_for(&self, field: &FieldId) -> Vec<Listener> {
        self.entries
            .iter()
            .filter(|(_, target, _)| target == field)
            .map(|(_, _, listener)| *listener)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
