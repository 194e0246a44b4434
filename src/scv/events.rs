//! Change notification.
//!
//! The manager publishes a [`CardEvent`] after every mutation that reached durable
//! storage. Nothing is published for a failed operation. Listeners either register a
//! callback or take an `mpsc` receiver.

use crate::model::{Card, CardKey};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardEvent {
    Created(Card),
    Updated(Card),
    Removed(Card),
    SelectionChanged(Option<CardKey>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub(crate) type Callback = Arc<dyn Fn(&CardEvent) + Send + Sync>;

#[derive(Default)]
pub struct Observers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
    channels: Vec<Sender<CardEvent>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&CardEvent) + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.callbacks.push((id, Arc::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    /// A receiver fed with every future event. Dropping it ends the subscription.
    pub fn channel(&mut self) -> Receiver<CardEvent> {
        let (tx, rx) = mpsc::channel();
        self.channels.push(tx);
        rx
    }

    pub fn len(&self) -> usize {
        self.callbacks.len() + self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify(&mut self, event: &CardEvent) {
        for (_, callback) in &self.callbacks {
            callback(event);
        }
        self.send(event);
    }

    /// Feeds `event` to the channels only.
    pub(crate) fn send(&mut self, event: &CardEvent) {
        self.channels.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// The registered callbacks, for calling once no lock is held.
    pub(crate) fn callbacks(&self) -> Vec<Callback> {
        self.callbacks
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("callbacks", &self.callbacks.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardKind;
    use std::sync::{Arc, Mutex};

    fn selection_event(id: u32) -> CardEvent {
        CardEvent::SelectionChanged(Some(CardKey::new(CardKind::Search, id)))
    }

    #[test]
    fn callbacks_see_events_until_unsubscribed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut observers = Observers::new();
        let sink = Arc::clone(&seen);
        let id = observers.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        observers.notify(&selection_event(1));
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.notify(&selection_event(2));

        assert_eq!(*seen.lock().unwrap(), vec![selection_event(1)]);
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut observers = Observers::new();
        let rx = observers.channel();
        let dropped = observers.channel();
        drop(dropped);

        observers.notify(&CardEvent::SelectionChanged(None));
        assert_eq!(rx.try_recv().unwrap(), CardEvent::SelectionChanged(None));
        assert_eq!(observers.len(), 1);

        drop(rx);
        observers.notify(&CardEvent::SelectionChanged(None));
        assert!(observers.is_empty());
    }
}
