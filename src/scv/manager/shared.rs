use super::CardManager;
use crate::clock::Clock;
use crate::error::{Result, ScvError};
use crate::events::{CardEvent, Observers, SubscriptionId};
use crate::model::{Card, CardKey, CardKind, CardPayload};
use crate::selection::Selection;
use crate::store::kv::KeyValueStore;
use crate::store::CardStore;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable, thread-safe handle to one [`CardManager`].
///
/// Every mutation holds the write lock for its whole read-allocate-write sequence, so two
/// concurrent creations can never compute the same `type_id`. Queries share the read
/// lock and never observe a half-applied mutation.
///
/// Events raised by a mutation are delivered after the write lock is released, so a
/// subscriber can query or mutate through any clone of the handle. Each mutation's
/// events arrive in order; events of concurrent mutations may interleave.
pub struct SharedCardManager<S: CardStore, K: KeyValueStore, C: Clock> {
    inner: Arc<RwLock<CardManager<S, K, C>>>,
    observers: Arc<Mutex<Observers>>,
}

impl<S: CardStore, K: KeyValueStore, C: Clock> Clone for SharedCardManager<S, K, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            observers: Arc::clone(&self.observers),
        }
    }
}

impl<S: CardStore, K: KeyValueStore, C: Clock> SharedCardManager<S, K, C> {
    /// Takes over `manager`, including subscribers it already has.
    pub fn new(mut manager: CardManager<S, K, C>) -> Self {
        let observers = std::mem::take(&mut manager.observers);
        manager.deferred = true;
        Self {
            inner: Arc::new(RwLock::new(manager)),
            observers: Arc::new(Mutex::new(observers)),
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, CardManager<S, K, C>>> {
        self.inner
            .read()
            .map_err(|_| ScvError::Store("card manager lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CardManager<S, K, C>>> {
        self.inner
            .write()
            .map_err(|_| ScvError::Store("card manager lock poisoned".to_string()))
    }

    fn observers(&self) -> MutexGuard<'_, Observers> {
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `op` with exclusive access, so several operations apply as one unit. Events
    /// are delivered once `op` returns and the lock is released. Subscribe through the
    /// handle, not through the manager passed to `op`.
    pub fn transaction<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut CardManager<S, K, C>) -> Result<T>,
    {
        let (result, events) = {
            let mut manager = self.write()?;
            let result = op(&mut manager);
            (result, std::mem::take(&mut manager.pending))
        };
        self.deliver(&events);
        result
    }

    fn deliver(&self, events: &[CardEvent]) {
        if events.is_empty() {
            return;
        }
        let callbacks = {
            let mut observers = self.observers();
            for event in events {
                observers.send(event);
            }
            observers.callbacks()
        };
        for event in events {
            for callback in &callbacks {
                callback(event);
            }
        }
    }

    pub fn all_cards(&self) -> Result<Vec<Card>> {
        self.read()?.all_cards()
    }

    pub fn find(&self, key: CardKey) -> Result<Option<Card>> {
        self.read()?.find(key)
    }

    pub fn count(&self, kind: CardKind) -> Result<usize> {
        self.read()?.count(kind)
    }

    pub fn selection(&self) -> Result<Selection> {
        Ok(self.read()?.selection())
    }

    pub fn selected_card(&self) -> Result<Option<Card>> {
        self.read()?.selected_card()
    }

    pub fn display_title(&self, card: &Card) -> Result<String> {
        Ok(self.read()?.display_title(card))
    }

    pub fn create_card(&self, kind: CardKind, payload: Option<CardPayload>) -> Result<Card> {
        self.transaction(|m| m.create_card(kind, payload))
    }

    pub fn remove_card(&self, target: &Card) -> Result<()> {
        self.transaction(|m| m.remove_card(target))
    }

    pub fn remove_cards(&self, targets: &[Card]) -> Result<usize> {
        self.transaction(|m| m.remove_cards(targets))
    }

    pub fn remove_selected(&self) -> Result<Option<Card>> {
        self.transaction(|m| m.remove_selected())
    }

    pub fn select(&self, card: &Card) -> Result<()> {
        self.transaction(|m| m.select(card))
    }

    pub fn rename_card(&self, key: CardKey, name: &str) -> Result<Card> {
        self.transaction(|m| m.rename_card(key, name))
    }

    pub fn update_payload(&self, key: CardKey, payload: CardPayload) -> Result<Card> {
        self.transaction(|m| m.update_payload(key, payload))
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CardEvent) + Send + Sync + 'static,
    {
        self.observers().subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers().unsubscribe(id)
    }

    pub fn events(&self) -> Receiver<CardEvent> {
        self.observers().channel()
    }
}
