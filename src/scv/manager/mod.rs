//! # Card Manager
//!
//! [`CardManager`] is the single owner of the card lifecycle. It is the only place cards
//! are created or destroyed, and it keeps the selection consistent with the store.
//!
//! ## Creation protocol
//!
//! 1. read the full collection from the [`CardStore`]
//! 2. allocate the next `type_id` for the kind (see [`crate::allocator`])
//! 3. build the card with the injected [`Clock`]'s current time
//! 4. insert it into the store
//! 5. select it
//!
//! ## Removal protocol
//!
//! If the target is selected, the replacement is computed from the collection *before*
//! deletion (see [`crate::selection::reselect_after_removal`]). The record is then deleted
//! and the replacement selected.
//!
//! ## Failure policy
//!
//! A failed store write aborts the operation before the selection is touched and before
//! any event is published. The in-memory view always matches the last successful write.
//! If the store write succeeded but persisting the selection reference failed, the
//! in-memory selection still follows the store and the failure is logged.
//!
//! ## Concurrency
//!
//! Mutators take `&mut self`, so a manager has exactly one writer at a time. Use
//! [`SharedCardManager`] to share one manager across threads. A shared manager queues
//! its events and the handle delivers them after releasing the lock, so subscribers may
//! read through the handle.

use crate::allocator;
use crate::clock::Clock;
use crate::error::{Result, ScvError};
use crate::events::{CardEvent, Observers, SubscriptionId};
use crate::labels::{self, LabelProvider, LabelTable};
use crate::model::{Card, CardKey, CardKind, CardPayload};
use crate::ordering::sort_by_creation;
use crate::selection::{reselect_after_removal, Selection, SelectionState};
use crate::store::kv::KeyValueStore;
use crate::store::CardStore;
use std::sync::mpsc::Receiver;

mod shared;

pub use shared::SharedCardManager;

pub struct CardManager<S: CardStore, K: KeyValueStore, C: Clock> {
    store: S,
    selection: SelectionState<K>,
    clock: C,
    labels: Box<dyn LabelProvider + Send + Sync>,
    observers: Observers,
    /// Set when owned by a [`SharedCardManager`]; events then wait in `pending`.
    deferred: bool,
    pending: Vec<CardEvent>,
}

impl<S: CardStore, K: KeyValueStore, C: Clock> CardManager<S, K, C> {
    /// A manager with no selection and the built-in labels.
    pub fn new(store: S, prefs: K, clock: C) -> Self {
        Self {
            store,
            selection: SelectionState::new(prefs),
            clock,
            labels: Box::new(LabelTable::builtin()),
            observers: Observers::new(),
            deferred: false,
            pending: Vec::new(),
        }
    }

    /// A manager with the persisted selection restored.
    pub fn open(store: S, prefs: K, clock: C) -> Result<Self> {
        let mut manager = Self::new(store, prefs, clock);
        manager.restore()?;
        Ok(manager)
    }

    pub fn with_labels<L>(mut self, labels: L) -> Self
    where
        L: LabelProvider + Send + Sync + 'static,
    {
        self.labels = Box::new(labels);
        self
    }

    // --- Queries ---

    /// Every card, oldest first; equal timestamps keep insertion order.
    pub fn all_cards(&self) -> Result<Vec<Card>> {
        let mut cards = self.store.fetch_all()?;
        sort_by_creation(&mut cards);
        Ok(cards)
    }

    pub fn cards_of_kind(&self, kind: CardKind) -> Result<Vec<Card>> {
        let mut cards = self.all_cards()?;
        cards.retain(|card| card.kind() == kind);
        Ok(cards)
    }

    pub fn find(&self, key: CardKey) -> Result<Option<Card>> {
        Ok(self
            .store
            .fetch_all()?
            .into_iter()
            .find(|card| card.key() == key))
    }

    pub fn get(&self, key: CardKey) -> Result<Card> {
        self.find(key)?.ok_or(ScvError::CardNotFound(key))
    }

    pub fn count(&self, kind: CardKind) -> Result<usize> {
        Ok(self
            .store
            .fetch_all()?
            .iter()
            .filter(|card| card.kind() == kind)
            .count())
    }

    pub fn total_count(&self) -> Result<usize> {
        Ok(self.store.fetch_all()?.len())
    }

    /// Largest `type_id` in use for `kind`, 0 when there are no cards of that kind.
    pub fn largest_type_id(&self, kind: CardKind) -> Result<u32> {
        Ok(allocator::largest_type_id(&self.store.fetch_all()?, kind))
    }

    pub fn selection(&self) -> Selection {
        self.selection.current()
    }

    /// The selected card, or `None` when nothing is selected or the selected record has
    /// disappeared from the store.
    pub fn selected_card(&self) -> Result<Option<Card>> {
        match self.selection.selected_key() {
            Some(key) => self.find(key),
            None => Ok(None),
        }
    }

    pub fn display_title(&self, card: &Card) -> String {
        labels::display_title(card, self.labels.as_ref())
    }

    // --- Lifecycle ---

    /// Creates a card of `kind` and selects it. `payload` defaults to the kind's empty
    /// payload and must match `kind` when given.
    pub fn create_card(&mut self, kind: CardKind, payload: Option<CardPayload>) -> Result<Card> {
        self.create_named_card(kind, "", payload)
    }

    pub fn create_named_card(
        &mut self,
        kind: CardKind,
        name: &str,
        payload: Option<CardPayload>,
    ) -> Result<Card> {
        let payload = match payload {
            None => CardPayload::default_for(kind),
            Some(p) if p.kind() == kind => p,
            Some(p) => {
                return Err(ScvError::KindMismatch {
                    expected: kind,
                    payload: p.kind(),
                })
            }
        };

        let cards = self.store.fetch_all()?;
        let type_id =
            allocator::next_type_id(&cards, kind).ok_or(ScvError::IdSpaceExhausted(kind))?;
        let mut card = Card::new(type_id, self.clock.now(), payload);
        card.set_name(name);

        self.store.insert(&card)?;
        log::debug!("Created card {} ({})", card.key(), card.id());
        self.publish(CardEvent::Created(card.clone()));
        self.follow_store(Selection::Selected(card.key()));
        Ok(card)
    }

    /// Deletes `target`. If it was selected, selects its successor in creation order,
    /// else the newest survivor, else nothing.
    pub fn remove_card(&mut self, target: &Card) -> Result<()> {
        let cards = self.all_cards()?;
        let target = cards
            .iter()
            .find(|card| card.id() == target.id())
            .cloned()
            .ok_or(ScvError::CardNotFound(target.key()))?;

        let replacement = if self.selection.current().is_selected(target.key()) {
            Some(Selection::from(
                reselect_after_removal(&cards, &target).map(Card::key),
            ))
        } else {
            None
        };

        self.store.delete(&target)?;
        log::debug!("Removed card {} ({})", target.key(), target.id());
        self.publish(CardEvent::Removed(target));

        if let Some(next) = replacement {
            self.follow_store(next);
        }
        Ok(())
    }

    /// Removes each target in turn, reselecting after every single removal. Stops at the
    /// first failure; earlier removals stay done. Returns how many cards were removed.
    pub fn remove_cards(&mut self, targets: &[Card]) -> Result<usize> {
        for (removed, target) in targets.iter().enumerate() {
            if let Err(e) = self.remove_card(target) {
                log::debug!("remove_cards stopped after {} removals: {}", removed, e);
                return Err(e);
            }
        }
        Ok(targets.len())
    }

    /// Removes the selected card, if any, and returns it.
    pub fn remove_selected(&mut self) -> Result<Option<Card>> {
        let Some(card) = self.selected_card()? else {
            return Ok(None);
        };
        self.remove_card(&card)?;
        Ok(Some(card))
    }

    // --- Selection ---

    /// Selects `card`. Selecting the already selected card changes nothing and publishes
    /// nothing.
    pub fn select(&mut self, card: &Card) -> Result<()> {
        self.select_key(card.key())
    }

    pub fn select_key(&mut self, key: CardKey) -> Result<()> {
        if self.find(key)?.is_none() {
            return Err(ScvError::CardNotFound(key));
        }
        if self.selection.set(Selection::Selected(key))? {
            log::debug!("Selected card {}", key);
            self.publish(CardEvent::SelectionChanged(Some(key)));
        }
        Ok(())
    }

    /// Re-reads the persisted selection. A reference to a card that no longer exists
    /// yields no selection.
    pub fn restore(&mut self) -> Result<Option<Card>> {
        let before = self.selection.current();
        let cards = self.all_cards()?;
        let restored = self.selection.restore(&cards)?;
        if restored != before {
            self.publish(CardEvent::SelectionChanged(restored.key()));
        }
        Ok(restored
            .key()
            .and_then(|key| cards.into_iter().find(|card| card.key() == key)))
    }

    // --- Payload updates ---

    /// Sets the custom name. A blank name reverts to the computed title.
    pub fn rename_card(&mut self, key: CardKey, name: &str) -> Result<Card> {
        self.modify(key, |card| {
            card.set_name(name);
            Ok(())
        })
    }

    /// Replaces the payload. The new payload must be of the card's kind.
    pub fn update_payload(&mut self, key: CardKey, payload: CardPayload) -> Result<Card> {
        self.modify(key, |card| {
            if payload.kind() != card.kind() {
                return Err(ScvError::KindMismatch {
                    expected: card.kind(),
                    payload: payload.kind(),
                });
            }
            *card.payload_mut() = payload;
            Ok(())
        })
    }

    /// Sets the query of a search card or the reference of a sutta card.
    pub fn set_payload_text(&mut self, key: CardKey, text: &str) -> Result<Card> {
        self.modify(key, |card| {
            card.payload_mut().set_text(text);
            Ok(())
        })
    }

    /// Stores the raw response of the last lookup on a search card.
    pub fn cache_search_results(&mut self, key: CardKey, raw: String) -> Result<Card> {
        self.modify(key, |card| match card.payload_mut() {
            CardPayload::Search { results, .. } => {
                *results = Some(raw);
                Ok(())
            }
            other => Err(ScvError::KindMismatch {
                expected: CardKind::Search,
                payload: other.kind(),
            }),
        })
    }

    pub fn clear_search_results(&mut self, key: CardKey) -> Result<Card> {
        self.modify(key, |card| {
            if let CardPayload::Search { results, .. } = card.payload_mut() {
                *results = None;
            }
            Ok(())
        })
    }

    // --- Notification ---

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&CardEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn events(&mut self) -> Receiver<CardEvent> {
        self.observers.channel()
    }

    // --- Collaborators ---

    /// Direct store access, bypassing the manager's bookkeeping.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn prefs(&self) -> &K {
        self.selection.prefs()
    }

    pub fn prefs_mut(&mut self) -> &mut K {
        self.selection.prefs_mut()
    }

    fn modify<F>(&mut self, key: CardKey, change: F) -> Result<Card>
    where
        F: FnOnce(&mut Card) -> Result<()>,
    {
        let mut card = self.get(key)?;
        change(&mut card)?;
        self.store.update(&card)?;
        log::debug!("Updated card {}", key);
        self.publish(CardEvent::Updated(card.clone()));
        Ok(card)
    }

    fn publish(&mut self, event: CardEvent) {
        if self.deferred {
            self.pending.push(event);
        } else {
            self.observers.notify(&event);
        }
    }

    /// Moves the selection after a committed store mutation.
    fn follow_store(&mut self, selection: Selection) {
        let changed = match self.selection.set(selection) {
            Ok(changed) => changed,
            Err(e) => {
                log::warn!("Selection {:?} was not persisted: {}", selection.key(), e);
                self.selection.set_unpersisted(selection)
            }
        };
        if changed {
            self.publish(CardEvent::SelectionChanged(selection.key()));
        }
    }
}
