//! # Selection
//!
//! At most one card is selected at a time. The selection is a [`CardKey`] rather than a
//! card copy, so it never holds stale payload data, and it is persisted under
//! [`SELECTED_CARD_KEY`] so it survives a restart.
//!
//! ## State machine
//!
//! ```text
//! Unselected ──create / select(c)──▶ Selected(c)
//! Selected(c) ──select(d)──────────▶ Selected(d)
//! Selected(c) ──remove(c)──────────▶ Selected(successor) | Unselected
//! Selected(c) ──remove(other)──────▶ Selected(c)
//! ```
//!
//! ## Reselection
//!
//! When the selected card is removed, the replacement is computed from the collection
//! *before* deletion (it needs the removed card's timestamp):
//!
//! 1. the first surviving card created strictly after the removed one, else
//! 2. the most recently created survivor, else
//! 3. nothing.
//!
//! Restoring a persisted reference that no longer matches a card yields no selection.

use crate::error::Result;
use crate::model::{Card, CardKey};
use crate::store::kv::KeyValueStore;

/// Preference key under which the selected card reference is persisted.
pub const SELECTED_CARD_KEY: &str = "SelectedCardID";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(CardKey),
}

impl Selection {
    pub fn key(&self) -> Option<CardKey> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(key) => Some(*key),
        }
    }

    pub fn is_selected(&self, key: CardKey) -> bool {
        self.key() == Some(key)
    }
}

impl From<Option<CardKey>> for Selection {
    fn from(key: Option<CardKey>) -> Self {
        key.map_or(Selection::Unselected, Selection::Selected)
    }
}

/// Picks the card to select after `target` is removed.
///
/// `ordered` is the collection before deletion, sorted by creation time. `target` itself
/// is skipped wherever it appears.
pub fn reselect_after_removal<'a>(ordered: &'a [Card], target: &Card) -> Option<&'a Card> {
    let mut last = None;
    for card in ordered.iter().filter(|card| card.id() != target.id()) {
        if card.created_at() > target.created_at() {
            return Some(card);
        }
        last = Some(card);
    }
    last
}

/// The current selection plus its durable copy.
pub struct SelectionState<K: KeyValueStore> {
    prefs: K,
    current: Selection,
}

impl<K: KeyValueStore> SelectionState<K> {
    /// Starts unselected. Call [`SelectionState::restore`] to pick up a persisted value.
    pub fn new(prefs: K) -> Self {
        Self {
            prefs,
            current: Selection::Unselected,
        }
    }

    pub fn current(&self) -> Selection {
        self.current
    }

    pub fn selected_key(&self) -> Option<CardKey> {
        self.current.key()
    }

    /// Persists, then switches to `selection`. Returns whether anything changed;
    /// re-applying the current selection touches nothing.
    ///
    /// On a persistence error the in-memory selection is left as it was.
    pub fn set(&mut self, selection: Selection) -> Result<bool> {
        if selection == self.current {
            return Ok(false);
        }
        match selection {
            Selection::Selected(key) => self.prefs.set(SELECTED_CARD_KEY, &key.to_string())?,
            Selection::Unselected => self.prefs.remove(SELECTED_CARD_KEY)?,
        }
        self.current = selection;
        Ok(true)
    }

    /// Switches in memory only. Used when the durable write failed after the card store
    /// had already committed, so memory must follow the store.
    pub(crate) fn set_unpersisted(&mut self, selection: Selection) -> bool {
        let changed = selection != self.current;
        self.current = selection;
        changed
    }

    /// Reads the persisted reference and selects it if `cards` still contains it.
    /// A missing, unreadable, unparsable or stale reference leaves the selection empty.
    pub fn restore(&mut self, cards: &[Card]) -> Result<Selection> {
        self.current = Selection::Unselected;

        let raw = match self.prefs.get(SELECTED_CARD_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(self.current),
            Err(e) => {
                log::warn!("Could not read persisted selection: {}", e);
                return Ok(self.current);
            }
        };
        let key: CardKey = match raw.parse() {
            Ok(key) => key,
            Err(e) => {
                log::warn!("Ignoring persisted selection {:?}: {}", raw, e);
                return Ok(self.current);
            }
        };

        if cards.iter().any(|card| card.key() == key) {
            self.current = Selection::Selected(key);
        } else {
            log::debug!("Persisted selection {} no longer exists", key);
        }
        Ok(self.current)
    }

    pub fn prefs(&self) -> &K {
        &self.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut K {
        &mut self.prefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardKind, CardPayload};
    use crate::store::kv::MemoryKeyValueStore;
    use chrono::{TimeZone, Utc};

    fn card(kind: CardKind, type_id: u32, secs: i64) -> Card {
        Card::new(
            type_id,
            Utc.timestamp_opt(secs, 0).unwrap(),
            CardPayload::default_for(kind),
        )
    }

    fn abc() -> Vec<Card> {
        vec![
            card(CardKind::Search, 1, 0),
            card(CardKind::Search, 2, 1),
            card(CardKind::Sutta, 1, 2),
        ]
    }

    #[test]
    fn middle_removal_selects_successor() {
        let cards = abc();
        let next = reselect_after_removal(&cards, &cards[1]).unwrap();
        assert_eq!(next.key(), cards[2].key());
    }

    #[test]
    fn first_removal_selects_second() {
        let cards = abc();
        let next = reselect_after_removal(&cards, &cards[0]).unwrap();
        assert_eq!(next.key(), cards[1].key());
    }

    #[test]
    fn tail_removal_falls_back_to_newest_survivor() {
        let cards = abc();
        let next = reselect_after_removal(&cards, &cards[2]).unwrap();
        assert_eq!(next.key(), cards[1].key());
    }

    #[test]
    fn last_card_removal_selects_nothing() {
        let cards = vec![card(CardKind::Search, 1, 0)];
        assert!(reselect_after_removal(&cards, &cards[0]).is_none());
    }

    #[test]
    fn equal_timestamps_are_not_successors() {
        // Successor means strictly later; equal timestamps fall through to the tail rule.
        let cards = vec![
            card(CardKind::Search, 1, 0),
            card(CardKind::Search, 2, 5),
            card(CardKind::Search, 3, 5),
        ];
        let next = reselect_after_removal(&cards, &cards[1]).unwrap();
        assert_eq!(next.type_id(), 3);

        let next = reselect_after_removal(&cards, &cards[2]).unwrap();
        assert_eq!(next.type_id(), 2);
    }

    #[test]
    fn set_is_idempotent_and_persists() {
        let mut state = SelectionState::new(MemoryKeyValueStore::new());
        let key = CardKey::new(CardKind::Sutta, 1);

        assert!(state.set(Selection::Selected(key)).unwrap());
        assert!(!state.set(Selection::Selected(key)).unwrap());
        assert_eq!(
            state.prefs().get(SELECTED_CARD_KEY).unwrap().as_deref(),
            Some("sutta:1")
        );

        assert!(state.set(Selection::Unselected).unwrap());
        assert_eq!(state.prefs().get(SELECTED_CARD_KEY).unwrap(), None);
    }

    #[test]
    fn failed_persist_keeps_previous_selection() {
        let mut state = SelectionState::new(MemoryKeyValueStore::new());
        let first = CardKey::new(CardKind::Search, 1);
        state.set(Selection::Selected(first)).unwrap();

        state.prefs_mut().set_simulate_write_error(true);
        let err = state
            .set(Selection::Selected(CardKey::new(CardKind::Search, 2)))
            .unwrap_err();
        assert!(err.is_persistence_failure());
        assert_eq!(state.selected_key(), Some(first));
    }

    #[test]
    fn restore_finds_existing_card() {
        let cards = abc();
        let mut prefs = MemoryKeyValueStore::new();
        prefs.set(SELECTED_CARD_KEY, "search:2").unwrap();

        let mut state = SelectionState::new(prefs);
        let restored = state.restore(&cards).unwrap();
        assert_eq!(restored, Selection::Selected(cards[1].key()));
    }

    #[test]
    fn restore_with_stale_or_garbage_reference_is_unselected() {
        let cards = abc();
        for raw in ["search:9", "not a key", ""] {
            let mut prefs = MemoryKeyValueStore::new();
            prefs.set(SELECTED_CARD_KEY, raw).unwrap();
            let mut state = SelectionState::new(prefs);
            assert_eq!(state.restore(&cards).unwrap(), Selection::Unselected);
        }
    }
}
