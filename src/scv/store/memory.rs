use super::CardStore;
use crate::error::{Result, ScvError};
use crate::model::Card;

/// In-memory card storage for testing.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    cards: Vec<Card>,
    simulate_write_error: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail until switched off again.
    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.simulate_write_error = simulate;
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn check_writable(&self, operation: &'static str) -> Result<()> {
        if self.simulate_write_error {
            return Err(ScvError::persistence(operation, "Simulated write error"));
        }
        Ok(())
    }

    fn position(&self, card: &Card) -> Option<usize> {
        self.cards.iter().position(|c| c.id() == card.id())
    }
}

impl CardStore for InMemoryStore {
    fn insert(&mut self, card: &Card) -> Result<()> {
        self.check_writable("insert")?;
        if self.position(card).is_some() {
            return Err(ScvError::Store(format!(
                "Card record {} already exists",
                card.id()
            )));
        }
        self.cards.push(card.clone());
        Ok(())
    }

    fn update(&mut self, card: &Card) -> Result<()> {
        self.check_writable("update")?;
        let idx = self
            .position(card)
            .ok_or(ScvError::CardNotFound(card.key()))?;
        self.cards[idx] = card.clone();
        Ok(())
    }

    fn delete(&mut self, card: &Card) -> Result<()> {
        self.check_writable("delete")?;
        let idx = self
            .position(card)
            .ok_or(ScvError::CardNotFound(card.key()))?;
        self.cards.remove(idx);
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<Card>> {
        Ok(self.cards.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardKind, CardPayload};
    use chrono::{TimeZone, Utc};

    fn card(type_id: u32) -> Card {
        Card::new(
            type_id,
            Utc.timestamp_opt(0, 0).unwrap(),
            CardPayload::default_for(CardKind::Search),
        )
    }

    #[test]
    fn keeps_insertion_order() {
        let mut store = InMemoryStore::new();
        for id in [3, 1, 2] {
            store.insert(&card(id)).unwrap();
        }
        let ids: Vec<u32> = store
            .fetch_all()
            .unwrap()
            .iter()
            .map(Card::type_id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn rejects_duplicate_records() {
        let mut store = InMemoryStore::new();
        let c = card(1);
        store.insert(&c).unwrap();
        assert!(matches!(store.insert(&c), Err(ScvError::Store(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_missing_record_is_not_found() {
        let mut store = InMemoryStore::new();
        let err = store.delete(&card(1)).unwrap_err();
        assert!(matches!(err, ScvError::CardNotFound(_)));
    }

    #[test]
    fn simulated_failure_leaves_records_untouched() {
        let mut store = InMemoryStore::new();
        let kept = card(1);
        store.insert(&kept).unwrap();
        store.set_simulate_write_error(true);

        assert!(store.insert(&card(2)).unwrap_err().is_persistence_failure());
        assert!(store.delete(&kept).unwrap_err().is_persistence_failure());
        assert_eq!(store.fetch_all().unwrap(), vec![kept]);
    }
}
