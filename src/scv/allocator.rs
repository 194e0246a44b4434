//! Per-kind identifier allocation.
//!
//! Each kind numbers its cards `1, 2, 3, ...`. The next id is always one past the
//! largest id currently in use for that kind, so ids freed by deletion are never handed
//! out again while a larger id survives, and gaps are never backfilled.

use crate::model::{Card, CardKind};

/// Largest `type_id` among cards of `kind`, or 0 when there are none.
pub fn largest_type_id<'a, I>(cards: I, kind: CardKind) -> u32
where
    I: IntoIterator<Item = &'a Card>,
{
    cards
        .into_iter()
        .filter(|card| card.kind() == kind)
        .map(Card::type_id)
        .max()
        .unwrap_or(0)
}

/// The `type_id` a new card of `kind` receives given the current collection, or `None`
/// once the kind's id space is used up.
pub fn next_type_id<'a, I>(cards: I, kind: CardKind) -> Option<u32>
where
    I: IntoIterator<Item = &'a Card>,
{
    largest_type_id(cards, kind).checked_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardPayload;
    use chrono::{TimeZone, Utc};

    fn card(kind: CardKind, type_id: u32) -> Card {
        Card::new(
            type_id,
            Utc.timestamp_opt(i64::from(type_id), 0).unwrap(),
            CardPayload::default_for(kind),
        )
    }

    #[test]
    fn empty_collection_starts_at_one() {
        let cards: Vec<Card> = Vec::new();
        assert_eq!(next_type_id(&cards, CardKind::Search), Some(1));
        assert_eq!(next_type_id(&cards, CardKind::Sutta), Some(1));
    }

    #[test]
    fn kinds_have_separate_namespaces() {
        let cards = vec![
            card(CardKind::Search, 1),
            card(CardKind::Search, 2),
            card(CardKind::Sutta, 1),
        ];
        assert_eq!(next_type_id(&cards, CardKind::Search), Some(3));
        assert_eq!(next_type_id(&cards, CardKind::Sutta), Some(2));
    }

    #[test]
    fn gaps_are_not_backfilled() {
        let cards = vec![card(CardKind::Sutta, 1), card(CardKind::Sutta, 7)];
        assert_eq!(next_type_id(&cards, CardKind::Sutta), Some(8));
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let cards = vec![
            card(CardKind::Search, 5),
            card(CardKind::Search, 2),
            card(CardKind::Search, 9),
        ];
        assert_eq!(largest_type_id(cards.iter().rev(), CardKind::Search), 9);
        assert_eq!(next_type_id(&cards, CardKind::Search), Some(10));
    }

    #[test]
    fn exhausted_id_space_yields_none() {
        let cards = vec![card(CardKind::Search, u32::MAX), card(CardKind::Sutta, 3)];
        assert_eq!(next_type_id(&cards, CardKind::Search), None);
        assert_eq!(next_type_id(&cards, CardKind::Sutta), Some(4));
    }
}
