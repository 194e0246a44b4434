use crate::model::Card;

/// Orders cards by creation time, oldest first. The sort is stable: cards sharing a
/// timestamp keep the order the store returned them in, which is insertion order.
pub fn sort_by_creation(cards: &mut [Card]) {
    cards.sort_by_key(Card::created_at);
}

pub fn is_sorted_by_creation(cards: &[Card]) -> bool {
    cards
        .windows(2)
        .all(|pair| pair[0].created_at() <= pair[1].created_at())
}
