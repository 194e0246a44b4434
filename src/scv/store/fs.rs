use super::{write_atomic, CardStore};
use crate::error::{Result, ScvError};
use crate::model::Card;
use std::fs;
use std::path::PathBuf;

const CARDS_FILENAME: &str = "cards.json";

/// File-backed card storage: one JSON array of records in `<root>/cards.json`.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn cards_path(&self) -> PathBuf {
        self.root.join(CARDS_FILENAME)
    }

    fn load(&self) -> Result<Vec<Card>> {
        let path = self.cards_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        log::trace!("FileStore: reading {:?}", path);
        let content = fs::read_to_string(&path).map_err(ScvError::Io)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let cards: Vec<Card> = serde_json::from_str(&content).map_err(ScvError::Serialization)?;
        Ok(cards)
    }

    fn save(&self, operation: &'static str, cards: &[Card]) -> Result<()> {
        let path = self.cards_path();
        log::trace!("FileStore: writing {} cards to {:?}", cards.len(), path);
        let content = serde_json::to_string_pretty(cards).map_err(ScvError::Serialization)?;
        write_atomic(&self.root, &path, &content, operation)
    }
}

impl CardStore for FileStore {
    fn insert(&mut self, card: &Card) -> Result<()> {
        let mut cards = self.load()?;
        if cards.iter().any(|c| c.id() == card.id()) {
            return Err(ScvError::Store(format!(
                "Card record {} already exists",
                card.id()
            )));
        }
        cards.push(card.clone());
        self.save("insert", &cards)
    }

    fn update(&mut self, card: &Card) -> Result<()> {
        let mut cards = self.load()?;
        let slot = cards
            .iter_mut()
            .find(|c| c.id() == card.id())
            .ok_or(ScvError::CardNotFound(card.key()))?;
        *slot = card.clone();
        self.save("update", &cards)
    }

    fn delete(&mut self, card: &Card) -> Result<()> {
        let mut cards = self.load()?;
        let before = cards.len();
        cards.retain(|c| c.id() != card.id());
        if cards.len() == before {
            return Err(ScvError::CardNotFound(card.key()));
        }
        self.save("delete", &cards)
    }

    fn fetch_all(&self) -> Result<Vec<Card>> {
        self.load()
    }
}
