//! Kind labels for computed card titles.
//!
//! A card without a custom name is titled `<kind label> <type_id>`, e.g. `Search 2`. The
//! title is computed on every call and never stored, so switching label tables renames
//! every unnamed card at once.

use crate::error::{Result, ScvError};
use crate::model::{Card, CardKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

static BUILTIN_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("card.type.search", "Search"),
        ("card.type.sutta", "Sutta"),
    ])
});

/// Supplies the human-readable label of each card kind.
pub trait LabelProvider {
    fn kind_label(&self, kind: CardKind) -> String;
}

pub fn label_key(kind: CardKind) -> String {
    format!("card.type.{}", kind)
}

/// Title shown for `card`: its custom name, or the kind label followed by its `type_id`.
pub fn display_title(card: &Card, labels: &dyn LabelProvider) -> String {
    match card.custom_name() {
        Some(name) => name.to_string(),
        None => format!("{} {}", labels.kind_label(card.kind()), card.type_id()),
    }
}

/// Label lookup backed by a flat `key -> text` table, falling back to the built-in
/// English labels for keys the table lacks.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    entries: HashMap<String, String>,
}

impl LabelTable {
    /// Built-in English labels only.
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parses a JSON object of `"card.type.<kind>": "<label>"` pairs.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, String> =
            serde_json::from_str(json).map_err(ScvError::Serialization)?;
        Ok(Self { entries })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(ScvError::Io)?;
        Self::from_json(&content)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|label| !label.trim().is_empty())
            .or_else(|| BUILTIN_LABELS.get(key).copied())
    }
}

impl LabelProvider for LabelTable {
    fn kind_label(&self, kind: CardKind) -> String {
        self.get(&label_key(kind))
            .map(str::to_string)
            .unwrap_or_else(|| kind.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardPayload;
    use chrono::{TimeZone, Utc};

    fn card(kind: CardKind, type_id: u32) -> Card {
        Card::new(
            type_id,
            Utc.timestamp_opt(0, 0).unwrap(),
            CardPayload::default_for(kind),
        )
    }

    #[test]
    fn unnamed_card_uses_kind_label_and_id() {
        let labels = LabelTable::builtin();
        assert_eq!(display_title(&card(CardKind::Search, 2), &labels), "Search 2");
        assert_eq!(display_title(&card(CardKind::Sutta, 1), &labels), "Sutta 1");
    }

    #[test]
    fn custom_name_wins_unless_blank() {
        let labels = LabelTable::builtin();
        let mut c = card(CardKind::Search, 1);
        c.set_name("Roots of suffering");
        assert_eq!(display_title(&c, &labels), "Roots of suffering");
        c.set_name("  ");
        assert_eq!(display_title(&c, &labels), "Search 1");
    }

    #[test]
    fn table_overrides_and_falls_back() {
        let labels = LabelTable::from_json(r#"{"card.type.search": "Suche"}"#).unwrap();
        assert_eq!(labels.kind_label(CardKind::Search), "Suche");
        assert_eq!(labels.kind_label(CardKind::Sutta), "Sutta");
    }

    #[test]
    fn relabelling_changes_titles_without_touching_cards() {
        let c = card(CardKind::Sutta, 3);
        let german = LabelTable::from_entries([("card.type.sutta", "Lehrrede")]);
        assert_eq!(display_title(&c, &german), "Lehrrede 3");
        assert_eq!(display_title(&c, &LabelTable::builtin()), "Sutta 3");
    }

    #[test]
    fn malformed_table_is_an_error() {
        assert!(matches!(
            LabelTable::from_json("[1, 2]"),
            Err(ScvError::Serialization(_))
        ));
    }
}
