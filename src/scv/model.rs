use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The closed set of card categories. Each kind owns its own `type_id` namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Search,
    Sutta,
}

impl CardKind {
    pub const ALL: [CardKind; 2] = [CardKind::Search, CardKind::Sutta];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardKind::Search => "search",
            CardKind::Sutta => "sutta",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CardKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown card kind: {}", s))
    }
}

/// Kind-specific card content. The variant decides the card's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CardPayload {
    Search {
        query: String,
        /// Raw response of the last lookup for `query`, kept so the view can render
        /// without refetching.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        results: Option<String>,
    },
    Sutta {
        reference: String,
    },
}

impl CardPayload {
    /// Empty payload for a freshly created card of `kind`.
    pub fn default_for(kind: CardKind) -> Self {
        match kind {
            CardKind::Search => CardPayload::Search {
                query: String::new(),
                results: None,
            },
            CardKind::Sutta => CardPayload::Sutta {
                reference: String::new(),
            },
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        CardPayload::Search {
            query: query.into(),
            results: None,
        }
    }

    pub fn sutta(reference: impl Into<String>) -> Self {
        CardPayload::Sutta {
            reference: reference.into(),
        }
    }

    pub fn kind(&self) -> CardKind {
        match self {
            CardPayload::Search { .. } => CardKind::Search,
            CardPayload::Sutta { .. } => CardKind::Sutta,
        }
    }

    /// The user-entered text of the payload: the query or the reference.
    pub fn text(&self) -> &str {
        match self {
            CardPayload::Search { query, .. } => query,
            CardPayload::Sutta { reference } => reference,
        }
    }

    /// Replaces the user-entered text. A changed search query drops cached results.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        match self {
            CardPayload::Search { query, results } => {
                if *query != text {
                    *results = None;
                }
                *query = text;
            }
            CardPayload::Sutta { reference } => *reference = text,
        }
    }
}

/// Reference to a card by kind and per-kind id, written `kind:type_id` (e.g. `search:2`).
///
/// Unique across the collection because `type_id` is unique within a kind. This is also
/// the payload persisted for the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardKey {
    pub kind: CardKind,
    pub type_id: u32,
}

impl CardKey {
    pub fn new(kind: CardKind, type_id: u32) -> Self {
        Self { kind, type_id }
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.type_id)
    }
}

impl FromStr for CardKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("Invalid card reference: {}", s))?;
        let kind = CardKind::from_str(kind)?;
        let type_id: u32 = id
            .parse()
            .map_err(|_| format!("Invalid card reference: {}", s))?;
        if type_id == 0 {
            return Err(format!("Invalid card reference: {}", s));
        }
        Ok(CardKey { kind, type_id })
    }
}

/// One unit in the browser. Built only by the manager; `kind`, `type_id` and
/// `created_at` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: Uuid,
    type_id: u32,
    created_at: DateTime<Utc>,
    #[serde(default)]
    name: String,
    #[serde(flatten)]
    payload: CardPayload,
}

impl Card {
    pub(crate) fn new(type_id: u32, created_at: DateTime<Utc>, payload: CardPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            type_id,
            created_at,
            name: String::new(),
            payload,
        }
    }

    /// Storage identifier, distinct from the per-kind `type_id`.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> CardKind {
        self.payload.kind()
    }

    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    pub fn key(&self) -> CardKey {
        CardKey::new(self.kind(), self.type_id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn payload(&self) -> &CardPayload {
        &self.payload
    }

    /// The explicit user-set name, if it is not blank.
    pub fn custom_name(&self) -> Option<&str> {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn payload_mut(&mut self) -> &mut CardPayload {
        &mut self.payload
    }
}
