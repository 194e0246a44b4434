//! # scv Architecture
//!
//! scv is the card core of a note-card browser. Each card holds either a text search or
//! a sutta lookup. This crate owns the part with real invariants: creating cards with
//! stable per-kind ids, ordering them, and keeping track of which card is selected. The
//! list/detail UI, the remote lookup client and localized strings are collaborators
//! that sit outside it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints cards, handles exit codes       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Manager (manager/)                                         │
//! │  - Create/remove protocol, selection, change events         │
//! │  - Generic over store, preferences and clock                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Policies (allocator.rs, ordering.rs, selection.rs)         │
//! │  - Pure functions over a card slice                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - CardStore trait: FileStore, InMemoryStore                │
//! │  - KeyValueStore trait for the persisted selection          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifiers
//!
//! A card has two ids. The storage id (a UUID) is what the store matches records by.
//! The `type_id` is the per-kind sequence number users see (`Search 2`, `Sutta 1`); with
//! the kind it forms a [`model::CardKey`] such as `search:2`, which is also what the
//! selection persists.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Everything below the CLI takes Rust values and returns `Result`s. It never prints,
//! never exits, and reads time only through the injected [`clock::Clock`], so tests
//! run against in-memory stores and a manual clock.
//!
//! ## Module Overview
//!
//! - [`manager`]: `CardManager` and its thread-safe handle
//! - [`model`]: `Card`, `CardKind`, `CardPayload`, `CardKey`
//! - [`allocator`]: per-kind id allocation
//! - [`ordering`]: creation-time ordering
//! - [`selection`]: selection state, persistence and reselection policy
//! - [`store`]: card and preference storage
//! - [`events`]: change notification
//! - [`labels`]: kind labels and computed titles
//! - [`clock`]: time sources
//! - [`config`]: configuration
//! - [`error`]: error types

pub mod allocator;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod labels;
pub mod manager;
pub mod model;
pub mod ordering;
pub mod selection;
pub mod store;

pub use manager::{CardManager, SharedCardManager};
