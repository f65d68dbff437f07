//! # Eventkeep Architecture
//!
//! Eventkeep is the durable store behind a calendar app and its home-screen
//! widgets. The app writes; the widget renderer, running in another process,
//! only reads. Both see the same storage namespace.
//!
//! The store's one promise is that the app never fails to start because of
//! storage. Damaged data is recovered from a one-generation backup when
//! possible and dropped when not, and every such decision is logged and
//! reported rather than thrown.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (main.rs, or an app's UI)                           │
//! │  - Calls cache queries and the four mutators, nothing else  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Event Cache (cache.rs)                                     │
//! │  - Authoritative in-memory Vec<Event>                       │
//! │  - add / update / delete / toggle, each followed by a save  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence Gateway (persistence.rs)                       │
//! │  - load: decode, plausibility check, backup fallback, heal  │
//! │  - save: backup, write, partial-save retry, widget refresh  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!            ┌─────────────────┼──────────────────┐
//!            ▼                 ▼                  ▼
//!       codec.rs          validity.rs         backup.rs
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Slot Storage (store/)                                      │
//! │  - SlotStore trait: named byte blobs, atomic replace        │
//! │  - FsSlotStore (production), MemSlotStore (testing)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Testing Strategy
//!
//! Every layer is generic over [`store::SlotStore`] and
//! [`notify::TimelineRefresher`], so the recovery paths are tested against
//! `MemSlotStore` with injected read/write failures and a closure standing in
//! for the widget. End-to-end restarts use `FsSlotStore` in a temp dir.
//!
//! ## Module Overview
//!
//! - [`cache`]: The event cache, mutators and queries
//! - [`persistence`]: Load/save orchestration and recovery reports
//! - [`backup`]: The shadow copy of the last save
//! - [`validity`]: Plausibility heuristics
//! - [`codec`]: JSON wire form
//! - [`store`]: Slot storage abstraction and implementations
//! - [`notify`]: Widget timeline refresh signal
//! - [`model`]: The `Event` record
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod backup;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod persistence;
pub mod store;
pub mod validity;
