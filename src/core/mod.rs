//! # Core Rendering Pipeline
//!
//! Everything that runs before a bubble is drawn. It knows nothing about
//! any specific UI technology.
//!
//! ```text
//!                      ┌──────────────────────────┐
//!                      │         Message          │
//!                      │  (data layer snapshot)   │
//!                      └────────────┬─────────────┘
//!            ┌──────────────────────┼──────────────────────┐
//!            ▼                      ▼                      ▼
//!     ┌────────────┐        ┌──────────────┐        ┌────────────┐
//!     │  segment   │        │   grouping   │        │  gesture   │
//!     │  parse()   │        │  positions,  │        │  reduce(), │
//!     │            │        │  avatars     │        │  springs   │
//!     └─────┬──────┘        └──────┬───────┘        └─────┬──────┘
//!           └──────────┬───────────┘                      ▼
//!                      ▼                           ┌────────────┐
//!               ┌────────────┐                     │ clearance  │
//!               │   layout   │                     └─────┬──────┘
//!               │ (plans)    │                           │
//!               └─────┬──────┘                           │
//!                     └──────────────┬───────────────────┘
//!                                    ▼
//!                          rendering layer (tui)
//! ```
//!
//! ## Modules
//!
//! - [`message`]: `Message` / `Attachment` data model
//! - [`segment`]: message → ordered segments
//! - [`grouping`]: bubble shape and avatar placement per message
//! - [`gesture`]: per-bubble swipe state machine
//! - [`spring`]: return-to-neutral animation, stepped by the caller
//! - [`clearance`]: bubble shift that keeps the revealed label on screen
//! - [`layout`]: combined render plans with a content-hash cache
//! - [`state`]: one conversation's messages, plans and gesture engines
//! - [`config`]: tuning values and their override hierarchy
//! - [`transcript`]: JSON conversation snapshots

pub mod clearance;
pub mod config;
pub mod gesture;
pub mod grouping;
pub mod layout;
pub mod message;
pub mod segment;
pub mod spring;
pub mod state;
pub mod transcript;
