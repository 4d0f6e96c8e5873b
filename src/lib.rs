//! # StayMatch
//!
//! A conversational short-term-rental recommender.
//!
//! Users state criteria (price, neighbourhood, room type, minimum nights,
//! minimum rating) and rate the listings they are shown. Every answer is one
//! listing: the best cosine match to the user's rating-weighted preference
//! vector among listings that satisfy the criteria, or a random pick while
//! there is no rating history.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────────┐   ┌──────────────────┐
//! │ JSON catalog│──▶│ staymatch-core│◀──│  ProfileStore    │
//! │   (ETL)     │   │ filter + rank │   │  (per-user lock) │
//! └─────────────┘   └──────┬────────┘   └──────────────────┘
//!                          │
//!                ┌─────────┴─────────┐
//!                ▼                   ▼
//!          ┌──────────┐       ┌────────────┐
//!          │   CLI    │       │  Session   │
//!          │ one-shot │       │ JSON lines │
//!          └──────────┘       └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! staymatch recommend --neighbourhood brooklyn --max-price 120
//! staymatch rank --rated 2539=5 --rated 3831=2 --limit 3
//! staymatch session --input events.jsonl
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`catalog`] | Catalog loading from the ETL's JSON output |
//! | [`details`] | Listing display data with failure fallback |
//! | [`display`] | URLs, rating emojis, criteria summaries |
//! | [`logging`] | Tracing subscriber setup |
//! | [`recommend`] | One-shot `recommend`, `filter` and `rank` commands |
//! | [`session`] | Chat event handling and JSON-lines replay |
//!
//! The recommendation core (models, filtering, aggregation, similarity,
//! profile storage) lives in the `staymatch-core` crate.

pub mod catalog;
pub mod config;
pub mod details;
pub mod display;
pub mod logging;
pub mod recommend;
pub mod session;
