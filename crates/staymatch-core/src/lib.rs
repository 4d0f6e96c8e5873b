//! # StayMatch Core
//!
//! The recommendation engine behind StayMatch: listing and profile models,
//! criteria filtering, preference aggregation, similarity ranking, and the
//! profile store abstraction.
//!
//! This crate performs no network or filesystem I/O. Catalog loading, the
//! chat transport and persistence live in the `staymatch` application
//! crate or behind the [`store::ProfileStore`] trait.
//!
//! ## Data Flow
//!
//! ```text
//! ProfileStore ──▶ Recommender ──▶ filter (narrows Catalog)
//!                      │
//!                      ├──▶ profile (preference vector from ratings)
//!                      ├──▶ similarity (rank candidates)
//!                      ▼
//!               Recommendation { listing_id, respects_criteria }
//! ```

pub mod filter;
pub mod models;
pub mod profile;
pub mod recommend;
pub mod similarity;
pub mod store;
