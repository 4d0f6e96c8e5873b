//! Profile storage abstraction for StayMatch.
//!
//! The [`ProfileStore`] trait is the narrow boundary through which the
//! recommendation core reads and writes per-user state, enabling pluggable
//! backends (in-memory today, persistent stores later).
//!
//! Implementations must be `Send + Sync` and must serialize access per user:
//! two calls for the same user id never interleave, calls for different
//! users need no coordination.

pub mod memory;

use anyhow::Result;

use crate::models::{ListingId, ProfileUpdate, UserId, UserProfile};

/// Abstract per-user profile backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get`](ProfileStore::get) | Snapshot of a user's profile, if one exists |
/// | [`merge`](ProfileStore::merge) | Apply a partial update (creating the profile on first use) |
/// | [`record_rating`](ProfileStore::record_rating) | Store one listing rating (creating the profile on first use) |
///
/// Both writers return the profile as it stands right after the write, so
/// callers can act on that snapshot without a second, racy read.
pub trait ProfileStore: Send + Sync {
    /// Retrieve a copy of the user's profile.
    fn get(&self, user_id: UserId) -> Result<Option<UserProfile>>;

    /// Merge newly stated fields into the user's profile.
    fn merge(&self, user_id: UserId, update: &ProfileUpdate) -> Result<UserProfile>;

    /// Store or replace the user's rating for a listing.
    fn record_rating(
        &self,
        user_id: UserId,
        listing_id: ListingId,
        rating: u8,
    ) -> Result<UserProfile>;
}
