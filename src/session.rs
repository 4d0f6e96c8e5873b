//! Conversational session handling.
//!
//! A chat front end turns every user message or reaction into an [`Event`];
//! [`Session::handle`] applies it to the user's stored profile and produces a
//! serializable [`Reply`]. The session is transport-agnostic: `staymatch
//! session` drives it from JSON lines, a bot adapter would drive it from its
//! own message loop.
//!
//! # Event Flow
//!
//! ```text
//! criteria ──▶ merge into profile ──▶ recommend ──▶ Reply::Recommendation
//! rate     ──▶ record rating      ──▶ recommend ──▶ Reply::Recommendation
//! saved    ──▶ read profile       ──────────────▶ Reply::Saved
//! name     ──▶ merge name         ──────────────▶ Reply::Greeting
//! greeting ──▶ read profile       ──────────────▶ Reply::Greeting
//! help     ─────────────────────────────────────▶ Reply::Help
//! ```
//!
//! Recommendations use the session's single random source, so a seeded
//! session replays identically.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use staymatch_core::models::{ListingId, ProfileUpdate, UserId, UserProfile};
use staymatch_core::recommend::{Recommender, Strategy};
use staymatch_core::store::memory::InMemoryProfileStore;
use staymatch_core::store::ProfileStore;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::catalog::load_catalog;
use crate::config::Config;
use crate::details::{fetch_or_empty, CatalogDetails, ListingDetailsSource};
use crate::display::{
    criteria_summary, listing_id_from_url, listing_url, rating_from_emoji, title_case,
};
use crate::recommend::{build_recommender, make_rng};

const FALLBACK_NOTICE: &str =
    "No listing matches all of your criteria, so this one was picked from the whole catalog.";

/// Sample messages listed by the help reply.
pub const HELP_EXAMPLES: [&str; 4] = [
    "Give me a room cheaper than 150",
    "A private room in Brooklyn for 3 nights",
    "My name is John",
    "Hello",
];

/// One inbound chat interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Newly stated search criteria.
    Criteria(CriteriaEvent),
    /// A rating reaction on a previously recommended listing.
    Rate(RateEvent),
    /// Request for the user's rated listings.
    Saved { user_id: UserId },
    /// The user introduced themselves.
    Name { user_id: UserId, name: String },
    /// The user said hello.
    Greeting { user_id: UserId },
    /// The user asked what they can say.
    Help { user_id: UserId },
}

impl Event {
    pub fn user_id(&self) -> UserId {
        match self {
            Event::Criteria(e) => e.user_id,
            Event::Rate(e) => e.user_id,
            Event::Saved { user_id }
            | Event::Name { user_id, .. }
            | Event::Greeting { user_id }
            | Event::Help { user_id } => *user_id,
        }
    }
}

/// Stated criteria. Only `user_id` is required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CriteriaEvent {
    pub user_id: UserId,
    pub name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub price: Option<f64>,
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
    pub minimum_nights: Option<u32>,
    pub rating: Option<f64>,
}

impl CriteriaEvent {
    /// Profile update with free-text slots title-cased.
    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name.as_deref().map(title_case),
            min_price: self.min_price,
            max_price: self.max_price,
            price: self.price,
            neighbourhood: self.neighbourhood.as_deref().map(title_case),
            room_type: self.room_type.as_deref().map(title_case),
            minimum_nights: self.minimum_nights,
            rating: self.rating,
            ..ProfileUpdate::default()
        }
    }
}

/// A rating, given either directly or as a keycap emoji, for a listing
/// identified either by id or by its page URL.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RateEvent {
    pub user_id: UserId,
    pub listing_id: Option<ListingId>,
    pub url: Option<String>,
    pub rating: Option<u8>,
    pub emoji: Option<String>,
}

impl RateEvent {
    fn listing(&self) -> Option<ListingId> {
        self.listing_id
            .or_else(|| self.url.as_deref().and_then(listing_id_from_url))
    }

    fn score(&self) -> Option<u8> {
        self.rating
            .or_else(|| self.emoji.as_deref().and_then(rating_from_emoji))
    }
}

/// One outbound reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Recommendation(RecommendationReply),
    Saved(SavedReply),
    Greeting {
        user_id: UserId,
        title: String,
        description: String,
    },
    Help {
        user_id: UserId,
        title: String,
        examples: Vec<String>,
    },
    Ignored {
        user_id: UserId,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReply {
    pub user_id: UserId,
    pub listing_id: ListingId,
    pub title: String,
    pub url: String,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub strategy: Strategy,
    pub score: Option<f64>,
    pub respects_criteria: bool,
    pub notice: Option<String>,
    pub criteria: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedReply {
    pub user_id: UserId,
    pub listings: Vec<SavedListing>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedListing {
    pub listing_id: ListingId,
    pub name: String,
    pub url: String,
    pub rating: u8,
}

/// Event handler bound to one catalog, one profile store and one random
/// source.
pub struct Session<S: ProfileStore> {
    recommender: Recommender,
    store: S,
    details: Arc<dyn ListingDetailsSource>,
    rng: Mutex<StdRng>,
}

impl<S: ProfileStore> Session<S> {
    pub fn new(
        recommender: Recommender,
        store: S,
        details: Arc<dyn ListingDetailsSource>,
        rng: StdRng,
    ) -> Self {
        Self {
            recommender,
            store,
            details,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply one event and build the reply.
    ///
    /// Errors are reserved for store failures and invalid ratings; events
    /// missing the information they need are answered with
    /// [`Reply::Ignored`].
    pub async fn handle(&self, event: Event) -> Result<Reply> {
        let user_id = event.user_id();
        debug!(user_id, ?event, "handling event");

        match event {
            Event::Criteria(criteria) => {
                let profile = self.store.merge(user_id, &criteria.to_update())?;
                self.recommend_for(&profile).await
            }
            Event::Rate(rate) => {
                let Some(listing_id) = rate.listing() else {
                    return Ok(ignored(user_id, "rating does not name a listing"));
                };
                let Some(score) = rate.score() else {
                    return Ok(ignored(user_id, "rating is missing or not a 0-5 keycap"));
                };
                let profile = self.store.record_rating(user_id, listing_id, score)?;
                info!(user_id, listing_id, rating = score, "rating recorded");
                self.recommend_for(&profile).await
            }
            Event::Saved { .. } => {
                let profile = self
                    .store
                    .get(user_id)?
                    .unwrap_or_else(|| UserProfile::new(user_id));
                Ok(Reply::Saved(self.saved(&profile)))
            }
            Event::Name { name, .. } => {
                let name = title_case(name.trim());
                let update = ProfileUpdate {
                    name: Some(name.clone()),
                    ..ProfileUpdate::default()
                };
                self.store.merge(user_id, &update)?;
                Ok(Reply::Greeting {
                    user_id,
                    title: format!("Nice to meet you, {}!", name),
                    description: "Tell me where and how you'd like to stay and I'll find \
                                  a room for you."
                        .to_string(),
                })
            }
            Event::Greeting { .. } => {
                let name = self.store.get(user_id)?.and_then(|p| p.name);
                let title = match name {
                    Some(name) => format!("Hello {}!", name),
                    None => "Hello!".to_string(),
                };
                Ok(Reply::Greeting {
                    user_id,
                    title,
                    description: "How are you?".to_string(),
                })
            }
            Event::Help { .. } => Ok(Reply::Help {
                user_id,
                title: "Here are some messages you can send me".to_string(),
                examples: HELP_EXAMPLES.iter().map(|e| e.to_string()).collect(),
            }),
        }
    }

    async fn recommend_for(&self, profile: &UserProfile) -> Result<Reply> {
        let recommendation = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| anyhow!("session random source poisoned"))?;
            self.recommender.recommend(profile, &mut *rng)?
        };
        let listing_id = recommendation.listing_id;
        let details = fetch_or_empty(self.details.as_ref(), listing_id).await;
        let listing = self.recommender.catalog().get(listing_id);

        let name = if details.title.is_empty() {
            listing.and_then(|l| l.name.clone()).unwrap_or_default()
        } else {
            details.title.clone()
        };

        Ok(Reply::Recommendation(RecommendationReply {
            user_id: profile.user_id,
            listing_id,
            title: format!("Room {}: {}", listing_id, name),
            url: details.url,
            image: details.images.into_iter().next(),
            price: listing.map(|l| l.price),
            rating: details.rating,
            strategy: recommendation.strategy,
            score: recommendation.score,
            respects_criteria: recommendation.respects_criteria,
            notice: (!recommendation.respects_criteria).then(|| FALLBACK_NOTICE.to_string()),
            criteria: criteria_summary(profile),
        }))
    }

    /// Rated listings, best rated first. Ratings for listings that left the
    /// catalog are skipped.
    fn saved(&self, profile: &UserProfile) -> SavedReply {
        let catalog = self.recommender.catalog();
        let mut listings: Vec<SavedListing> = profile
            .ratings
            .iter()
            .filter_map(|(&listing_id, &rating)| {
                let listing = catalog.get(listing_id)?;
                Some(SavedListing {
                    listing_id,
                    name: listing.name.clone().unwrap_or_default(),
                    url: listing_url(listing_id),
                    rating,
                })
            })
            .collect();
        // Stable: equal ratings keep ascending id order.
        listings.sort_by(|a, b| b.rating.cmp(&a.rating));
        SavedReply {
            user_id: profile.user_id,
            listings,
        }
    }
}

fn ignored(user_id: UserId, reason: &str) -> Reply {
    Reply::Ignored {
        user_id,
        reason: reason.to_string(),
    }
}

/// Parse and handle one JSON line. Unparseable lines and failed events are
/// answered with [`Reply::Ignored`] so one bad message never ends a session.
pub async fn handle_line<S: ProfileStore>(session: &Session<S>, line: &str) -> Reply {
    let event: Event = match serde_json::from_str(line) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "invalid session event");
            return ignored(0, &format!("invalid event: {}", e));
        }
    };
    let user_id = event.user_id();
    match session.handle(event).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(user_id, error = %e, "event failed");
            ignored(user_id, &format!("{:#}", e))
        }
    }
}

async fn replay<R, S>(session: &Session<S>, reader: R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    S: ProfileStore,
{
    let mut lines = reader.lines();
    let mut handled = 0usize;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = handle_line(session, line).await;
        println!("{}", serde_json::to_string(&reply)?);
        handled += 1;
    }
    Ok(handled)
}

/// Run a session over JSON-lines events from `input` (stdin when `None`),
/// printing one JSON reply per event.
pub async fn run_session(config: &Config, input: Option<PathBuf>, seed: Option<u64>) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let recommender = build_recommender(config, catalog.clone());
    let details: Arc<dyn ListingDetailsSource> = Arc::new(CatalogDetails::new(catalog));
    let rng = make_rng(seed.or(config.recommend.seed));
    let session = Session::new(recommender, InMemoryProfileStore::new(), details, rng);

    let handled = match input {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open event file: {}", path.display()))?;
            replay(&session, BufReader::new(file)).await?
        }
        None => replay(&session, BufReader::new(tokio::io::stdin())).await?,
    };

    info!(events = handled, users = session.store().len()?, "session finished");
    Ok(())
}
