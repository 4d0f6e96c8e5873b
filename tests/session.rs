use std::fs;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use staymatch::catalog::{CatalogSource, JsonCatalog};
use staymatch::details::CatalogDetails;
use staymatch::session::{handle_line, Event, RateEvent, Reply, Session};
use staymatch_core::recommend::Recommender;
use staymatch_core::store::memory::InMemoryProfileStore;
use staymatch_core::store::ProfileStore;
use tempfile::TempDir;

const CATALOG: &str = r#"{
  "neighbourhoods": ["Bronx", "Queens"],
  "room_types": ["Entire home/apt", "Private room"],
  "features": ["wifi", "kitchen", "washer"],
  "listings": [
    {"id": 10, "name": "A", "price": 60, "rating": 4.1, "minimum_nights": 1,
     "neighbourhoods": [1, 0], "room_types": [1, 0], "features": [1, 0, 0]},
    {"id": 11, "name": "B", "price": 65, "rating": 4.3, "minimum_nights": 1,
     "neighbourhoods": [1, 0], "room_types": [0, 1], "features": [0, 1, 0]},
    {"id": 12, "name": "C", "price": 70, "rating": 4.0, "minimum_nights": 2,
     "neighbourhoods": [0, 1], "room_types": [1, 0], "features": [0, 0, 1]},
    {"id": 13, "name": "D", "price": 75, "rating": 3.8, "minimum_nights": 1,
     "neighbourhoods": [0, 1], "room_types": [0, 1], "features": [1, 1, 1]}
  ]
}"#;

async fn session() -> (TempDir, Arc<Session<InMemoryProfileStore>>) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("listings.json");
    fs::write(&path, CATALOG).unwrap();

    let catalog = Arc::new(JsonCatalog::new(&path).load().await.unwrap());
    let session = Session::new(
        Recommender::new(catalog.clone()),
        InMemoryProfileStore::new(),
        Arc::new(CatalogDetails::new(catalog)),
        StdRng::seed_from_u64(2024),
    );
    (tmp, Arc::new(session))
}

#[tokio::test]
async fn test_users_rate_concurrently() {
    let (_tmp, session) = session().await;

    let mut tasks = Vec::new();
    for user_id in 1..=16u64 {
        let session = Arc::clone(&session);
        tasks.push(tokio::spawn(async move {
            for (listing_id, rating) in [(10, 5), (11, 3), (12, 1)] {
                let reply = session
                    .handle(Event::Rate(RateEvent {
                        user_id,
                        listing_id: Some(listing_id),
                        rating: Some(rating),
                        ..RateEvent::default()
                    }))
                    .await
                    .unwrap();
                assert!(matches!(reply, Reply::Recommendation(_)));
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let store = session.store();
    assert_eq!(store.len().unwrap(), 16);
    for user_id in 1..=16u64 {
        let profile = store.get(user_id).unwrap().unwrap();
        assert_eq!(profile.ratings.len(), 3);
        assert_eq!(profile.ratings.get(&10), Some(&5));
    }
}

#[tokio::test]
async fn test_conversation_narrows_then_learns() {
    let (_tmp, session) = session().await;

    let reply = handle_line(
        &*session,
        r#"{"type": "criteria", "user_id": 1, "neighbourhood": "queens", "room_type": "private"}"#,
    )
    .await;
    let first = match reply {
        Reply::Recommendation(r) => r,
        other => panic!("expected a recommendation, got {:?}", other),
    };
    assert_eq!(first.listing_id, 13);
    assert!(first.respects_criteria);
    assert!(first.criteria.contains("Neighbourhood: Queens"));
    assert!(first.criteria.contains("Room type: Private"));

    // Widen the search, then rate: the next pick follows the rated features.
    handle_line(
        &*session,
        r#"{"type": "criteria", "user_id": 1, "neighbourhood": "bronx", "room_type": "home"}"#,
    )
    .await;
    let reply = handle_line(
        &*session,
        r#"{"type": "rate", "user_id": 1, "listing_id": 13, "rating": 5}"#,
    )
    .await;
    let next = match reply {
        Reply::Recommendation(r) => r,
        other => panic!("expected a recommendation, got {:?}", other),
    };
    assert_eq!(next.listing_id, 10);
    assert!(next.respects_criteria);
    assert!(next.score.is_some());
}
