use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn staymatch_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("staymatch");
    path
}

const CATALOG: &str = r#"{
  "neighbourhoods": ["Brooklyn", "Manhattan", "Staten Island"],
  "room_types": ["Entire home/apt", "Private room", "Shared room", "Hotel room"],
  "features": ["wifi", "kitchen", "pool", "parking"],
  "listings": [
    {"id": 1, "name": "Sunny Loft", "price": 150, "rating": 4.8, "minimum_nights": 2,
     "neighbourhoods": [0, 1, 0], "room_types": [1, 0, 0, 0], "features": [1, 1, 0, 0],
     "images": ["https://img.example/1.jpg"]},
    {"id": 2, "name": "Garden Room", "price": 70, "rating": 4.5, "minimum_nights": 1,
     "neighbourhoods": [1, 0, 0], "room_types": [0, 1, 0, 0], "features": [1, 0, 0, 1]},
    {"id": 3, "name": "Budget Bunk", "price": 35, "rating": 3.9, "minimum_nights": 1,
     "neighbourhoods": [1, 0, 0], "room_types": [0, 0, 1, 0], "features": [1, 0, 0, 0]},
    {"id": 4, "name": "Harbor View", "price": 110, "rating": 4.2, "minimum_nights": 3,
     "neighbourhoods": [0, 0, 1], "room_types": [1, 0, 0, 0], "features": [1, 1, 0, 1]},
    {"id": 5, "name": "Pool House", "price": 95, "rating": 4.7, "minimum_nights": 1,
     "neighbourhoods": [0, 0, 1], "room_types": [0, 1, 0, 0], "features": [0, 1, 1, 1]}
  ]
}"#;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("listings.json"), CATALOG).unwrap();

    let config_content = format!(
        r#"[catalog]
path = "{}/data/listings.json"

[recommend]
price_tolerance = 20.0
seed = 11
shortlist = 3

[logging]
filter = "warn"
"#,
        root.display()
    );

    let config_path = config_dir.join("staymatch.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_staymatch(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = staymatch_binary();
    let output = Command::new(&binary)
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run staymatch binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_filter_by_neighbourhood() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_staymatch(&config, &["filter", "--neighbourhood", "brooklyn"]);
    assert!(success, "filter failed: {}", stderr);
    assert!(stdout.contains("Garden Room"));
    assert!(stdout.contains("Budget Bunk"));
    assert!(!stdout.contains("Sunny Loft"));
    assert!(stdout.contains("2 of 5 listings match."));
}

#[test]
fn test_filter_staten_alias_and_room_keyword() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_staymatch(
        &config,
        &["filter", "--neighbourhood", "staten", "--room-type", "private"],
    );
    assert!(success, "filter failed: {}", stderr);
    assert!(stdout.contains("Pool House"));
    assert!(stdout.contains("1 of 5 listings match."));
}

#[test]
fn test_filter_no_match() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, success) = run_staymatch(&config, &["filter", "--min-price", "500"]);
    assert!(success);
    assert!(stdout.contains("No matching listings."));
}

#[test]
fn test_recommend_within_budget() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_staymatch(&config, &["recommend", "--max-price", "40"]);
    assert!(success, "recommend failed: {}", stderr);
    assert!(stdout.contains("Room 3: Budget Bunk"));
    assert!(stdout.contains("https://www.airbnb.com/rooms/3"));
    assert!(stdout.contains("chosen by: random pick"));
    assert!(!stdout.contains("note:"));
}

#[test]
fn test_recommend_unsatisfiable_criteria_adds_note() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_staymatch(&config, &["recommend", "--min-price", "1000"]);
    assert!(success, "recommend failed: {}", stderr);
    assert!(stdout.contains("note: no listing matches all criteria"));
}

#[test]
fn test_recommend_by_similarity() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_staymatch(&config, &["recommend", "--rated", "1=5"]);
    assert!(success, "recommend failed: {}", stderr);
    assert!(stdout.contains("Room 4: Harbor View"));
    assert!(stdout.contains("chosen by: similarity (0.816)"));
}

#[test]
fn test_rank_shortlist() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) =
        run_staymatch(&config, &["rank", "--rated", "1=5", "--limit", "2"]);
    assert!(success, "rank failed: {}", stderr);
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.starts_with(' ')).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("1. [0.816] Room 4"));
    assert!(lines[1].starts_with("2. [0.707] Room 3"));
}

#[test]
fn test_rank_requires_ratings() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, success) = run_staymatch(&config, &["rank"]);
    assert!(!success);
    assert!(stderr.contains("--rated"));
}

#[test]
fn test_rejects_out_of_range_rating_flag() {
    let (_tmp, config) = setup_test_env();
    let (_, _, success) = run_staymatch(&config, &["recommend", "--rated", "1=9"]);
    assert!(!success);
}

#[test]
fn test_catalog_flag_without_config_file() {
    let (tmp, _) = setup_test_env();
    let missing = tmp.path().join("config/none.toml");
    let catalog = tmp.path().join("data/listings.json");
    let (stdout, stderr, success) = run_staymatch(
        &missing,
        &["--catalog", catalog.to_str().unwrap(), "filter", "--max-price", "80"],
    );
    assert!(success, "filter failed: {}", stderr);
    assert!(stdout.contains("2 of 5 listings match."));
}

#[test]
fn test_missing_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_staymatch(&tmp.path().join("nope.toml"), &["filter"]);
    assert!(!success);
    assert!(stderr.contains("Config file not found"));
}

#[test]
fn test_session_replay() {
    let (tmp, config) = setup_test_env();
    let events = tmp.path().join("events.jsonl");
    fs::write(
        &events,
        r#"{"type": "name", "user_id": 42, "name": "grace"}
{"type": "greeting", "user_id": 42}
{"type": "criteria", "user_id": 42, "neighbourhood": "staten", "max_price": 100}

{"type": "rate", "user_id": 42, "url": "https://www.airbnb.com/rooms/5", "emoji": "5️⃣"}
{"type": "saved", "user_id": 42}
not even json
"#,
    )
    .unwrap();

    let (stdout, stderr, success) =
        run_staymatch(&config, &["session", "--input", events.to_str().unwrap()]);
    assert!(success, "session failed: {}", stderr);

    let replies: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(replies.len(), 6);

    assert_eq!(replies[0]["type"], "greeting");
    assert!(replies[0]["title"].as_str().unwrap().contains("Grace"));
    assert_eq!(replies[1]["title"], "Hello Grace!");

    let replies = &replies[1..];

    assert_eq!(replies[1]["type"], "recommendation");
    assert_eq!(replies[1]["listing_id"], 5);
    assert_eq!(replies[1]["respects_criteria"], true);
    assert_eq!(replies[1]["title"], "Room 5: Pool House");

    // The only matching listing is now rated, so the whole catalog is used.
    assert_eq!(replies[2]["type"], "recommendation");
    assert_eq!(replies[2]["respects_criteria"], false);
    assert_eq!(replies[2]["strategy"], "similarity");
    assert!(replies[2]["notice"].is_string());

    assert_eq!(replies[3]["type"], "saved");
    assert_eq!(replies[3]["listings"][0]["listing_id"], 5);
    assert_eq!(replies[3]["listings"][0]["rating"], 5);

    assert_eq!(replies[4]["type"], "ignored");
}
