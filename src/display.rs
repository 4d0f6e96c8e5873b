//! Presentation helpers shared by the CLI and the chat session.
//!
//! Listing URLs, keycap rating emojis, text normalization of free-text slots,
//! and the criteria summary shown under every recommendation.

use staymatch_core::models::{ListingId, UserProfile};

/// Public listing page prefix.
pub const LISTING_URL_BASE: &str = "https://www.airbnb.com/rooms/";

/// Keycap emojis offered as rating reactions, indexed by rating.
pub const RATING_EMOJIS: [&str; 6] = [
    "0\u{fe0f}\u{20e3}",
    "1\u{fe0f}\u{20e3}",
    "2\u{fe0f}\u{20e3}",
    "3\u{fe0f}\u{20e3}",
    "4\u{fe0f}\u{20e3}",
    "5\u{fe0f}\u{20e3}",
];

/// Public page of a listing; negative ids have no page.
pub fn listing_url(id: ListingId) -> String {
    if id < 0 {
        return String::new();
    }
    format!("{}{}", LISTING_URL_BASE, id)
}

/// Listing id from the last path segment of a listing URL.
pub fn listing_id_from_url(url: &str) -> Option<ListingId> {
    url.trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

/// Rating carried by a keycap emoji reaction.
pub fn rating_from_emoji(emoji: &str) -> Option<u8> {
    RATING_EMOJIS
        .iter()
        .position(|e| *e == emoji)
        .map(|idx| idx as u8)
}

/// Capitalize the first letter of every word and lowercase the rest.
///
/// Word boundaries are any non-alphabetic character, so `"entire home/apt"`
/// becomes `"Entire Home/Apt"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Format a number without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Summary of the criteria currently stored for a user.
///
/// The mean-price line is only filled when no price bound is set, since
/// bounds take precedence over it during filtering.
pub fn criteria_summary(profile: &UserProfile) -> String {
    let number = |v: Option<f64>| v.map(format_number).unwrap_or_default();
    let mean_price = if profile.min_price.is_none() && profile.max_price.is_none() {
        number(profile.price)
    } else {
        String::new()
    };

    [
        format!(
            "Neighbourhood: {}",
            profile.neighbourhood.as_deref().unwrap_or("")
        ),
        format!("Room type: {}", profile.room_type.as_deref().unwrap_or("")),
        format!(
            "Minimum nights: {}",
            profile
                .minimum_nights
                .map(|n| n.to_string())
                .unwrap_or_default()
        ),
        format!("Minimum price: {}", number(profile.min_price)),
        format!("Maximum price: {}", number(profile.max_price)),
        format!("Mean price: {}", mean_price),
        format!("Min rating: {}", number(profile.rating)),
    ]
    .join("\n")
}
