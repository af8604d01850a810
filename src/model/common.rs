use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

pub type ArtworkId = i64;

pub type EmotionLabel = String;

/// Ordered so payloads and log lines come out deterministic
pub type EmotionSet = BTreeSet<EmotionLabel>;

/// Counter values per emotion; every value is >= 0
pub type EmotionCounts = BTreeMap<EmotionLabel, i64>;

/// Signed net change per emotion. Only non-zero entries are ever stored.
pub type DeltaMap = BTreeMap<EmotionLabel, i64>;

/// Whether an emotion was added to or removed from the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Selected,
    Deselected,
}

impl ToggleOutcome {
    /// Optimistic adjustment applied to the displayed count
    pub fn count_delta(self) -> i64 {
        match self {
            ToggleOutcome::Selected => 1,
            ToggleOutcome::Deselected => -1,
        }
    }
}

/// Parse an artwork id from a path segment, rejecting anything non-numeric
pub fn parse_artwork_id(raw: &str) -> Option<ArtworkId> {
    raw.trim().parse::<ArtworkId>().ok()
}

/// Apply a signed delta to a count, flooring at zero
pub fn clamp_count(current: i64, delta: i64) -> i64 {
    current.saturating_add(delta).max(0)
}

pub fn generate_session_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("session_{}_{}", millis, &random[..9])
}
