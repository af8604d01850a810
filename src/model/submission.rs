use crate::model::{ArtworkId, EmotionSet, VisitorKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A visitor's last known tag state for one artwork
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub artwork_id: ArtworkId,
    pub visitor: VisitorKey,
    pub selected_emotions: EmotionSet,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(artwork_id: ArtworkId, visitor: VisitorKey, selected_emotions: EmotionSet) -> Self {
        Self {
            artwork_id,
            visitor,
            selected_emotions,
            updated_at: Utc::now(),
        }
    }
}
