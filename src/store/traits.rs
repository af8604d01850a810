use crate::model::{ArtworkId, EmotionCounts, EmotionSet, Submission, VisitorKey};
use anyhow::Result;

/// Persistent emotion counters keyed by (artwork, emotion)
#[async_trait::async_trait]
pub trait CountStore: Send + Sync {
    /// All counters recorded for an artwork
    async fn get_counts(&self, artwork_id: ArtworkId) -> Result<EmotionCounts>;
    /// Apply a signed delta as one atomic read-modify-write, clamping at zero.
    /// Creates the counter when missing. Returns the new count.
    async fn adjust_count(&self, artwork_id: ArtworkId, emotion: &str, delta: i64) -> Result<i64>;
}

/// Persistent per-visitor submissions keyed by (artwork, visitor)
#[async_trait::async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn get_submission(
        &self,
        artwork_id: ArtworkId,
        visitor: &VisitorKey,
    ) -> Result<Option<Submission>>;
    /// Upsert; replaces any earlier submission for the same key
    async fn put_submission(
        &self,
        artwork_id: ArtworkId,
        visitor: &VisitorKey,
        emotions: &EmotionSet,
    ) -> Result<()>;
}

pub trait VoteStore: CountStore + SubmissionStore + Send + Sync {}
impl<T: CountStore + SubmissionStore + Send + Sync> VoteStore for T {}
