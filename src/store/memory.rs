use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::{
    clamp_count, ArtworkId, EmotionCounts, EmotionLabel, EmotionSet, Submission, VisitorKey,
};
use crate::store::traits::{CountStore, SubmissionStore};

/// Process-local vote store. Each counter update happens under one lock, so
/// concurrent deltas are never lost.
#[derive(Debug, Default)]
pub struct MemoryStore {
    counts: Mutex<HashMap<(ArtworkId, EmotionLabel), i64>>,
    submissions: Mutex<HashMap<(ArtworkId, String), Submission>>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating calls served so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }
}

#[async_trait::async_trait]
impl CountStore for MemoryStore {
    async fn get_counts(&self, artwork_id: ArtworkId) -> Result<EmotionCounts> {
        let counts = self.counts.lock();
        Ok(counts
            .iter()
            .filter(|((id, _), _)| *id == artwork_id)
            .map(|((_, emotion), count)| (emotion.clone(), *count))
            .collect())
    }

    async fn adjust_count(&self, artwork_id: ArtworkId, emotion: &str, delta: i64) -> Result<i64> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let mut counts = self.counts.lock();
        let count = counts.entry((artwork_id, emotion.to_string())).or_insert(0);
        *count = clamp_count(*count, delta);
        Ok(*count)
    }
}

#[async_trait::async_trait]
impl SubmissionStore for MemoryStore {
    async fn get_submission(
        &self,
        artwork_id: ArtworkId,
        visitor: &VisitorKey,
    ) -> Result<Option<Submission>> {
        let submissions = self.submissions.lock();
        Ok(submissions.get(&(artwork_id, visitor.as_key())).cloned())
    }

    async fn put_submission(
        &self,
        artwork_id: ArtworkId,
        visitor: &VisitorKey,
        emotions: &EmotionSet,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let submission = Submission::new(artwork_id, visitor.clone(), emotions.clone());
        self.submissions
            .lock()
            .insert((artwork_id, visitor.as_key()), submission);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_adjust_count_clamps_at_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.adjust_count(1, "Calm", -1).await.unwrap(), 0);
        assert_eq!(store.adjust_count(1, "Calm", 1).await.unwrap(), 1);
        assert_eq!(store.adjust_count(1, "Calm", -3).await.unwrap(), 0);

        let counts = store.get_counts(1).await.unwrap();
        assert_eq!(counts.get("Calm"), Some(&0));
    }

    #[tokio::test]
    async fn test_counts_are_scoped_per_artwork() {
        let store = MemoryStore::new();
        store.adjust_count(1, "Calm", 1).await.unwrap();
        store.adjust_count(2, "Warm", 2).await.unwrap();

        let counts = store.get_counts(1).await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["Calm"], 1);
        assert!(store.get_counts(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_upsert_overwrites() {
        let store = MemoryStore::new();
        let visitor = VisitorKey::new("10.0.0.1", "s1");
        let first: EmotionSet = ["Calm".to_string()].into_iter().collect();
        let second: EmotionSet = ["Warm".to_string()].into_iter().collect();

        assert!(store.get_submission(4, &visitor).await.unwrap().is_none());
        store.put_submission(4, &visitor, &first).await.unwrap();
        store.put_submission(4, &visitor, &second).await.unwrap();

        let stored = store.get_submission(4, &visitor).await.unwrap().unwrap();
        assert_eq!(stored.selected_emotions, second);
        assert_eq!(store.submission_count(), 1);

        let other = VisitorKey::new("10.0.0.1", "s2");
        assert!(store.get_submission(4, &other).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deltas_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.adjust_count(8, "Romantic", 1).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get_counts(8).await.unwrap()["Romantic"], 50);
        assert_eq!(store.write_count(), 50);
    }
}
