use log::warn;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use crate::model::{
    generate_session_id, ArtworkId, EmotionSet, SessionPaintingState, SessionSnapshot,
};

#[derive(Debug)]
struct SessionInner {
    session_id: String,
    paintings: BTreeMap<ArtworkId, SessionPaintingState>,
}

/// Browser-tab scoped selection state, one entry per artwork opened in the
/// session. Never talks to the vote store.
#[derive(Debug)]
pub struct SessionStateCache {
    inner: Mutex<SessionInner>,
}

impl Default for SessionStateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateCache {
    /// Create an empty cache with a fresh session id
    pub fn new() -> Self {
        Self::with_session_id(generate_session_id())
    }

    pub fn with_session_id(session_id: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                session_id: session_id.into(),
                paintings: BTreeMap::new(),
            }),
        }
    }

    /// Rebuild a cache from a JSON snapshot. A corrupt snapshot starts a new session.
    ///
    /// Pending deltas are recomputed from baseline and current rather than
    /// taken from the snapshot.
    pub fn restore(json: &str) -> Self {
        match serde_json::from_str::<SessionSnapshot>(json) {
            Ok(mut snapshot) => {
                for state in snapshot.paintings.values_mut() {
                    state.refresh_deltas();
                }
                Self {
                    inner: Mutex::new(SessionInner {
                        session_id: snapshot.session_id,
                        paintings: snapshot.paintings,
                    }),
                }
            }
            Err(e) => {
                warn!("Discarding unreadable session snapshot: {}", e);
                Self::new()
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock();
        SessionSnapshot {
            session_id: inner.session_id.clone(),
            paintings: inner.paintings.clone(),
        }
    }

    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }

    pub fn session_id(&self) -> String {
        self.inner.lock().session_id.clone()
    }

    /// State for an artwork, created with empty sets on first access
    pub fn get_or_init(&self, artwork_id: ArtworkId) -> SessionPaintingState {
        let mut inner = self.inner.lock();
        inner.paintings.entry(artwork_id).or_default().clone()
    }

    pub fn get(&self, artwork_id: ArtworkId) -> Option<SessionPaintingState> {
        self.inner.lock().paintings.get(&artwork_id).cloned()
    }

    /// Overwrite the current selection. The baseline only changes when supplied.
    pub fn set_selections(
        &self,
        artwork_id: ArtworkId,
        current: EmotionSet,
        baseline: Option<EmotionSet>,
    ) {
        self.update(artwork_id, |state| {
            if let Some(baseline) = baseline {
                state.set_baseline(baseline);
            }
            state.set_current(current);
        });
    }

    /// Run `f` against the artwork's state under the cache lock
    pub fn update<R>(
        &self,
        artwork_id: ArtworkId,
        f: impl FnOnce(&mut SessionPaintingState) -> R,
    ) -> R {
        let mut inner = self.inner.lock();
        f(inner.paintings.entry(artwork_id).or_default())
    }

    /// Like [`update`](Self::update), but never creates an entry
    pub fn update_existing<R>(
        &self,
        artwork_id: ArtworkId,
        f: impl FnOnce(&mut SessionPaintingState) -> R,
    ) -> Option<R> {
        let mut inner = self.inner.lock();
        inner.paintings.get_mut(&artwork_id).map(f)
    }

    /// Artworks holding state in this session, in id order
    pub fn paintings(&self) -> Vec<ArtworkId> {
        self.inner.lock().paintings.keys().copied().collect()
    }

    /// Artworks whose current selection differs from their baseline
    pub fn dirty_paintings(&self) -> Vec<ArtworkId> {
        self.inner
            .lock()
            .paintings
            .iter()
            .filter(|(_, state)| state.is_dirty())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Wipe all painting state and start a new session id
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.paintings.clear();
        inner.session_id = generate_session_id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ToggleOutcome;

    fn set(items: &[&str]) -> EmotionSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_get_or_init_creates_empty_state() {
        let cache = SessionStateCache::new();
        assert!(cache.get(1).is_none());

        let state = cache.get_or_init(1);
        assert!(state.baseline.is_empty());
        assert!(state.current.is_empty());
        assert!(!state.loaded);
        assert_eq!(cache.paintings(), vec![1]);
    }

    #[test]
    fn test_set_selections_preserves_baseline() {
        let cache = SessionStateCache::new();
        cache.set_selections(2, set(&["Calm"]), Some(set(&["Calm"])));
        cache.set_selections(2, set(&["Calm", "Warm"]), None);
        cache.set_selections(2, set(&["Warm"]), None);

        let state = cache.get(2).unwrap();
        assert_eq!(state.baseline, set(&["Calm"]));
        assert_eq!(state.current, set(&["Warm"]));
        assert_eq!(state.pending_deltas.get("Calm"), Some(&-1));
        assert_eq!(state.pending_deltas.get("Warm"), Some(&1));
        assert_eq!(cache.dirty_paintings(), vec![2]);
    }

    #[test]
    fn test_clear_wipes_state_and_rotates_session() {
        let cache = SessionStateCache::with_session_id("session_1_aaaaaaaaa");
        cache.set_selections(3, set(&["Hopeful"]), None);
        cache.clear();

        assert!(cache.paintings().is_empty());
        assert_ne!(cache.session_id(), "session_1_aaaaaaaaa");
    }

    #[test]
    fn test_restore_from_snapshot() {
        let cache = SessionStateCache::with_session_id("session_7_bbbbbbbbb");
        cache.set_selections(5, set(&["Joyful"]), Some(set(&[])));
        let json = cache.snapshot_json().unwrap();

        let restored = SessionStateCache::restore(&json);
        assert_eq!(restored.session_id(), "session_7_bbbbbbbbb");
        assert_eq!(restored.get(5), cache.get(5));
    }

    #[test]
    fn test_restore_recomputes_pending_deltas() {
        let json = r#"{
            "session_id": "session_9_ccccccccc",
            "paintings": {
                "4": {
                    "baseline": ["Calm"],
                    "current": ["Calm", "Warm"],
                    "pending_deltas": {"Calm": 5, "Mysterious": -1},
                    "loaded": true
                },
                "6": {
                    "baseline": [],
                    "current": ["Hopeful"],
                    "loaded": true
                }
            }
        }"#;

        let restored = SessionStateCache::restore(json);
        let state = restored.get(4).unwrap();
        assert_eq!(state.pending_deltas.len(), 1);
        assert_eq!(state.pending_deltas.get("Warm"), Some(&1));
        assert_eq!(restored.get(6).unwrap().pending_deltas.get("Hopeful"), Some(&1));
        assert_eq!(restored.dirty_paintings(), vec![4, 6]);
    }

    #[test]
    fn test_update_existing_does_not_create_entries() {
        let cache = SessionStateCache::new();
        assert_eq!(cache.update_existing(7, |state| state.toggle("Calm")), None);
        assert!(cache.paintings().is_empty());

        cache.get_or_init(7);
        assert_eq!(
            cache.update_existing(7, |state| state.toggle("Calm")),
            Some(ToggleOutcome::Selected)
        );
    }

    #[test]
    fn test_restore_ignores_corrupt_snapshot() {
        let restored = SessionStateCache::restore("{not json");
        assert!(restored.paintings().is_empty());
        assert!(restored.session_id().starts_with("session_"));
    }
}
