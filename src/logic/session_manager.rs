use log::{debug, error, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::logic::delta::needs_submission_write;
use crate::model::{
    clamp_count, ArtworkId, Catalog, DeltaMap, EmotionCounts, EmotionLabel, EmotionSet,
    ToggleOutcome, VisitorKey,
};
use crate::store::session_cache::SessionStateCache;
use crate::store::traits::VoteStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Emotion label must not be empty")]
    InvalidEmotion,

    #[error("Unknown artwork {0}")]
    UnknownArtwork(ArtworkId),

    #[error("Emotion '{emotion}' is not offered for artwork {artwork_id}")]
    UnknownEmotion {
        artwork_id: ArtworkId,
        emotion: EmotionLabel,
    },

    #[error("Artwork {0} has not been opened in this session")]
    NotOpen(ArtworkId),

    #[error("Vote store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// What the detail view renders for one artwork
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtworkView {
    pub artwork_id: ArtworkId,
    pub selected: EmotionSet,
    pub counts: EmotionCounts,
}

/// Outcome of one flush. Store failures are recorded here rather than returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushReport {
    pub artwork_id: ArtworkId,
    /// Net changes this flush pushed to the store
    pub deltas: DeltaMap,
    pub submission_written: bool,
    /// New authoritative count for every delta the store accepted
    pub applied: BTreeMap<EmotionLabel, i64>,
    pub failures: Vec<String>,
}

impl FlushReport {
    fn empty(artwork_id: ArtworkId) -> Self {
        Self {
            artwork_id,
            ..Default::default()
        }
    }

    /// Number of write calls this flush issued against the store
    pub fn store_writes(&self) -> usize {
        self.deltas.len() + usize::from(self.submission_written)
    }

    pub fn is_noop(&self) -> bool {
        self.store_writes() == 0
    }

    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

struct FlushPlan {
    deltas: DeltaMap,
    current: EmotionSet,
    write_submission: bool,
}

/// Reconciles one visitor's emotion selections against the vote store.
///
/// Selections live in the injected [`SessionStateCache`]; toggles are purely
/// local and only [`flush`](Self::flush) talks to the store. Each flush pushes
/// the net change since the baseline and then advances the baseline, so the
/// same change is never written twice. Labels are checked against the
/// catalog up front, so a flush only ever carries emotions the store accepts.
pub struct VoteSessionManager<S: VoteStore> {
    store: Arc<S>,
    catalog: Arc<Catalog>,
    cache: Arc<SessionStateCache>,
    visitor: VisitorKey,
    displayed: Mutex<HashMap<ArtworkId, EmotionCounts>>,
}

impl<S: VoteStore> VoteSessionManager<S> {
    pub fn new(
        store: Arc<S>,
        catalog: Arc<Catalog>,
        cache: Arc<SessionStateCache>,
        visitor: VisitorKey,
    ) -> Self {
        Self {
            store,
            catalog,
            cache,
            visitor,
            displayed: Mutex::new(HashMap::new()),
        }
    }

    /// Manager whose visitor key pairs `network_address` with the cache's session id
    pub fn for_session(
        store: Arc<S>,
        catalog: Arc<Catalog>,
        cache: Arc<SessionStateCache>,
        network_address: impl Into<String>,
    ) -> Self {
        let visitor = VisitorKey::new(network_address, cache.session_id());
        Self::new(store, catalog, cache, visitor)
    }

    pub fn visitor(&self) -> &VisitorKey {
        &self.visitor
    }

    pub fn cache(&self) -> &Arc<SessionStateCache> {
        &self.cache
    }

    /// Open an artwork's detail view.
    ///
    /// The visitor's prior submission is loaded as baseline the first time the
    /// artwork is opened in this session. Counts are refetched on every open.
    pub async fn open(&self, artwork_id: ArtworkId) -> Result<ArtworkView, SessionError> {
        if self.catalog.get(artwork_id).is_none() {
            return Err(SessionError::UnknownArtwork(artwork_id));
        }
        let state = self.cache.get_or_init(artwork_id);
        if !state.loaded {
            self.load_baseline(artwork_id).await?;
        }
        self.refresh_counts(artwork_id).await;
        Ok(self.view(artwork_id))
    }

    async fn load_baseline(&self, artwork_id: ArtworkId) -> Result<(), SessionError> {
        let submission = self
            .store
            .get_submission(artwork_id, &self.visitor)
            .await
            .map_err(|e| {
                error!("Failed to load submission for artwork {}: {:#}", artwork_id, e);
                SessionError::Store(e)
            })?;

        let baseline = submission
            .map(|s| s.selected_emotions)
            .unwrap_or_default();
        debug!("Loaded baseline for artwork {}: {:?}", artwork_id, baseline);

        self.cache.update(artwork_id, |state| {
            // A concurrent open may already have loaded it
            if state.loaded {
                return;
            }
            state.set_baseline(baseline.clone());
            state.set_current(baseline);
            state.loaded = true;
        });
        Ok(())
    }

    async fn refresh_counts(&self, artwork_id: ArtworkId) {
        match self.store.get_counts(artwork_id).await {
            Ok(mut counts) => {
                let pending = self
                    .cache
                    .get(artwork_id)
                    .map(|state| state.pending_deltas)
                    .unwrap_or_default();
                for (emotion, delta) in pending {
                    let count = counts.entry(emotion).or_insert(0);
                    *count = clamp_count(*count, delta);
                }
                self.displayed.lock().insert(artwork_id, counts);
            }
            Err(e) => {
                warn!(
                    "Failed to fetch emotion counts for artwork {}, showing stale counts: {:#}",
                    artwork_id, e
                );
            }
        }
    }

    /// Flip an emotion in the current selection and optimistically adjust
    /// its displayed count. No store call is made.
    ///
    /// The emotion must be one the artwork offers.
    pub fn toggle(
        &self,
        artwork_id: ArtworkId,
        emotion: &str,
    ) -> Result<ToggleOutcome, SessionError> {
        let emotion = emotion.trim();
        if emotion.is_empty() {
            return Err(SessionError::InvalidEmotion);
        }
        let artwork = self
            .catalog
            .get(artwork_id)
            .ok_or(SessionError::UnknownArtwork(artwork_id))?;
        if !artwork.has_emotion(emotion) {
            return Err(SessionError::UnknownEmotion {
                artwork_id,
                emotion: emotion.to_string(),
            });
        }

        let outcome = self
            .cache
            .update_existing(artwork_id, |state| {
                if state.loaded {
                    Some(state.toggle(emotion))
                } else {
                    None
                }
            })
            .flatten()
            .ok_or(SessionError::NotOpen(artwork_id))?;

        let mut displayed = self.displayed.lock();
        let count = displayed
            .entry(artwork_id)
            .or_default()
            .entry(emotion.to_string())
            .or_insert(0);
        *count = clamp_count(*count, outcome.count_delta());

        Ok(outcome)
    }

    pub fn pending_deltas(&self, artwork_id: ArtworkId) -> DeltaMap {
        self.cache
            .get(artwork_id)
            .map(|state| state.pending_deltas)
            .unwrap_or_default()
    }

    pub fn view(&self, artwork_id: ArtworkId) -> ArtworkView {
        let selected = self
            .cache
            .get(artwork_id)
            .map(|state| state.current)
            .unwrap_or_default();
        let counts = self
            .displayed
            .lock()
            .get(&artwork_id)
            .cloned()
            .unwrap_or_default();
        ArtworkView {
            artwork_id,
            selected,
            counts,
        }
    }

    /// Push the net change since the baseline to the store.
    ///
    /// The baseline is advanced before any store call, so a second trigger
    /// racing this one finds nothing pending. Store failures are logged and
    /// recorded in the report; nothing is retried or rolled back.
    pub async fn flush(&self, artwork_id: ArtworkId) -> FlushReport {
        let Some(plan) = self.take_flush_plan(artwork_id) else {
            return FlushReport::empty(artwork_id);
        };

        let mut report = FlushReport {
            artwork_id,
            deltas: plan.deltas.clone(),
            submission_written: plan.write_submission,
            ..Default::default()
        };

        if plan.write_submission {
            if let Err(e) = self
                .store
                .put_submission(artwork_id, &self.visitor, &plan.current)
                .await
            {
                warn!("Failed to save submission for artwork {}: {:#}", artwork_id, e);
                report.failures.push(format!("submission: {:#}", e));
            }
        }

        for (emotion, delta) in &plan.deltas {
            match self.store.adjust_count(artwork_id, emotion, *delta).await {
                Ok(new_count) => {
                    report.applied.insert(emotion.clone(), new_count);
                }
                Err(e) => {
                    warn!(
                        "Failed to apply {:+} to {} on artwork {}: {:#}",
                        delta, emotion, artwork_id, e
                    );
                    report.failures.push(format!("{}: {:#}", emotion, e));
                }
            }
        }

        info!(
            "Flushed artwork {} for {}: deltas={:?} submission={} failures={}",
            artwork_id,
            self.visitor,
            report.deltas,
            report.submission_written,
            report.failures.len()
        );
        report
    }

    fn take_flush_plan(&self, artwork_id: ArtworkId) -> Option<FlushPlan> {
        self.cache
            .update_existing(artwork_id, |state| {
                if !state.loaded {
                    return None;
                }
                let deltas = state.pending_deltas.clone();
                let write_submission =
                    needs_submission_write(&deltas, &state.baseline, &state.current);
                if !write_submission {
                    return None;
                }
                state.advance_baseline();
                Some(FlushPlan {
                    deltas,
                    current: state.current.clone(),
                    write_submission,
                })
            })
            .flatten()
    }

    /// Visitor moved from one artwork to another
    pub async fn navigate(
        &self,
        from: ArtworkId,
        to: ArtworkId,
    ) -> Result<(FlushReport, ArtworkView), SessionError> {
        let report = self.flush(from).await;
        let view = self.open(to).await?;
        Ok((report, view))
    }

    /// Detail view closed
    pub async fn close(&self, artwork_id: ArtworkId) -> FlushReport {
        self.flush(artwork_id).await
    }

    /// Flush every artwork touched in this session, then drop all session state
    pub async fn end_session(self) -> Vec<FlushReport> {
        let mut reports = Vec::new();
        for artwork_id in self.cache.paintings() {
            let report = self.flush(artwork_id).await;
            if !report.is_noop() {
                reports.push(report);
            }
        }
        self.cache.clear();
        self.displayed.lock().clear();
        info!(
            "Session for {} ended after {} flush(es)",
            self.visitor,
            reports.len()
        );
        reports
    }
}
