use crate::logic::delta::compute_deltas;
use crate::model::{ArtworkId, DeltaMap, EmotionSet, ToggleOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-artwork selection state held for one browsing session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPaintingState {
    /// Emotions recorded as of the last successful flush
    pub baseline: EmotionSet,
    pub current: EmotionSet,
    /// Always `compute_deltas(baseline, current)`; rebuilt on restore
    #[serde(default)]
    pub pending_deltas: DeltaMap,
    /// Baseline has been loaded from the vote store this session
    #[serde(default)]
    pub loaded: bool,
}

impl SessionPaintingState {
    pub fn set_current(&mut self, current: EmotionSet) {
        self.current = current;
        self.refresh_deltas();
    }

    pub fn set_baseline(&mut self, baseline: EmotionSet) {
        self.baseline = baseline;
        self.refresh_deltas();
    }

    pub fn toggle(&mut self, emotion: &str) -> ToggleOutcome {
        let outcome = if self.current.remove(emotion) {
            ToggleOutcome::Deselected
        } else {
            self.current.insert(emotion.to_string());
            ToggleOutcome::Selected
        };
        self.refresh_deltas();
        outcome
    }

    /// Make the current selection the new baseline, leaving nothing pending
    pub fn advance_baseline(&mut self) {
        self.baseline = self.current.clone();
        self.pending_deltas.clear();
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending_deltas.is_empty()
    }

    pub fn refresh_deltas(&mut self) {
        self.pending_deltas = compute_deltas(&self.baseline, &self.current);
    }
}

/// Serializable form of a whole session, suitable for host-side persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub paintings: BTreeMap<ArtworkId, SessionPaintingState>,
}
