use itertools::{EitherOrBoth, Itertools};

use crate::model::{DeltaMap, EmotionSet};

/// Classify every emotion in `baseline ∪ current` and keep only those whose
/// assertion state changed.
///
/// - baseline only: `-1` (retracted)
/// - current only: `+1` (newly asserted)
/// - both or neither: excluded
///
/// Repeated toggles of the same emotion within a session therefore collapse
/// to a single `±1` or to nothing.
pub fn compute_deltas(baseline: &EmotionSet, current: &EmotionSet) -> DeltaMap {
    baseline
        .iter()
        .merge_join_by(current.iter(), |a, b| a.cmp(b))
        .filter_map(|entry| match entry {
            EitherOrBoth::Left(retracted) => Some((retracted.clone(), -1)),
            EitherOrBoth::Right(asserted) => Some((asserted.clone(), 1)),
            EitherOrBoth::Both(_, _) => None,
        })
        .collect()
}

/// Whether a flush has to write the visitor's submission
pub fn needs_submission_write(
    deltas: &DeltaMap,
    baseline: &EmotionSet,
    current: &EmotionSet,
) -> bool {
    !deltas.is_empty() || (baseline.is_empty() && !current.is_empty())
}
