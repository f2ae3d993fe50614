use std::collections::HashSet;

use crate::models::ExerciseRecord;

/// Candidates whose name is not already in `saved`, in their original order.
/// Only names are compared: a saved record with different details still hides
/// the candidate.
pub fn filter_unsaved(candidates: &[ExerciseRecord], saved: &[ExerciseRecord]) -> Vec<ExerciseRecord> {
    let saved_names: HashSet<&str> = saved.iter().map(|record| record.name.as_str()).collect();

    candidates
        .iter()
        .filter(|candidate| !saved_names.contains(candidate.name.as_str()))
        .cloned()
        .collect()
}
