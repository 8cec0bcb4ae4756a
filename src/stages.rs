#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StageDefinition {
    pub(crate) name: &'static str,
    pub(crate) threshold: f64,
}

const fn stage(name: &'static str, threshold: f64) -> StageDefinition {
    StageDefinition { name, threshold }
}

// Thresholds strictly increasing, first is 0.
pub(crate) const STAGES: [StageDefinition; 7] = [
    stage("Seed", 0.0),
    stage("Sprout", 12.0),
    stage("Seedling", 40.0),
    stage("Leafy", 85.0),
    stage("Bushy", 150.0),
    stage("Budding", 240.0),
    stage("Blooming", 360.0),
];

pub(crate) const LAST_STAGE: usize = STAGES.len() - 1;

pub(crate) fn stage_index(growth: f64) -> usize {
    STAGES
        .iter()
        .rposition(|s| s.threshold <= growth)
        .unwrap_or(0)
}

pub(crate) fn stage_name(idx: usize) -> &'static str {
    STAGES[idx.min(LAST_STAGE)].name
}

pub(crate) fn next_threshold(idx: usize) -> Option<f64> {
    STAGES.get(idx + 1).map(|s| s.threshold)
}

/// Growth points still missing before the next stage; `None` once fully grown.
pub(crate) fn remaining_growth(growth: f64) -> Option<f64> {
    next_threshold(stage_index(growth)).map(|t| (t - growth).max(0.0))
}

/// Fraction of the way from the current threshold to the next, in [0,1].
pub(crate) fn stage_progress(growth: f64) -> f64 {
    let idx = stage_index(growth);
    match next_threshold(idx) {
        Some(next) => {
            let base = STAGES[idx].threshold;
            ((growth - base) / (next - base)).clamp(0.0, 1.0)
        }
        None => 1.0,
    }
}
