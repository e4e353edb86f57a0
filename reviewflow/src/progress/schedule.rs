//! Linear stage-index to percent mapping.

/// Maps run steps to percentages.
///
/// A run over `n` stages has `n + 2` steps: initialization, one per stage,
/// and final assembly. Step `k` maps to `k * 100 / (n + 2)`, so only the
/// assembly step reaches 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSchedule {
    stage_count: usize,
}

impl ProgressSchedule {
    /// Creates a schedule for `stage_count` stages.
    #[must_use]
    pub fn new(stage_count: usize) -> Self {
        Self { stage_count }
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    fn total_steps(&self) -> usize {
        self.stage_count + 2
    }

    fn percent_at(&self, step: usize) -> u8 {
        let step = step.min(self.total_steps());
        // Bounded by 100, the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        let pct = (step * 100 / self.total_steps()) as u8;
        pct
    }

    /// Percent reported once the pipeline is initialized.
    #[must_use]
    pub fn initialized(&self) -> u8 {
        self.percent_at(1)
    }

    /// Percent reported when the stage at `index` (0-based) starts.
    #[must_use]
    pub fn stage_started(&self, index: usize) -> u8 {
        self.percent_at(index + 1)
    }

    /// Percent reported when the stage at `index` (0-based) succeeds.
    #[must_use]
    pub fn stage_finished(&self, index: usize) -> u8 {
        self.percent_at(index + 2)
    }

    /// Percent reported once the review record is assembled.
    #[must_use]
    pub fn completed(&self) -> u8 {
        100
    }
}
