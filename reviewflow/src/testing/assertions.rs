//! Test assertions for runs and progress.

use crate::core::{RunStatus, StageResult, StageStatus};
use crate::engine::RunState;
use crate::progress::CollectingProgressReporter;

/// Asserts that the run completed and produced a record.
pub fn assert_run_completed(run: &RunState) {
    assert_eq!(
        run.status(),
        RunStatus::Completed,
        "Expected completed run, failed at {:?}: {:?}",
        run.failed_stage(),
        run.error()
    );
    assert!(run.record().is_some(), "Completed run has no review record");
    for result in run.results() {
        assert_eq!(
            result.status(),
            StageStatus::Succeeded,
            "Stage '{}' did not succeed",
            result.stage_id()
        );
    }
}

/// Asserts that the run failed at `stage_id` and nothing after it ran.
pub fn assert_run_failed_at(run: &RunState, stage_id: &str) {
    assert_eq!(run.status(), RunStatus::Failed, "Expected failed run");
    assert_eq!(run.failed_stage(), Some(stage_id), "Failed at a different stage");
    assert!(run.record().is_none(), "Failed run produced a record");

    let position = run
        .order()
        .iter()
        .position(|id| id == stage_id)
        .unwrap_or_else(|| panic!("Stage '{stage_id}' is not part of the run"));
    for (i, id) in run.order().iter().enumerate() {
        let expected = match i.cmp(&position) {
            std::cmp::Ordering::Less => StageStatus::Succeeded,
            std::cmp::Ordering::Equal => StageStatus::Failed,
            std::cmp::Ordering::Greater => StageStatus::Pending,
        };
        assert_stage_status(run, id, expected);
    }
}

/// Asserts that the run was cancelled and produced no record.
pub fn assert_run_cancelled(run: &RunState) {
    assert_eq!(run.status(), RunStatus::Cancelled, "Expected cancelled run");
    assert!(run.record().is_none(), "Cancelled run produced a record");
    assert!(run.cancel_reason().is_some(), "Cancelled run has no reason");
}

/// Asserts the status of one stage.
pub fn assert_stage_status(run: &RunState, stage_id: &str, expected: StageStatus) {
    let actual = run.result(stage_id).map(StageResult::status);
    assert_eq!(
        actual,
        Some(expected),
        "Expected stage '{}' to be {:?}, got {:?}",
        stage_id,
        expected,
        actual
    );
}

/// Asserts that percents never decrease and reach 100 only as the last event.
pub fn assert_progress_monotonic(reporter: &CollectingProgressReporter) {
    let percents = reporter.percents();
    for pair in percents.windows(2) {
        assert!(pair[0] <= pair[1], "Progress went backwards: {percents:?}");
    }
    if let Some(pos) = percents.iter().position(|&p| p == 100) {
        assert_eq!(pos, percents.len() - 1, "Progress reported after 100: {percents:?}");
    }
    assert!(percents.iter().all(|&p| p <= 100), "Progress above 100: {percents:?}");
}
