//! Progress reporting for review runs.
//!
//! The engine emits one [`ProgressReporter::on_progress`] event per stage
//! transition. Percent values follow a [`ProgressSchedule`] that reserves
//! the first step for initialization and the last for assembling the record.

mod reporter;
mod schedule;

pub use reporter::{
    CollectingProgressReporter, LoggingProgressReporter, NoOpProgressReporter, ProgressEvent,
    ProgressReporter,
};
pub use schedule::ProgressSchedule;
