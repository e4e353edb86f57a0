//! Run state and the execution engine.

mod executor;
mod state;

pub use executor::ExecutionEngine;
pub use state::RunState;
