//! Cooperative cancellation for review runs.
//!
//! The engine checks a [`CancellationToken`] between stages. A generator call
//! already in flight always runs to completion.

mod token;

pub use token::CancellationToken;
