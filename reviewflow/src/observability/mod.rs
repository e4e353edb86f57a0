//! Observability utilities.
//!
//! - [`init_tracing`] installs a `tracing-subscriber` fmt layer with an
//!   `EnvFilter` (`RUST_LOG`, default `info`)
//! - Span attribute structs describing runs and stages
//! - [`SpanTimer`] for wall-clock stage timing

mod spans;
mod subscriber;

pub use spans::{RunSpanAttributes, SpanTimer, StageSpanAttributes};
pub use subscriber::{init_tracing, LogFormat};
