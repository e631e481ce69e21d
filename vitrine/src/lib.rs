//! Expose vitrine's command implementations for use in integration tests.
pub mod cli;
pub mod pipeline;
pub mod progress;
pub mod videos;
