//! Public works efficiency index (IEOP).
//!
//! Scores public construction projects on cost, schedule, recurrence and
//! execution, ranks them, and summarizes a portfolio. The scoring core
//! ([`scoring`], [`portfolio`]) is pure and synchronous; everything that
//! touches files, the network or the terminal lives in the other modules.
pub mod config;
pub mod error;
pub mod fallback;
pub mod loader;
pub mod output;
pub mod portfolio;
pub mod reference;
pub mod scoring;
pub mod source;
pub mod telemetry;
pub mod types;
pub mod util;
