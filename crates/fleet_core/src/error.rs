//! Simulator error type.
//!
//! Every fatal condition maps onto one of four kinds: bad configuration,
//! bad input data, a broken internal invariant, or a misbehaving search
//! strategy. Nothing is recovered inside the event loop; the runner stops
//! at the first fault. Resource expiration is a normal outcome, not an error.

use thiserror::Error;

/// The top-level error type for `fleet_core`.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("data error: {0}")]
    Data(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("strategy error: {0}")]
    Strategy(String),
}

/// Shorthand result type used across the crate.
pub type SimResult<T> = Result<T, SimError>;
