//! Error types for metering, billing, and simulation.

use std::io;

use thiserror::Error;
use time::Date;

/// Data-integrity errors raised by meters and the account manager.
///
/// None of these are transient: each one means the driving layer broke a
/// precondition (empty history, desynchronized series, charging too early).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeterError {
    #[error("meter has no readings to total")]
    InsufficientHistory,

    #[error("window must cover at least one reading")]
    InvalidWindow,

    #[error("no client reading found at ratchet date {timestamp}")]
    RatchetIndexNotFound { timestamp: Date },

    #[error("ratchet value is zero, expense factors are undefined")]
    DivisionByZero,

    #[error("cannot charge accounts yet: {reason}")]
    PrematureCharge { reason: &'static str },

    #[error("reading sum does not fit in 64 bits")]
    ReadingOverflow,
}

/// Errors surfaced while driving a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("metering error: {0}")]
    Meter(#[from] MeterError),

    #[error("reading source ran out of values for client {client}")]
    SourceExhausted { client: usize },

    #[error("failed to record day result: {0}")]
    Sink(#[from] io::Error),
}
