//! Error types for the note codec and its text formats

use thiserror::Error;

use crate::codec::token::Token;

/// Errors raised while building the codec or converting between notes and tokens
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("eps must lie strictly between 0 and 1, got {0}")]
    InvalidEps(f64),
    #[error("n_velocity_bins must be at least 1, got {0}")]
    InvalidVelocityBins(usize),
    #[error("pitch {0} is outside the supported range 21..=108")]
    UnsupportedPitch(u8),
    #[error("velocity {0} is outside 0..=127")]
    InvalidVelocity(u8),
    #[error("note {pitch} has invalid timing: start={start}, end={end}")]
    InvalidNoteTiming { pitch: u8, start: f64, end: f64 },
    #[error("cannot encode time gap {0}")]
    InvalidDuration(f64),
    #[error("velocity bin {bin} is out of range (n_bins = {n_bins})")]
    VelocityBinOutOfRange { bin: usize, n_bins: usize },
    #[error("unknown symbol: {0:?}")]
    UnknownSymbol(String),
    #[error("token {0} is not part of this vocabulary")]
    TokenOutOfVocabulary(Token),
    #[error("token id {0} is not part of this vocabulary")]
    UnknownTokenId(usize),
    #[error("token {0} is not a time step")]
    NotATimeStep(Token),
    /// Internal invariant: the greedy decomposition did not converge.
    #[error("time gap {dt} could not be decomposed into time steps")]
    TimeDecomposition { dt: f64 },
    /// Internal invariant: repair must leave as many note-on as note-off events.
    #[error("unbalanced events after repair: {on} note-on vs {off} note-off")]
    UnbalancedEvents { on: usize, off: usize },
}

/// Errors raised while reading the line-oriented note and token formats
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("line {line}: expected `pitch start end velocity`, got {text:?}")]
    InvalidLine { line: usize, text: String },
    #[error("line {line}: invalid pitch {text:?}")]
    InvalidPitch { line: usize, text: String },
    #[error("line {line}: invalid time {text:?}")]
    InvalidTime { line: usize, text: String },
    #[error("line {line}: invalid velocity {text:?}")]
    InvalidVelocity { line: usize, text: String },
    #[error("line {line}: {source}")]
    InvalidSymbol { line: usize, source: CodecError },
}
