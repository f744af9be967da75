//! Tokenizer configuration
//!
//! The two scalars here fully determine the vocabulary. Token sequences
//! produced under one configuration are meaningless under another.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Configuration for [`NoLossTokenizer`](crate::codec::NoLossTokenizer)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Smallest distinguishable time gap in seconds, also the decomposition tolerance
    pub eps: f64,
    /// Number of velocity quantization bins
    pub n_velocity_bins: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            eps: 0.001,
            n_velocity_bins: 128,
        }
    }
}

impl TokenizerConfig {
    pub fn new(eps: f64, n_velocity_bins: usize) -> Self {
        Self {
            eps,
            n_velocity_bins,
        }
    }

    /// Check that a vocabulary can be built from this configuration
    pub fn validate(&self) -> Result<(), CodecError> {
        // Negated comparison so that NaN is rejected too
        if !(self.eps > 0.0 && self.eps < 1.0) {
            return Err(CodecError::InvalidEps(self.eps));
        }
        if self.n_velocity_bins < 1 {
            return Err(CodecError::InvalidVelocityBins(self.n_velocity_bins));
        }
        Ok(())
    }
}
