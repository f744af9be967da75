//! Velocity quantization into linearly spaced bins

use crate::error::CodecError;
use crate::note::MAX_VELOCITY;

/// Maps MIDI velocities to bins and bins back to representative velocities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VelocityQuantizer {
    /// `n_bins + 1` edges spanning 0..=127, truncated to integers
    edges: Vec<u8>,
    /// Integer midpoint of each bin
    bin_to_velocity: Vec<u8>,
}

impl VelocityQuantizer {
    /// Build the bin table. Callers validate `n_bins >= 1` beforehand.
    pub(crate) fn new(n_bins: usize) -> Self {
        let step = f64::from(MAX_VELOCITY) / n_bins as f64;
        let edges: Vec<u8> = (0..=n_bins)
            .map(|i| {
                if i == n_bins {
                    MAX_VELOCITY
                } else {
                    (i as f64 * step) as u8
                }
            })
            .collect();

        let bin_to_velocity = edges
            .windows(2)
            .map(|pair| ((u16::from(pair[0]) + u16::from(pair[1])) / 2) as u8)
            .collect();

        Self {
            edges,
            bin_to_velocity,
        }
    }

    pub fn n_bins(&self) -> usize {
        self.bin_to_velocity.len()
    }

    pub fn edges(&self) -> &[u8] {
        &self.edges
    }

    /// Bin index for a velocity: the last bin whose lower edge does not exceed it
    ///
    /// Velocities at or above the top edge land in the last bin.
    pub fn encode(&self, velocity: u8) -> usize {
        let at_or_below = self.edges.partition_point(|&edge| edge <= velocity);
        at_or_below.saturating_sub(1).min(self.n_bins() - 1)
    }

    /// Representative velocity of a bin
    pub fn decode(&self, bin: usize) -> Result<u8, CodecError> {
        self.bin_to_velocity
            .get(bin)
            .copied()
            .ok_or(CodecError::VelocityBinOutOfRange {
                bin,
                n_bins: self.n_bins(),
            })
    }

    /// Half the width of a bin, the worst-case quantization error for it
    pub fn half_width(&self, bin: usize) -> Option<f64> {
        let lo = *self.edges.get(bin)?;
        let hi = *self.edges.get(bin + 1)?;
        Some(f64::from(hi - lo) / 2.0)
    }
}
