//! Note records

use crate::error::CodecError;

/// Lowest supported MIDI pitch (A0)
pub const MIN_PITCH: u8 = 21;
/// Highest supported MIDI pitch (C8)
pub const MAX_PITCH: u8 = 108;
/// Number of supported pitches
pub const PITCH_COUNT: usize = (MAX_PITCH - MIN_PITCH) as usize + 1;
/// Highest MIDI velocity
pub const MAX_VELOCITY: u8 = 127;

/// A single key press: pitch held from `start` to `end` (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub pitch: u8,
    pub start: f64,
    pub end: f64,
    pub velocity: u8,
}

impl Note {
    pub fn new(pitch: u8, start: f64, end: f64, velocity: u8) -> Self {
        Self {
            pitch,
            start,
            end,
            velocity,
        }
    }

    /// Check that this note can be tokenized
    pub fn validate(&self) -> Result<(), CodecError> {
        if !is_supported_pitch(self.pitch) {
            return Err(CodecError::UnsupportedPitch(self.pitch));
        }
        if self.velocity > MAX_VELOCITY {
            return Err(CodecError::InvalidVelocity(self.velocity));
        }
        let timing_ok = self.start.is_finite()
            && self.end.is_finite()
            && self.start >= 0.0
            && self.end >= self.start;
        if !timing_ok {
            return Err(CodecError::InvalidNoteTiming {
                pitch: self.pitch,
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

pub fn is_supported_pitch(pitch: u8) -> bool {
    (MIN_PITCH..=MAX_PITCH).contains(&pitch)
}
