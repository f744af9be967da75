//! Expansion of note records into time-ordered key events

use std::cmp::Ordering;

use crate::codec::token::KeyDirection;
use crate::codec::velocity::VelocityQuantizer;
use crate::note::Note;

/// A key press or release derived from one edge of a note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub time: f64,
    pub pitch: u8,
    pub velocity_bin: usize,
    pub direction: KeyDirection,
}

/// Expand notes into on/off events sorted by time
///
/// At equal times releases come before presses. Within the same time and
/// direction the input order of the notes is kept.
pub fn notes_to_events(notes: &[Note], quantizer: &VelocityQuantizer) -> Vec<Event> {
    let mut events: Vec<Event> = notes
        .iter()
        .flat_map(|note| {
            let velocity_bin = quantizer.encode(note.velocity);
            [
                Event {
                    time: note.start,
                    pitch: note.pitch,
                    velocity_bin,
                    direction: KeyDirection::Down,
                },
                Event {
                    time: note.end,
                    pitch: note.pitch,
                    velocity_bin,
                    direction: KeyDirection::Up,
                },
            ]
        })
        .collect();

    // Stable. Numeric comparison so that -0.0 and 0.0 tie; notes are
    // validated beforehand, so there is no NaN.
    events.sort_by(|a, b| {
        a.time
            .partial_cmp(&b.time)
            .unwrap_or(Ordering::Equal)
            .then(a.direction.cmp(&b.direction))
    });
    events
}
