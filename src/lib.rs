//! Conversion between timed MIDI notes and flat token sequences
//!
//! Notes become press/release events, gaps between events become runs of
//! power-of-two time steps, and velocities become bins. Decoding repairs
//! sequences with unmatched presses or releases, so truncated or generated
//! sequences can be turned back into notes.

pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod note;

pub use codec::{NoLossTokenizer, Token};
pub use config::TokenizerConfig;
pub use error::{CodecError, ParseError};
pub use note::Note;
