//! Vocabulary symbols
//!
//! Symbol text forms:
//! - Sequence start: `<CLS>`
//! - Key down:       `NOTE_ON_<pitch>`   (e.g., NOTE_ON_60)
//! - Key up:         `NOTE_OFF_<pitch>`  (e.g., NOTE_OFF_60)
//! - Velocity bin:   `VELOCITY_<bin>`    (e.g., VELOCITY_7)
//! - Time step:      `<rung>T`           (1-based rung, e.g., 12T)

use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

pub const SEQUENCE_START_SYMBOL: &str = "<CLS>";
const NOTE_ON_PREFIX: &str = "NOTE_ON_";
const NOTE_OFF_PREFIX: &str = "NOTE_OFF_";
const VELOCITY_PREFIX: &str = "VELOCITY_";
const TIME_STEP_SUFFIX: char = 'T';

/// Direction of a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyDirection {
    // Up sorts before Down: a release closes a note before a coincident press opens one
    Up,
    Down,
}

/// A single vocabulary symbol
///
/// `TimeStep` carries the 0-based rung index into the time ladder; its text
/// form uses the 1-based rung number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    SequenceStart,
    NoteOn(u8),
    NoteOff(u8),
    Velocity(usize),
    TimeStep(usize),
}

impl Token {
    /// Key token for a pitch and direction
    pub fn key(pitch: u8, direction: KeyDirection) -> Self {
        match direction {
            KeyDirection::Down => Token::NoteOn(pitch),
            KeyDirection::Up => Token::NoteOff(pitch),
        }
    }

    pub fn is_time_step(&self) -> bool {
        matches!(self, Token::TimeStep(_))
    }

    pub fn is_key(&self) -> bool {
        matches!(self, Token::NoteOn(_) | Token::NoteOff(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::SequenceStart => f.write_str(SEQUENCE_START_SYMBOL),
            Token::NoteOn(pitch) => write!(f, "{NOTE_ON_PREFIX}{pitch}"),
            Token::NoteOff(pitch) => write!(f, "{NOTE_OFF_PREFIX}{pitch}"),
            Token::Velocity(bin) => write!(f, "{VELOCITY_PREFIX}{bin}"),
            Token::TimeStep(rung) => write!(f, "{}{TIME_STEP_SUFFIX}", rung + 1),
        }
    }
}

/// Strict decimal parse: digits only, no sign or whitespace
fn parse_number<T: FromStr>(digits: &str) -> Option<T> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for Token {
    type Err = CodecError;

    /// Parse the text form of a symbol. This does not check membership in
    /// any particular vocabulary; see `Vocabulary::parse_symbol`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || CodecError::UnknownSymbol(s.to_string());

        if s == SEQUENCE_START_SYMBOL {
            return Ok(Token::SequenceStart);
        }
        if let Some(pitch) = s.strip_prefix(NOTE_ON_PREFIX) {
            return parse_number(pitch).map(Token::NoteOn).ok_or_else(unknown);
        }
        if let Some(pitch) = s.strip_prefix(NOTE_OFF_PREFIX) {
            return parse_number(pitch).map(Token::NoteOff).ok_or_else(unknown);
        }
        if let Some(bin) = s.strip_prefix(VELOCITY_PREFIX) {
            return parse_number(bin).map(Token::Velocity).ok_or_else(unknown);
        }
        if let Some(rung) = s.strip_suffix(TIME_STEP_SUFFIX) {
            return match parse_number::<usize>(rung) {
                Some(rung) if rung >= 1 => Ok(Token::TimeStep(rung - 1)),
                _ => Err(unknown()),
            };
        }
        Err(unknown())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Token::SequenceStart.to_string(), "<CLS>");
        assert_eq!(Token::NoteOn(60).to_string(), "NOTE_ON_60");
        assert_eq!(Token::NoteOff(21).to_string(), "NOTE_OFF_21");
        assert_eq!(Token::Velocity(7).to_string(), "VELOCITY_7");
        assert_eq!(Token::TimeStep(0).to_string(), "1T");
        assert_eq!(Token::TimeStep(11).to_string(), "12T");
    }

    #[test]
    fn test_parse() {
        assert_eq!("<CLS>".parse::<Token>().unwrap(), Token::SequenceStart);
        assert_eq!("NOTE_ON_60".parse::<Token>().unwrap(), Token::NoteOn(60));
        assert_eq!("NOTE_OFF_108".parse::<Token>().unwrap(), Token::NoteOff(108));
        assert_eq!("VELOCITY_0".parse::<Token>().unwrap(), Token::Velocity(0));
        assert_eq!("12T".parse::<Token>().unwrap(), Token::TimeStep(11));
    }

    #[test]
    fn test_parse_invalid() {
        for symbol in [
            "", "NOTE_ON_", "NOTE_ON_x", "NOTE_ON_+5", "NOTE_ON_300", "VELOCITY_-1", "0T", "T",
            "1.5T", "NOTE_UP_60", " NOTE_ON_60",
        ] {
            assert_eq!(
                symbol.parse::<Token>(),
                Err(CodecError::UnknownSymbol(symbol.to_string())),
                "{symbol:?} should not parse"
            );
        }
    }

    #[test]
    fn test_key() {
        assert_eq!(Token::key(64, KeyDirection::Down), Token::NoteOn(64));
        assert_eq!(Token::key(64, KeyDirection::Up), Token::NoteOff(64));
        assert!(KeyDirection::Up < KeyDirection::Down);
    }
}
