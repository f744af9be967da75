//! Line-oriented text formats
//!
//! Notes, one per line:
//! `<pitch> <start> <end> <velocity>  # comment`
//!
//! Token sequences, one per line, symbols separated by single spaces:
//! `VELOCITY_7 NOTE_ON_60 9T 8T VELOCITY_7 NOTE_OFF_60`

use std::fmt::Write;

use crate::codec::{Token, Vocabulary};
use crate::error::ParseError;
use crate::note::Note;

/// Strip a trailing comment and surrounding whitespace
fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or(line).trim()
}

/// Parse one note line. Returns `None` for blank and comment-only lines.
///
/// `line_number` is 1-based and only used for error reporting.
pub fn parse_note_line(line: &str, line_number: usize) -> Result<Option<Note>, ParseError> {
    let line = strip_comment(line);
    if line.is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    let [pitch, start, end, velocity] = fields[..] else {
        return Err(ParseError::InvalidLine {
            line: line_number,
            text: line.to_string(),
        });
    };

    let pitch = pitch.parse::<u8>().map_err(|_| ParseError::InvalidPitch {
        line: line_number,
        text: pitch.to_string(),
    })?;
    let parse_time = |s: &str| {
        s.parse::<f64>().map_err(|_| ParseError::InvalidTime {
            line: line_number,
            text: s.to_string(),
        })
    };
    let start = parse_time(start)?;
    let end = parse_time(end)?;
    let velocity = velocity
        .parse::<u8>()
        .map_err(|_| ParseError::InvalidVelocity {
            line: line_number,
            text: velocity.to_string(),
        })?;

    Ok(Some(Note::new(pitch, start, end, velocity)))
}

/// Parse a full note file
pub fn parse_notes(text: &str) -> Result<Vec<Note>, ParseError> {
    let mut notes = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(note) = parse_note_line(line, i + 1)? {
            notes.push(note);
        }
    }
    Ok(notes)
}

pub fn write_notes(notes: &[Note]) -> String {
    let mut out = String::new();
    for note in notes {
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{} {} {} {}",
            note.pitch, note.start, note.end, note.velocity
        );
    }
    out
}

/// Parse one line of space-separated symbols against a vocabulary
pub fn parse_token_line(
    line: &str,
    line_number: usize,
    vocab: &Vocabulary,
) -> Result<Vec<Token>, ParseError> {
    line.split_whitespace()
        .map(|symbol| {
            vocab
                .parse_symbol(symbol)
                .map_err(|source| ParseError::InvalidSymbol {
                    line: line_number,
                    source,
                })
        })
        .collect()
}

/// Parse a token file: one sequence per non-empty line
pub fn parse_token_sequences(text: &str, vocab: &Vocabulary) -> Result<Vec<Vec<Token>>, ParseError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_token_line(line, i + 1, vocab))
        .collect()
}

/// Render a sequence as a single newline-terminated line
pub fn write_token_line(tokens: &[Token]) -> String {
    let mut out = tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerConfig;
    use crate::error::CodecError;

    #[test]
    fn test_parse_note_line() {
        let note = parse_note_line("60 0.0 0.5 100", 1).unwrap().unwrap();
        assert_eq!(note, Note::new(60, 0.0, 0.5, 100));

        let note = parse_note_line("  64\t1.25   2  80  # sustained", 3)
            .unwrap()
            .unwrap();
        assert_eq!(note, Note::new(64, 1.25, 2.0, 80));

        assert_eq!(parse_note_line("", 1).unwrap(), None);
        assert_eq!(parse_note_line("# header", 1).unwrap(), None);
    }

    #[test]
    fn test_parse_note_line_errors() {
        assert!(matches!(
            parse_note_line("60 0.0 0.5", 4),
            Err(ParseError::InvalidLine { line: 4, .. })
        ));
        assert!(matches!(
            parse_note_line("c4 0.0 0.5 100", 1),
            Err(ParseError::InvalidPitch { .. })
        ));
        assert!(matches!(
            parse_note_line("60 zero 0.5 100", 1),
            Err(ParseError::InvalidTime { .. })
        ));
        assert!(matches!(
            parse_note_line("60 0.0 0.5 300", 1),
            Err(ParseError::InvalidVelocity { .. })
        ));
    }

    #[test]
    fn test_notes_round_trip_through_text() {
        let text = r#"
# pitch start end velocity
60 0 0.5 100
64 0.25 1.5 72   # held

67 1 1.125 40
        "#;
        let notes = parse_notes(text).unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[1], Note::new(64, 0.25, 1.5, 72));
        assert_eq!(parse_notes(&write_notes(&notes)).unwrap(), notes);
    }

    #[test]
    fn test_token_lines() {
        let vocab = Vocabulary::build(TokenizerConfig::new(0.01, 8)).unwrap();
        let text = "VELOCITY_7 NOTE_ON_60 3T VELOCITY_7 NOTE_OFF_60\n\n<CLS> NOTE_OFF_21\n";
        let sequences = parse_token_sequences(text, &vocab).unwrap();
        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0][2], Token::TimeStep(2));
        assert_eq!(sequences[1], vec![Token::SequenceStart, Token::NoteOff(21)]);
        assert_eq!(
            write_token_line(&sequences[0]),
            "VELOCITY_7 NOTE_ON_60 3T VELOCITY_7 NOTE_OFF_60\n"
        );
    }

    #[test]
    fn test_token_line_unknown_symbol() {
        let vocab = Vocabulary::build(TokenizerConfig::new(0.01, 8)).unwrap();
        assert_eq!(
            parse_token_line("NOTE_ON_60 VELOCITY_8", 2, &vocab),
            Err(ParseError::InvalidSymbol {
                line: 2,
                source: CodecError::UnknownSymbol("VELOCITY_8".to_string()),
            })
        );
    }
}
