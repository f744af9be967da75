//! Note/token codec
//!
//! Encoding walks time-ordered key events and emits, per event, the time
//! steps covering the gap since the previous event, the velocity bin and the
//! key token. Decoding first repairs unmatched presses and releases, then
//! pairs the i-th press of a pitch with the i-th release of that pitch.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::codec::events::notes_to_events;
use crate::codec::token::Token;
use crate::codec::vocab::{Vocabulary, VocabularyExport};
use crate::config::TokenizerConfig;
use crate::error::CodecError;
use crate::note::{Note, MIN_PITCH, PITCH_COUNT};

/// Press recorded during decoding, waiting to be paired with a release
#[derive(Debug, Clone, Copy)]
struct Press {
    pitch: u8,
    start: f64,
    velocity: u8,
}

#[derive(Debug, Clone, Copy)]
struct Release {
    pitch: u8,
    end: f64,
}

/// Converts note records to token sequences and back
///
/// The vocabulary is built once in [`NoLossTokenizer::new`] and never
/// mutated, so a tokenizer can be shared by reference across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct NoLossTokenizer {
    vocab: Vocabulary,
}

impl NoLossTokenizer {
    pub const NAME: &'static str = "NoLossTokenizer";

    pub fn new(config: TokenizerConfig) -> Result<Self, CodecError> {
        Ok(Self {
            vocab: Vocabulary::build(config)?,
        })
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn parameters(&self) -> TokenizerConfig {
        self.vocab.config()
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    pub fn export_vocab(&self) -> VocabularyExport {
        self.vocab.export(Self::NAME)
    }

    /// Time-step tokens covering a gap of `dt` seconds
    pub fn tokenize_time_distance(&self, dt: f64) -> Result<Vec<Token>, CodecError> {
        self.vocab.time().encode(dt)
    }

    /// Encode notes into a token sequence
    ///
    /// Notes may be given in any order. Every key token is preceded by
    /// exactly one velocity token, and any time steps sit directly before
    /// that velocity token.
    pub fn tokenize(&self, notes: &[Note]) -> Result<Vec<Token>, CodecError> {
        for note in notes {
            note.validate()?;
        }

        let events = notes_to_events(notes, self.vocab.velocity());
        let mut tokens = Vec::with_capacity(events.len() * 3);
        let mut previous_time = 0.0;

        for event in &events {
            let dt = event.time - previous_time;
            tokens.extend(self.tokenize_time_distance(dt)?);
            tokens.push(Token::Velocity(event.velocity_bin));
            tokens.push(Token::key(event.pitch, event.direction));
            previous_time = event.time;
        }

        trace!(
            "tokenized {} notes into {} tokens",
            notes.len(),
            tokens.len()
        );
        Ok(tokens)
    }

    /// Restore matching press/release structure in a token sequence
    ///
    /// - A release with no pending press gets a `[velocity, NOTE_ON]` pair
    ///   inserted at the very front, using the velocity token seen last
    ///   before that release. Later orphans end up further forward.
    /// - Every press still pending at the end gets a `[velocity, NOTE_OFF]`
    ///   pair appended, using the velocity recorded with that press.
    ///
    /// Sequences that are already balanced are returned unchanged.
    pub fn fix_token_sequences(&self, tokens: &[Token]) -> Result<Vec<Token>, CodecError> {
        // Pending press velocities per pitch, oldest first
        let mut pressed: Vec<VecDeque<usize>> = vec![VecDeque::new(); PITCH_COUNT];
        let mut current_velocity = 0;
        let mut orphans: Vec<(usize, u8)> = Vec::new();

        for &token in tokens {
            self.vocab.id_of(token)?;
            match token {
                Token::Velocity(bin) => current_velocity = bin,
                Token::NoteOn(pitch) => {
                    pressed[pitch_index(pitch)].push_back(current_velocity);
                }
                Token::NoteOff(pitch) => {
                    if pressed[pitch_index(pitch)].pop_front().is_none() {
                        orphans.push((current_velocity, pitch));
                    }
                }
                Token::SequenceStart | Token::TimeStep(_) => {}
            }
        }

        let dangling: usize = pressed.iter().map(VecDeque::len).sum();
        if orphans.is_empty() && dangling == 0 {
            return Ok(tokens.to_vec());
        }

        let mut fixed = Vec::with_capacity(tokens.len() + 2 * (orphans.len() + dangling));
        for &(bin, pitch) in orphans.iter().rev() {
            fixed.push(Token::Velocity(bin));
            fixed.push(Token::NoteOn(pitch));
        }
        fixed.extend_from_slice(tokens);
        for (offset, bins) in pressed.iter().enumerate() {
            let pitch = MIN_PITCH + offset as u8;
            for &bin in bins {
                fixed.push(Token::Velocity(bin));
                fixed.push(Token::NoteOff(pitch));
            }
        }

        debug!(
            "repaired token sequence: prepended {} note-on, appended {} note-off",
            orphans.len(),
            dangling
        );
        Ok(fixed)
    }

    /// Decode a token sequence into notes sorted by start time
    ///
    /// The sequence is repaired first, so model output with unmatched
    /// presses or releases is accepted.
    pub fn untokenize(&self, tokens: &[Token]) -> Result<Vec<Note>, CodecError> {
        let tokens = self.fix_token_sequences(tokens)?;

        let mut presses = Vec::new();
        let mut releases = Vec::new();
        let mut current_time = 0.0;
        let mut current_velocity = 0;

        for &token in &tokens {
            match token {
                Token::TimeStep(_) => current_time += self.vocab.time().decode(token)?,
                Token::Velocity(bin) => current_velocity = self.vocab.velocity().decode(bin)?,
                Token::NoteOn(pitch) => presses.push(Press {
                    pitch,
                    start: current_time,
                    velocity: current_velocity,
                }),
                Token::NoteOff(pitch) => releases.push(Release {
                    pitch,
                    end: current_time,
                }),
                Token::SequenceStart => {}
            }
        }

        if presses.len() != releases.len() {
            return Err(CodecError::UnbalancedEvents {
                on: presses.len(),
                off: releases.len(),
            });
        }

        // Both lists are chronological; a stable sort by pitch lines up the
        // i-th press of each pitch with the i-th release of the same pitch
        presses.sort_by_key(|press| press.pitch);
        releases.sort_by_key(|release| release.pitch);

        let mut notes: Vec<Note> = presses
            .into_iter()
            .zip(releases)
            .map(|(press, release)| Note::new(press.pitch, press.start, release.end, press.velocity))
            .collect();
        notes.sort_by(|a, b| a.start.total_cmp(&b.start));

        trace!(
            "untokenized {} tokens into {} notes",
            tokens.len(),
            notes.len()
        );
        Ok(notes)
    }

    /// Parse symbols, checking each against this vocabulary
    pub fn parse_symbols<S: AsRef<str>>(&self, symbols: &[S]) -> Result<Vec<Token>, CodecError> {
        symbols
            .iter()
            .map(|symbol| self.vocab.parse_symbol(symbol.as_ref()))
            .collect()
    }

    pub fn tokenize_symbols(&self, notes: &[Note]) -> Result<Vec<String>, CodecError> {
        Ok(self
            .tokenize(notes)?
            .iter()
            .map(Token::to_string)
            .collect())
    }

    pub fn untokenize_symbols<S: AsRef<str>>(&self, symbols: &[S]) -> Result<Vec<Note>, CodecError> {
        self.untokenize(&self.parse_symbols(symbols)?)
    }

    /// Vocabulary indices of a token sequence
    pub fn encode_ids(&self, tokens: &[Token]) -> Result<Vec<usize>, CodecError> {
        tokens.iter().map(|&token| self.vocab.id_of(token)).collect()
    }

    pub fn decode_ids(&self, ids: &[usize]) -> Result<Vec<Token>, CodecError> {
        ids.iter().map(|&id| self.vocab.token(id)).collect()
    }
}

fn pitch_index(pitch: u8) -> usize {
    usize::from(pitch - MIN_PITCH)
}
