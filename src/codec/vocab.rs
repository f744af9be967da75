//! Vocabulary construction and export
//!
//! Index layout, in assignment order:
//! - `<CLS>`
//! - `NOTE_ON_p`, `NOTE_OFF_p` pairs for p = 21..=108
//! - `VELOCITY_b` for b = 0..n_velocity_bins
//! - time steps `1T`..`KT`, finest first
//!
//! Ids are computed arithmetically from the token, and tokens are looked up
//! by id in a flat table, so both directions are O(1).

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::codec::time::TimeLadder;
use crate::codec::token::Token;
use crate::codec::velocity::VelocityQuantizer;
use crate::config::TokenizerConfig;
use crate::error::CodecError;
use crate::note::{is_supported_pitch, MAX_PITCH, MIN_PITCH, PITCH_COUNT};

const SPECIALS: [Token; 1] = [Token::SequenceStart];
const NOTE_OFFSET: usize = SPECIALS.len();
const VELOCITY_OFFSET: usize = NOTE_OFFSET + 2 * PITCH_COUNT;

/// Immutable symbol table together with the velocity and time tables it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    config: TokenizerConfig,
    tokens: Vec<Token>,
    velocity: VelocityQuantizer,
    time: TimeLadder,
}

/// Serializable view of a vocabulary, for use as a model's embedding dictionary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyExport {
    pub name: String,
    pub parameters: TokenizerConfig,
    pub vocab: Vec<String>,
    pub token_to_id: BTreeMap<String, usize>,
}

impl Vocabulary {
    /// Build every table for `config`, or fail without building anything
    pub fn build(config: TokenizerConfig) -> Result<Self, CodecError> {
        config.validate()?;

        let velocity = VelocityQuantizer::new(config.n_velocity_bins);
        let time = TimeLadder::new(config.eps);

        let mut tokens = Vec::with_capacity(
            SPECIALS.len() + 2 * PITCH_COUNT + velocity.n_bins() + time.len(),
        );
        tokens.extend(SPECIALS);
        for pitch in MIN_PITCH..=MAX_PITCH {
            tokens.push(Token::NoteOn(pitch));
            tokens.push(Token::NoteOff(pitch));
        }
        tokens.extend((0..velocity.n_bins()).map(Token::Velocity));
        tokens.extend((0..time.len()).map(Token::TimeStep));

        debug!(
            "built vocabulary: eps={}, velocity_bins={}, time_steps={}, size={}",
            config.eps,
            config.n_velocity_bins,
            time.len(),
            tokens.len()
        );

        Ok(Self {
            config,
            tokens,
            velocity,
            time,
        })
    }

    pub fn config(&self) -> TokenizerConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// All tokens in index order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn velocity(&self) -> &VelocityQuantizer {
        &self.velocity
    }

    pub fn time(&self) -> &TimeLadder {
        &self.time
    }

    pub fn contains(&self, token: Token) -> bool {
        self.id_of(token).is_ok()
    }

    /// Index of a token, failing if it does not belong to this vocabulary
    pub fn id_of(&self, token: Token) -> Result<usize, CodecError> {
        let id = match token {
            Token::SequenceStart => Some(0),
            Token::NoteOn(pitch) if is_supported_pitch(pitch) => {
                Some(NOTE_OFFSET + 2 * usize::from(pitch - MIN_PITCH))
            }
            Token::NoteOff(pitch) if is_supported_pitch(pitch) => {
                Some(NOTE_OFFSET + 2 * usize::from(pitch - MIN_PITCH) + 1)
            }
            Token::Velocity(bin) if bin < self.velocity.n_bins() => Some(VELOCITY_OFFSET + bin),
            Token::TimeStep(rung) if rung < self.time.len() => {
                Some(VELOCITY_OFFSET + self.velocity.n_bins() + rung)
            }
            _ => None,
        };
        id.ok_or(CodecError::TokenOutOfVocabulary(token))
    }

    /// Token stored at an index
    pub fn token(&self, id: usize) -> Result<Token, CodecError> {
        self.tokens
            .get(id)
            .copied()
            .ok_or(CodecError::UnknownTokenId(id))
    }

    /// Parse a symbol and check that it belongs to this vocabulary
    pub fn parse_symbol(&self, symbol: &str) -> Result<Token, CodecError> {
        let token: Token = symbol.parse()?;
        if self.contains(token) {
            Ok(token)
        } else {
            Err(CodecError::UnknownSymbol(symbol.to_string()))
        }
    }

    /// Symbol text of every token, in index order
    pub fn symbols(&self) -> Vec<String> {
        self.tokens.iter().map(Token::to_string).collect()
    }

    pub fn export(&self, name: &str) -> VocabularyExport {
        let vocab = self.symbols();
        let token_to_id = vocab
            .iter()
            .enumerate()
            .map(|(id, symbol)| (symbol.clone(), id))
            .collect();
        VocabularyExport {
            name: name.to_string(),
            parameters: self.config,
            vocab,
            token_to_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(eps: f64, bins: usize) -> Vocabulary {
        Vocabulary::build(TokenizerConfig::new(eps, bins)).unwrap()
    }

    #[test]
    fn test_layout() {
        let v = vocab(0.001, 2);
        // 1 special + 176 note tokens + 2 velocity + 10 time steps
        assert_eq!(v.len(), 189);
        assert_eq!(v.token(0).unwrap(), Token::SequenceStart);
        assert_eq!(v.token(1).unwrap(), Token::NoteOn(21));
        assert_eq!(v.token(2).unwrap(), Token::NoteOff(21));
        assert_eq!(v.token(176).unwrap(), Token::NoteOff(108));
        assert_eq!(v.token(177).unwrap(), Token::Velocity(0));
        assert_eq!(v.token(179).unwrap(), Token::TimeStep(0));
        assert_eq!(v.token(188).unwrap(), Token::TimeStep(9));
        assert_eq!(v.token(189), Err(CodecError::UnknownTokenId(189)));
    }

    #[test]
    fn test_ids_match_positions() {
        let v = vocab(0.01, 32);
        for (id, &token) in v.tokens().iter().enumerate() {
            assert_eq!(v.id_of(token).unwrap(), id);
        }
    }

    #[test]
    fn test_out_of_vocabulary() {
        let v = vocab(0.01, 32);
        for token in [
            Token::NoteOn(20),
            Token::NoteOff(109),
            Token::Velocity(32),
            Token::TimeStep(v.time().len()),
        ] {
            assert_eq!(v.id_of(token), Err(CodecError::TokenOutOfVocabulary(token)));
        }
    }

    #[test]
    fn test_parse_symbol() {
        let v = vocab(0.01, 32);
        assert_eq!(v.parse_symbol("NOTE_ON_60").unwrap(), Token::NoteOn(60));
        assert_eq!(v.parse_symbol("7T").unwrap(), Token::TimeStep(6));
        assert_eq!(
            v.parse_symbol("VELOCITY_32"),
            Err(CodecError::UnknownSymbol("VELOCITY_32".to_string()))
        );
        assert_eq!(
            v.parse_symbol("8T"),
            Err(CodecError::UnknownSymbol("8T".to_string()))
        );
    }

    #[test]
    fn test_symbols_are_unique() {
        let v = vocab(0.001, 128);
        let export = v.export("NoLossTokenizer");
        assert_eq!(export.vocab.len(), v.len());
        assert_eq!(export.token_to_id.len(), v.len());
        assert_eq!(export.token_to_id["<CLS>"], 0);
        assert_eq!(export.token_to_id["NOTE_ON_21"], 1);
        assert_eq!(export.token_to_id["1T"], 1 + 176 + 128);
    }

    #[test]
    fn test_invalid_config_builds_nothing() {
        assert_eq!(
            Vocabulary::build(TokenizerConfig::new(1.5, 4)),
            Err(CodecError::InvalidEps(1.5))
        );
        assert_eq!(
            Vocabulary::build(TokenizerConfig::new(0.01, 0)),
            Err(CodecError::InvalidVelocityBins(0))
        );
    }
}
