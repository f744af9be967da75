//! Time-step ladder and greedy time-delta decomposition
//!
//! The ladder is `eps, 2·eps, 4·eps, ...` up to the largest rung below one
//! second. A gap is filled largest rung first; a rung may repeat, so gaps
//! longer than the coarsest rung are covered by repeating it.

use crate::codec::token::Token;
use crate::error::CodecError;

/// Upper bound on loop iterations for a single gap
///
/// Gaps far beyond the coarsest rung need one iteration per repetition;
/// past this bound the decomposition is reported as failed.
pub const MAX_DECOMPOSITION_STEPS: usize = 1 << 24;

/// Geometric ladder of time-step durations
#[derive(Debug, Clone, PartialEq)]
pub struct TimeLadder {
    eps: f64,
    rungs: Vec<f64>,
}

impl TimeLadder {
    /// Build the ladder for `eps`. Callers validate `0 < eps < 1` beforehand,
    /// which guarantees at least one rung.
    pub(crate) fn new(eps: f64) -> Self {
        let mut rungs = Vec::new();
        let mut dt = eps;
        while dt < 1.0 {
            rungs.push(dt);
            dt *= 2.0;
        }
        Self { eps, rungs }
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Number of rungs
    pub fn len(&self) -> usize {
        self.rungs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }

    /// Duration of each rung, finest first
    pub fn rungs(&self) -> &[f64] {
        &self.rungs
    }

    /// Duration of the coarsest rung
    pub fn max_time_value(&self) -> f64 {
        self.rungs.last().copied().unwrap_or(self.eps)
    }

    /// Decompose `dt` into time-step tokens whose durations sum to within `eps` of it
    ///
    /// The comparisons are strict (`< eps` to stop, `> eps` to step down a
    /// rung). A gap whose running overshoot lands exactly on `eps` cannot be
    /// filled and is reported as `TimeDecomposition`.
    pub fn encode(&self, dt: f64) -> Result<Vec<Token>, CodecError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(CodecError::InvalidDuration(dt));
        }

        let mut tokens = Vec::new();
        let mut filled = 0.0;
        let mut rung = self.rungs.len().saturating_sub(1);

        for _ in 0..MAX_DECOMPOSITION_STEPS {
            if (dt - filled).abs() < self.eps {
                return Ok(tokens);
            }
            let step = self.rungs[rung];
            if filled + step - dt > self.eps {
                rung = rung
                    .checked_sub(1)
                    .ok_or(CodecError::TimeDecomposition { dt })?;
            } else {
                tokens.push(Token::TimeStep(rung));
                filled += step;
            }
        }

        Err(CodecError::TimeDecomposition { dt })
    }

    /// Duration of a single time-step token
    pub fn decode(&self, token: Token) -> Result<f64, CodecError> {
        match token {
            Token::TimeStep(rung) => self
                .rungs
                .get(rung)
                .copied()
                .ok_or(CodecError::TokenOutOfVocabulary(token)),
            other => Err(CodecError::NotATimeStep(other)),
        }
    }

    /// Total duration of a run of time-step tokens
    pub fn decode_sum(&self, tokens: &[Token]) -> Result<f64, CodecError> {
        tokens
            .iter()
            .try_fold(0.0, |total, &token| Ok(total + self.decode(token)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ladder_shape() {
        let ladder = TimeLadder::new(0.001);
        // 0.001 * 2^9 = 0.512 is the last rung below 1.0
        assert_eq!(ladder.len(), 10);
        assert_eq!(ladder.rungs()[0], 0.001);
        assert_abs_diff_eq!(ladder.max_time_value(), 0.512, epsilon = 1e-12);
        for pair in ladder.rungs().windows(2) {
            assert_eq!(pair[1], pair[0] * 2.0);
        }
    }

    #[test]
    fn test_ladder_coarse_eps() {
        let ladder = TimeLadder::new(0.6);
        assert_eq!(ladder.rungs(), &[0.6]);
        assert_eq!(ladder.max_time_value(), 0.6);
    }

    #[test]
    fn test_encode_zero() {
        let ladder = TimeLadder::new(0.01);
        assert!(ladder.encode(0.0).unwrap().is_empty());
        // below tolerance
        assert!(ladder.encode(0.009).unwrap().is_empty());
    }

    #[test]
    fn test_encode_largest_first() {
        let ladder = TimeLadder::new(0.001);
        let tokens = ladder.encode(0.5).unwrap();
        let rungs: Vec<usize> = tokens
            .iter()
            .map(|t| match t {
                Token::TimeStep(r) => *r,
                _ => unreachable!(),
            })
            .collect();
        // non-increasing rungs
        for pair in rungs.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert_abs_diff_eq!(ladder.decode_sum(&tokens).unwrap(), 0.5, epsilon = 0.001);
    }

    #[test]
    fn test_encode_repeats_coarsest_rung() {
        let ladder = TimeLadder::new(0.01);
        let max = ladder.max_time_value();
        let coarsest = Token::TimeStep(ladder.len() - 1);
        let tokens = ladder.encode(max * 5.0).unwrap();
        assert_eq!(tokens, vec![coarsest; 5]);

        let tokens = ladder.encode(12.3).unwrap();
        assert!(tokens.iter().filter(|&&t| t == coarsest).count() >= 19);
        assert!((ladder.decode_sum(&tokens).unwrap() - 12.3).abs() < 0.01);
    }

    #[test]
    fn test_encode_invalid() {
        let ladder = TimeLadder::new(0.01);
        assert!(matches!(
            ladder.encode(-0.5),
            Err(CodecError::InvalidDuration(_))
        ));
        assert!(matches!(
            ladder.encode(f64::NAN),
            Err(CodecError::InvalidDuration(_))
        ));
        assert!(matches!(
            ladder.encode(f64::INFINITY),
            Err(CodecError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_encode_beyond_cap() {
        let ladder = TimeLadder::new(0.5);
        assert_eq!(
            ladder.encode(1e12),
            Err(CodecError::TimeDecomposition { dt: 1e12 })
        );
    }

    #[test]
    fn test_decode() {
        let ladder = TimeLadder::new(0.01);
        assert_eq!(ladder.decode(Token::TimeStep(0)).unwrap(), 0.01);
        assert_eq!(ladder.decode(Token::TimeStep(2)).unwrap(), 0.04);
        assert_eq!(
            ladder.decode(Token::TimeStep(99)),
            Err(CodecError::TokenOutOfVocabulary(Token::TimeStep(99)))
        );
        assert_eq!(
            ladder.decode(Token::NoteOn(60)),
            Err(CodecError::NotATimeStep(Token::NoteOn(60)))
        );
    }
}
