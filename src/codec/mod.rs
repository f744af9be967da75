//! Note/token codec
//!
//! - Token: vocabulary symbols and their text form
//! - Vocabulary: symbol table and index layout
//! - VelocityQuantizer: velocity bins
//! - TimeLadder: time-step ladder and gap decomposition
//! - Events: note expansion and ordering
//! - NoLossTokenizer: encode, repair, decode

pub mod events;
pub mod time;
pub mod token;
pub mod tokenizer;
pub mod velocity;
pub mod vocab;

pub use events::{notes_to_events, Event};
pub use time::TimeLadder;
pub use token::{KeyDirection, Token};
pub use tokenizer::NoLossTokenizer;
pub use velocity::VelocityQuantizer;
pub use vocab::{Vocabulary, VocabularyExport};
