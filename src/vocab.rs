/// The vocabulary source and word selector. The vocabulary is a JSON array of
/// `{"vocabWord": ..., "wordGrade": ...}` records loaded once at startup and
/// treated as a read-only snapshot for the life of the process.
use anyhow::Context;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::hangman::HangmanError;

/// VocabEntry is one candidate word with its difficulty grade. The grade is
/// an external classification (school-grade level) unrelated to game state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabEntry {
    #[serde(rename = "vocabWord")]
    pub word: String,
    #[serde(rename = "wordGrade")]
    pub grade: u32,
}

/// `load_vocab` reads and parses a vocabulary file. Entries whose word is
/// empty or contains non-letters are dropped rather than trusted; the file is
/// an external data contract.
pub fn load_vocab(path: impl AsRef<str>) -> anyhow::Result<Vec<VocabEntry>> {
    let contents = std::fs::read_to_string(path.as_ref())
        .context(format!("Error reading vocabulary file {}", path.as_ref()))?;

    let pool: Vec<VocabEntry> = serde_json::from_str(&contents)
        .context(format!("Error parsing vocabulary file {}", path.as_ref()))?;

    Ok(pool
        .into_iter()
        .filter(|e| !e.word.is_empty() && e.word.chars().all(|c| c.is_ascii_alphabetic()))
        .collect())
}

/// `select_word` picks a target word uniformly at random from the entries
/// whose length and grade fall within the given inclusive ranges. Returns the
/// word uppercased; the case of the source data is irrelevant to gameplay.
/// Fails with `EmptyPool` when the filters leave nothing, which the caller
/// must surface before a session starts.
pub fn select_word(
    pool: &[VocabEntry],
    word_length: (usize, usize),
    grade: (u32, u32),
) -> Result<String, HangmanError> {
    let filtered = pool
        .iter()
        .filter(|e| {
            let len = e.word.chars().count();
            len >= word_length.0 && len <= word_length.1 && e.grade >= grade.0 && e.grade <= grade.1
        })
        .collect::<Vec<_>>();

    filtered
        .choose(&mut rand::thread_rng())
        .map(|e| e.word.to_uppercase())
        .ok_or(HangmanError::EmptyPool)
}
