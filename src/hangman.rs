/// Hangman is a game where you have to guess a hidden word one letter at a
/// time. Correct guesses reveal every position of the letter at once; wrong
/// guesses add to a miss count, and when the misses reach the configured
/// budget the game is lost.
///
/// This module implements the game logic. Everything here is synchronous and
/// pure: the game state is never stored, it is recomputed from the counts on
/// every call, so it can never go stale.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The 26 uppercase letters the game is played over.
pub const ALPHABET_LEN: usize = 26;

/// Errors the engine can report. Both indicate a defect in the calling layer:
/// the input decoder must filter non-letters, and the preferences layer must
/// validate filters against the pool before starting a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HangmanError {
    #[error("no words in the pool satisfy the current filters")]
    EmptyPool,
    #[error("'{0}' is not an uppercase letter A-Z")]
    InvalidLetter(char),
}

/// State represents the current state of a game. It is always derived from
/// the counts via `evaluate`, never set directly.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    /// No guesses made yet.
    Pending,
    /// In progress, misses still below the danger threshold.
    Progressing,
    /// In progress with misses at or past 60% of the budget.
    Imperiled,
    Won,
    Lost,
    /// Counts violate the session invariants. Fatal; the session must be
    /// discarded.
    Error,
}

impl GameState {
    /// Returns true when no further guesses are accepted.
    pub fn is_over(self) -> bool {
        matches!(self, GameState::Won | GameState::Lost | GameState::Error)
    }
}

/// `evaluate` derives the game state from the counts. First matching rule
/// wins; the order is a deliberate tie-break policy:
///
/// 1. No guesses at all is `Pending`.
/// 2. Misses at or past the budget is `Lost`. `>=` rather than `==` so that
///    lowering `max_misses` mid-round resolves to `Lost` instead of letting a
///    now-over-budget miss count slip through.
/// 3. Every position revealed is `Won`.
/// 4. Counts out of bounds is `Error` (the counts are unsigned, so only the
///    hit-count upper bound is checkable here).
/// 5. Misses at or past 60% of the budget is `Imperiled`.
pub fn evaluate(hit_count: usize, miss_count: u32, word_length: usize, max_misses: u32) -> GameState {
    if hit_count == 0 && miss_count == 0 {
        GameState::Pending
    } else if miss_count >= max_misses {
        GameState::Lost
    } else if hit_count == word_length {
        GameState::Won
    } else if hit_count > word_length {
        GameState::Error
    } else if miss_count as f64 >= 0.6 * max_misses as f64 {
        GameState::Imperiled
    } else {
        GameState::Progressing
    }
}

/// LetterMark is the per-letter guess record.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum LetterMark {
    Unguessed,
    Hit,
    Miss,
}

/// Guess is the outcome of recording one letter.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Guess {
    /// The letter had already been marked (or the game was already over);
    /// nothing changed.
    pub already_guessed: bool,
    /// How many positions of the target word the letter fills. 0 on a miss.
    pub occurrences: usize,
}

/// Ledger tracks the mark for each of the 26 letters. A letter never reverts
/// to `Unguessed` once marked, which makes repeat guesses no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    marks: [LetterMark; ALPHABET_LEN],
}

impl Default for Ledger {
    fn default() -> Self {
        Ledger::new()
    }
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger {
            marks: [LetterMark::Unguessed; ALPHABET_LEN],
        }
    }

    fn index(letter: char) -> Result<usize, HangmanError> {
        if letter.is_ascii_uppercase() {
            Ok(letter as usize - 'A' as usize)
        } else {
            Err(HangmanError::InvalidLetter(letter))
        }
    }

    /// Returns the mark for an uppercase letter.
    pub fn mark(&self, letter: char) -> Result<LetterMark, HangmanError> {
        Ok(self.marks[Self::index(letter)?])
    }

    /// `record` marks a letter against the target word. Idempotent: if the
    /// letter is already marked the call reports `already_guessed` and leaves
    /// the ledger untouched. Otherwise it returns the letter's total
    /// occurrence count in `target`, so a doubled letter scores all of its
    /// positions in one guess.
    pub fn record(&mut self, letter: char, target: &str) -> Result<Guess, HangmanError> {
        let i = Self::index(letter)?;
        if self.marks[i] != LetterMark::Unguessed {
            return Ok(Guess {
                already_guessed: true,
                occurrences: 0,
            });
        }

        let occurrences = target.chars().filter(|&c| c == letter).count();
        self.marks[i] = if occurrences > 0 {
            LetterMark::Hit
        } else {
            LetterMark::Miss
        };

        Ok(Guess {
            already_guessed: false,
            occurrences,
        })
    }

    /// `guessed_letters` returns all marked letters in alphabetical order,
    /// with the mark each one carries.
    pub fn guessed_letters(&self) -> Vec<(char, LetterMark)> {
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, m)| **m != LetterMark::Unguessed)
            .map(|(i, m)| ((b'A' + i as u8) as char, *m))
            .collect()
    }
}

/// GameConfig holds the validated player preferences for a session. Ranges
/// are inclusive.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub max_misses: u32,
    pub word_length: (usize, usize),
    pub grade: (u32, u32),
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            max_misses: 10,
            word_length: (3, 12),
            grade: (1, 12),
        }
    }
}

impl GameConfig {
    pub fn new(
        max_misses: u32,
        word_length: (usize, usize),
        grade: (u32, u32),
    ) -> anyhow::Result<GameConfig> {
        if max_misses == 0 {
            anyhow::bail!("max_misses must be at least 1")
        }
        if word_length.0 > word_length.1 {
            anyhow::bail!("word length range is inverted")
        }
        if grade.0 > grade.1 {
            anyhow::bail!("grade range is inverted")
        }

        Ok(GameConfig {
            max_misses,
            word_length,
            grade,
        })
    }
}

/// Session is one complete play-through: a fixed target word, the guess
/// ledger, and the running counts. It is replaced wholesale on a new game;
/// the target word never changes mid-round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The word the player is trying to reveal. Uppercase, fixed.
    pub target_word: String,
    /// Letter positions revealed so far.
    pub hit_count: usize,
    /// Distinct wrong letters guessed so far.
    pub miss_count: u32,
    pub ledger: Ledger,
    pub config: GameConfig,
}

impl Session {
    /// `new` starts a session over the given word. The word is uppercased
    /// here; the selector already does this, but the invariant belongs to the
    /// session.
    pub fn new(target_word: impl Into<String>, config: GameConfig) -> anyhow::Result<Session> {
        let target_word = target_word.into().to_uppercase();
        if target_word.is_empty() {
            anyhow::bail!("target word must not be empty")
        }
        if !target_word.chars().all(|c| c.is_ascii_uppercase()) {
            anyhow::bail!("target word must contain only letters: {:?}", target_word)
        }

        Ok(Session {
            target_word,
            hit_count: 0,
            miss_count: 0,
            ledger: Ledger::new(),
            config,
        })
    }

    /// `state` recomputes the game state from the current counts.
    pub fn state(&self) -> GameState {
        evaluate(
            self.hit_count,
            self.miss_count,
            self.target_word.chars().count(),
            self.config.max_misses,
        )
    }

    /// `guess` plays one letter. Repeat guesses and guesses after the game is
    /// over change nothing and report `already_guessed`. A hit adds the
    /// letter's full occurrence count to `hit_count`; a miss adds 1 to
    /// `miss_count`. Hit and miss are mutually exclusive per guess.
    pub fn guess(&mut self, letter: char) -> Result<Guess, HangmanError> {
        if self.state().is_over() {
            return Ok(Guess {
                already_guessed: true,
                occurrences: 0,
            });
        }

        let guess = self.ledger.record(letter, &self.target_word)?;
        if !guess.already_guessed {
            if guess.occurrences > 0 {
                self.hit_count += guess.occurrences;
            } else {
                self.miss_count += 1;
            }
        }
        Ok(guess)
    }

    /// `set_max_misses` applies a mid-round difficulty change and returns the
    /// re-evaluated state. The caller is responsible for the confirmation
    /// policy; an accepted reduction may flip the state straight to `Lost`
    /// with no new guess.
    pub fn set_max_misses(&mut self, max_misses: u32) -> GameState {
        self.config.max_misses = max_misses;
        self.state()
    }

    /// `revealed` reports whether a position of the target word should be
    /// shown: its letter was guessed, or the round was lost and everything
    /// unmasks.
    pub fn revealed(&self, letter: char) -> Result<bool, HangmanError> {
        Ok(self.state() == GameState::Lost || self.ledger.mark(letter)? == LetterMark::Hit)
    }
}
