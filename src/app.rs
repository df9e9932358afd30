/// App is the main bot application and handler state. It implements the outer
/// game logic: per-user sessions, preferences, scores, and persistence. The
/// engine itself lives in `hangman`; this layer owns the single live Session
/// per chat and mutates it synchronously to completion per event.
use anyhow::*;
use log::*;
use mobot::{api::User, *};
use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    sync::Arc,
};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
    sync::RwLock,
};

use serde::{Deserialize, Serialize};

use crate::hangman::{GameConfig, GameState, Session};
use crate::vocab::{self, VocabEntry};

/// Move is the outcome of one guess, shaped for reply rendering.
#[derive(Debug, Clone, Copy)]
pub enum Move {
    /// The letter was already guessed (or the game was already over).
    Repeat(char),
    /// The letter fills this many positions of the word.
    Hit(char, usize),
    Miss(char),
    Won,
    Lost,
}

/// A preference change that touches a live round and is waiting for the
/// player to confirm it.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PendingChange {
    Reset,
    MaxMisses(u32),
}

/// The result of asking for a preference change.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConfigChange {
    /// Applied immediately; carries the re-evaluated state of the current
    /// session, if there is one.
    Applied(Option<GameState>),
    /// A round is live; the change is parked until /confirm.
    NeedsConfirm,
}

/// Score represents a user's score.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Score {
    pub games: u32,
    pub wins: u32,
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.0}% ({}/{})",
            self.wins as f32 / self.games as f32 * 100.0,
            self.wins,
            self.games
        )
    }
}

/// SaveData represents the data that is saved for each user on disk. Data
/// is saved in JSON format.
#[derive(Serialize, Deserialize)]
struct SaveData {
    user_id: String,
    #[serde(default)]
    user_handle: String,
    #[serde(default)]
    user_first_name: String,
    #[serde(default)]
    user_last_name: String,
    #[serde(default)]
    won_words: Vec<String>,
    #[serde(default)]
    played_words: Vec<String>,
    score: Score,
    #[serde(default)]
    config: GameConfig,
    last_session: Option<Session>,
}

/// App represents the bot state for the hangman bot.
#[derive(Clone, Default, BotState)]
pub struct App {
    // App global
    pub game_name: String,
    pub admin_user: Option<String>,
    admin_chat_id: Arc<RwLock<Option<i64>>>,
    save_dir: String,
    scores: Arc<RwLock<HashMap<String, Score>>>,
    vocab: Arc<Vec<VocabEntry>>,

    // Per chat ID
    pub session: Option<Session>,
    pub config: GameConfig,
    pub pending: Option<PendingChange>,
    deferred_max_misses: Option<u32>,
    played_words: HashSet<String>,
    won_words: HashSet<String>,
}

impl App {
    /// Creates a new App instance over a vocabulary snapshot.
    pub fn new(game_name: String, vocab: Vec<VocabEntry>) -> App {
        App {
            game_name,
            vocab: Arc::new(vocab),
            ..Default::default()
        }
    }

    /// Returns true while the current session still accepts guesses
    /// (including a fresh session awaiting its first guess).
    pub fn is_playing(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| !s.state().is_over())
            .unwrap_or(false)
    }

    /// Returns true while guesses have been made and the round is neither won
    /// nor lost. This is the window where preference changes need the
    /// player's confirmation.
    pub fn in_live_round(&self) -> bool {
        matches!(
            self.session.as_ref().map(Session::state),
            Some(GameState::Progressing) | Some(GameState::Imperiled)
        )
    }

    /// Starts a new session, discarding any previous one. Applies a deferred
    /// difficulty change first, then picks a word matching the current
    /// preferences. Prefers words this user hasn't played yet; once all
    /// matching words are played it draws from the whole filtered pool again.
    pub async fn start_game(&mut self) -> Result<String> {
        if let Some(max_misses) = self.deferred_max_misses.take() {
            self.config.max_misses = max_misses;
        }
        self.pending = None;

        let unplayed = self
            .vocab
            .iter()
            .filter(|e| !self.played_words.contains(&e.word.to_uppercase()))
            .cloned()
            .collect::<Vec<_>>();

        let target_word =
            vocab::select_word(&unplayed, self.config.word_length, self.config.grade).or_else(
                |_| vocab::select_word(&self.vocab, self.config.word_length, self.config.grade),
            )?;

        self.session = Some(Session::new(target_word.clone(), self.config.clone())?);
        self.played_words.insert(target_word.clone());
        Ok(target_word)
    }

    /// Plays one letter against the current session. On a broken session
    /// (ERROR state) the session is discarded and the error surfaced; there
    /// is no recovery path.
    pub async fn play_guess(&mut self, from: &User, letter: char) -> Result<Move> {
        let session = self.session.as_mut().ok_or(anyhow!("no active session"))?;
        let guess = session.guess(letter)?;

        if guess.already_guessed {
            return Ok(Move::Repeat(letter));
        }

        match session.state() {
            GameState::Won => {
                self.inc_wins(from).await;
                Ok(Move::Won)
            }
            GameState::Lost => {
                if let Err(e) = self.save(from).await {
                    error!("Error saving game state: {}", e);
                }
                Ok(Move::Lost)
            }
            GameState::Error => {
                self.session = None;
                bail!("session reached an invalid state and was discarded")
            }
            _ => {
                // The handler reloads saved state on every message, so the
                // round must be persisted after each guess or a reload would
                // roll it back.
                if let Err(e) = self.save(from).await {
                    error!("Error saving game state: {}", e);
                }
                if guess.occurrences > 0 {
                    Ok(Move::Hit(letter, guess.occurrences))
                } else {
                    Ok(Move::Miss(letter))
                }
            }
        }
    }

    /// Asks to change the miss budget. Outside a live round it applies
    /// immediately (re-evaluating any fresh session); inside one it is parked
    /// until the player confirms.
    pub fn request_max_misses(&mut self, max_misses: u32) -> Result<ConfigChange> {
        if max_misses == 0 {
            bail!("the miss budget must be at least 1")
        }

        if self.in_live_round() {
            self.pending = Some(PendingChange::MaxMisses(max_misses));
            return Ok(ConfigChange::NeedsConfirm);
        }

        self.config.max_misses = max_misses;
        let state = self.session.as_mut().map(|s| s.set_max_misses(max_misses));
        Ok(ConfigChange::Applied(state))
    }

    /// Sets the word length range for future sessions. The current word is
    /// fixed, so no confirmation is needed.
    pub fn set_word_length(&mut self, low: usize, high: usize) -> Result<()> {
        if low > high {
            bail!("word length range is inverted")
        }
        self.config.word_length = (low, high);
        Ok(())
    }

    /// Sets the grade range for future sessions.
    pub fn set_grade(&mut self, low: u32, high: u32) -> Result<()> {
        if low > high {
            bail!("grade range is inverted")
        }
        self.config.grade = (low, high);
        Ok(())
    }

    /// Asks to abandon the current round. Needs confirmation only while the
    /// round is live.
    pub fn request_reset(&mut self) -> ConfigChange {
        if self.in_live_round() {
            self.pending = Some(PendingChange::Reset);
            ConfigChange::NeedsConfirm
        } else {
            ConfigChange::Applied(None)
        }
    }

    /// Applies the parked change. A confirmed difficulty change re-evaluates
    /// the live session immediately, which may flip it straight to LOST.
    pub fn confirm_pending(&mut self) -> Option<PendingChange> {
        let pending = self.pending.take()?;
        if let PendingChange::MaxMisses(max_misses) = pending {
            self.config.max_misses = max_misses;
            if let Some(session) = self.session.as_mut() {
                session.set_max_misses(max_misses);
            }
        }
        Some(pending)
    }

    /// Declines the parked change. A declined difficulty change is deferred
    /// to the next session; a declined reset just evaporates.
    pub fn decline_pending(&mut self) {
        if let Some(PendingChange::MaxMisses(max_misses)) = self.pending.take() {
            self.deferred_max_misses = Some(max_misses);
        }
    }

    /// Authorizes the user as an admin.
    pub async fn auth_admin(&mut self, username: &str, chat_id: i64) -> bool {
        if self.admin_user.is_some() && self.admin_user.as_ref().unwrap().eq(username) {
            *self.admin_chat_id.write().await = Some(chat_id);
            return true;
        }
        false
    }

    /// Sends a log message to the admin chat
    pub async fn admin_log(&self, api: Arc<API>, text: String) {
        let chat_id = *self.admin_chat_id.read().await;
        if let Some(chat_id) = chat_id {
            _ = api
                .send_message(&api::SendMessageRequest {
                    chat_id,
                    text: format!("`{}`", api::escape_code(text.as_str())),
                    parse_mode: Some(api::ParseMode::MarkdownV2),
                    ..Default::default()
                })
                .await;
        }
    }

    /// Set the directory where game state is saved.
    pub fn set_save_dir(&mut self, save_dir: String) {
        self.save_dir = save_dir;
    }

    /// Returns the user's current score
    pub async fn score(&self, from: &String) -> Score {
        self.scores
            .read()
            .await
            .get(from)
            .cloned()
            .unwrap_or_default()
    }

    /// Increments the number of games this user played and saves state.
    pub async fn inc_games(&self, from: &User) {
        self.scores
            .write()
            .await
            .entry(from.id.to_string())
            .or_default()
            .games += 1;
        if let Err(e) = self.save(from).await {
            error!("Error saving game state: {}", e);
        }
    }

    /// Increments the number of wins for this user and saves state.
    pub async fn inc_wins(&mut self, from: &User) {
        self.scores
            .write()
            .await
            .entry(from.id.to_string())
            .or_default()
            .wins += 1;
        if let Some(session) = self.session.as_ref() {
            self.won_words.insert(session.target_word.clone());
        }
        if let Err(e) = self.save(from).await {
            error!("Error saving game state: {}", e);
        }
    }

    /// Save game state for user
    pub async fn save(&self, user: &User) -> anyhow::Result<()> {
        if self.save_dir.is_empty() {
            return Ok(());
        }

        let filename = format!("{}/{}.json", self.save_dir, user.id);

        let mut file = File::create(filename.clone())
            .await
            .context(format!("Error creating file {}", filename))?;

        let save_data = SaveData {
            user_id: user.id.clone().to_string(),
            user_handle: user.username.clone().unwrap_or_default(),
            user_first_name: user.first_name.clone(),
            user_last_name: user.last_name.clone().unwrap_or_default(),
            played_words: self.played_words.iter().cloned().collect(),
            won_words: self.won_words.iter().cloned().collect(),
            score: self.score(&user.id.to_string()).await,
            config: self.config.clone(),
            last_session: self.session.clone(),
        };

        file.write_all(
            serde_json::to_vec(&save_data)
                .context("Error serializing game state")?
                .as_ref(),
        )
        .await
        .context(format!("Error writing file {}", filename))
    }

    /// Load game state for user.
    pub async fn load(&mut self, user: &User) -> anyhow::Result<()> {
        if self.save_dir.is_empty() {
            bail!("No save directory configured");
        }

        let filename = format!("{}/{}.json", self.save_dir, user.id);

        let mut file = File::open(filename.clone())
            .await
            .context(format!("Error opening file {}", filename))?;

        let mut contents = vec![];
        file.read_to_end(&mut contents)
            .await
            .context(format!("Error reading file {}", filename))?;

        let save_data: SaveData = serde_json::from_slice(&contents)
            .context(format!("Error deserializing game state from {}", filename))?;

        self.won_words = HashSet::from_iter(save_data.won_words);
        self.played_words = HashSet::from_iter(save_data.played_words);
        self.scores
            .write()
            .await
            .insert(user.id.to_string(), save_data.score);
        self.config = save_data.config;
        self.session = save_data.last_session;

        Ok(())
    }
}
