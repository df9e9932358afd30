use std::sync::Arc;

use anyhow::anyhow;
use log::*;
use mobot::api::escape_md;
use mobot::*;

use crate::app::*;
use crate::figure::{self, Face, Part};
use crate::hangman::{GameState, LetterMark, Session};

/// emoji_letter takes a capital letter and returns the corresponding emoji letter
/// inside the Regional Indicator Symbol range.
fn emoji_letter(l: char) -> char {
    let base = 0x1F1E6;
    let a = 'A' as u32;
    let target = l.to_ascii_uppercase() as u32;

    std::char::from_u32(base + target - a).unwrap_or('?')
}

/// face_emoji picks the expression for the status line from the part flags.
fn face_emoji(parts: &[Part]) -> Option<&'static str> {
    if parts.contains(&Part::Mouth(Face::Happy)) {
        Some("\u{1F600}")
    } else if parts.contains(&Part::Mouth(Face::Worried)) {
        Some("\u{1F61F}")
    } else if parts.contains(&Part::Mouth(Face::Dead)) {
        Some("\u{1F480}")
    } else if parts.contains(&Part::Mouth(Face::Normal)) {
        Some("\u{1F642}")
    } else {
        None
    }
}

/// render_figure draws the gallows scene as monospace text from the part
/// flags. Head and nose unlock together, so one glyph covers both.
fn render_figure(session: &Session) -> String {
    let state = session.state();
    let parts = figure::parts(state, session.miss_count, session.config.max_misses);
    let has = |p: Part| parts.contains(&p);

    let mut s = String::from("  ____\n");
    s.push_str(if has(Part::Rope) { " |   !\n" } else { " |\n" });
    s.push_str(if has(Part::Head) { " |   O\n" } else { " |\n" });

    let lh = if has(Part::LeftHand) { "-" } else { " " };
    let la = if has(Part::LeftArm) { "\\" } else { " " };
    let body = if has(Part::Body) { "|" } else { " " };
    let ra = if has(Part::RightArm) { "/" } else { " " };
    let rh = if has(Part::RightHand) { "-" } else { "" };
    s.push_str(&format!(" | {}{}{}{}{}\n", lh, la, body, ra, rh));

    let lf = if has(Part::LeftFoot) { "_" } else { " " };
    let ll = if has(Part::LeftLeg) { "/" } else { " " };
    let rl = if has(Part::RightLeg) { "\\" } else { " " };
    let rf = if has(Part::RightFoot) { "_" } else { "" };
    s.push_str(&format!(" | {}{} {}{}\n", lf, ll, rl, rf));
    s.push_str("_|_\n");
    s
}

/// render_word shows the target word with guessed letters revealed as emoji
/// letters and the rest masked. On a lost round everything unmasks.
fn render_word(session: &Session) -> anyhow::Result<String> {
    let mut s = String::new();
    for c in session.target_word.chars() {
        if session.revealed(c)? {
            s.push(emoji_letter(c));
        } else {
            s.push('\u{25FB}');
        }
        s.push(' ');
    }
    Ok(s)
}

/// render_ledger lists the guessed letters in order, striking out the misses.
fn render_ledger(session: &Session) -> String {
    session
        .ledger
        .guessed_letters()
        .iter()
        .map(|(c, mark)| match mark {
            LetterMark::Miss => format!("~{}~", c),
            _ => format!("`{}`", c),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// render_board is the full game view: figure, status face, word, and ledger.
fn render_board(session: &Session) -> anyhow::Result<String> {
    let state = session.state();
    let parts = figure::parts(state, session.miss_count, session.config.max_misses);

    let mut s = format!("```\n{}```\n", render_figure(session));
    s.push_str(&render_word(session)?);
    if let Some(face) = face_emoji(&parts) {
        s.push_str(&format!("  {}", face));
    }
    s.push_str("\n\n");

    let ledger = render_ledger(session);
    if !ledger.is_empty() {
        s.push_str(&format!("Guessed: {}\n", ledger));
    }
    s.push_str(&format!(
        "Misses: {} of {}\n",
        session.miss_count, session.config.max_misses
    ));
    Ok(s)
}

pub async fn handle_new_game(e: Event, state: State<App>) -> Result<Action, anyhow::Error> {
    // Get the sender's first name
    let from = e.update.get_message()?.clone().from.unwrap_or_default();

    // Get the application state
    let mut app = state.get().write().await;

    let target_word = match app.start_game().await {
        Ok(word) => word,
        Err(err) => {
            // Usually an empty filtered pool. Surface it before any session
            // starts instead of leaving the player in a dead chat.
            warn!("Could not start a game: {}", err);
            return Ok(Action::ReplyText(format!(
                "No game for you yet: {}. Try relaxing /length or /grade.",
                err
            )));
        }
    };
    app.inc_games(&from).await; // saves state

    info!(
        "Starting new game with {} ({}), target word: {}.",
        from.first_name,
        from.username.clone().unwrap_or("unknown".into()),
        target_word
    );

    app.admin_log(
        Arc::clone(&e.api),
        format!(
            "{} ({}) starting a new game with word {}.",
            from.first_name,
            from.username.clone().unwrap_or_default(),
            target_word,
        ),
    )
    .await;

    let first_game = if app.score(&from.id.to_string()).await.games <= 1 {
        "This is your first game.".to_string()
    } else {
        format!("Your score: {}.", app.score(&from.id.to_string()).await)
    };

    Ok(Action::ReplyText(format!(
        "Hi {}, Welcome to {}!\n\n{}\nGuess the {}-letter word one letter at a time. You can miss {} times.",
        from.first_name,
        app.game_name,
        first_game,
        target_word.chars().count(),
        app.config.max_misses,
    )))
}

pub async fn handle_bot_command(e: Event, state: State<App>) -> Result<Action, anyhow::Error> {
    // Get the command
    let command = e
        .update
        .get_message()?
        .text
        .as_ref()
        .ok_or(anyhow!("No command"))?
        .clone();
    let mut args = command.split_whitespace();
    let command = args.next().unwrap_or_default();

    let reply = match command {
        "/help" => {
            let game_name = state.get().read().await.game_name.clone();
            format!(
                "Welcome to {}! Guess the hidden word one letter at a time before the figure is fully drawn.

/new starts over, /difficulty sets how many misses you get (3, 5, 7 or 10),
/length and /grade narrow the word pool, /score shows your score.",
                game_name
            )
        }

        "/new" | "/start" => {
            let needs_confirm = {
                let mut app = state.get().write().await;
                app.request_reset() == ConfigChange::NeedsConfirm
            };
            if needs_confirm {
                "This will reset your game in progress. Send /confirm to go ahead.".into()
            } else {
                return handle_new_game(e, state).await;
            }
        }

        "/confirm" => {
            let confirmed = {
                let mut app = state.get().write().await;
                app.confirm_pending()
            };
            match confirmed {
                Some(PendingChange::Reset) => {
                    return handle_new_game(e, state).await;
                }
                Some(PendingChange::MaxMisses(max_misses)) => {
                    let app = state.get().read().await;
                    let session = app.session.as_ref().ok_or(anyhow!("no active session"))?;
                    let mut reply = format!(
                        "Miss budget is now {}\\.\n\n{}",
                        max_misses,
                        render_board(session)?
                    );
                    // A stricter budget can end the round on the spot.
                    if session.state() == GameState::Lost {
                        reply.push_str(&format!(
                            "\nThat put you over budget\\. The word was {}\\. Send /new to play again\\.",
                            session.target_word
                        ));
                    }
                    return Ok(Action::ReplyMarkdown(reply));
                }
                None => "Nothing to confirm.".into(),
            }
        }

        "/difficulty" => {
            let max_misses: u32 = match args.next().map(str::parse) {
                Some(Ok(n)) => n,
                _ => {
                    return Ok(Action::ReplyText(
                        "Usage: /difficulty <misses>, e.g. /difficulty 5. Standard values: 3, 5, 7, 10."
                            .into(),
                    ))
                }
            };

            let mut app = state.get().write().await;
            match app.request_max_misses(max_misses) {
                Ok(ConfigChange::NeedsConfirm) => {
                    "Changing the miss budget mid-game can end it immediately. \
                     Send /confirm to apply now; otherwise it applies from your next game."
                        .into()
                }
                Ok(ConfigChange::Applied(_)) => {
                    format!("Miss budget set to {}.", max_misses)
                }
                Err(err) => format!("Can't do that: {}.", err),
            }
        }

        "/length" => {
            let (low, high) = match (args.next().map(str::parse), args.next().map(str::parse)) {
                (Some(Ok(low)), Some(Ok(high))) => (low, high),
                _ => {
                    return Ok(Action::ReplyText(
                        "Usage: /length <low> <high>, e.g. /length 4 8.".into(),
                    ))
                }
            };
            let mut app = state.get().write().await;
            match app.set_word_length(low, high) {
                Ok(()) => format!(
                    "Word length set to {}-{} letters, starting with your next game.",
                    low, high
                ),
                Err(err) => format!("Can't do that: {}.", err),
            }
        }

        "/grade" => {
            let (low, high) = match (args.next().map(str::parse), args.next().map(str::parse)) {
                (Some(Ok(low)), Some(Ok(high))) => (low, high),
                _ => {
                    return Ok(Action::ReplyText(
                        "Usage: /grade <low> <high>, e.g. /grade 2 6.".into(),
                    ))
                }
            };
            let mut app = state.get().write().await;
            match app.set_grade(low, high) {
                Ok(()) => format!(
                    "Word grade set to {}-{}, starting with your next game.",
                    low, high
                ),
                Err(err) => format!("Can't do that: {}.", err),
            }
        }

        "/admin" => {
            let mut app = state.get().write().await;
            if app
                .auth_admin(
                    e.update
                        .from_user()?
                        .username
                        .clone()
                        .unwrap_or_default()
                        .as_str(),
                    e.update.chat_id()?,
                )
                .await
            {
                "Admin messages routed to this chat.".into()
            } else {
                "You are not an admin.".into()
            }
        }

        "/score" => {
            let from = e.update.get_message()?.clone().from.unwrap_or_default();
            let mut app = state.get().write().await;

            if let Err(e) = app.load(&from).await {
                warn!("No saved game state: {}", e);
                "You have not played any games yet.".to_string()
            } else {
                format!("Your score: {}", app.score(&from.id.to_string()).await)
            }
        }

        _ => "I don't know that command.".into(),
    };

    Ok(Action::ReplyText(reply))
}

/// handle_chat_event is the main Telegram handler for the bot. It decodes a
/// message into either a command or a single-letter guess; anything else is
/// rejected before it reaches the ledger.
pub async fn handle_chat_event(e: Event, state: State<App>) -> Result<Action, anyhow::Error> {
    // Get the message
    let message = e
        .update
        .get_message()?
        .text
        .clone()
        .ok_or(anyhow!("No message text"))?;

    // Get the sender's first name
    let from = e.update.get_message()?.clone().from.unwrap_or_default();

    // Get the application state
    {
        let mut state = state.get().write().await;
        if let Err(err) = state.load(&from).await {
            warn!("No saved game state: {}", err);
            state
                .admin_log(
                    Arc::clone(&e.api),
                    format!(
                        "New user: {} ({})",
                        from.first_name,
                        from.username.clone().unwrap_or_default()
                    ),
                )
                .await;
        }
    }

    if message.starts_with('/') {
        return handle_bot_command(e, state).await;
    }

    // If there's no active game, start one.
    if !state.get().read().await.is_playing() {
        return handle_new_game(e, state).await;
    }

    // Decode the guess: exactly one letter, anything else bounces here.
    let guess = message.trim();
    let letter = match (guess.chars().next(), guess.chars().count()) {
        (Some(c), 1) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
        _ => {
            return Ok(Action::ReplyText(format!(
                "Guess a single letter A-Z, {}.",
                from.first_name
            )))
        }
    };

    info!(
        "{} ({}) guessed {}",
        from.first_name,
        from.username.clone().unwrap_or("unknown".into()),
        letter
    );

    // Guessing instead of confirming declines any pending preference change.
    let deferred = {
        let mut app = state.get().write().await;
        let deferred = app.pending.is_some();
        app.decline_pending();
        deferred
    };

    // Play the guess. A session whose counts no longer add up is discarded
    // by the app; tell the player instead of failing the handler.
    let turn = match state.get().write().await.play_guess(&from, letter).await {
        Ok(turn) => turn,
        Err(err) => {
            warn!("Discarding session for {}: {}", from.first_name, err);
            return Ok(Action::ReplyText(
                "Something went wrong with this round. Send any message to start a new game."
                    .into(),
            ));
        }
    };

    let (mut reply, target_word, score) = {
        let app = state.get().read().await;
        let session = app.session.as_ref().ok_or(anyhow!("no active session"))?;
        let reply = render_board(session)?;
        let target_word = session.target_word.clone();
        let score = app.score(&from.id.to_string()).await;

        (reply, target_word, score)
    };

    if deferred {
        reply.push_str("\nKeeping the current settings for this round\\.\n");
    }

    match turn {
        Move::Repeat(letter) => reply.push_str(&format!(
            "\nYou already tried `{}`\\. Pick another letter\\.",
            letter
        )),
        Move::Hit(letter, occurrences) => {
            if occurrences > 1 {
                reply.push_str(&format!(
                    "\n`{}` appears {} times\\! Keep going\\.",
                    letter, occurrences
                ));
            } else {
                reply.push_str(&format!("\n`{}` is in the word\\. Keep going\\.", letter));
            }
        }
        Move::Miss(letter) => reply.push_str(&format!(
            "\nNo `{}` in the word\\. Careful now\\.",
            letter
        )),
        Move::Won => {
            reply.push_str(
                escape_md(format!("\nYou won! \u{1F46F}\nYour score: {}", score).as_str()).as_str(),
            );
            info!(
                "{} ({}) won with {} (target: {})",
                from.first_name,
                from.clone().username.unwrap_or("unknown".into()),
                letter,
                target_word
            );
        }
        Move::Lost => {
            reply.push_str(
                escape_md(
                    format!(
                        "\nYou lost! Target word: {} \u{1F979}\nYour score: {}",
                        target_word, score
                    )
                    .as_str(),
                )
                .as_str(),
            );
            info!(
                "{} ({}) lost with {} (target: {})",
                from.first_name,
                from.clone().username.unwrap_or("unknown".into()),
                letter,
                target_word
            );
        }
    }

    state
        .get()
        .read()
        .await
        .admin_log(
            Arc::clone(&e.api),
            format!(
                "{} ({}) guessed '{}' against '{}' {}.",
                from.first_name,
                from.username.clone().unwrap_or_default(),
                letter,
                target_word,
                match turn {
                    Move::Repeat(_) => "which was a repeat",
                    Move::Hit(_, _) => "and hit",
                    Move::Miss(_) => "and missed",
                    Move::Won => "and won",
                    Move::Lost => "and lost",
                }
            ),
        )
        .await;

    Ok(Action::ReplyMarkdown(reply))
}
