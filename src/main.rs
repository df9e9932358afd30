use argh::FromArgs;
use log::*;
use mobot::*;

use crate::app::App;
use crate::handlers::handle_chat_event;

mod app;
mod figure;
mod handlers;
mod hangman;
mod vocab;

#[cfg(test)]
mod figure_test;
#[cfg(test)]
mod vocab_test;

#[derive(FromArgs)]
/// A Telegram hangman bot.
struct Args {
    /// JSON file with the vocabulary ({"vocabWord", "wordGrade"} records)
    #[argh(option, short = 'v', default = "String::from(\"hangman_vocab.json\")")]
    vocab: String,

    /// directory to save per-user game state in (disabled when empty)
    #[argh(option, short = 's', default = "String::new()")]
    save_dir: String,

    /// name of the game, shown in greetings
    #[argh(option, short = 'n', default = "String::from(\"Hangman\")")]
    game_name: String,

    /// telegram username of the admin user
    #[argh(option, short = 'a')]
    admin: Option<String>,
}

#[tokio::main]
async fn main() {
    mobot::init_logger();
    let args: Args = argh::from_env();

    let pool = match vocab::load_vocab(&args.vocab) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Could not load vocabulary: {}", e);
            std::process::exit(1);
        }
    };
    info!("Loaded {} words from {}.", pool.len(), args.vocab);

    let mut app = App::new(args.game_name, pool);
    app.set_save_dir(args.save_dir);
    app.admin_user = args.admin;

    let client = Client::new(std::env::var("TELEGRAM_TOKEN").unwrap());
    info!("Starting bot...");
    Router::new(client)
        .with_state(app)
        .add_route(Route::Message(Matcher::Any), handle_chat_event)
        .start()
        .await;
}
