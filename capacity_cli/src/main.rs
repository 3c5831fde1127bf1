//! # Structural Design Assistant CLI
//!
//! Line-oriented REPL over a [`Session`]: general chat by default, structured
//! design commands after `!mode design`. `exit` or end of input ends the
//! session.

mod cli;
mod config;
mod openai;
mod telemetry;

use std::io::{self, Write};
use std::process::ExitCode;

use capacity_core::chat::{ChatService, OfflineChat};
use capacity_core::router::{Session, BANNER};
use capacity_core::store::DocumentStore;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::cli::Cli;
use crate::config::Settings;
use crate::openai::OpenAiChat;

fn prompt(text: &str) {
    print!("\n{}", text);
    // A failed flush only delays the prompt.
    let _ = io::stdout().flush();
}

fn build_chat(settings: &Settings) -> Box<dyn ChatService> {
    let Some(api_key) = settings.api_key() else {
        info!("no API key configured, chat runs offline");
        return Box::new(OfflineChat);
    };
    match OpenAiChat::new(&settings.openai, api_key) {
        Ok(chat) => Box::new(chat),
        Err(e) => {
            error!(error = %e, "chat client unavailable, falling back to offline chat");
            Box::new(OfflineChat)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    settings.apply_env(|key| std::env::var(key).ok());
    settings.apply_cli(&cli);

    telemetry::init_telemetry_with_level(&settings.logging.level);

    let store = match DocumentStore::connect(&settings.store.connection_string, &settings.store.database) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(path = %store.database_dir().display(), "store ready");

    let mut session = Session::new(Box::new(store), build_chat(&settings));

    println!("{}", BANNER);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&session.prompt());

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: failed to read input: {}", e);
                return ExitCode::FAILURE;
            }
        };

        if line.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        match session.handle_line(&line).await {
            Ok(response) => println!("\nAI: {}", response),
            Err(e) => {
                eprintln!("\nFatal: {}", e);
                if let Ok(json) = serde_json::to_string_pretty(&e) {
                    eprintln!("{}", json);
                }
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
