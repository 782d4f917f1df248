mod common;
mod config;
mod controller;
mod responder;
mod storage;
mod ui;

use std::error::Error;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::sync::mpsc;

use controller::{AI_CHAT_ID, Controller};
use responder::{Responder, ResponderWorker};
use storage::ChatStore;
use ui::ChatApp;

#[derive(Parser)]
#[command(
    name = "tele_chat",
    version,
    about = "Desktop messenger with a simulated assistant and friend"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Database file, overrides `storage_path` from the config
    #[arg(long, value_name = "FILE")]
    db: Option<String>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
enum Mode {
    /// Send one message from the terminal and print the reply
    Send {
        /// Chat to write to; defaults to the last active chat, then the assistant
        #[arg(long)]
        chat: Option<String>,
        text: String,
    },
    /// Delete stored chats and messages
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);
    let db_path = cli.db.unwrap_or_else(|| app_config.storage_path.clone());
    let store = ChatStore::open(&db_path)?;
    let responder = Responder::from_config(&app_config.responder);

    match cli.mode {
        Some(Mode::Reset) => {
            store.clear()?;
            log::info!("Cleared stored chats in {db_path}");
            Ok(())
        }
        Some(Mode::Send { chat, text }) => {
            let chat_id = chat
                .or_else(|| store.active_chat())
                .unwrap_or_else(|| AI_CHAT_ID.to_string());
            run_send(store, responder, &chat_id, &text).await
        }
        None => run_full_client(store, responder).await,
    }
}

async fn run_send(
    store: ChatStore,
    responder: Responder,
    chat_id: &str,
    text: &str,
) -> Result<(), Box<dyn Error>> {
    let mut controller = Controller::init(store);
    if !controller.select_chat(chat_id) {
        return Err(format!("unknown chat `{chat_id}`").into());
    }
    if !controller.send_message(&responder, text).await {
        return Err("message is empty".into());
    }

    let state = controller.state();
    let own_name = "You";
    let peer_name = state
        .active_chat()
        .and_then(|chat| chat.peer())
        .map(|peer| peer.name.clone())
        .unwrap_or_default();

    for message in state.active_messages().iter().rev().take(2).rev() {
        let name = if message.is_own() { own_name } else { peer_name.as_str() };
        println!("{name}: {}", message.text);
    }
    Ok(())
}

async fn run_full_client(store: ChatStore, responder: Responder) -> Result<(), Box<dyn Error>> {
    // UI -> responder
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Responder -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    tokio::spawn(ResponderWorker::new(responder, cmd_rx, event_tx).run());

    let controller = Controller::init(store);
    let options = eframe::NativeOptions::default();
    let mut startup = Some((controller, event_rx));

    eframe::run_native(
        "Telegram Clone",
        options,
        Box::new(move |cc| {
            let (controller, event_receiver) = startup
                .take()
                .ok_or("ChatApp should only be initialized once")?;
            Ok(Box::new(ChatApp::new(
                cc,
                controller,
                cmd_tx.clone(),
                event_receiver,
            )))
        }),
    )?;

    Ok(())
}
