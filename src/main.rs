mod chat;
mod common;
mod config;
mod network;
mod ui;

use chat::ChatSession;
use dotenvy::dotenv;
use network::RelayConnection;
use tokio::sync::mpsc;
use ui::ChatApp;

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let relay_addr = config::relay_address();
    run_client(relay_addr).await
}

async fn run_client(relay_addr: String) -> Result<(), eframe::Error> {
    // 1. Tạo các kênh giao tiếp (Channels)
    // UI -> Network
    let (command_tx, command_rx) = mpsc::channel(100);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    // 2. Khởi chạy Network Task (Chạy ngầm)
    tokio::spawn(async move {
        RelayConnection::new(event_tx, command_rx, relay_addr)
            .run()
            .await;
    });

    // 3. Khởi chạy UI (Chạy trên Main Thread)
    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);
    let mut session = Some(ChatSession::new(command_tx));

    eframe::run_native(
        "Rust Relay Chat",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");
            let session = session
                .take()
                .expect("ChatApp should only be initialized once");

            Ok(Box::new(ChatApp::new(cc, session, event_receiver)))
        }),
    )
}
