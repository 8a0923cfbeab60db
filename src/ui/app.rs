use eframe::egui;
use tokio::sync::mpsc;

use crate::chat::ChatSession;
use crate::common::{ConnectionEvent, ConnectionState};

use super::components::{chat_area, input_bar};

/// Presentation layer. Không giữ chat state nào của riêng mình ngoài nội
/// dung ô nhập: feed, danh tính và trạng thái kết nối đều đọc từ session.
pub struct ChatApp {
    session: ChatSession,
    event_receiver: mpsc::Receiver<ConnectionEvent>,
    input_text: String,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        session: ChatSession,
        event_receiver: mpsc::Receiver<ConnectionEvent>,
    ) -> Self {
        Self {
            session,
            event_receiver,
            input_text: String::new(),
        }
    }

    fn drain_connection_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.session.handle_event(event);
        }
    }

    fn status_line(&self, ui: &mut egui::Ui) {
        let status = match self.session.connection_state() {
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Open => "Connected",
            ConnectionState::Closed => "Disconnected",
        };
        match self.session.client_id() {
            Some(id) => ui.label(format!("{status} — client {id}")),
            None => ui.label(status),
        };
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_connection_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Relay Chat");
            self.status_line(ui);
            ui.separator();

            chat_area::render(ui, &mut self.session);

            ui.separator();
            if let Some(content) = input_bar::render(ui, &mut self.input_text) {
                self.session.send_message(&content);
            }
        });

        ctx.request_repaint();
    }
}

impl Drop for ChatApp {
    // Đóng cửa sổ là kết thúc phiên: nhả kết nối đúng một lần.
    fn drop(&mut self) {
        self.session.teardown();
    }
}
