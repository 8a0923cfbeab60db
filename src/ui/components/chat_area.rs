use eframe::egui;

use crate::chat::ChatSession;

// Màu bubble theo hai phía: tin của mình nhạt, tin từ peer xanh đậm.
const OWN_FILL: egui::Color32 = egui::Color32::from_rgb(0xf8, 0xf9, 0xfa);
const PEER_FILL: egui::Color32 = egui::Color32::from_rgb(0x00, 0x7b, 0xff);

pub fn render(ui: &mut egui::Ui, session: &mut ChatSession) {
    let scroll_to_latest = session.take_arrival();

    egui::ScrollArea::vertical().show(ui, |ui| {
        for message in session.messages() {
            let from_peer = session.is_from_peer(message);
            let align = if from_peer {
                egui::Align::Max
            } else {
                egui::Align::Min
            };
            let (fill, text_color) = if from_peer {
                (PEER_FILL, egui::Color32::WHITE)
            } else {
                (OWN_FILL, egui::Color32::BLACK)
            };

            ui.with_layout(egui::Layout::top_down(align), |ui| {
                egui::Frame::new()
                    .fill(fill)
                    .corner_radius(8)
                    .inner_margin(8)
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&message.content).color(text_color));
                    });
            });
        }

        if scroll_to_latest {
            ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
        }
    });
}
