use chrono::Local;
use eframe::egui;

use crate::common::{Chat, Message};

const OWN_BUBBLE: egui::Color32 = egui::Color32::from_rgb(0x2A, 0xAB, 0xEE);

#[derive(Default)]
pub struct HeaderActions {
    pub restart: bool,
    pub toggle_sidebar: bool,
}

pub fn render_header(ui: &mut egui::Ui, chat: &Chat) -> HeaderActions {
    let mut actions = HeaderActions::default();

    ui.horizontal(|ui| {
        if ui.button("☰").on_hover_text("Toggle chat list").clicked() {
            actions.toggle_sidebar = true;
        }
        ui.vertical(|ui| {
            ui.heading(chat.name.as_str());
            if chat.has_ai() {
                ui.colored_label(OWN_BUBBLE, "AI Assistant");
            } else if let Some(peer) = chat.peer() {
                ui.label(egui::RichText::new(if peer.is_online { "online" } else { "offline" }).weak());
            }
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Restart").on_hover_text("Clear this conversation").clicked() {
                actions.restart = true;
            }
        });
    });

    actions
}

pub fn render_messages(ui: &mut egui::Ui, messages: &[Message], typing_label: Option<&str>) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for message in messages {
                bubble(ui, message);
            }
            if let Some(label) = typing_label {
                ui.label(egui::RichText::new(label).italics().weak());
            }
        });
}

fn bubble(ui: &mut egui::Ui, message: &Message) {
    let layout = if message.is_own() {
        egui::Layout::right_to_left(egui::Align::TOP)
    } else {
        egui::Layout::left_to_right(egui::Align::TOP)
    };
    let time = message.timestamp.with_timezone(&Local).format("%H:%M").to_string();

    ui.with_layout(layout, |ui| {
        let frame = if message.is_own() {
            egui::Frame::new().fill(OWN_BUBBLE)
        } else {
            egui::Frame::new().fill(ui.visuals().faint_bg_color)
        };
        frame
            .corner_radius(12)
            .inner_margin(egui::Margin::symmetric(10, 6))
            .show(ui, |ui| {
                ui.set_max_width(320.0);
                ui.vertical(|ui| {
                    let text = egui::RichText::new(message.text.as_str());
                    if message.is_own() {
                        ui.label(text.color(egui::Color32::WHITE));
                    } else {
                        ui.label(text);
                    }
                    ui.label(egui::RichText::new(time).small().weak());
                });
            });
    });
    ui.add_space(4.0);
}

pub fn render_welcome(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() / 3.0);
        ui.heading("Welcome to Telegram Clone");
        ui.label("Select a chat to start messaging");
    });
}
