use eframe::egui;

use crate::common::Theme;
use crate::controller::ChatState;

#[derive(Default)]
pub struct SidebarActions {
    pub selected_chat: Option<String>,
    pub search_text: Option<String>,
    pub toggle_theme: bool,
}

pub fn render(ui: &mut egui::Ui, state: &ChatState) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.horizontal(|ui| {
        ui.heading("Chats");
        let label = match state.theme {
            Theme::Light => "🌙",
            Theme::Dark => "☀",
        };
        if ui.button(label).on_hover_text("Toggle theme").clicked() {
            actions.toggle_theme = true;
        }
    });
    ui.separator();

    let mut search = state.search_text.clone();
    if ui
        .add(egui::TextEdit::singleline(&mut search).hint_text("Search"))
        .changed()
    {
        actions.search_text = Some(search);
    }
    ui.separator();

    let active = state.snapshot.active_chat.as_deref();
    let mut any = false;

    egui::ScrollArea::vertical().show(ui, |ui| {
        for chat in state.visible_chats() {
            any = true;
            let selected = active == Some(chat.id.as_str());

            let row = ui.horizontal(|ui| {
                ui.label(egui::RichText::new(chat.initial()).strong().size(18.0));
                ui.vertical(|ui| {
                    let clicked = ui.selectable_label(selected, chat.name.as_str()).clicked();
                    if let Some(last) = &chat.last_message {
                        ui.label(egui::RichText::new(preview(&last.text)).weak());
                    }
                    clicked
                })
                .inner
            });

            if chat.unread_count > 0 {
                ui.colored_label(
                    egui::Color32::from_rgb(0x2A, 0xAB, 0xEE),
                    format!("● {}", chat.unread_count),
                );
            }
            if row.inner {
                actions.selected_chat = Some(chat.id.clone());
            }
            ui.separator();
        }
    });

    if !any {
        ui.label("No chats found");
    }

    actions
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 32;
    if text.chars().count() <= MAX_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_CHARS).collect();
    format!("{cut}…")
}
