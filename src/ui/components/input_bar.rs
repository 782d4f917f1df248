use eframe::egui;

/// Returns the trimmed text when the user sends it; blank input never leaves.
pub fn render(ui: &mut egui::Ui, input_text: &mut String) -> Option<String> {
    let mut send = false;
    let can_send = !input_text.trim().is_empty();

    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(input_text)
                .hint_text("Type a message...")
                .desired_width(ui.available_width() - 70.0),
        );
        if ui.add_enabled(can_send, egui::Button::new("Send")).clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
            response.request_focus();
        }
    });

    let message = input_text.trim();
    if send && !message.is_empty() {
        let message = message.to_string();
        input_text.clear();
        return Some(message);
    }

    None
}
