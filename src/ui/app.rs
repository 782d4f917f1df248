use eframe::egui;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::common::{ResponderCommand, ResponderEvent, Theme};
use crate::controller::{Controller, SendOutcome};

use super::components::{
    chat_area, input_bar,
    sidebar::{self, SidebarActions},
};

pub struct ChatApp {
    controller: Controller,
    input_text: String,
    command_sender: mpsc::Sender<ResponderCommand>,
    event_receiver: mpsc::Receiver<ResponderEvent>,
    applied_theme: Option<Theme>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        controller: Controller,
        command_sender: mpsc::Sender<ResponderCommand>,
        event_receiver: mpsc::Receiver<ResponderEvent>,
    ) -> Self {
        Self {
            controller,
            input_text: String::new(),
            command_sender,
            event_receiver,
            applied_theme: None,
        }
    }

    fn handle_responder_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                ResponderEvent::ReplyReady { ticket, reply } => {
                    self.controller.apply_reply(ticket, reply);
                }
            }
        }
    }

    fn send_message(&mut self, text: String) {
        let SendOutcome::AwaitingReply(request) = self.controller.submit_message(&text) else {
            return;
        };

        let ticket = request.ticket.clone();
        if let Err(err) = self
            .command_sender
            .try_send(ResponderCommand::Reply(request))
        {
            match err {
                TrySendError::Full(_) => log::warn!("Responder queue full; reply skipped"),
                TrySendError::Closed(_) => log::warn!("Responder worker is gone; reply skipped"),
            }
            self.controller.abandon_reply(&ticket);
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        let theme = self.controller.state().theme;
        if self.applied_theme == Some(theme) {
            return;
        }
        ctx.set_visuals(match theme {
            Theme::Light => egui::Visuals::light(),
            Theme::Dark => egui::Visuals::dark(),
        });
        self.applied_theme = Some(theme);
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_responder_events();
        self.apply_theme(ctx);

        if self.controller.state().sidebar_open {
            egui::SidePanel::left("chat_sidebar")
                .resizable(true)
                .default_width(260.0)
                .show(ctx, |ui| {
                    let actions: SidebarActions = sidebar::render(ui, self.controller.state());
                    if let Some(text) = actions.search_text {
                        self.controller.set_search_text(&text);
                    }
                    if let Some(chat_id) = actions.selected_chat {
                        self.controller.select_chat(&chat_id);
                    }
                    if actions.toggle_theme {
                        self.controller.toggle_theme();
                    }
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(chat) = self.controller.state().active_chat() else {
                if !self.controller.state().sidebar_open && ui.button("☰").clicked() {
                    self.controller.toggle_sidebar();
                }
                chat_area::render_welcome(ui);
                return;
            };

            let header = chat_area::render_header(ui, chat);
            ui.separator();

            let typing_label = if self.controller.state().is_typing() {
                chat.persona().map(|persona| persona.profile().typing_label)
            } else {
                None
            };

            let input_height = 36.0;
            ui.allocate_ui(
                egui::vec2(ui.available_width(), ui.available_height() - input_height),
                |ui| {
                    chat_area::render_messages(
                        ui,
                        self.controller.state().active_messages(),
                        typing_label,
                    );
                },
            );

            ui.separator();
            let submitted = input_bar::render(ui, &mut self.input_text);

            if header.toggle_sidebar {
                self.controller.toggle_sidebar();
            }
            if header.restart {
                self.controller.restart_conversation();
            }
            if let Some(text) = submitted {
                self.send_message(text);
            }
        });

        ctx.request_repaint();
    }
}
