pub mod seed;
pub mod state;

use chrono::Utc;
use uuid::Uuid;

use crate::common::{LOCAL_USER_ID, Message, PendingReply, ReplyRequest, Snapshot};
use crate::responder::{Reply, Responder, Turn};
use crate::storage::ChatStore;

pub use seed::AI_CHAT_ID;
pub use state::ChatState;

/// Result of handing a message to [`Controller::submit_message`].
#[derive(Debug)]
pub enum SendOutcome {
    /// Blank text or no chat selected; nothing changed.
    Rejected,
    /// Stored, nobody will answer.
    Delivered,
    /// Stored; the request must go to a responder and come back through
    /// [`Controller::apply_reply`].
    AwaitingReply(ReplyRequest),
}

/// Applies user actions to the chat state and mirrors them to the store.
pub struct Controller {
    store: ChatStore,
    state: ChatState,
}

impl Controller {
    /// Loads the stored snapshot, seeding the default chats on first run.
    pub fn init(store: ChatStore) -> Self {
        let mut snapshot = store.load();

        let changed = if snapshot.chats.is_empty() {
            log::info!("No stored chats; creating the default ones");
            snapshot = Snapshot {
                chats: seed::initial_chats(),
                ..Default::default()
            };
            true
        } else {
            let filled = seed::backfill_personas(&mut snapshot.chats);
            if filled > 0 {
                log::info!("Restored the persona of {filled} stored participants");
            }
            filled > 0
        };
        if changed {
            if let Err(err) = store.save(&snapshot) {
                log::error!("Failed to save chats: {err}");
            }
        }

        let theme = store.theme();
        log::info!(
            "Loaded {} chats, active chat: {:?}",
            snapshot.chats.len(),
            snapshot.active_chat
        );

        Self {
            state: ChatState::new(snapshot, theme),
            store,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Makes `chat_id` active and marks it read. Unknown ids are ignored.
    pub fn select_chat(&mut self, chat_id: &str) -> bool {
        let Some(chat) = self.state.snapshot.chat_mut(chat_id) else {
            log::warn!("Ignoring selection of unknown chat {chat_id}");
            return false;
        };
        chat.unread_count = 0;
        self.state.snapshot.active_chat = Some(chat_id.to_string());
        self.state.search_text.clear();

        self.persist_chats();
        if let Err(err) = self.store.set_active_chat(chat_id) {
            log::error!("Failed to save active chat: {err}");
        }
        true
    }

    /// Commits a message from the local user to the active chat.
    pub fn submit_message(&mut self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Rejected;
        }
        let Some(chat) = self.state.active_chat() else {
            log::warn!("Message submitted without an active chat");
            return SendOutcome::Rejected;
        };

        let chat_id = chat.id.clone();
        let responder = chat
            .responder()
            .map(|(participant, persona)| (participant.id.clone(), persona));

        self.commit_message(new_message(&chat_id, LOCAL_USER_ID, text), false);

        let Some((sender_id, persona)) = responder else {
            return SendOutcome::Delivered;
        };

        let generation = self.state.begin_reply(&chat_id);
        let history = self
            .state
            .snapshot
            .messages_for(&chat_id)
            .iter()
            .map(Turn::from_message)
            .collect();

        SendOutcome::AwaitingReply(ReplyRequest {
            ticket: PendingReply {
                chat_id,
                sender_id,
                generation,
            },
            persona,
            history,
        })
    }

    /// Commits a reply and clears its typing state. Replies for deleted
    /// chats or requested before a restart are dropped.
    pub fn apply_reply(&mut self, ticket: PendingReply, reply: Reply) -> bool {
        self.state.finish_reply(&ticket);

        if let Some(fault) = &reply.fault {
            log::warn!("Reply in {} stands in for a failure: {fault}", ticket.chat_id);
        }
        if self.state.snapshot.chat(&ticket.chat_id).is_none() {
            log::warn!("Dropping reply for unknown chat {}", ticket.chat_id);
            return false;
        }
        if ticket.generation != self.state.generation(&ticket.chat_id) {
            log::info!(
                "Dropping reply for {} requested before the conversation was restarted",
                ticket.chat_id
            );
            return false;
        }

        let is_active = self.state.snapshot.active_chat.as_deref() == Some(ticket.chat_id.as_str());
        self.commit_message(
            new_message(&ticket.chat_id, &ticket.sender_id, &reply.text),
            !is_active,
        );
        true
    }

    /// Clears typing for a request that never reached a responder.
    pub fn abandon_reply(&mut self, ticket: &PendingReply) {
        self.state.finish_reply(ticket);
    }

    /// Submits and waits for the reply inline. Returns false when rejected.
    pub async fn send_message(&mut self, responder: &Responder, text: &str) -> bool {
        match self.submit_message(text) {
            SendOutcome::Rejected => false,
            SendOutcome::Delivered => true,
            SendOutcome::AwaitingReply(request) => {
                let reply = responder.reply(&request.history, request.persona).await;
                self.apply_reply(request.ticket, reply);
                true
            }
        }
    }

    /// Empties the active chat's history. The chat itself stays.
    pub fn restart_conversation(&mut self) -> bool {
        let Some(chat_id) = self.state.snapshot.active_chat.clone() else {
            return false;
        };
        let Some(chat) = self.state.snapshot.chat_mut(&chat_id) else {
            return false;
        };
        chat.last_message = None;
        self.state.snapshot.messages.remove(&chat_id);
        self.state.bump_generation(&chat_id);
        log::info!("Restarted conversation {chat_id}");

        self.persist_messages();
        self.persist_chats();
        true
    }

    pub fn toggle_theme(&mut self) {
        self.state.theme = self.state.theme.toggled();
        if let Err(err) = self.store.set_theme(self.state.theme) {
            log::error!("Failed to save theme: {err}");
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.state.sidebar_open = !self.state.sidebar_open;
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.state.search_text = text.to_string();
    }

    fn commit_message(&mut self, message: Message, mark_unread: bool) {
        let chat_id = message.chat_id.clone();
        if let Some(chat) = self.state.snapshot.chat_mut(&chat_id) {
            chat.last_message = Some(message.clone());
            if mark_unread {
                chat.unread_count += 1;
            }
        }
        self.state
            .snapshot
            .messages
            .entry(chat_id)
            .or_default()
            .push(message);

        self.persist_messages();
        self.persist_chats();
    }

    fn persist_chats(&self) {
        if let Err(err) = self.store.save_chats(&self.state.snapshot.chats) {
            log::error!("Failed to save chats: {err}");
        }
    }

    fn persist_messages(&self) {
        if let Err(err) = self.store.save_messages(&self.state.snapshot.messages) {
            log::error!("Failed to save messages: {err}");
        }
    }
}

fn new_message(chat_id: &str, sender_id: &str, text: &str) -> Message {
    Message {
        id: Uuid::new_v4().to_string(),
        text: text.to_string(),
        sender_id: sender_id.to_string(),
        chat_id: chat_id.to_string(),
        timestamp: Utc::now(),
        is_read: false,
        is_delivered: true,
    }
}
