use std::collections::HashMap;

use crate::common::{Chat, Message, PendingReply, Snapshot, Theme};

/// Everything the presentation layer reads, owned by the controller.
#[derive(Debug)]
pub struct ChatState {
    pub snapshot: Snapshot,
    pub search_text: String,
    pub sidebar_open: bool,
    pub theme: Theme,
    /// chat id -> generations of replies still in flight
    in_flight: HashMap<String, Vec<u64>>,
    /// chat id -> restart count, only kept in memory
    generations: HashMap<String, u64>,
}

impl ChatState {
    pub fn new(snapshot: Snapshot, theme: Theme) -> Self {
        Self {
            snapshot,
            search_text: String::new(),
            sidebar_open: true,
            theme,
            in_flight: HashMap::new(),
            generations: HashMap::new(),
        }
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.snapshot
            .active_chat
            .as_deref()
            .and_then(|chat_id| self.snapshot.chat(chat_id))
    }

    pub fn active_messages(&self) -> &[Message] {
        match self.snapshot.active_chat.as_deref() {
            Some(chat_id) => self.snapshot.messages_for(chat_id),
            None => &[],
        }
    }

    /// Whether a reply is pending for the active chat.
    pub fn is_typing(&self) -> bool {
        self.snapshot
            .active_chat
            .as_deref()
            .is_some_and(|chat_id| self.is_typing_in(chat_id))
    }

    /// Replies requested before the last restart do not count.
    pub fn is_typing_in(&self, chat_id: &str) -> bool {
        let current = self.generation(chat_id);
        self.in_flight
            .get(chat_id)
            .is_some_and(|pending| pending.contains(&current))
    }

    pub fn generation(&self, chat_id: &str) -> u64 {
        self.generations.get(chat_id).copied().unwrap_or(0)
    }

    /// Chats whose name matches the search text, case-insensitively.
    pub fn visible_chats(&self) -> impl Iterator<Item = &Chat> {
        let needle = self.search_text.trim().to_lowercase();
        self.snapshot
            .chats
            .iter()
            .filter(move |chat| needle.is_empty() || chat.name.to_lowercase().contains(&needle))
    }

    pub(super) fn begin_reply(&mut self, chat_id: &str) -> u64 {
        let generation = self.generation(chat_id);
        self.in_flight
            .entry(chat_id.to_string())
            .or_default()
            .push(generation);
        generation
    }

    pub(super) fn finish_reply(&mut self, ticket: &PendingReply) {
        if let Some(pending) = self.in_flight.get_mut(&ticket.chat_id) {
            if let Some(index) = pending.iter().position(|g| *g == ticket.generation) {
                pending.swap_remove(index);
            }
            if pending.is_empty() {
                self.in_flight.remove(&ticket.chat_id);
            }
        }
    }

    pub(super) fn bump_generation(&mut self, chat_id: &str) {
        *self.generations.entry(chat_id.to_string()).or_default() += 1;
    }
}
