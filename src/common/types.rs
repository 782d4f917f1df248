use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sender id of the person using the app.
pub const LOCAL_USER_ID: &str = "user";

/// Behavioral profile of a simulated participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Assistant,
    Friend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, rename = "isAI")]
    pub is_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,
}

impl User {
    /// Explicit persona, or Assistant for AI users that carry none.
    pub fn persona(&self) -> Option<Persona> {
        self.persona
            .or_else(|| self.is_ai.then_some(Persona::Assistant))
    }
}

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender_id: String,
    pub chat_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_delivered: bool,
}

impl Message {
    pub fn is_own(&self) -> bool {
        self.sender_id == LOCAL_USER_ID
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub participants: Vec<User>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Chat {
    /// First participant that is not the local user.
    pub fn peer(&self) -> Option<&User> {
        self.participants
            .iter()
            .find(|participant| participant.id != LOCAL_USER_ID)
    }

    /// The participant who answers in this chat and the persona they speak
    /// with, if any.
    pub fn responder(&self) -> Option<(&User, Persona)> {
        self.participants
            .iter()
            .filter(|participant| participant.id != LOCAL_USER_ID)
            .find_map(|participant| participant.persona().map(|persona| (participant, persona)))
    }

    pub fn persona(&self) -> Option<Persona> {
        self.responder().map(|(_, persona)| persona)
    }

    pub fn has_ai(&self) -> bool {
        self.participants.iter().any(|participant| participant.is_ai)
    }

    pub fn initial(&self) -> String {
        self.name.chars().next().map(String::from).unwrap_or_default()
    }
}

/// Complete persisted state: chats, messages per chat and the active chat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub chats: Vec<Chat>,
    pub messages: HashMap<String, Vec<Message>>,
    pub active_chat: Option<String>,
}

impl Snapshot {
    pub fn chat(&self, chat_id: &str) -> Option<&Chat> {
        self.chats.iter().find(|chat| chat.id == chat_id)
    }

    pub fn chat_mut(&mut self, chat_id: &str) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|chat| chat.id == chat_id)
    }

    pub fn messages_for(&self, chat_id: &str) -> &[Message] {
        self.messages
            .get(chat_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Restores the snapshot invariants: drops entries that reference
    /// unknown chats or are filed under the wrong chat, points every chat's
    /// last message at the tail of its list and zeroes the active chat's
    /// unread counter. Returns the number of entries dropped or repaired.
    pub fn normalize(&mut self) -> usize {
        let mut repaired = 0;
        let chats = &self.chats;

        self.messages.retain(|chat_id, list| {
            let known = chats.iter().any(|chat| &chat.id == chat_id);
            if !known {
                repaired += list.len().max(1);
            }
            known
        });

        for (chat_id, list) in self.messages.iter_mut() {
            let before = list.len();
            list.retain(|message| &message.chat_id == chat_id);
            repaired += before - list.len();
        }

        if let Some(active) = &self.active_chat {
            if self.chat(active).is_none() {
                self.active_chat = None;
                repaired += 1;
            }
        }

        for chat in self.chats.iter_mut() {
            let tail = self
                .messages
                .get(&chat.id)
                .and_then(|list| list.last())
                .cloned();
            if chat.last_message != tail {
                chat.last_message = tail;
                repaired += 1;
            }
            if self.active_chat.as_deref() == Some(chat.id.as_str()) && chat.unread_count != 0 {
                chat.unread_count = 0;
                repaired += 1;
            }
        }

        repaired
    }
}

/// Window color scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}
