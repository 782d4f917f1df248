use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::common::{Chat, Message, Snapshot, Theme};

use super::database::{Database, delete_on, put_on};
use super::error::{StoreError, StoreResult};

const CHATS_KEY: &str = "telegram-clone-chats";
const MESSAGES_KEY: &str = "telegram-clone-messages";
const ACTIVE_CHAT_KEY: &str = "telegram-clone-active-chat";
const THEME_KEY: &str = "telegram-clone-theme";

/// Durable home of the chat snapshot and the theme preference.
pub struct ChatStore {
    db: Database,
}

impl ChatStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Ok(Self {
            db: Database::new(path)?,
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> StoreResult<Self> {
        Ok(Self {
            db: Database::in_memory()?,
        })
    }

    /// Loads the snapshot, substituting defaults for anything unreadable.
    pub fn load(&self) -> Snapshot {
        let (snapshot, faults) = self.load_with_faults();
        for fault in &faults {
            log::warn!("Ignoring stored state: {fault}");
        }
        snapshot
    }

    /// Like [`ChatStore::load`], also returning the faults that were replaced
    /// by defaults. Each record falls back on its own.
    pub fn load_with_faults(&self) -> (Snapshot, Vec<StoreError>) {
        let mut faults = Vec::new();

        let chats = self.read_chats().unwrap_or_else(|err| {
            faults.push(err);
            Vec::new()
        });
        let messages = self.read_messages().unwrap_or_else(|err| {
            faults.push(err);
            HashMap::new()
        });
        let active_chat = self.read_active_chat().unwrap_or_else(|err| {
            faults.push(err);
            None
        });

        let mut snapshot = Snapshot {
            chats,
            messages,
            active_chat,
        };
        let repaired = snapshot.normalize();
        if repaired > 0 {
            log::warn!("Repaired {repaired} stored entries that broke snapshot invariants");
        }

        (snapshot, faults)
    }

    /// Writes all three records in one transaction.
    pub fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let chats = encode(CHATS_KEY, &snapshot.chats)?;
        let messages = encode(MESSAGES_KEY, &snapshot.messages)?;

        let tx = self.db.connection().unchecked_transaction()?;
        put_on(&tx, CHATS_KEY, &chats)?;
        put_on(&tx, MESSAGES_KEY, &messages)?;
        match &snapshot.active_chat {
            Some(chat_id) => put_on(&tx, ACTIVE_CHAT_KEY, chat_id)?,
            None => delete_on(&tx, ACTIVE_CHAT_KEY)?,
        }
        tx.commit()?;
        Ok(())
    }

    pub fn read_chats(&self) -> StoreResult<Vec<Chat>> {
        self.read_json(CHATS_KEY)
    }

    pub fn save_chats(&self, chats: &[Chat]) -> StoreResult<()> {
        self.db.put(CHATS_KEY, &encode(CHATS_KEY, chats)?)
    }

    pub fn read_messages(&self) -> StoreResult<HashMap<String, Vec<Message>>> {
        self.read_json(MESSAGES_KEY)
    }

    pub fn save_messages(&self, messages: &HashMap<String, Vec<Message>>) -> StoreResult<()> {
        self.db.put(MESSAGES_KEY, &encode(MESSAGES_KEY, messages)?)
    }

    pub fn read_active_chat(&self) -> StoreResult<Option<String>> {
        self.db.get(ACTIVE_CHAT_KEY)
    }

    /// Active chat id, or `None` when unset or unreadable.
    pub fn active_chat(&self) -> Option<String> {
        self.read_active_chat().unwrap_or_else(|err| {
            log::warn!("Failed to read active chat: {err}");
            None
        })
    }

    pub fn set_active_chat(&self, chat_id: &str) -> StoreResult<()> {
        self.db.put(ACTIVE_CHAT_KEY, chat_id)
    }

    pub fn theme(&self) -> Theme {
        match self.db.get(THEME_KEY) {
            Ok(Some(value)) => Theme::parse(&value).unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(err) => {
                log::warn!("Failed to read theme preference: {err}");
                Theme::default()
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) -> StoreResult<()> {
        self.db.put(THEME_KEY, theme.as_str())
    }

    /// Removes the snapshot records. The theme preference survives.
    pub fn clear(&self) -> StoreResult<()> {
        let tx = self.db.connection().unchecked_transaction()?;
        for key in [CHATS_KEY, MESSAGES_KEY, ACTIVE_CHAT_KEY] {
            delete_on(&tx, key)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn read_json<T: DeserializeOwned + Default>(&self, key: &'static str) -> StoreResult<T> {
        match self.db.get(key)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| StoreError::Decode { key, source })
            }
            None => Ok(T::default()),
        }
    }
}

fn encode<T: Serialize + ?Sized>(key: &'static str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::common::{LOCAL_USER_ID, User};

    fn sample_chat(id: &str) -> Chat {
        Chat {
            id: id.to_string(),
            participants: vec![
                User {
                    id: LOCAL_USER_ID.to_string(),
                    name: "You".to_string(),
                    avatar: None,
                    is_online: true,
                    last_seen: None,
                    is_ai: false,
                    persona: None,
                },
                User {
                    id: "ai".to_string(),
                    name: "AI Assistant".to_string(),
                    avatar: None,
                    is_online: true,
                    last_seen: None,
                    is_ai: true,
                    persona: None,
                },
            ],
            name: "AI Assistant".to_string(),
            last_message: None,
            unread_count: 2,
            is_group: false,
            avatar: None,
        }
    }

    fn sample_snapshot() -> Snapshot {
        let message = Message {
            id: "m-1".to_string(),
            text: "hello".to_string(),
            sender_id: LOCAL_USER_ID.to_string(),
            chat_id: "ai-assistant".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 9, 8, 15, 42).unwrap(),
            is_read: false,
            is_delivered: true,
        };
        let mut chat = sample_chat("ai-assistant");
        chat.last_message = Some(message.clone());
        let mut active = sample_chat("friend-1");
        active.unread_count = 0;

        Snapshot {
            chats: vec![chat, active],
            messages: HashMap::from([("ai-assistant".to_string(), vec![message])]),
            active_chat: Some("friend-1".to_string()),
        }
    }

    #[test]
    fn empty_store_loads_defaults() {
        let store = ChatStore::in_memory().unwrap();
        let (snapshot, faults) = store.load_with_faults();

        assert_eq!(snapshot, Snapshot::default());
        assert!(faults.is_empty());
    }

    #[test]
    fn save_then_load_returns_same_snapshot() {
        let store = ChatStore::in_memory().unwrap();
        let snapshot = sample_snapshot();

        store.save(&snapshot).unwrap();
        assert_eq!(store.load(), snapshot);
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chat.db");
        let snapshot = sample_snapshot();

        ChatStore::open(&path).unwrap().save(&snapshot).unwrap();
        let reopened = ChatStore::open(&path).unwrap();

        assert_eq!(reopened.load(), snapshot);
    }

    #[test]
    fn malformed_messages_keep_good_chats() {
        let store = ChatStore::in_memory().unwrap();
        let snapshot = sample_snapshot();
        store.save(&snapshot).unwrap();
        store.db.put(MESSAGES_KEY, "{not json").unwrap();

        let (loaded, faults) = store.load_with_faults();

        let names: Vec<_> = loaded.chats.iter().map(|chat| chat.name.as_str()).collect();
        assert_eq!(names, vec!["AI Assistant", "AI Assistant"]);
        assert!(loaded.messages.is_empty());
        assert!(loaded.chats.iter().all(|chat| chat.last_message.is_none()));
        assert_eq!(faults.len(), 1);
        assert!(matches!(
            faults[0],
            StoreError::Decode {
                key: MESSAGES_KEY,
                ..
            }
        ));
    }

    #[test]
    fn load_marks_active_chat_read() {
        let store = ChatStore::in_memory().unwrap();
        let mut chats = sample_snapshot().chats;
        chats[1].unread_count = 5;
        store.save_chats(&chats).unwrap();
        store.set_active_chat("friend-1").unwrap();

        let loaded = store.load();
        assert_eq!(loaded.chats[1].unread_count, 0);
        assert_eq!(loaded.chats[0].unread_count, 2);
    }

    #[test]
    fn bad_timestamp_is_a_decode_fault() {
        let store = ChatStore::in_memory().unwrap();
        store
            .db
            .put(
                MESSAGES_KEY,
                r#"{"a":[{"id":"1","text":"x","senderId":"user","chatId":"a","timestamp":"yesterday","isRead":false,"isDelivered":true}]}"#,
            )
            .unwrap();

        let (loaded, faults) = store.load_with_faults();
        assert!(loaded.messages.is_empty());
        assert_eq!(faults.len(), 1);
    }

    #[test]
    fn active_chat_round_trip_and_clear() {
        let store = ChatStore::in_memory().unwrap();
        assert_eq!(store.active_chat(), None);

        store.set_active_chat("friend-1").unwrap();
        assert_eq!(store.active_chat().as_deref(), Some("friend-1"));

        store.save(&sample_snapshot()).unwrap();
        store.set_theme(Theme::Dark).unwrap();
        store.clear().unwrap();

        assert_eq!(store.load(), Snapshot::default());
        assert_eq!(store.theme(), Theme::Dark);
    }

    #[test]
    fn saving_without_active_chat_removes_it() {
        let store = ChatStore::in_memory().unwrap();
        store.set_active_chat("ai-assistant").unwrap();

        let mut snapshot = sample_snapshot();
        snapshot.active_chat = None;
        store.save(&snapshot).unwrap();

        assert_eq!(store.active_chat(), None);
    }

    #[test]
    fn unknown_theme_falls_back_to_light() {
        let store = ChatStore::in_memory().unwrap();
        store.db.put(THEME_KEY, "neon").unwrap();
        assert_eq!(store.theme(), Theme::Light);
    }
}
