use crate::common::{Chat, LOCAL_USER_ID, Persona, User};

pub const AI_CHAT_ID: &str = "ai-assistant";
pub const FRIEND_CHAT_ID: &str = "friend-1";
pub const AI_USER_ID: &str = "ai";
pub const FRIEND_USER_ID: &str = "friend-1";

fn local_user() -> User {
    User {
        id: LOCAL_USER_ID.to_string(),
        name: "You".to_string(),
        avatar: None,
        is_online: true,
        last_seen: None,
        is_ai: false,
        persona: None,
    }
}

fn direct_chat(id: &str, peer: User) -> Chat {
    Chat {
        id: id.to_string(),
        name: peer.name.clone(),
        participants: vec![local_user(), peer],
        last_message: None,
        unread_count: 0,
        is_group: false,
        avatar: None,
    }
}

/// Chats created on first run: the assistant and a friend.
pub fn initial_chats() -> Vec<Chat> {
    vec![
        direct_chat(
            AI_CHAT_ID,
            User {
                id: AI_USER_ID.to_string(),
                name: "AI Assistant".to_string(),
                avatar: None,
                is_online: true,
                last_seen: None,
                is_ai: true,
                persona: Some(Persona::Assistant),
            },
        ),
        direct_chat(
            FRIEND_CHAT_ID,
            User {
                id: FRIEND_USER_ID.to_string(),
                name: "John Doe".to_string(),
                avatar: None,
                is_online: false,
                last_seen: None,
                is_ai: false,
                persona: Some(Persona::Friend),
            },
        ),
    ]
}

/// Gives the seeded friend its persona when the stored record has none,
/// as records written before personas existed do. Returns how many
/// participants changed.
pub fn backfill_personas(chats: &mut [Chat]) -> usize {
    let mut filled = 0;
    for participant in chats.iter_mut().flat_map(|chat| chat.participants.iter_mut()) {
        if participant.id == FRIEND_USER_ID && !participant.is_ai && participant.persona.is_none() {
            participant.persona = Some(Persona::Friend);
            filled += 1;
        }
    }
    filled
}
