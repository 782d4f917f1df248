pub mod commands;
pub mod events;
pub mod types;

pub use commands::{PendingReply, ReplyRequest, ResponderCommand};
pub use events::ResponderEvent;
pub use types::{Chat, LOCAL_USER_ID, Message, Persona, Snapshot, Theme, User};
