use super::types::Persona;
use crate::responder::Turn;

/// Identifies an in-flight reply: which chat it belongs to, who answers
/// and the chat generation it was requested under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub chat_id: String,
    pub sender_id: String,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub ticket: PendingReply,
    pub persona: Persona,
    /// Prior turns plus the message that triggered the request.
    pub history: Vec<Turn>,
}

/// Commands the UI sends to the responder worker.
#[derive(Debug, Clone)]
pub enum ResponderCommand {
    Reply(ReplyRequest),
}
