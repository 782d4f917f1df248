use super::commands::PendingReply;
use crate::responder::Reply;

/// Events the responder worker sends back to the UI.
#[derive(Debug)]
pub enum ResponderEvent {
    ReplyReady { ticket: PendingReply, reply: Reply },
}
