use tokio::sync::mpsc;

use crate::common::{ReplyRequest, ResponderCommand, ResponderEvent};

use super::Responder;

/// Background task answering reply requests from the UI.
pub struct ResponderWorker {
    responder: Responder,
    command_receiver: mpsc::Receiver<ResponderCommand>,
    event_sender: mpsc::Sender<ResponderEvent>,
}

impl ResponderWorker {
    pub fn new(
        responder: Responder,
        command_receiver: mpsc::Receiver<ResponderCommand>,
        event_sender: mpsc::Sender<ResponderEvent>,
    ) -> Self {
        Self {
            responder,
            command_receiver,
            event_sender,
        }
    }

    /// Runs until every command sender is dropped. Each request gets its own
    /// task, so chats do not wait on each other.
    pub async fn run(mut self) {
        log::info!(
            "Responder worker started ({})",
            if self.responder.is_mock() { "simulated" } else { "remote" }
        );

        while let Some(command) = self.command_receiver.recv().await {
            match command {
                ResponderCommand::Reply(request) => self.spawn_reply(request),
            }
        }

        log::info!("Responder worker stopped");
    }

    fn spawn_reply(&self, request: ReplyRequest) {
        let responder = self.responder.clone();
        let event_sender = self.event_sender.clone();

        tokio::spawn(async move {
            let ReplyRequest {
                ticket,
                persona,
                history,
            } = request;
            let reply = responder.reply(&history, persona).await;

            if let Err(err) = event_sender
                .send(ResponderEvent::ReplyReady { ticket, reply })
                .await
            {
                log::warn!("Failed to deliver reply to UI: {err}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::common::{PendingReply, Persona};
    use crate::responder::MockResponder;

    fn request(chat_id: &str, persona: Persona) -> ReplyRequest {
        ReplyRequest {
            ticket: PendingReply {
                chat_id: chat_id.to_string(),
                sender_id: chat_id.to_string(),
                generation: 0,
            },
            persona,
            history: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn answers_requests_concurrently() {
        let (command_tx, command_rx) = mpsc::channel(8);
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let mock = MockResponder::with_delay(Duration::from_secs(2), Duration::from_secs(2));
        tokio::spawn(ResponderWorker::new(Responder::Mock(mock), command_rx, event_tx).run());

        let started = tokio::time::Instant::now();
        command_tx
            .send(ResponderCommand::Reply(request("a", Persona::Assistant)))
            .await
            .unwrap();
        command_tx
            .send(ResponderCommand::Reply(request("b", Persona::Friend)))
            .await
            .unwrap();

        let mut chats = Vec::new();
        for _ in 0..2 {
            let ResponderEvent::ReplyReady { ticket, reply } = event_rx.recv().await.unwrap();
            assert!(reply.fault.is_none());
            chats.push(ticket.chat_id);
        }
        chats.sort();

        assert_eq!(chats, vec!["a".to_string(), "b".to_string()]);
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
