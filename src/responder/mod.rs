pub mod completion;
pub mod error;
pub mod mock;
pub mod persona;
pub mod worker;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::{LOCAL_USER_ID, Message, Persona};
use crate::config::ResponderConfig;

pub use completion::CompletionClient;
pub use error::ResponderError;
pub use mock::MockResponder;
pub use worker::ResponderWorker;

/// Used when the endpoint answers without any content.
pub const FALLBACK_REPLY: &str = "Sorry, I could not process your message.";
/// Delivered in place of a reply when the endpoint could not be reached.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: &str) -> Self {
        Self {
            role: Role::System,
            content: content.to_string(),
        }
    }

    /// The local user's messages are user turns, everyone else speaks as
    /// the assistant.
    pub fn from_message(message: &Message) -> Self {
        let role = if message.sender_id == LOCAL_USER_ID {
            Role::User
        } else {
            Role::Assistant
        };
        Self {
            role,
            content: message.text.clone(),
        }
    }
}

/// Reply text plus the fault it replaced, if any.
#[derive(Debug)]
pub struct Reply {
    pub text: String,
    pub fault: Option<ResponderError>,
}

impl Reply {
    fn ok(text: String) -> Self {
        Self { text, fault: None }
    }
}

/// Produces reply text, either canned or from a remote endpoint.
#[derive(Debug, Clone)]
pub enum Responder {
    Mock(MockResponder),
    Remote(CompletionClient),
}

impl Responder {
    /// Remote when a usable credential is configured, mock otherwise.
    pub fn from_config(config: &ResponderConfig) -> Self {
        let mock = MockResponder::with_delay(
            Duration::from_millis(config.mock_delay_min_ms),
            Duration::from_millis(config.mock_delay_max_ms),
        );

        let Some(api_key) = config.credential() else {
            log::info!("No API key configured; replies are simulated");
            return Responder::Mock(mock);
        };

        match CompletionClient::new(
            &config.base_url,
            api_key,
            &config.model,
            Duration::from_secs(config.request_timeout_secs),
        ) {
            Ok(client) => {
                log::info!("Replies come from {} ({})", config.base_url, config.model);
                Responder::Remote(client)
            }
            Err(err) => {
                log::error!("Failed to build HTTP client, falling back to simulated replies: {err}");
                Responder::Mock(mock)
            }
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Responder::Mock(_))
    }

    /// Never fails: faults become [`ERROR_REPLY`] and are kept on the reply.
    pub async fn reply(&self, history: &[Turn], persona: Persona) -> Reply {
        match self {
            Responder::Mock(mock) => Reply::ok(mock.reply(persona).await),
            Responder::Remote(client) => match client.complete(history, persona).await {
                Ok(text) => Reply::ok(text),
                Err(err) => {
                    log::error!("Completion request failed: {err}");
                    Reply {
                        text: ERROR_REPLY.to_string(),
                        fault: Some(err),
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> ResponderConfig {
        ResponderConfig {
            api_key: api_key.map(str::to_string),
            ..ResponderConfig::default()
        }
    }

    #[test]
    fn mode_follows_credential() {
        assert!(Responder::from_config(&config(None)).is_mock());
        assert!(Responder::from_config(&config(Some(""))).is_mock());
        assert!(Responder::from_config(&config(Some(crate::config::API_KEY_PLACEHOLDER))).is_mock());
        assert!(!Responder::from_config(&config(Some("sk-real"))).is_mock());
    }

    #[tokio::test]
    async fn unreachable_endpoint_becomes_apology() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        let responder = Responder::Remote(CompletionClient::with_client(
            http,
            &format!("http://{addr}"),
            "sk-test",
            "gpt-3.5-turbo",
        ));

        let reply = responder.reply(&[], Persona::Assistant).await;
        assert_eq!(reply.text, ERROR_REPLY);
        assert!(matches!(reply.fault, Some(ResponderError::Transport(_))));
    }

    #[test]
    fn turns_map_sender_to_role() {
        let message = Message {
            id: "1".to_string(),
            text: "yo".to_string(),
            sender_id: "friend-1".to_string(),
            chat_id: "friend-1".to_string(),
            timestamp: chrono::Utc::now(),
            is_read: false,
            is_delivered: true,
        };
        assert_eq!(Turn::from_message(&message).role, Role::Assistant);
    }
}
