use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::common::Persona;

use super::error::{ResponderError, ResponderResult};
use super::{FALLBACK_REPLY, Turn};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Turn>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize, Debug, Default)]
struct CompletionResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> ResponderResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url, api_key, model))
    }

    pub fn with_client(http: Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// One request: persona system prompt first, then the conversation.
    pub async fn complete(&self, history: &[Turn], persona: Persona) -> ResponderResult<String> {
        let profile = persona.profile();
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Turn::system(profile.system_prompt));
        messages.extend_from_slice(history);

        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: profile.max_tokens,
            temperature: profile.temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResponderError::Status {
                status: status.as_u16(),
            });
        }

        let data: CompletionResponse = response.json().await?;
        let content = data
            .choices
            .into_iter()
            .flatten()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty());

        Ok(content.unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    use super::*;
    use crate::responder::Role;

    /// Serves a single canned HTTP response and hands back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{addr}/v1"), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn client(base_url: &str) -> CompletionClient {
        let http = Client::builder().no_proxy().build().unwrap();
        CompletionClient::with_client(http, base_url, "sk-test", "gpt-3.5-turbo")
    }

    fn history() -> Vec<Turn> {
        vec![Turn {
            role: Role::User,
            content: "hello".to_string(),
        }]
    }

    #[tokio::test]
    async fn sends_persona_prompt_and_reads_first_choice() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Hi there"}},{"message":{"content":"ignored"}}]}"#,
        )
        .await;

        let reply = client(&url).complete(&history(), Persona::Friend).await.unwrap();
        assert_eq!(reply, "Hi there");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));

        let body_start = request.find("\r\n\r\n").unwrap() + 4;
        let body: serde_json::Value = serde_json::from_str(&request[body_start..]).unwrap();
        let profile = Persona::Friend.profile();
        assert_eq!(body["max_tokens"], profile.max_tokens);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], profile.system_prompt);
        assert_eq!(body["messages"][1]["content"], "hello");
        assert!((body["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn missing_content_yields_fallback() {
        let (url, _server) = serve_once("200 OK", r#"{"choices":[]}"#).await;

        let reply = client(&url)
            .complete(&history(), Persona::Assistant)
            .await
            .unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn null_choices_yield_fallback() {
        let (url, _server) = serve_once("200 OK", r#"{"choices":null}"#).await;

        let reply = client(&url)
            .complete(&history(), Persona::Assistant)
            .await
            .unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let (url, _server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;

        let err = client(&url)
            .complete(&history(), Persona::Assistant)
            .await
            .unwrap_err();
        assert!(matches!(err, ResponderError::Status { status: 500 }));
    }
}
