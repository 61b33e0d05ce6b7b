//! HTTP gateway to the remote assistant service.
//!
//! The gateway owns the first (and primary) resilience tier: transport
//! failures and non-success statuses never surface to the caller. Instead
//! the gateway answers from the [`responder`](crate::responder) and reports
//! which path it took through [`Exchange`]. An `Err` from [`exchange`]
//! means the gateway itself broke (a success response whose body could not
//! be parsed) and is the caller's narrow last-resort case.
//!
//! [`exchange`]: AssistantClient::exchange

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::api::{
    ArtifactInfo, ChatMessage, ChatRequest, ChatResponse, EnhanceRequest, EnhanceResponse, Role,
};
use crate::responder;

const CHAT_PATH: &str = "/api/chat/simple";
const ENHANCE_PATH: &str = "/api/enhance-prompt";

/// Outcome of a successful exchange, distinguishing a real backend reply
/// from one synthesized by the internal fallback.
#[derive(Clone, Debug)]
pub enum Exchange {
    Remote(ChatResponse),
    Fallback(ChatResponse),
}

impl Exchange {
    pub fn response(&self) -> &ChatResponse {
        match self {
            Exchange::Remote(response) | Exchange::Fallback(response) => response,
        }
    }

    pub fn into_response(self) -> ChatResponse {
        match self {
            Exchange::Remote(response) | Exchange::Fallback(response) => response,
        }
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self, Exchange::Fallback(_))
    }
}

/// Client-side seam to the assistant service.
#[async_trait]
pub trait AssistantClient {
    /// Post the message history and return a reply envelope.
    ///
    /// Transport failures are absorbed internally; `Err` is reserved for
    /// gateway-internal faults.
    async fn exchange(
        &self,
        messages: &[ChatMessage],
        conversation_id: Option<&str>,
    ) -> Result<Exchange>;

    /// Rewrite a draft prompt into a sharper one.
    async fn enhance(&self, prompt: &str) -> Result<String>;
}

/// Gateway backed by the assistant backend's HTTP API.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpGateway {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    /// Attach a bearer credential to every outgoing request.
    ///
    /// The credential comes from the surrounding application's auth layer;
    /// the gateway only carries it.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.post(url);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Synthesize a response envelope from the fallback responder.
    fn fallback_response(
        messages: &[ChatMessage],
        conversation_id: Option<&str>,
    ) -> ChatResponse {
        let query = messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map(|message| message.content.as_str())
            .unwrap_or("");
        let reply = responder::respond(query);

        ChatResponse {
            message: ChatMessage::assistant(reply.content),
            conversation_id: conversation_id
                .map(str::to_string)
                .unwrap_or_else(|| generated_id("conv")),
            artifact: reply.artifact_title.map(|title| ArtifactInfo {
                id: generated_id("artifact"),
                title: title.to_string(),
                kind: "document".to_string(),
            }),
        }
    }
}

#[async_trait]
impl AssistantClient for HttpGateway {
    async fn exchange(
        &self,
        messages: &[ChatMessage],
        conversation_id: Option<&str>,
    ) -> Result<Exchange> {
        let request = ChatRequest {
            messages: messages.to_vec(),
            conversation_id: conversation_id.map(str::to_string),
        };

        match self.post(CHAT_PATH).json(&request).send().await {
            Ok(response) if response.status().is_success() => {
                let parsed: ChatResponse = response
                    .json()
                    .await
                    .context("malformed chat response body")?;
                Ok(Exchange::Remote(parsed))
            }
            Ok(response) => {
                debug!(status = %response.status(), "backend returned error status, answering from fallback");
                Ok(Exchange::Fallback(Self::fallback_response(
                    messages,
                    conversation_id,
                )))
            }
            Err(err) => {
                debug!(error = %err, "backend unreachable, answering from fallback");
                Ok(Exchange::Fallback(Self::fallback_response(
                    messages,
                    conversation_id,
                )))
            }
        }
    }

    async fn enhance(&self, prompt: &str) -> Result<String> {
        let request = EnhanceRequest {
            prompt: prompt.to_string(),
        };
        let response = self
            .post(ENHANCE_PATH)
            .json(&request)
            .send()
            .await
            .context("enhance request failed")?
            .error_for_status()
            .context("enhance request rejected")?;
        let parsed: EnhanceResponse = response
            .json()
            .await
            .context("malformed enhance response body")?;
        Ok(parsed.enhanced_prompt)
    }
}

fn generated_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("{prefix}_{millis}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response, then close.
    async fn one_shot_server(status_line: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // Drain the request before answering.
            let mut buf = vec![0u8; 16 * 1024];
            let mut seen = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                seen.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&seen) {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    fn request_complete(bytes: &[u8]) -> bool {
        let Some(split) = bytes.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let headers = String::from_utf8_lossy(&bytes[..split]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        bytes.len() >= split + 4 + content_length
    }

    /// A base URL nothing is listening on.
    async fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn connection_refused_falls_back_with_conversation_id() {
        let gateway = HttpGateway::new(refused_url().await);
        let history = vec![ChatMessage::user("What is my estimated budget?")];

        let exchange = gateway.exchange(&history, Some("conv_42")).await.unwrap();
        assert!(exchange.used_fallback());
        let response = exchange.into_response();
        assert_eq!(response.conversation_id, "conv_42");
        assert_eq!(response.message.role, Role::Assistant);
        assert!(response.message.content.contains("budget planning"));
        let artifact = response.artifact.unwrap();
        assert_eq!(artifact.title, "Budget Estimate Draft");
        assert_eq!(artifact.kind, "document");
    }

    #[tokio::test]
    async fn connection_refused_without_id_generates_one() {
        let gateway = HttpGateway::new(refused_url().await);
        let history = vec![ChatMessage::user("hello there")];

        let response = gateway.exchange(&history, None).await.unwrap().into_response();
        assert!(response.conversation_id.starts_with("conv_"));
        assert!(response.artifact.is_none());
    }

    #[tokio::test]
    async fn server_error_status_falls_back() {
        let base_url = one_shot_server("500 Internal Server Error", "{\"error\": \"boom\"}").await;
        let gateway = HttpGateway::new(base_url);
        let history = vec![ChatMessage::user("Tell me about APS assessment workbooks")];

        let exchange = gateway.exchange(&history, Some("conv_7")).await.unwrap();
        assert!(exchange.used_fallback());
        let response = exchange.into_response();
        assert_eq!(response.conversation_id, "conv_7");
        assert!(response.message.content.contains("APS assessment workbook"));
        assert!(response.artifact.is_none());
    }

    #[tokio::test]
    async fn malformed_success_body_is_an_error() {
        let base_url = one_shot_server("200 OK", "definitely not json").await;
        let gateway = HttpGateway::new(base_url);
        let history = vec![ChatMessage::user("hi")];

        let result = gateway.exchange(&history, Some("conv_1")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn success_body_is_returned_as_remote() {
        let body = r#"{
            "message": {"role": "assistant", "content": "From the backend"},
            "conversation_id": "conv_9",
            "artifact": {"id": "a1", "title": "Plan", "type": "table"}
        }"#;
        let base_url = one_shot_server("200 OK", body).await;
        let gateway = HttpGateway::new(base_url);
        let history = vec![ChatMessage::user("anything")];

        let exchange = gateway.exchange(&history, Some("conv_9")).await.unwrap();
        assert!(!exchange.used_fallback());
        let response = exchange.into_response();
        assert_eq!(response.message.content, "From the backend");
        assert_eq!(response.artifact.unwrap().kind, "table");
    }

    #[tokio::test]
    async fn fallback_uses_most_recent_user_message() {
        let gateway = HttpGateway::new(refused_url().await);
        let history = vec![
            ChatMessage::user("first question"),
            ChatMessage::assistant("first answer"),
            ChatMessage::user("what does compliance require?"),
        ];

        let response = gateway.exchange(&history, Some("c")).await.unwrap().into_response();
        assert!(response.message.content.contains("compliance requirements"));
    }

    #[tokio::test]
    async fn enhance_returns_rewritten_prompt() {
        let base_url =
            one_shot_server("200 OK", r#"{"enhanced_prompt": "A sharper prompt"}"#).await;
        let gateway = HttpGateway::new(base_url);

        let enhanced = gateway.enhance("a prompt").await.unwrap();
        assert_eq!(enhanced, "A sharper prompt");
    }

    #[tokio::test]
    async fn enhance_propagates_failure() {
        let gateway = HttpGateway::new(refused_url().await);
        assert!(gateway.enhance("a prompt").await.is_err());
    }
}
