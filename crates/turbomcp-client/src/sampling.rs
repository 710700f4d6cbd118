//! Client-side sampling support for handling server-initiated requests
//!
//! This module provides the `SamplingHandler` trait used to respond to
//! `sampling/createMessage` requests initiated by an MCP server, plus
//! simple handlers useful for testing and development. Forwarding a
//! sampling request to a real LLM backend is the responsibility of the
//! host application; implement `SamplingHandler` and register it with
//! `Client::set_sampling_handler`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use turbomcp_client::sampling::{SamplingHandler, DefaultSamplingHandler};
//! use turbomcp_protocol::types::CreateMessageRequest;
//!
//! # async fn example(request: CreateMessageRequest) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let handler = DefaultSamplingHandler;
//! let _ = handler.handle_create_message(request).await?;
//! # Ok(()) }
//! ```

use async_trait::async_trait;
use tracing::warn;
use turbomcp_protocol::types::{
    Content, CreateMessageRequest, CreateMessageResult, Role, StopReason, TextContent,
};

/// Handler for server-initiated sampling requests
///
/// Implement this trait to handle sampling requests from MCP servers.
/// The handler receives a `CreateMessageRequest` and must return a response
/// with the generated content.
#[async_trait]
pub trait SamplingHandler: Send + Sync + std::fmt::Debug {
    /// Handle a sampling/createMessage request from the server
    async fn handle_create_message(
        &self,
        request: CreateMessageRequest,
    ) -> Result<CreateMessageResult, Box<dyn std::error::Error + Send + Sync>>;
}

/// Default sampling handler - echoes the user's message back
///
/// Useful as a placeholder while wiring up a client, or in tests that
/// don't care about the actual sampling content.
#[derive(Debug, Clone)]
pub struct DefaultSamplingHandler;

#[async_trait]
impl SamplingHandler for DefaultSamplingHandler {
    async fn handle_create_message(
        &self,
        request: CreateMessageRequest,
    ) -> Result<CreateMessageResult, Box<dyn std::error::Error + Send + Sync>> {
        warn!("Using DefaultSamplingHandler - this echoes input and does not call a real model");

        let user_message = request
            .messages
            .iter()
            .find_map(|msg| {
                if msg.role == Role::User {
                    match &msg.content {
                        Content::Text(text) => Some(text.text.clone()),
                        _ => None,
                    }
                } else {
                    None
                }
            })
            .unwrap_or_else(|| "No user message provided".to_string());

        let response_text = format!("Echo response: {}", user_message);

        Ok(CreateMessageResult {
            role: Role::Assistant,
            content: Content::Text(TextContent {
                text: response_text,
                annotations: None,
                meta: None,
            }),
            model: "turbomcp-echo".to_string(),
            stop_reason: Some(StopReason::EndTurn),
            _meta: None,
        })
    }
}

/// Mock LLM handler for testing
///
/// Simulates an LLM by providing canned responses based on the input.
/// Useful for testing and examples.
#[derive(Debug, Clone)]
pub struct MockLLMHandler {
    model_name: String,
}

impl MockLLMHandler {
    /// Create a new mock LLM handler
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
        }
    }
}

#[async_trait]
impl SamplingHandler for MockLLMHandler {
    async fn handle_create_message(
        &self,
        request: CreateMessageRequest,
    ) -> Result<CreateMessageResult, Box<dyn std::error::Error + Send + Sync>> {
        let question = request
            .messages
            .iter()
            .find_map(|msg| {
                if msg.role == Role::User {
                    match &msg.content {
                        Content::Text(text) => Some(text.text.clone()),
                        _ => None,
                    }
                } else {
                    None
                }
            })
            .unwrap_or_default();

        let response_text = if question.to_lowercase().contains("capital") {
            "The capital of France is Paris.".to_string()
        } else if question.to_lowercase().contains("2+2")
            || question.to_lowercase().contains("2 + 2")
        {
            "2 + 2 equals 4.".to_string()
        } else if question.to_lowercase().contains("hello") {
            "Hello! How can I assist you today?".to_string()
        } else {
            format!(
                "I understand you're asking about: {}. Let me help you with that.",
                question
            )
        };

        Ok(CreateMessageResult {
            role: Role::Assistant,
            content: Content::Text(TextContent {
                text: response_text,
                annotations: None,
                meta: None,
            }),
            model: self.model_name.clone(),
            stop_reason: Some(StopReason::EndTurn),
            _meta: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbomcp_protocol::types::SamplingMessage;

    fn user_request(text: &str) -> CreateMessageRequest {
        CreateMessageRequest {
            messages: vec![SamplingMessage {
                role: Role::User,
                content: Content::Text(TextContent {
                    text: text.to_string(),
                    annotations: None,
                    meta: None,
                }),
                metadata: None,
            }],
            model_preferences: None,
            system_prompt: None,
            include_context: None,
            temperature: None,
            max_tokens: 256,
            stop_sequences: None,
            _meta: None,
        }
    }

    #[tokio::test]
    async fn default_handler_echoes_input() {
        let handler = DefaultSamplingHandler;
        let result = handler
            .handle_create_message(user_request("hello there"))
            .await
            .unwrap();
        match result.content {
            Content::Text(t) => assert!(t.text.contains("hello there")),
            _ => panic!("expected text content"),
        }
    }

    #[tokio::test]
    async fn mock_handler_recognizes_known_questions() {
        let handler = MockLLMHandler::new("mock-1");
        let result = handler
            .handle_create_message(user_request("what's the capital of France?"))
            .await
            .unwrap();
        match result.content {
            Content::Text(t) => assert!(t.text.contains("Paris")),
            _ => panic!("expected text content"),
        }
    }
}
