//! OpenAI chat-completions provider
//!
//! Talks to `POST {api_base}/chat/completions`. Any OpenAI-compatible server
//! works by pointing `api_base` at it.
//!
//! ```no_run
//! use agent_llm::{CompletionRequest, LLMProvider, Message};
//! use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! # async fn run() -> agent_llm::Result<()> {
//! let provider = OpenAIProvider::with_config(OpenAIConfig::new("sk-..."))?;
//! let request = CompletionRequest::builder("gpt-3.5-turbo")
//!     .add_message(Message::user("Summarize today's BTC news"))
//!     .build();
//! let response = provider.complete(request).await?;
//! println!("{}", response.message.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};
use agent_utils::SecretStore;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Secret holding the API key
pub const API_KEY_SECRET: &str = "OPENAI_API_KEY";
/// Optional secret overriding the API base URL
pub const API_BASE_SECRET: &str = "OPENAI_API_BASE";

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Base URL, without the trailing `/chat/completions`
    pub api_base: String,
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Config from the secrets store
    ///
    /// Requires `OPENAI_API_KEY`; honours `OPENAI_API_BASE` when set.
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self> {
        let api_key = secrets
            .require(API_KEY_SECRET)
            .map_err(|e| LLMError::ConfigurationError(e.to_string()))?;

        let mut config = Self::new(api_key);
        if let Some(base) = secrets.get(API_BASE_SECRET) {
            config = config.with_api_base(base);
        }
        Ok(config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// OpenAI provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "OpenAI API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider from the secrets store
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self> {
        Self::with_config(OpenAIConfig::from_secrets(secrets)?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, tools = request.tools.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = ChatRequest {
            model: request.model.clone(),
            messages: build_chat_messages(request.system, request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools: convert_tools(&request.tools),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            warn!(status = status.as_u16(), "Chat completion failed");
            return Err(LLMError::from_status(
                status.as_u16(),
                &request.model,
                error_text,
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

        let usage = parsed.usage.unwrap_or_default();
        debug!(
            finish_reason = %choice.finish_reason,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Chat completion received"
        );

        Ok(CompletionResponse {
            message: parse_response_message(choice.message)?,
            stop_reason: map_stop_reason(&choice.finish_reason),
            usage: TokenUsage::single(usage.prompt_tokens, usage.completion_tokens),
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ChatToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &'static str, content: String) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ChatFunction,
}

#[derive(Debug, Serialize)]
struct ChatFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: ChatFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatFunctionCall {
    name: String,
    /// JSON encoded arguments
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ChatToolCall>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// The system prompt becomes the first message of the array
fn build_chat_messages(system: Option<String>, messages: Vec<Message>) -> Vec<ChatMessage> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    if let Some(sys) = system {
        out.push(ChatMessage::text("system", sys));
    }
    for msg in messages {
        convert_message(msg, &mut out);
    }
    out
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    }
}

/// Tool results become separate `tool` messages after the carrying message
fn convert_message(msg: Message, out: &mut Vec<ChatMessage>) {
    let role = role_name(msg.role);
    let blocks = match msg.content {
        Some(MessageContent::Text(text)) => {
            out.push(ChatMessage::text(role, text));
            return;
        }
        Some(MessageContent::Blocks(blocks)) => blocks,
        None => {
            out.push(ChatMessage::text(role, String::new()));
            return;
        }
    };

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    let mut tool_messages = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => texts.push(text),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(ChatToolCall {
                id,
                kind: function_kind(),
                function: ChatFunctionCall {
                    name,
                    arguments: input.to_string(),
                },
            }),
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => tool_messages.push(ChatMessage {
                role: "tool",
                content: Some(content),
                tool_calls: Vec::new(),
                tool_call_id: Some(tool_use_id),
            }),
        }
    }

    if !texts.is_empty() || !tool_calls.is_empty() {
        out.push(ChatMessage {
            role,
            content: (!texts.is_empty()).then(|| texts.join("\n")),
            tool_calls,
            tool_call_id: None,
        });
    }
    out.extend(tool_messages);
}

fn convert_tools(tools: &[ToolDefinition]) -> Vec<ChatTool> {
    tools
        .iter()
        .map(|tool| ChatTool {
            kind: "function",
            function: ChatFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

fn parse_response_message(msg: ChatResponseMessage) -> Result<Message> {
    let mut blocks = Vec::new();

    if let Some(content) = msg.content.filter(|c| !c.is_empty()) {
        blocks.push(ContentBlock::Text { text: content });
    }

    for call in msg.tool_calls {
        // Some servers send "" for argument-less calls.
        let raw = if call.function.arguments.trim().is_empty() {
            "{}"
        } else {
            call.function.arguments.as_str()
        };
        let input: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
            LLMError::UnexpectedResponse(format!(
                "Failed to parse arguments of {}: {e}",
                call.function.name
            ))
        })?;
        blocks.push(ContentBlock::ToolUse {
            id: call.id,
            name: call.function.name,
            input,
        });
    }

    Ok(Message::assistant_blocks(blocks))
}

fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "length" => StopReason::MaxTokens,
        "tool_calls" | "function_call" => StopReason::ToolUse,
        "stop" => StopReason::EndTurn,
        other => {
            debug!(reason = other, "Unrecognised finish reason");
            StopReason::EndTurn
        }
    }
}
