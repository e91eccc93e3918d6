//! Anthropic Messages API provider

use super::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = http_client(config.timeout_secs.unwrap_or(120))?;
        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or("https://api.anthropic.com/v1")
    }
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn models(&self) -> Vec<String> {
        vec![
            "claude-sonnet-4-5-20250929".into(),
            "claude-haiku-4-5-20251001".into(),
            "claude-3-opus-20240229".into(),
        ]
    }

    fn default_model(&self) -> &str {
        self.config
            .default_model
            .as_deref()
            .unwrap_or("claude-sonnet-4-5-20250929")
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(ProviderError::AuthenticationFailed),
        };

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.default_model().to_string());
        let api_request = build_request(model, request);

        let mut req = self
            .client
            .post(format!("{}/messages", self.base_url()))
            .header("x-api-key", api_key)
            .header("content-type", "application/json")
            .json(&api_request);

        if !self.config.headers.contains_key("anthropic-version") {
            req = req.header("anthropic-version", "2023-06-01");
        }
        for (key, value) in &self.config.headers {
            req = req.header(key, value);
        }

        let response = req
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();

            if status == 429 {
                return Err(ProviderError::RateLimited { retry_after: None });
            } else if status == 401 {
                return Err(ProviderError::AuthenticationFailed);
            } else if status == 404 {
                return Err(ProviderError::ModelNotFound(api_request.model));
            }

            return Err(ProviderError::Api { status, message: text });
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        parse_response(api_response)
    }
}

fn build_request(model: String, request: CompletionRequest) -> AnthropicRequest {
    let mut system: Option<String> = None;
    let mut messages: Vec<AnthropicMessage> = Vec::new();

    for msg in request.messages {
        match msg.role {
            Role::System => {
                let text = msg.content.unwrap_or_default();
                system = Some(match system {
                    Some(prev) => format!("{}\n\n{}", prev, text),
                    None => text,
                });
            }
            Role::User => messages.push(AnthropicMessage {
                role: "user".into(),
                content: AnthropicContent::Text(msg.content.unwrap_or_default()),
            }),
            Role::Assistant => {
                let calls = msg.tool_calls.unwrap_or_default();
                if calls.is_empty() {
                    messages.push(AnthropicMessage {
                        role: "assistant".into(),
                        content: AnthropicContent::Text(msg.content.unwrap_or_default()),
                    });
                    continue;
                }

                let mut blocks = Vec::with_capacity(calls.len() + 1);
                if let Some(text) = msg.content.filter(|t| !t.is_empty()) {
                    blocks.push(AnthropicContentBlock::Text { text });
                }
                for call in calls {
                    let input = call
                        .parse_arguments::<serde_json::Value>()
                        .unwrap_or_else(|_| serde_json::json!({}));
                    blocks.push(AnthropicContentBlock::ToolUse {
                        id: call.id,
                        name: call.name,
                        input,
                    });
                }
                messages.push(AnthropicMessage {
                    role: "assistant".into(),
                    content: AnthropicContent::Blocks(blocks),
                });
            }
            Role::Tool => {
                let block = AnthropicContentBlock::ToolResult {
                    tool_use_id: msg.tool_call_id.unwrap_or_default(),
                    content: msg.content.unwrap_or_default(),
                };
                // Results for one assistant turn share a single user message
                if let Some(blocks) = messages.last_mut().and_then(|m| m.tool_result_blocks()) {
                    blocks.push(block);
                } else {
                    messages.push(AnthropicMessage {
                        role: "user".into(),
                        content: AnthropicContent::Blocks(vec![block]),
                    });
                }
            }
        }
    }

    AnthropicRequest {
        model,
        messages,
        system,
        max_tokens: request.max_tokens.unwrap_or(4096),
        temperature: request.temperature,
        tools: request.tools.map(|tools| {
            tools
                .into_iter()
                .map(|t| AnthropicTool {
                    name: t.name,
                    description: t.description,
                    input_schema: t.parameters,
                })
                .collect()
        }),
        stop_sequences: request.stop,
    }
}

fn parse_response(api_response: AnthropicResponse) -> Result<CompletionResponse, ProviderError> {
    let mut content = String::new();
    let mut tool_calls = Vec::new();

    for block in api_response.content {
        match block {
            ContentBlock::Text { text } => content.push_str(&text),
            ContentBlock::ToolUse { id, name, input } => {
                let arguments = serde_json::to_string(&input)
                    .map_err(|e| ProviderError::Parse(e.to_string()))?;
                tool_calls.push(ToolCall::new(id, name, arguments));
            }
            ContentBlock::Other => {}
        }
    }

    let finish_reason = match api_response.stop_reason.as_deref() {
        Some("end_turn") | Some("stop_sequence") => FinishReason::Stop,
        Some("max_tokens") => FinishReason::Length,
        Some("tool_use") => FinishReason::ToolCalls,
        _ => FinishReason::Unknown,
    };

    let usage = Usage {
        prompt_tokens: api_response.usage.input_tokens,
        completion_tokens: api_response.usage.output_tokens,
        total_tokens: api_response.usage.input_tokens + api_response.usage.output_tokens,
    };

    Ok(CompletionResponse {
        id: api_response.id,
        model: api_response.model,
        content: if content.is_empty() { None } else { Some(content) },
        tool_calls,
        finish_reason,
        usage,
    })
}

// ============================================================================
// Anthropic API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<AnthropicTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: AnthropicContent,
}

impl AnthropicMessage {
    /// Block list of a user message that already carries tool results
    fn tool_result_blocks(&mut self) -> Option<&mut Vec<AnthropicContentBlock>> {
        if self.role != "user" {
            return None;
        }
        match &mut self.content {
            AnthropicContent::Blocks(blocks)
                if blocks
                    .iter()
                    .all(|b| matches!(b, AnthropicContentBlock::ToolResult { .. })) =>
            {
                Some(blocks)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum AnthropicContent {
    Text(String),
    Blocks(Vec<AnthropicContentBlock>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    id: String,
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: usize,
    output_tokens: usize,
}
