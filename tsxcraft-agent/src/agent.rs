//! Agent implementation - the model <-> tools loop for one role

use crate::roles::AgentRole;
use tsxcraft_core::error::{self, ErrorKind, Result};
use tsxcraft_core::tools::{self, TaskRequest, ToolOutput};
use tsxcraft_core::{
    ChatMessage, CompletionRequest, LlmProvider, Session, UsageTracker, TEMPERATURE,
};

/// Configuration for an agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model turns allowed before giving up
    pub max_steps: usize,
    /// Completion budget per model call
    pub max_tokens: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 40,
            max_tokens: Some(8192),
        }
    }
}

/// Result of one agent invocation
#[derive(Debug, Clone, Default)]
pub struct AgentOutcome {
    /// Final text of the last model turn
    pub reply: String,
    /// Model turns taken, subagents included
    pub steps: usize,
    pub usage: UsageTracker,
}

/// Runs `task` tool calls on behalf of an agent
#[allow(async_fn_in_trait)]
pub trait Delegate {
    async fn delegate(&mut self, session: &mut Session, task: TaskRequest) -> Result<AgentOutcome>;
}

/// Delegate for agents that cannot hand work off
pub struct NoDelegate;

impl Delegate for NoDelegate {
    async fn delegate(&mut self, _session: &mut Session, task: TaskRequest) -> Result<AgentOutcome> {
        Err(error::subagent_unknown(task.subagent.as_str()))
    }
}

/// One role bound to a model
pub struct Agent<P> {
    role: AgentRole,
    provider: P,
    config: AgentConfig,
}

impl<P: LlmProvider> Agent<P> {
    pub fn new(role: AgentRole, provider: P) -> Self {
        Self::with_config(role, provider, AgentConfig::default())
    }

    pub fn with_config(role: AgentRole, provider: P, config: AgentConfig) -> Self {
        Self {
            role,
            provider,
            config,
        }
    }

    /// Run from a fresh conversation holding only `input`.
    pub async fn invoke(&self, session: &mut Session, input: &str) -> Result<AgentOutcome> {
        let mut messages = vec![ChatMessage::user(input)];
        self.drive(session, &mut messages, &mut NoDelegate).await
    }

    /// Loop until the model answers without tool calls.
    ///
    /// `messages` excludes the system prompt and is extended in place.
    pub async fn drive<D: Delegate>(
        &self,
        session: &mut Session,
        messages: &mut Vec<ChatMessage>,
        delegate: &mut D,
    ) -> Result<AgentOutcome> {
        let role = self.role.name();
        let definitions = tools::definitions(self.role.tools());
        let mut outcome = AgentOutcome::default();

        for step in 1..=self.config.max_steps {
            let mut conversation = Vec::with_capacity(messages.len() + 1);
            conversation.push(ChatMessage::system(self.role.system_prompt()));
            conversation.extend(messages.iter().cloned());

            let mut request = CompletionRequest::new(conversation)
                .with_tools(definitions.clone())
                .with_temperature(TEMPERATURE);
            if let Some(max) = self.config.max_tokens {
                request = request.with_max_tokens(max);
            }

            session.record_llm_call();
            let response = self.provider.complete(request).await.map_err(|e| {
                e.into_error("agent::drive")
                    .with_context("role", role)
                    .with_context("step", step.to_string())
            })?;

            outcome.steps += 1;
            outcome.usage.track(&response.model, &response.usage);
            tracing::info!(
                role,
                step,
                tool_calls = response.tool_calls.len(),
                tokens = response.usage.total_tokens,
                "model turn"
            );

            if response.tool_calls.is_empty() {
                let reply = response.content.unwrap_or_default();
                messages.push(ChatMessage::assistant(reply.clone()));
                outcome.reply = reply;
                return Ok(outcome);
            }

            messages.push(ChatMessage::assistant_tool_calls(
                response.content,
                response.tool_calls.clone(),
            ));

            for (i, call) in response.tool_calls.iter().enumerate() {
                let result = match tools::execute(session, self.role.tools(), call) {
                    ToolOutput::Text(text) => text,
                    ToolOutput::Delegate(task) => {
                        tracing::info!(role, subagent = %task.subagent, "delegating task");
                        match delegate.delegate(session, task).await {
                            Ok(sub) => {
                                outcome.steps += sub.steps;
                                outcome.usage.absorb(&sub.usage);
                                sub.reply
                            }
                            // A stuck subagent is reported to the caller's model, not fatal
                            Err(err) if err.kind() == ErrorKind::StepLimitExceeded => {
                                tracing::warn!(role, error = %err, "subagent gave up");
                                tools::error_result(&err)
                            }
                            // Every call id of the turn still gets a result
                            Err(err) => {
                                let failed = tools::error_result(&err);
                                for pending in &response.tool_calls[i..] {
                                    messages.push(ChatMessage::tool_result(
                                        pending.id.clone(),
                                        failed.clone(),
                                    ));
                                }
                                return Err(err);
                            }
                        }
                    }
                };
                messages.push(ChatMessage::tool_result(call.id.clone(), result));
            }
        }

        Err(error::step_limit_exceeded(role, self.config.max_steps).with_operation("agent::drive"))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tsxcraft_core::{
        CompletionResponse, FinishReason, ProviderError, Role, ToolCall, Usage,
    };

    /// Replays canned responses and records every request
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedProvider {
        script: Arc<Mutex<VecDeque<CompletionResponse>>>,
        pub(crate) requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl ScriptedProvider {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn tool_turn(&self, calls: Vec<ToolCall>) -> &Self {
            self.push(None, calls)
        }

        pub(crate) fn text_turn(&self, text: &str) -> &Self {
            self.push(Some(text.to_string()), Vec::new())
        }

        fn push(&self, content: Option<String>, tool_calls: Vec<ToolCall>) -> &Self {
            let finish_reason = if tool_calls.is_empty() {
                FinishReason::Stop
            } else {
                FinishReason::ToolCalls
            };
            self.script.lock().unwrap().push_back(CompletionResponse {
                id: "resp".into(),
                model: "scripted".into(),
                content,
                tool_calls,
                finish_reason,
                usage: Usage {
                    prompt_tokens: 10,
                    completion_tokens: 2,
                    total_tokens: 12,
                },
            });
            self
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn models(&self) -> Vec<String> {
            vec!["scripted".into()]
        }

        fn default_model(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ProviderError::Other("script exhausted".into()))
        }
    }

    pub(crate) fn call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall::new(id, name, args.to_string())
    }

    #[tokio::test]
    async fn test_executes_tools_then_stops() {
        let provider = ScriptedProvider::new();
        provider
            .tool_turn(vec![
                call("c1", "read_tsx", serde_json::json!({"file_path": "Card.tsx"})),
                call("c2", "write_scratch_pad", serde_json::json!({"diffs": {"Card.tsx": "use p-6"}})),
            ])
            .text_turn("Recorded one diff.");

        let mut session = Session::new("s", "t");
        session.files.write("Card.tsx", "<div className=\"p-4\" />");

        let agent = Agent::new(AgentRole::HtmlAnalyser, provider.clone());
        let outcome = agent.invoke(&mut session, "analyse").await.unwrap();

        assert_eq!(outcome.reply, "Recorded one diff.");
        assert_eq!(outcome.steps, 2);
        assert_eq!(outcome.usage.total_tokens(), 24);
        assert_eq!(session.scratch_pad.get("Card.tsx").unwrap().rationale, "use p-6");
        assert_eq!(session.metadata.llm_calls, 2);
        assert_eq!(session.metadata.tool_calls, 2);

        let requests = provider.requests.lock().unwrap();
        let first = &requests[0];
        assert_eq!(first.messages[0].role, Role::System);
        assert_eq!(first.temperature, Some(0.0));
        assert_eq!(first.tools.as_ref().unwrap().len(), 3);

        // second request replays the tool calls and their results in order
        let second = &requests[1].messages;
        assert_eq!(second.len(), 5);
        assert_eq!(second[2].tool_calls.as_ref().unwrap().len(), 2);
        assert_eq!(second[3].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(second[3].content.as_deref(), Some("     1\t<div className=\"p-4\" />"));
        assert_eq!(second[4].content.as_deref(), Some("Updated scratch pad with 1 file(s)"));
    }

    #[tokio::test]
    async fn test_tool_errors_fed_back() {
        let provider = ScriptedProvider::new();
        provider
            .tool_turn(vec![
                call("c1", "write_tsx", serde_json::json!({"file_path": "a.tsx", "content": "x"})),
                call("c2", "read_tsx", serde_json::json!({"file_path": "missing.tsx"})),
            ])
            .text_turn("done");

        let mut session = Session::new("s", "t");
        let agent = Agent::new(AgentRole::HtmlAnalyser, provider.clone());
        agent.invoke(&mut session, "go").await.unwrap();

        let requests = provider.requests.lock().unwrap();
        let results = &requests[1].messages;
        assert_eq!(results[3].content.as_deref(), Some("Error: unknown tool 'write_tsx'"));
        assert_eq!(results[4].content.as_deref(), Some("Error: TSX file 'missing.tsx' not found"));
        assert!(session.files.is_empty());
    }

    #[tokio::test]
    async fn test_step_limit() {
        let provider = ScriptedProvider::new();
        for i in 0..3 {
            provider.tool_turn(vec![call(&format!("c{}", i), "read_scratch_pad", serde_json::json!({}))]);
        }

        let mut session = Session::new("s", "t");
        let config = AgentConfig {
            max_steps: 2,
            max_tokens: None,
        };
        let agent = Agent::with_config(AgentRole::TsxStyling, provider.clone(), config);
        let err = agent.invoke(&mut session, "apply").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StepLimitExceeded);
        assert_eq!(provider.request_count(), 2);
        assert!(provider.requests.lock().unwrap()[0].max_tokens.is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = ScriptedProvider::new();
        let mut session = Session::new("s", "t");
        let agent = Agent::new(AgentRole::TsxStyling, provider);

        let err = agent.invoke(&mut session, "apply").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InferenceFailed);
        assert_eq!(err.operation(), "agent::drive");
    }
}
