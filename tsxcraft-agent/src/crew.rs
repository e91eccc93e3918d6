//! The orchestrator and its two subagents working over one session

use crate::agent::{Agent, AgentConfig, AgentOutcome, Delegate};
use crate::roles::AgentRole;
use tsxcraft_core::error::Result;
use tsxcraft_core::tools::{Subagent, TaskRequest};
use tsxcraft_core::{LlmProvider, Session, SessionStatus};

pub struct Crew<P> {
    orchestrator: Agent<P>,
    analyser: Agent<P>,
    styling: Agent<P>,
}

impl<P: LlmProvider> Crew<P> {
    /// One provider per role
    pub fn new(orchestrator: P, analyser: P, styling: P) -> Self {
        Self::with_config(orchestrator, analyser, styling, AgentConfig::default())
    }

    pub fn with_config(orchestrator: P, analyser: P, styling: P, config: AgentConfig) -> Self {
        Self {
            orchestrator: Agent::with_config(AgentRole::Orchestrator, orchestrator, config.clone()),
            analyser: Agent::with_config(AgentRole::HtmlAnalyser, analyser, config.clone()),
            styling: Agent::with_config(AgentRole::TsxStyling, styling, config),
        }
    }

    /// Run the orchestrator on `input`, continuing the session's conversation.
    ///
    /// Marks the session completed or failed.
    pub async fn run(&self, session: &mut Session, input: &str) -> Result<AgentOutcome> {
        tracing::info!(session = session.id(), "orchestrator run");

        let mut messages = std::mem::take(&mut session.messages);
        messages.push(tsxcraft_core::ChatMessage::user(input));

        let mut subagents = Subagents {
            analyser: &self.analyser,
            styling: &self.styling,
        };
        let result = self
            .orchestrator
            .drive(session, &mut messages, &mut subagents)
            .await;
        session.messages = messages;

        session.set_status(match result {
            Ok(_) => SessionStatus::Completed,
            Err(_) => SessionStatus::Failed,
        });
        result
    }

    /// Run the HTML analyser alone
    pub async fn run_analyzer(&self, session: &mut Session, input: &str) -> Result<AgentOutcome> {
        self.analyser.invoke(session, input).await
    }

    /// Run the styling agent alone
    pub async fn run_styling(&self, session: &mut Session, input: &str) -> Result<AgentOutcome> {
        self.styling.invoke(session, input).await
    }
}

struct Subagents<'a, P> {
    analyser: &'a Agent<P>,
    styling: &'a Agent<P>,
}

impl<P: LlmProvider> Delegate for Subagents<'_, P> {
    async fn delegate(&mut self, session: &mut Session, task: TaskRequest) -> Result<AgentOutcome> {
        let agent = match task.subagent {
            Subagent::HtmlAnalyser => self.analyser,
            Subagent::TsxStyling => self.styling,
        };
        let outcome = agent.invoke(session, &task.description).await?;
        tracing::info!(subagent = %task.subagent, steps = outcome.steps, "subagent finished");
        Ok(outcome)
    }
}
