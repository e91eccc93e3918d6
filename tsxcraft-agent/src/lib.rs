//! # tsxcraft agents
//!
//! Each agent drives the model <-> tools loop for one role:
//! 1. Send the role's instructions, the conversation and its tool set
//! 2. Execute every requested tool call against the session, in order
//! 3. Append the results and ask again
//! 4. Stop when the model answers without tool calls
//!
//! The [`Crew`] runs the orchestrator and services its `task` tool by running
//! the HTML analyser or the TSX styling agent over the same session.

mod agent;
mod crew;
mod roles;

pub use agent::{Agent, AgentConfig, AgentOutcome, Delegate, NoDelegate};
pub use crew::Crew;
pub use roles::AgentRole;
