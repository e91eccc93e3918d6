//! # Agent Tools
//!
//! JSON-schema described operations over a [`Session`]. Each role is handed a
//! fixed subset; calls outside that subset are reported like unknown tools.
//!
//! Tool failures never abort a run. They come back to the model as a result
//! string starting with `Error: `.

use crate::error::{self, Result};
use crate::files::DEFAULT_READ_LIMIT;
use crate::provider::{ToolCall, ToolDefinition};
use crate::scratch_pad::{DiffEntry, DiffInput, WriteMode};
use crate::session::Session;
use crate::todos::Todo;
use serde::Deserialize;
use serde_json::json;
use std::fmt;

/// Every tool known to the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ReadTsx,
    WriteTsx,
    ReadScratchPad,
    WriteScratchPad,
    VerifyScratchPad,
    WriteTodos,
    ReadTodos,
    Task,
}

impl ToolName {
    pub const ALL: [ToolName; 8] = [
        ToolName::ReadTsx,
        ToolName::WriteTsx,
        ToolName::ReadScratchPad,
        ToolName::WriteScratchPad,
        ToolName::VerifyScratchPad,
        ToolName::WriteTodos,
        ToolName::ReadTodos,
        ToolName::Task,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ReadTsx => "read_tsx",
            ToolName::WriteTsx => "write_tsx",
            ToolName::ReadScratchPad => "read_scratch_pad",
            ToolName::WriteScratchPad => "write_scratch_pad",
            ToolName::VerifyScratchPad => "verify_scratch_pad",
            ToolName::WriteTodos => "write_todos",
            ToolName::ReadTodos => "read_todos",
            ToolName::Task => "task",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Name, description and JSON schema sent to the provider
    pub fn definition(&self) -> ToolDefinition {
        let def = ToolDefinition::new(self.as_str(), self.description());
        match self {
            ToolName::ReadTsx => def.with_parameters(json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path of the TSX file to read" },
                    "offset": { "type": "integer", "minimum": 0, "description": "0-based line to start from (default 0)" },
                    "limit": { "type": "integer", "minimum": 1, "description": "Maximum lines to return (default 2000)" }
                },
                "required": ["file_path"]
            })),
            ToolName::WriteTsx => def.with_parameters(json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path of the TSX file to write" },
                    "content": { "type": "string", "description": "Complete new file content" }
                },
                "required": ["file_path", "content"]
            })),
            ToolName::WriteScratchPad => def.with_parameters(json!({
                "type": "object",
                "properties": {
                    "diffs": {
                        "type": "object",
                        "description": "Map of file path to a diff note, or to {rationale, before, after}",
                        "additionalProperties": {
                            "oneOf": [
                                { "type": "string" },
                                {
                                    "type": "object",
                                    "properties": {
                                        "rationale": { "type": "string" },
                                        "before": { "type": "string" },
                                        "after": { "type": "string" }
                                    },
                                    "required": ["rationale"]
                                }
                            ]
                        }
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["replace", "merge"],
                        "description": "replace (default) discards earlier entries; merge keeps them"
                    }
                },
                "required": ["diffs"]
            })),
            ToolName::WriteTodos => def.with_parameters(json!({
                "type": "object",
                "properties": {
                    "todos": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "content": { "type": "string" },
                                "status": { "type": "string", "enum": ["pending", "in_progress", "completed"] }
                            },
                            "required": ["content"]
                        }
                    }
                },
                "required": ["todos"]
            })),
            ToolName::Task => def.with_parameters(json!({
                "type": "object",
                "properties": {
                    "subagent_type": {
                        "type": "string",
                        "enum": [Subagent::HtmlAnalyser.as_str(), Subagent::TsxStyling.as_str()]
                    },
                    "description": { "type": "string", "description": "Complete instructions for the subagent" }
                },
                "required": ["subagent_type", "description"]
            })),
            ToolName::ReadScratchPad | ToolName::VerifyScratchPad | ToolName::ReadTodos => def,
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ToolName::ReadTsx => "Read a TSX file from the virtual file system. Returns numbered lines.",
            ToolName::WriteTsx => "Create or completely overwrite a TSX file in the virtual file system.",
            ToolName::ReadScratchPad => "Read every diff recorded on the scratch pad.",
            ToolName::WriteScratchPad => "Record proposed diffs on the scratch pad, keyed by file path.",
            ToolName::VerifyScratchPad => "Check each recorded 'before' snippet against the current file contents.",
            ToolName::WriteTodos => "Replace the todo list used to plan the work.",
            ToolName::ReadTodos => "Read the current todo list.",
            ToolName::Task => "Delegate a task to a subagent and receive its final report.",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definitions for a role's tool set
pub fn definitions(tools: &[ToolName]) -> Vec<ToolDefinition> {
    tools.iter().map(ToolName::definition).collect()
}

/// Delegation targets of the `task` tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subagent {
    HtmlAnalyser,
    TsxStyling,
}

impl Subagent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subagent::HtmlAnalyser => "html-analyser",
            Subagent::TsxStyling => "tsx-styling-agent",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "html-analyser" => Ok(Subagent::HtmlAnalyser),
            "tsx-styling-agent" => Ok(Subagent::TsxStyling),
            other => Err(error::subagent_unknown(other)),
        }
    }
}

impl fmt::Display for Subagent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Deserialize)]
struct ReadTsxArgs {
    file_path: String,
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_READ_LIMIT
}

#[derive(Debug, Deserialize)]
struct WriteTsxArgs {
    file_path: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WriteScratchPadArgs {
    diffs: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    mode: WriteMode,
}

#[derive(Debug, Deserialize)]
struct WriteTodosArgs {
    todos: Vec<Todo>,
}

/// Parsed `task` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub subagent: Subagent,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct TaskArgs {
    subagent_type: String,
    description: String,
}

// =============================================================================
// Execution
// =============================================================================

/// What a tool call produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    /// Text handed straight back to the model
    Text(String),
    /// The caller must run a subagent and report its reply
    Delegate(TaskRequest),
}

impl ToolOutput {
    pub fn text(&self) -> Option<&str> {
        match self {
            ToolOutput::Text(text) => Some(text),
            ToolOutput::Delegate(_) => None,
        }
    }
}

/// Render an error the way the model sees it
pub fn error_result(err: &error::Error) -> String {
    format!("Error: {}", err.message())
}

/// Execute one call against the session, restricted to `allowed`.
///
/// Failures are folded into a `ToolOutput::Text("Error: ...")`.
pub fn execute(session: &mut Session, allowed: &[ToolName], call: &ToolCall) -> ToolOutput {
    session.record_tool_call();
    tracing::debug!(tool = %call.name, id = %call.id, "executing tool");

    match try_execute(session, allowed, call) {
        Ok(output) => output,
        Err(err) => {
            tracing::warn!(tool = %call.name, error = %err, "tool call failed");
            ToolOutput::Text(error_result(&err))
        }
    }
}

fn try_execute(session: &mut Session, allowed: &[ToolName], call: &ToolCall) -> Result<ToolOutput> {
    let tool = ToolName::parse(&call.name)
        .filter(|t| allowed.contains(t))
        .ok_or_else(|| error::tool_unknown(&call.name).with_operation("tools::execute"))?;

    let text = match tool {
        ToolName::ReadTsx => {
            let args: ReadTsxArgs = parse_args(tool, call)?;
            session
                .files
                .read(&args.file_path, args.offset, args.limit)?
                .to_string()
        }
        ToolName::WriteTsx => {
            let args: WriteTsxArgs = parse_args(tool, call)?;
            session.files.write(args.file_path, args.content)
        }
        ToolName::ReadScratchPad => session.scratch_pad.read(),
        ToolName::WriteScratchPad => {
            let args: WriteScratchPadArgs = parse_args(tool, call)?;
            let mut entries = Vec::with_capacity(args.diffs.len());
            for (path, value) in args.diffs {
                let input: DiffInput = serde_json::from_value(value).map_err(|e| {
                    error::tool_arguments_invalid(tool.as_str(), format!("diff for '{}': {}", path, e))
                })?;
                entries.push(DiffEntry::from_input(path, input));
            }
            session.scratch_pad.write_with_mode(entries, args.mode)
        }
        ToolName::VerifyScratchPad => session.scratch_pad.verification_report(&session.files),
        ToolName::WriteTodos => {
            let args: WriteTodosArgs = parse_args(tool, call)?;
            session.todos.write(args.todos)
        }
        ToolName::ReadTodos => session.todos.read(),
        ToolName::Task => {
            let args: TaskArgs = parse_args(tool, call)?;
            return Ok(ToolOutput::Delegate(TaskRequest {
                subagent: Subagent::parse(&args.subagent_type)?,
                description: args.description,
            }));
        }
    };

    Ok(ToolOutput::Text(text))
}

fn parse_args<T: serde::de::DeserializeOwned>(tool: ToolName, call: &ToolCall) -> Result<T> {
    call.parse_arguments()
        .map_err(|e| error::tool_arguments_invalid(tool.as_str(), e.to_string()).with_operation("tools::execute"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::EMPTY_FILE_NOTICE;
    use crate::scratch_pad::EMPTY_SCRATCH_PAD;

    const ANALYSER: &[ToolName] = &[
        ToolName::ReadTsx,
        ToolName::WriteScratchPad,
        ToolName::ReadScratchPad,
    ];

    fn call(name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall::new("call_1", name, args.to_string())
    }

    fn text(output: ToolOutput) -> String {
        match output {
            ToolOutput::Text(text) => text,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_read_tsx_defaults() {
        let mut session = Session::new("s", "t");
        session.files.write("Card.tsx", "a\nb\n");
        session.files.write("Empty.tsx", "");

        let out = text(execute(&mut session, ANALYSER, &call("read_tsx", json!({"file_path": "Card.tsx"}))));
        assert_eq!(out, "     1\ta\n     2\tb");

        let out = text(execute(&mut session, ANALYSER, &call("read_tsx", json!({"file_path": "Empty.tsx"}))));
        assert_eq!(out, EMPTY_FILE_NOTICE);
        assert_eq!(session.metadata.tool_calls, 2);
    }

    #[test]
    fn test_store_errors_become_strings() {
        let mut session = Session::new("s", "t");
        session.files.write("Card.tsx", "a\nb\n");

        let out = text(execute(&mut session, ANALYSER, &call("read_tsx", json!({"file_path": "Nope.tsx"}))));
        assert_eq!(out, "Error: TSX file 'Nope.tsx' not found");

        let out = text(execute(
            &mut session,
            ANALYSER,
            &call("read_tsx", json!({"file_path": "Card.tsx", "offset": 5})),
        ));
        assert_eq!(out, "Error: Line offset 5 exceeds file length (2 lines)");
    }

    #[test]
    fn test_unknown_and_disallowed_tools() {
        let mut session = Session::new("s", "t");

        let out = text(execute(&mut session, ANALYSER, &call("rm_rf", json!({}))));
        assert_eq!(out, "Error: unknown tool 'rm_rf'");

        // write_tsx exists but is not in the analyser set
        let out = text(execute(
            &mut session,
            ANALYSER,
            &call("write_tsx", json!({"file_path": "a.tsx", "content": "x"})),
        ));
        assert_eq!(out, "Error: unknown tool 'write_tsx'");
        assert!(session.files.is_empty());
    }

    #[test]
    fn test_malformed_arguments() {
        let mut session = Session::new("s", "t");
        let bad = ToolCall::new("c", "read_tsx", "{not json");
        let out = text(execute(&mut session, ANALYSER, &bad));
        assert!(out.starts_with("Error: invalid arguments for 'read_tsx':"));

        let out = text(execute(&mut session, ANALYSER, &call("read_tsx", json!({"offset": 1}))));
        assert!(out.starts_with("Error: invalid arguments for 'read_tsx':"));
    }

    #[test]
    fn test_write_scratch_pad_shapes_and_order() {
        let mut session = Session::new("s", "t");
        let args = json!({
            "diffs": {
                "z/Last.tsx": "plain note",
                "a/First.tsx": { "rationale": "swap padding", "before": "p-2", "after": "p-4" }
            }
        });

        let out = text(execute(&mut session, ANALYSER, &call("write_scratch_pad", args)));
        assert_eq!(out, "Updated scratch pad with 2 file(s)");

        let entries = session.scratch_pad.entries();
        assert_eq!(entries[0].path, "z/Last.tsx");
        assert_eq!(entries[0].rationale, "plain note");
        assert_eq!(entries[1].before.as_deref(), Some("p-2"));
    }

    #[test]
    fn test_write_scratch_pad_modes() {
        let mut session = Session::new("s", "t");
        execute(&mut session, ANALYSER, &call("write_scratch_pad", json!({"diffs": {"a.tsx": "one"}})));
        execute(&mut session, ANALYSER, &call("write_scratch_pad", json!({"diffs": {"b.tsx": "two"}})));
        assert!(session.scratch_pad.get("a.tsx").is_none());

        execute(
            &mut session,
            ANALYSER,
            &call("write_scratch_pad", json!({"diffs": {"c.tsx": "three"}, "mode": "merge"})),
        );
        assert!(session.scratch_pad.get("b.tsx").is_some());
        assert!(session.scratch_pad.get("c.tsx").is_some());

        let out = text(execute(&mut session, ANALYSER, &call("write_scratch_pad", json!({"diffs": {"d.tsx": 5}}))));
        assert!(out.starts_with("Error: invalid arguments for 'write_scratch_pad': diff for 'd.tsx'"));
    }

    #[test]
    fn test_read_empty_scratch_pad() {
        let mut session = Session::new("s", "t");
        let out = text(execute(&mut session, ANALYSER, &call("read_scratch_pad", json!({}))));
        assert_eq!(out, EMPTY_SCRATCH_PAD);
    }

    #[test]
    fn test_todos_round_trip() {
        let mut session = Session::new("s", "t");
        let tools = [ToolName::WriteTodos, ToolName::ReadTodos];
        let out = text(execute(
            &mut session,
            &tools,
            &call("write_todos", json!({"todos": [{"content": "Analyse", "status": "in_progress"}]})),
        ));
        assert_eq!(out, "Updated todo list with 1 item(s)");

        let out = text(execute(&mut session, &tools, &ToolCall::new("c", "read_todos", "")));
        assert_eq!(out, "Current TODO List:\n1. [in_progress] Analyse");
    }

    #[test]
    fn test_task_delegation() {
        let mut session = Session::new("s", "t");
        let tools = [ToolName::Task];

        let out = execute(
            &mut session,
            &tools,
            &call("task", json!({"subagent_type": "html-analyser", "description": "Compare"})),
        );
        assert_eq!(
            out,
            ToolOutput::Delegate(TaskRequest {
                subagent: Subagent::HtmlAnalyser,
                description: "Compare".into(),
            })
        );

        let out = text(execute(
            &mut session,
            &tools,
            &call("task", json!({"subagent_type": "general-purpose", "description": "x"})),
        ));
        assert_eq!(out, "Error: unknown subagent 'general-purpose'");
    }

    #[test]
    fn test_definitions_cover_set() {
        let defs = definitions(ANALYSER);
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["read_tsx", "write_scratch_pad", "read_scratch_pad"]);
        assert_eq!(defs[0].parameters["required"][0], "file_path");
        for tool in ToolName::ALL {
            assert_eq!(ToolName::parse(tool.as_str()), Some(tool));
        }
    }
}
