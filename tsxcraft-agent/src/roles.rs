//! Agent roles: instructions, tool set and default model for each

use std::fmt;
use tsxcraft_core::tools::{Subagent, ToolName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    Orchestrator,
    HtmlAnalyser,
    TsxStyling,
}

impl AgentRole {
    pub fn name(&self) -> &'static str {
        match self {
            AgentRole::Orchestrator => "orchestrator",
            AgentRole::HtmlAnalyser => Subagent::HtmlAnalyser.as_str(),
            AgentRole::TsxStyling => Subagent::TsxStyling.as_str(),
        }
    }

    pub fn tools(&self) -> &'static [ToolName] {
        match self {
            AgentRole::Orchestrator => &[
                ToolName::WriteTodos,
                ToolName::ReadTodos,
                ToolName::ReadScratchPad,
                ToolName::Task,
            ],
            AgentRole::HtmlAnalyser => &[
                ToolName::ReadTsx,
                ToolName::WriteScratchPad,
                ToolName::ReadScratchPad,
            ],
            AgentRole::TsxStyling => &[
                ToolName::ReadScratchPad,
                ToolName::VerifyScratchPad,
                ToolName::ReadTsx,
                ToolName::WriteTsx,
            ],
        }
    }

    /// Registry alias used when no model is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            AgentRole::Orchestrator | AgentRole::HtmlAnalyser => "reliable",
            AgentRole::TsxStyling => "smart",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            AgentRole::Orchestrator => ORCHESTRATOR_PROMPT,
            AgentRole::HtmlAnalyser => HTML_ANALYSER_PROMPT,
            AgentRole::TsxStyling => TSX_STYLING_PROMPT,
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const ORCHESTRATOR_PROMPT: &str = r#"You are a Next.js styling orchestrator. You turn HTML snippets exported from Figma into changes to React/TypeScript components styled with Tailwind CSS.

The user message is a JSON request with: html_snippet, target_component, file ("create" or "edit"), action, details, reference_files and optionally implementation_step.

Workflow:
1. Plan the work with write_todos and keep the list current as steps finish.
2. Delegate analysis with task(subagent_type="html-analyser"). Pass the complete request: the HTML snippet, the target path, the action, every detail and the reference files. The analyser records proposed diffs on the scratch pad.
3. Check the result with read_scratch_pad.
4. Delegate the edit with task(subagent_type="tsx-styling-agent"), telling it which files the scratch pad covers.
5. Finish with a short report: files changed, new or changed props, and anything that could not be applied.

Subagents start without your context. Every task description must stand on its own.
Prioritise exact visual match, reusability, accessibility and type safety."#;

const HTML_ANALYSER_PROMPT: &str = r#"You are an HTML/CSS analysis agent. You compare an HTML design snippet against React/TSX components and propose the edits that make the components match the design exactly.

Workflow:
1. Analyse the HTML: Tailwind classes with exact values, colours, typography, spacing, layout, assets.
2. Read the target component with read_tsx (it may not exist yet when the request creates it).
3. Read the reference files with read_tsx to learn the project's patterns, props and design tokens.
4. List every gap between the HTML and the current TSX.
5. Record your proposal with write_scratch_pad, one entry per file. Prefer the structured form {"rationale": ..., "before": ..., "after": ...} where "before" is copied verbatim from the current file and "after" is its replacement. Use a plain note for new files or changes without a single anchor.

You never edit files yourself. A separate agent applies the scratch pad. Do not assume file contents you have not read.
Finish with a short summary of the recorded entries."#;

const TSX_STYLING_PROMPT: &str = r#"You are a TSX styling agent. You apply the diffs recorded on the scratch pad to the component files.

Workflow:
1. Read the scratch pad with read_scratch_pad.
2. Run verify_scratch_pad to see which "before" snippets still occur in the files.
3. For each file, read it with read_tsx, apply the recorded change and write the complete new content with write_tsx. Files that do not exist yet are created from the "after" code.
4. Re-read each written file to confirm the change landed.

Change nothing beyond what the scratch pad specifies and keep the existing formatting. If a "before" snippet does not match, do not guess: report it.
Finish with a report of the files modified and any entries that could not be applied, with reasons."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_tool_sets() {
        assert!(AgentRole::Orchestrator.tools().contains(&ToolName::Task));
        assert!(!AgentRole::HtmlAnalyser.tools().contains(&ToolName::WriteTsx));
        assert!(AgentRole::TsxStyling.tools().contains(&ToolName::WriteTsx));
        assert!(!AgentRole::TsxStyling.tools().contains(&ToolName::WriteScratchPad));
    }

    #[test]
    fn test_subagent_mapping() {
        assert_eq!(AgentRole::TsxStyling.name(), "tsx-styling-agent");
        assert_eq!(AgentRole::HtmlAnalyser.name(), "html-analyser");
        assert_eq!(AgentRole::TsxStyling.default_model(), "smart");
    }
}
