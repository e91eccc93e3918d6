//! Structured styling request handed to the orchestrator

use crate::error::{self, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whether the target component is new or already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Create,
    #[serde(alias = "update")]
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylingRequest {
    /// HTML/CSS design snippet to reproduce
    pub html_snippet: String,
    /// Path of the component to create or edit
    pub target_component: String,
    pub file: FileAction,
    /// High-level description of the change
    pub action: String,
    #[serde(default)]
    pub details: Vec<String>,
    /// Existing files to study for patterns
    #[serde(default)]
    pub reference_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_step: Option<u32>,
}

impl StylingRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            error::parse_error(format!("invalid styling request: {}", e))
                .with_operation("request::from_json")
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            error::io_error(format!("failed to read {}: {}", path.display(), e))
                .with_operation("request::from_path")
        })?;
        Self::from_json(&json)
    }

    /// The user message sent to the orchestrator: the request as pretty JSON
    pub fn to_prompt(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| error::serialization_error(e.to_string()).with_operation("request::to_prompt"))
    }

    /// Project files worth loading into the virtual store, target first, without duplicates
    pub fn files_to_seed(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::with_capacity(self.reference_files.len() + 1);
        if self.file == FileAction::Edit {
            paths.push(&self.target_component);
        }
        for path in &self.reference_files {
            if !paths.contains(&path.as_str()) {
                paths.push(path);
            }
        }
        paths
    }

    /// Short summary used as a session task
    pub fn summary(&self) -> String {
        let verb = match self.file {
            FileAction::Create => "create",
            FileAction::Edit => "edit",
        };
        format!("{} {}: {}", verb, self.target_component, self.action)
    }
}
