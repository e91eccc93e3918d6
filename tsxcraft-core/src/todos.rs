//! Orchestrator todo list - the plan the orchestrator keeps while delegating

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Completed => "completed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub content: String,
    #[serde(default)]
    pub status: TodoStatus,
}

impl Todo {
    pub fn new(content: impl Into<String>, status: TodoStatus) -> Self {
        Self {
            content: content.into(),
            status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoList {
    items: Vec<Todo>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the list
    pub fn write(&mut self, todos: Vec<Todo>) -> String {
        self.items = todos;
        format!("Updated todo list with {} item(s)", self.items.len())
    }

    pub fn read(&self) -> String {
        if self.items.is_empty() {
            return "No todos currently in the list.".to_string();
        }

        let mut out = String::from("Current TODO List:");
        for (i, todo) in self.items.iter().enumerate() {
            out.push_str(&format!("\n{}. [{}] {}", i + 1, todo.status, todo.content));
        }
        out
    }

    /// Count of items not yet completed
    pub fn open_count(&self) -> usize {
        self.items
            .iter()
            .filter(|t| t.status != TodoStatus::Completed)
            .count()
    }
}
