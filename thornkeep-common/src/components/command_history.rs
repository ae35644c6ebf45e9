use std::collections::VecDeque;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

const CAPACITY: usize = 30;

/// Bounded ring buffer of raw input lines, plus the cursor state the
/// dispatcher needs to support up/down recall with mid-recall editing
/// (§4.4: `currentHistoryIndex` / `savedCurrentCommand`).
#[derive(Component, Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    #[serde(skip)]
    pub current_index: Option<usize>,
    #[serde(skip)]
    pub saved_current_command: Option<String>,
}

impl CommandHistory {
    pub fn push(&mut self, line: String) {
        if line.is_empty() {
            return;
        }
        self.entries.push_back(line);
        if self.entries.len() > CAPACITY {
            self.entries.pop_front();
        }
        self.current_index = None;
        self.saved_current_command = None;
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }

    /// Move one entry back in history (towards older commands), returning
    /// the line to display, or `None` if already at the oldest entry.
    pub fn recall_previous(&mut self, current_line: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.current_index.is_none() {
            self.saved_current_command = Some(current_line.to_string());
            self.current_index = Some(self.entries.len());
        }
        let index = self.current_index.unwrap();
        if index == 0 {
            return None;
        }
        let next_index = index - 1;
        self.current_index = Some(next_index);
        self.entries.get(next_index).map(|s| s.as_str())
    }

    /// Move one entry forward in history, returning to the saved in-flight
    /// line once the newest entry is passed.
    pub fn recall_next(&mut self) -> Option<&str> {
        let index = self.current_index?;
        let next_index = index + 1;
        if next_index >= self.entries.len() {
            self.current_index = None;
            return self.saved_current_command.as_deref();
        }
        self.current_index = Some(next_index);
        self.entries.get(next_index).map(|s| s.as_str())
    }
}
