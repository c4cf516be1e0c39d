use crate::models::project::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A submitted command line. Never mutated after creation and sent exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    id: Uuid,
    text: String,
    project: ProjectId,
    submitted_at: DateTime<Utc>,
}

impl Command {
    /// Build a command from a raw input line. Returns `None` for empty or
    /// whitespace-only lines.
    pub fn new(line: &str, project: &ProjectId) -> Option<Self> {
        let text = line.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            project: project.clone(),
            submitted_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}
