use serde::{Deserialize, Serialize};

/// Shown in place of the file list when listing fails.
pub const NO_FILES_MESSAGE: &str = "no files available";
/// Shown in place of the file view when loading a selected file fails.
pub const LOAD_FAILED_MESSAGE: &str = "failed to load file content";
/// Shown in place of the file view when persisting an edit fails.
pub const SAVE_FAILED_MESSAGE: &str = "failed to save changes";
/// Shown in place of the file view when creating a file fails.
pub const CREATE_FAILED_MESSAGE: &str = "failed to create file";

/// Characters the file server refuses in a file name.
const FORBIDDEN_NAME_CHARS: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// A named file within a project's workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub content: String,
    pub selected: bool,
}

impl FileHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// What the file pane currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkspaceView {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

impl WorkspaceView {
    pub fn error_message(&self) -> Option<&str> {
        match self {
            WorkspaceView::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Whether the file server will accept `name` as a flat file name.
pub fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains(FORBIDDEN_NAME_CHARS)
}
