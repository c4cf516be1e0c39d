use crate::error::Result;
use crate::sync::FileSyncClient;
use tracing::{debug, info, warn};
use wasmide_core::{
    FileHandle, WorkspaceView, CREATE_FAILED_MESSAGE, LOAD_FAILED_MESSAGE, NO_FILES_MESSAGE,
    SAVE_FAILED_MESSAGE,
};

/// Proof that a selection started. Only the ticket of the most recent
/// selection can complete it; older tickets are stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    name: String,
}

impl LoadTicket {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// File pane state for one session: the listed files, which one is
/// selected, and what the pane shows.
///
/// `files` only ever holds names from the last successful listing. The
/// selection is tracked apart from it, so selecting an unlisted name never
/// adds to the list.
///
/// Network failures never escape; they land in [`view`](Self::view) or
/// [`list_banner`](Self::list_banner) as fixed messages.
pub struct FileWorkspace {
    client: FileSyncClient,
    files: Vec<FileHandle>,
    selection: Option<FileHandle>,
    list_banner: Option<String>,
    view: WorkspaceView,
    generation: u64,
}

impl FileWorkspace {
    pub fn new(client: FileSyncClient) -> Self {
        Self {
            client,
            files: Vec::new(),
            selection: None,
            list_banner: None,
            view: WorkspaceView::Idle,
            generation: 0,
        }
    }

    pub fn client(&self) -> &FileSyncClient {
        &self.client
    }

    pub fn files(&self) -> &[FileHandle] {
        &self.files
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    /// The selected file with its local content.
    pub fn selected(&self) -> Option<&FileHandle> {
        self.selection.as_ref()
    }

    pub fn view(&self) -> &WorkspaceView {
        &self.view
    }

    /// Set when the last listing failed.
    pub fn list_banner(&self) -> Option<&str> {
        self.list_banner.as_deref()
    }

    /// Fetch the file list fresh. On failure the list is emptied and the
    /// banner set; the selection is untouched.
    pub async fn refresh(&mut self) {
        if let Err(e) = self.reload_list().await {
            warn!("Listing files for {} failed: {}", self.client.project(), e);
            self.files.clear();
            self.list_banner = Some(NO_FILES_MESSAGE.to_string());
        }
    }

    /// Replace the list only when the listing succeeds.
    async fn reload_list(&mut self) -> Result<()> {
        let names = self.client.list_files().await?;
        self.files = names.into_iter().map(FileHandle::new).collect();
        self.list_banner = None;
        self.mark_selected();
        debug!(
            "Listed {} files for project {}",
            self.files.len(),
            self.client.project()
        );
        Ok(())
    }

    fn mark_selected(&mut self) {
        let selected = self.selection.as_ref().map(|f| f.name.as_str());
        for file in &mut self.files {
            file.selected = Some(file.name.as_str()) == selected;
        }
    }

    fn set_selection(&mut self, name: &str) {
        self.generation += 1;
        let mut handle = FileHandle::new(name);
        handle.selected = true;
        self.selection = Some(handle);
        self.mark_selected();
    }

    /// Mark `name` selected and enter `Loading`. Any selection still loading
    /// is superseded.
    pub fn begin_select(&mut self, name: &str) -> LoadTicket {
        self.set_selection(name);
        self.view = WorkspaceView::Loading;
        LoadTicket {
            generation: self.generation,
            name: name.to_string(),
        }
    }

    /// Apply the outcome of a load. Returns `false` when the ticket was
    /// superseded by a newer selection and the outcome was dropped.
    pub fn finish_select(&mut self, ticket: LoadTicket, result: Result<String>) -> bool {
        if ticket.generation != self.generation {
            debug!("Dropping stale load of {}", ticket.name);
            return false;
        }

        match result {
            Ok(content) => {
                if let Some(file) = self.selection.as_mut() {
                    file.content = content;
                }
                self.view = WorkspaceView::Ready;
            }
            Err(e) => {
                warn!("Loading {} failed: {}", ticket.name, e);
                self.view = WorkspaceView::Error(LOAD_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    /// Select `name` and load its content.
    pub async fn select_file(&mut self, name: &str) {
        let ticket = self.begin_select(name);
        let result = self.client.load_content(ticket.name()).await;
        self.finish_select(ticket, result);
    }

    /// Select `name` with empty local content and no load, for replacing the
    /// file wholesale. Supersedes any load in flight; the view is unchanged.
    pub fn select_unloaded(&mut self, name: &str) {
        self.set_selection(name);
    }

    /// Replace the selected file's content and persist it. The local content
    /// is kept even when the save fails.
    pub async fn edit(&mut self, content: impl Into<String>) {
        let Some(file) = self.selection.as_mut() else {
            warn!("Edit ignored: no file selected");
            return;
        };
        file.content = content.into();
        let name = file.name.clone();
        let content = file.content.clone();

        match self.client.save_content(&name, &content).await {
            Ok(()) => {
                debug!("Saved {}", name);
                self.view = WorkspaceView::Ready;
            }
            Err(e) => {
                warn!("Saving {} failed: {}", name, e);
                self.view = WorkspaceView::Error(SAVE_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Create an empty file and re-list. The previous list stays as it was
    /// when either step fails.
    pub async fn create_file(&mut self, name: &str) {
        match self.client.create_file(name).await {
            Ok(()) => {
                info!("Created {}", name);
                if let Err(e) = self.reload_list().await {
                    warn!("Re-listing after creating {} failed: {}", name, e);
                }
            }
            Err(e) => {
                warn!("Creating {} failed: {}", name, e);
                self.view = WorkspaceView::Error(CREATE_FAILED_MESSAGE.to_string());
            }
        }
    }
}
