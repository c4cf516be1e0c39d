use crate::cli::FilesCommand;
use anyhow::{bail, Context, Result};
use tokio::io::AsyncReadExt;
use wasmide_core::config::AppConfig;
use wasmide_core::ProjectId;
use wasmide_remote::{FileSyncClient, FileWorkspace};

pub async fn run(command: FilesCommand, config: &AppConfig, project: ProjectId) -> Result<()> {
    let client = FileSyncClient::from_config(&config.backend, project)
        .context("invalid file server configuration")?;
    let mut workspace = FileWorkspace::new(client);

    match command {
        FilesCommand::List => {
            workspace.refresh().await;
            print_listing(&workspace);
        }
        FilesCommand::Open { name } => {
            workspace.select_file(&name).await;
            check_view(&workspace)?;
            if let Some(file) = workspace.selected() {
                print!("{}", file.content);
            }
        }
        FilesCommand::Write { name, content } => {
            let content = match content {
                Some(content) => content,
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut buf)
                        .await
                        .context("failed to read content from stdin")?;
                    buf
                }
            };
            workspace.select_unloaded(&name);
            workspace.edit(content).await;
            check_view(&workspace)?;
        }
        FilesCommand::Create { name } => {
            workspace.create_file(&name).await;
            check_view(&workspace)?;
            print_listing(&workspace);
        }
        FilesCommand::Run { lang } => {
            workspace
                .client()
                .run_code(&lang)
                .await
                .with_context(|| format!("failed to run {} code", lang))?;
            println!("Started {} run for project {}", lang, workspace.client().project());
        }
    }
    Ok(())
}

fn print_listing(workspace: &FileWorkspace) {
    match workspace.list_banner() {
        Some(banner) => println!("{}", banner),
        None => {
            for name in workspace.file_names() {
                println!("{}", name);
            }
        }
    }
}

fn check_view(workspace: &FileWorkspace) -> Result<()> {
    if let Some(message) = workspace.view().error_message() {
        bail!("{}", message);
    }
    Ok(())
}
