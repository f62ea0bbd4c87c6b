use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use super::print_json;
use crate::domain::{ResumeFile, ResumeId, ResumeUpdate, StoredResume};
use crate::infrastructure::resume_store::ResumeStore;

#[derive(Debug, Subcommand)]
pub enum ResumeCommands {
    /// Cache a resume file, replacing any previous one
    Store(StoreResumeCommand),
    /// Show the cached resume's details
    Show,
    /// Write the cached resume back to disk
    Export(ExportResumeCommand),
    /// Delete the cached resume
    Remove,
    /// Change the cached resume's name, id or metadata
    Update(UpdateResumeCommand),
}

pub fn run(store: &ResumeStore, command: ResumeCommands) -> Result<()> {
    match command {
        ResumeCommands::Store(c) => store_resume(store, c),
        ResumeCommands::Show => show_resume(store),
        ResumeCommands::Export(c) => export_resume(store, c),
        ResumeCommands::Remove => remove_resume(store),
        ResumeCommands::Update(c) => update_resume(store, c),
    }
}

/// A stored resume without its encoded payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResumeSummary<'a> {
    file_name: &'a str,
    file_type: &'a str,
    file_size: u64,
    uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resume_id: Option<&'a ResumeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a serde_json::Value>,
}

impl<'a> From<&'a StoredResume> for ResumeSummary<'a> {
    fn from(record: &'a StoredResume) -> Self {
        Self {
            file_name: &record.file_name,
            file_type: &record.file_type,
            file_size: record.file_size,
            uploaded_at: record.uploaded_at,
            resume_id: record.resume_id.as_ref(),
            metadata: record.metadata.as_ref(),
        }
    }
}

fn parse_metadata(raw: Option<&str>) -> Result<Option<serde_json::Value>> {
    raw.map(|raw| serde_json::from_str(raw).context("--metadata must be valid JSON"))
        .transpose()
}

#[derive(Debug, Args)]
pub struct StoreResumeCommand {
    pub path: PathBuf,
    /// Identifier assigned by the backend
    #[arg(long)]
    pub resume_id: Option<String>,
    /// Arbitrary JSON stored alongside the file
    #[arg(long)]
    pub metadata: Option<String>,
}

fn store_resume(store: &ResumeStore, command: StoreResumeCommand) -> Result<()> {
    let file = ResumeFile::from_path(&command.path)
        .with_context(|| format!("failed to read {}", command.path.display()))?;
    let metadata = parse_metadata(command.metadata.as_deref())?;
    let resume_id = command.resume_id.as_deref().map(ResumeId::from);

    let record = store.store(&file, resume_id, metadata)?;
    print_json(&ResumeSummary::from(&record))
}

fn show_resume(store: &ResumeStore) -> Result<()> {
    match store.get()? {
        Some(record) => print_json(&ResumeSummary::from(&record)),
        None => {
            eprintln!("No resume stored.");
            Ok(())
        }
    }
}

#[derive(Debug, Args)]
pub struct ExportResumeCommand {
    /// Destination file; defaults to the stored file name
    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn export_resume(store: &ResumeStore, command: ExportResumeCommand) -> Result<()> {
    let Some(file) = store.get_as_file()? else {
        bail!("no readable resume stored");
    };

    let output = command
        .output
        .unwrap_or_else(|| PathBuf::from(&file.name));
    std::fs::write(&output, &file.bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    eprintln!("Wrote {} bytes to {}", file.size(), output.display());
    Ok(())
}

fn remove_resume(store: &ResumeStore) -> Result<()> {
    store.remove()?;
    eprintln!("Resume removed.");
    Ok(())
}

#[derive(Debug, Args)]
pub struct UpdateResumeCommand {
    #[arg(long)]
    pub file_name: Option<String>,
    #[arg(long)]
    pub resume_id: Option<String>,
    #[arg(long)]
    pub metadata: Option<String>,
}

fn update_resume(store: &ResumeStore, command: UpdateResumeCommand) -> Result<()> {
    let update = ResumeUpdate {
        file_name: command.file_name,
        resume_id: command.resume_id.as_deref().map(ResumeId::from),
        metadata: parse_metadata(command.metadata.as_deref())?,
    };

    match store.update_metadata(update)? {
        Some(record) => print_json(&ResumeSummary::from(&record)),
        None => bail!("no resume stored"),
    }
}
