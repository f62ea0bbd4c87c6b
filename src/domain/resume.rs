use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A resume file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, mime_type_for(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        Some("rtf") => "application/rtf",
        Some("odt") => "application/vnd.oasis.opendocument.text",
        _ => FALLBACK_MIME_TYPE,
    }
}

/// Identifier assigned by the backend after upload; either shape is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResumeId {
    Number(i64),
    Text(String),
}

impl From<&str> for ResumeId {
    fn from(value: &str) -> Self {
        value
            .parse::<i64>()
            .map_or_else(|_| ResumeId::Text(value.to_string()), ResumeId::Number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResume {
    /// `data:<mime>;base64,<payload>`
    pub file: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<ResumeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl StoredResume {
    pub fn from_file(
        file: &ResumeFile,
        resume_id: Option<ResumeId>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            file: encode_data_url(&file.mime_type, &file.bytes),
            file_name: file.name.clone(),
            file_type: file.mime_type.clone(),
            file_size: file.size(),
            uploaded_at: Utc::now(),
            resume_id,
            metadata,
        }
    }

    /// Decode the stored payload back into a file. `None` if the payload is malformed.
    pub fn to_file(&self) -> Option<ResumeFile> {
        let bytes = decode_data_url(&self.file)?;
        Some(ResumeFile::new(
            self.file_name.clone(),
            self.file_type.clone(),
            bytes,
        ))
    }

    pub fn apply(&mut self, update: ResumeUpdate) {
        if let Some(file_name) = update.file_name {
            self.file_name = file_name;
        }
        if let Some(resume_id) = update.resume_id {
            self.resume_id = Some(resume_id);
        }
        if let Some(metadata) = update.metadata {
            self.metadata = Some(metadata);
        }
    }
}

/// Partial update for a stored resume; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeUpdate {
    pub file_name: Option<String>,
    pub resume_id: Option<ResumeId>,
    pub metadata: Option<serde_json::Value>,
}

pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let mime_type = if mime_type.is_empty() {
        FALLBACK_MIME_TYPE
    } else {
        mime_type
    };
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

pub fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let (_, payload) = data_url.split_once(',')?;
    STANDARD.decode(payload).ok()
}
