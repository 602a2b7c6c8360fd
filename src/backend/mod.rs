use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

// A wrapper for the remote document-chat backend API
pub struct BackendClient {
    base_url: String,
    client: Client,
}

/// Failures of a backend round-trip, kept apart so the caller can decide
/// how each one surfaces in the page.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("backend returned malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("backend response is missing `{0}`")]
    MissingField(&'static str),

    #[error("backend rejected the request: {0}")]
    Rejected(String),
}

/// A chat session issued by the backend after it has ingested a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedSession {
    pub session_id: String,
    /// Display name derived from the uploaded file, when the backend offers one.
    pub suggested_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadBody {
    session_id: Option<String>,
    suggested_name: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    reply: Option<String>,
    error: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    /// Sends a PDF to the backend for ingestion and returns the session it
    /// issues for chatting against that document.
    pub async fn upload_pdf(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedSession, BackendError> {
        let url = format!("{}/upload_pdf", self.base_url);

        info!("Uploading {} ({} bytes) to {}", filename, bytes.len(), url);

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!("Upload response ({}): {}", status, body);

        parse_upload_response(status, &body)
    }

    /// Posts one user message for the given session and returns the reply.
    pub async fn chat(&self, message: &str, session_id: &str) -> Result<String, BackendError> {
        let url = format!("{}/chat", self.base_url);

        debug!("Chat request for session {}: {}", session_id, message);

        let payload = serde_json::json!({
            "message": message,
            "session_id": session_id,
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!("Chat response ({}): {}", status, body);

        parse_chat_response(status, &body)
    }
}

fn parse_upload_response(status: StatusCode, body: &str) -> Result<UploadedSession, BackendError> {
    if !status.is_success() {
        return Err(BackendError::Status {
            status,
            body: body.to_string(),
        });
    }

    let parsed: UploadBody = serde_json::from_str(body)?;
    if let Some(error) = parsed.error {
        return Err(BackendError::Rejected(error));
    }

    // The backend reports some upload failures as a 200 without a session.
    let session_id = parsed
        .session_id
        .ok_or(BackendError::MissingField("session_id"))?;

    Ok(UploadedSession {
        session_id,
        suggested_name: parsed.suggested_name,
    })
}

fn parse_chat_response(status: StatusCode, body: &str) -> Result<String, BackendError> {
    if !status.is_success() {
        return Err(BackendError::Status {
            status,
            body: body.to_string(),
        });
    }

    let parsed: ChatBody = serde_json::from_str(body)?;
    if let Some(error) = parsed.error {
        return Err(BackendError::Rejected(error));
    }

    parsed.reply.ok_or(BackendError::MissingField("reply"))
}
