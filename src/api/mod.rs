pub mod http;
pub mod seed;

#[cfg(test)]
pub(crate) mod fake;

use thiserror::Error;

use crate::domain::agent::{AgentQuery, AgentReply};
use crate::domain::draft::{Draft, DraftUpdate, NewDraft};
use crate::domain::email::{Email, EmailId, ProcessedRecord};
use crate::domain::prompts::PromptSet;

pub use http::HttpApi;
pub use seed::SeedFallback;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method} {path}: request failed: {source}")]
    Transport {
        method: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {path}: backend answered HTTP {status}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("{path}: unexpected response: {detail}")]
    Malformed { path: String, detail: String },

    #[error("offline seed {path}: {detail}")]
    Seed { path: String, detail: String },
}

impl ApiError {
    pub fn malformed(path: impl Into<String>, detail: impl ToString) -> Self {
        ApiError::Malformed {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

/// The backend's REST surface, one method per endpoint.
pub trait MailboxApi: Send + Sync {
    /// `GET /health`
    fn health(&self) -> ApiResult<String>;

    /// `GET /inbox`
    fn list_inbox(&self) -> ApiResult<Vec<Email>>;
    /// `POST /inbox/load`: re-read the mailbox and reset processing.
    fn reload_inbox(&self) -> ApiResult<Vec<Email>>;
    /// `GET /processed`
    fn list_processed(&self) -> ApiResult<Vec<ProcessedRecord>>;
    /// `POST /ingest`: returns the number of processed emails.
    fn ingest_all(&self) -> ApiResult<u64>;
    /// `POST /ingest/:id`
    fn ingest_one(&self, id: &EmailId) -> ApiResult<ProcessedRecord>;

    fn get_prompts(&self) -> ApiResult<PromptSet>;
    fn save_prompts(&self, prompts: &PromptSet) -> ApiResult<()>;

    /// `POST /agent/query`
    fn agent_query(&self, query: &AgentQuery) -> ApiResult<AgentReply>;

    fn list_drafts(&self) -> ApiResult<Vec<Draft>>;
    fn create_draft(&self, draft: &NewDraft) -> ApiResult<Draft>;
    fn update_draft(&self, update: &DraftUpdate) -> ApiResult<()>;
}
