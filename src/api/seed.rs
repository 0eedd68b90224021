use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{ApiError, ApiResult, MailboxApi};
use crate::domain::agent::{AgentQuery, AgentReply};
use crate::domain::draft::{Draft, DraftUpdate, NewDraft};
use crate::domain::email::{Email, EmailId, ProcessedRecord};
use crate::domain::prompts::PromptSet;

/// Serves the inbox from a local `mock_inbox.json`-style file whenever the
/// backend cannot be reached. Every other endpoint goes straight through.
pub struct SeedFallback<A> {
    inner: A,
    seed: PathBuf,
}

impl<A: MailboxApi> SeedFallback<A> {
    pub fn new(inner: A, seed: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            seed: seed.into(),
        }
    }
}

pub fn load_seed(path: &Path) -> ApiResult<Vec<Email>> {
    let seed_err = |detail: String| ApiError::Seed {
        path: path.display().to_string(),
        detail,
    };
    let s = fs::read_to_string(path).map_err(|e| seed_err(e.to_string()))?;
    serde_json::from_str(&s).map_err(|e| seed_err(e.to_string()))
}

impl<A: MailboxApi> MailboxApi for SeedFallback<A> {
    fn health(&self) -> ApiResult<String> {
        self.inner.health()
    }

    fn list_inbox(&self) -> ApiResult<Vec<Email>> {
        match self.inner.list_inbox() {
            Err(e) if e.is_transport() => {
                warn!("inbox unreachable ({e}); using seed {}", self.seed.display());
                load_seed(&self.seed)
            }
            other => other,
        }
    }

    fn reload_inbox(&self) -> ApiResult<Vec<Email>> {
        match self.inner.reload_inbox() {
            Err(e) if e.is_transport() => {
                warn!("inbox reload unreachable ({e}); using seed {}", self.seed.display());
                load_seed(&self.seed)
            }
            other => other,
        }
    }

    fn list_processed(&self) -> ApiResult<Vec<ProcessedRecord>> {
        match self.inner.list_processed() {
            Err(e) if e.is_transport() => Ok(Vec::new()),
            other => other,
        }
    }

    fn ingest_all(&self) -> ApiResult<u64> {
        self.inner.ingest_all()
    }

    fn ingest_one(&self, id: &EmailId) -> ApiResult<ProcessedRecord> {
        self.inner.ingest_one(id)
    }

    fn get_prompts(&self) -> ApiResult<PromptSet> {
        self.inner.get_prompts()
    }

    fn save_prompts(&self, prompts: &PromptSet) -> ApiResult<()> {
        self.inner.save_prompts(prompts)
    }

    fn agent_query(&self, query: &AgentQuery) -> ApiResult<AgentReply> {
        self.inner.agent_query(query)
    }

    fn list_drafts(&self) -> ApiResult<Vec<Draft>> {
        self.inner.list_drafts()
    }

    fn create_draft(&self, draft: &NewDraft) -> ApiResult<Draft> {
        self.inner.create_draft(draft)
    }

    fn update_draft(&self, update: &DraftUpdate) -> ApiResult<()> {
        self.inner.update_draft(update)
    }
}
