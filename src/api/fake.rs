use std::sync::Mutex;

use crate::api::{ApiError, ApiResult, MailboxApi};
use crate::domain::agent::{AgentQuery, AgentReply};
use crate::domain::draft::{Draft, DraftUpdate, NewDraft};
use crate::domain::email::{Email, EmailId, ProcessedRecord};
use crate::domain::prompts::PromptSet;

/// Calls the views made, in order, with their payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Inbox,
    Reload,
    Processed,
    IngestAll,
    IngestOne(EmailId),
    Prompts,
    SavePrompts(PromptSet),
    Agent(AgentQuery),
    Drafts,
    CreateDraft(NewDraft),
    UpdateDraft(DraftUpdate),
}

#[derive(Default)]
pub struct Backend {
    pub emails: Vec<Email>,
    pub processed: Vec<ProcessedRecord>,
    pub ingest_result: Vec<ProcessedRecord>,
    pub drafts: Vec<Draft>,
    pub prompts: PromptSet,
    pub reply: Option<serde_json::Value>,
    pub failing: Vec<&'static str>,
    pub calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeApi {
    pub backend: Mutex<Backend>,
}

impl FakeApi {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend: Mutex::new(backend),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.backend.lock().unwrap().calls.clone()
    }

    fn with<T>(
        &self,
        name: &'static str,
        call: Call,
        f: impl FnOnce(&mut Backend) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let mut b = self.backend.lock().unwrap();
        b.calls.push(call);
        if b.failing.contains(&name) {
            return Err(ApiError::Status {
                method: "FAKE".into(),
                path: name.into(),
                status: 500,
                body: String::new(),
            });
        }
        f(&mut *b)
    }
}

impl MailboxApi for FakeApi {
    fn health(&self) -> ApiResult<String> {
        Ok("ok".into())
    }

    fn list_inbox(&self) -> ApiResult<Vec<Email>> {
        self.with("inbox", Call::Inbox, |b| Ok(b.emails.clone()))
    }

    fn reload_inbox(&self) -> ApiResult<Vec<Email>> {
        self.with("reload", Call::Reload, |b| {
            b.processed.clear();
            Ok(b.emails.clone())
        })
    }

    fn list_processed(&self) -> ApiResult<Vec<ProcessedRecord>> {
        self.with("processed", Call::Processed, |b| Ok(b.processed.clone()))
    }

    fn ingest_all(&self) -> ApiResult<u64> {
        self.with("ingest", Call::IngestAll, |b| {
            b.processed = b.ingest_result.clone();
            Ok(b.processed.len() as u64)
        })
    }

    fn ingest_one(&self, id: &EmailId) -> ApiResult<ProcessedRecord> {
        self.with("ingest_one", Call::IngestOne(id.clone()), |b| {
            b.ingest_result
                .iter()
                .find(|r| &r.email_id == id)
                .cloned()
                .ok_or_else(|| ApiError::malformed("/ingest", "email not found"))
        })
    }

    fn get_prompts(&self) -> ApiResult<PromptSet> {
        self.with("prompts", Call::Prompts, |b| Ok(b.prompts.clone()))
    }

    fn save_prompts(&self, prompts: &PromptSet) -> ApiResult<()> {
        self.with("save_prompts", Call::SavePrompts(prompts.clone()), |b| {
            b.prompts = prompts.clone();
            Ok(())
        })
    }

    fn agent_query(&self, query: &AgentQuery) -> ApiResult<AgentReply> {
        self.with("agent", Call::Agent(query.clone()), |b| {
            let raw = b
                .reply
                .clone()
                .unwrap_or_else(|| serde_json::json!({"type": "custom", "response": "ok"}));
            AgentReply::from_value(raw).map_err(|e| ApiError::malformed("/agent/query", e))
        })
    }

    fn list_drafts(&self) -> ApiResult<Vec<Draft>> {
        self.with("drafts", Call::Drafts, |b| Ok(b.drafts.clone()))
    }

    fn create_draft(&self, draft: &NewDraft) -> ApiResult<Draft> {
        self.with("create_draft", Call::CreateDraft(draft.clone()), |b| {
            let created = Draft {
                id: ((b.drafts.len() + 1) as u64).into(),
                email_id: draft.email_id.clone(),
                subject: draft.subject.clone(),
                body: draft.body.clone(),
                suggested_followups: draft.suggested_followups.clone(),
            };
            b.drafts.insert(0, created.clone());
            Ok(created)
        })
    }

    fn update_draft(&self, update: &DraftUpdate) -> ApiResult<()> {
        self.with("update_draft", Call::UpdateDraft(update.clone()), |b| {
            for d in b.drafts.iter_mut().filter(|d| d.id == update.id) {
                d.subject = update.subject.clone();
                d.body = update.body.clone();
            }
            Ok(())
        })
    }
}
