use log::{debug, warn};
use reqwest::Method;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

use crate::api::{ApiError, ApiResult, MailboxApi};
use crate::domain::agent::{AgentQuery, AgentReply};
use crate::domain::draft::{CreatedDraft, Draft, DraftUpdate, NewDraft};
use crate::domain::email::{Email, EmailId, ProcessedRecord};
use crate::domain::prompts::PromptSet;

const ERROR_BODY_CHARS: usize = 200;

/// Blocking JSON client for the MailboxIQ backend.
pub struct HttpApi {
    base: Url,
    client: Client,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LoadedInbox {
    Wrapped { inbox: Vec<Email> },
    Bare(Vec<Email>),
}

#[derive(Deserialize)]
struct IngestSummary {
    processed_count: u64,
}

#[derive(Deserialize)]
struct Health {
    #[serde(default)]
    status: Option<String>,
}

impl HttpApi {
    /// `timeout = None` waits for the backend indefinitely.
    pub fn new(base: Url, timeout: Option<Duration>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                method: "INIT".into(),
                path: base.to_string(),
                source,
            })?;
        Ok(Self { base, client })
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::malformed(self.base.as_str(), "base URL cannot take a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send<B, T>(&self, method: Method, segments: &[&str], body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        debug!("{method} {url}");

        let mut req = self.client.request(method.clone(), url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let transport = |source| ApiError::Transport {
            method: method.to_string(),
            path: path.clone(),
            source,
        };
        let resp = req.send().map_err(transport)?;
        let status = resp.status();
        let text = resp.text().map_err(transport)?;

        if !status.is_success() {
            warn!("{method} {path} -> {status}");
            return Err(ApiError::Status {
                method: method.to_string(),
                path,
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::malformed(path, e))
    }

    fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        self.send::<(), T>(Method::GET, segments, None)
    }

    /// POST without a payload still sends `{}` so the backend sees JSON.
    fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        self.send(Method::POST, segments, Some(&json!({})))
    }
}

impl MailboxApi for HttpApi {
    fn health(&self) -> ApiResult<String> {
        let h: Health = self.get(&["health"])?;
        Ok(h.status.unwrap_or_else(|| "unknown".into()))
    }

    fn list_inbox(&self) -> ApiResult<Vec<Email>> {
        self.get(&["inbox"])
    }

    fn reload_inbox(&self) -> ApiResult<Vec<Email>> {
        Ok(match self.post_empty::<LoadedInbox>(&["inbox", "load"])? {
            LoadedInbox::Wrapped { inbox } | LoadedInbox::Bare(inbox) => inbox,
        })
    }

    fn list_processed(&self) -> ApiResult<Vec<ProcessedRecord>> {
        self.get(&["processed"])
    }

    fn ingest_all(&self) -> ApiResult<u64> {
        let s: IngestSummary = self.post_empty(&["ingest"])?;
        Ok(s.processed_count)
    }

    fn ingest_one(&self, id: &EmailId) -> ApiResult<ProcessedRecord> {
        let key = id.key();
        self.post_empty(&["ingest", key.as_str()])
    }

    fn get_prompts(&self) -> ApiResult<PromptSet> {
        self.get(&["prompts"])
    }

    fn save_prompts(&self, prompts: &PromptSet) -> ApiResult<()> {
        let _ack: Value = self.send(Method::POST, &["prompts"], Some(prompts))?;
        Ok(())
    }

    fn agent_query(&self, query: &AgentQuery) -> ApiResult<AgentReply> {
        let raw: Value = self.send(Method::POST, &["agent", "query"], Some(query))?;
        AgentReply::from_value(raw).map_err(|e| ApiError::malformed("/agent/query", e))
    }

    fn list_drafts(&self) -> ApiResult<Vec<Draft>> {
        self.get(&["drafts"])
    }

    fn create_draft(&self, draft: &NewDraft) -> ApiResult<Draft> {
        let created: CreatedDraft = self.send(Method::POST, &["drafts"], Some(draft))?;
        Ok(created.into())
    }

    fn update_draft(&self, update: &DraftUpdate) -> ApiResult<()> {
        let _ack: Value = self.send(Method::PUT, &["drafts"], Some(update))?;
        Ok(())
    }
}
