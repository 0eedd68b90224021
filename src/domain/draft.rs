use serde::{Deserialize, Serialize};

use super::email::EmailId;
use super::{RecordId, null_as_default};

pub type DraftId = RecordId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: DraftId,
    #[serde(default)]
    pub email_id: Option<EmailId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggested_followups: Vec<String>,
}

/// Body of `POST /drafts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDraft {
    pub email_id: Option<EmailId>,
    pub subject: String,
    pub body: String,
    pub suggested_followups: Vec<String>,
}

/// Body of `PUT /drafts`: a full replace of subject and body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftUpdate {
    pub id: DraftId,
    pub subject: String,
    pub body: String,
}

/// `POST /drafts` answers either with the draft or with `{status, draft}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreatedDraft {
    Wrapped { draft: Draft },
    Bare(Draft),
}

impl From<CreatedDraft> for Draft {
    fn from(c: CreatedDraft) -> Self {
        match c {
            CreatedDraft::Wrapped { draft } | CreatedDraft::Bare(draft) => draft,
        }
    }
}
