//! Agent queries and the normalized form of their replies.
//!
//! The backend answers `/agent/query` with `{status, type, response, data?}`
//! where the meaning of `response` depends on `type`. Everything downstream
//! works with [`AgentReply`] instead of the raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::email::{ActionItem, EmailId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentQuery {
    /// `None` is sent as `null` and means the whole inbox.
    pub email_id: Option<EmailId>,
    pub instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

/// The fixed per-email actions offered next to an opened email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Summarize,
    ExtractTasks,
    DraftReply,
}

impl Instruction {
    pub fn text(self) -> &'static str {
        match self {
            Instruction::Summarize => "Summarize this email",
            Instruction::ExtractTasks => "Extract the tasks from this email",
            Instruction::DraftReply => "Draft a reply to this email",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftReply {
    pub subject: Option<String>,
    pub body: String,
}

impl DraftReply {
    pub fn subject_or_default(&self, original_subject: Option<&str>) -> String {
        match self.subject.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => match original_subject {
                Some(orig) => format!("Re: {orig}"),
                None => "(no subject)".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    Summary(String),
    Custom(String),
    Global(String),
    Tasks(Vec<ActionItem>),
    Draft(DraftReply),
}

#[derive(Debug, Error, PartialEq)]
pub enum ReplyError {
    #[error("agent reported status '{status}': {message}")]
    Failed { status: String, message: String },
    #[error("{0}")]
    Shape(String),
}

#[derive(Deserialize)]
struct RawReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    response: Value,
    #[serde(default)]
    data: Option<Value>,
}

impl AgentReply {
    pub fn from_value(value: Value) -> Result<Self, ReplyError> {
        let raw: RawReply =
            serde_json::from_value(value).map_err(|e| ReplyError::Shape(e.to_string()))?;

        if let Some(status) = raw.status.as_deref()
            && !status.eq_ignore_ascii_case("ok")
        {
            return Err(ReplyError::Failed {
                status: status.to_string(),
                message: display_text(&raw.response),
            });
        }

        match raw.kind.as_deref() {
            Some("tasks") => tasks_from(raw.data.as_ref(), &raw.response).map(AgentReply::Tasks),
            Some("draft") => draft_from(&raw.response, raw.data.as_ref()).map(AgentReply::Draft),
            Some("summary") => Ok(AgentReply::Summary(display_text(&raw.response))),
            Some("global") => Ok(AgentReply::Global(display_text(&raw.response))),
            _ => Ok(AgentReply::Custom(display_text(&raw.response))),
        }
    }

    /// Display text for the reply. `original_subject` feeds the draft
    /// subject fallback.
    pub fn render(&self, original_subject: Option<&str>) -> String {
        match self {
            AgentReply::Summary(text) | AgentReply::Custom(text) | AgentReply::Global(text) => {
                text.clone()
            }
            AgentReply::Tasks(items) => task_lines(items).join("\n"),
            AgentReply::Draft(draft) => format!(
                "Subject: {}\n\n{}",
                draft.subject_or_default(original_subject),
                draft.body
            ),
        }
    }
}

/// One bullet per task; the deadline is appended only when there is one.
pub fn task_lines(items: &[ActionItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item.deadline() {
            Some(deadline) => format!("• {} (deadline: {deadline})", item.task),
            None => format!("• {}", item.task),
        })
        .collect()
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("response").or_else(|| map.get("text")) {
            Some(inner @ Value::String(_)) => display_text(inner),
            _ => serde_json::to_string_pretty(value).unwrap_or_default(),
        },
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

fn tasks_from(data: Option<&Value>, response: &Value) -> Result<Vec<ActionItem>, ReplyError> {
    let list = match (data, response) {
        (Some(Value::Array(items)), _) | (_, Value::Array(items)) => items,
        (_, Value::String(text)) => {
            // Only the bullet text survived; keep one task per line.
            return Ok(text
                .lines()
                .map(|l| l.trim().trim_start_matches(['-', '•', '*']).trim())
                .filter(|l| !l.is_empty())
                .map(|task| ActionItem {
                    task: task.to_string(),
                    deadline: None,
                })
                .collect());
        }
        _ => return Err(ReplyError::Shape("tasks reply without a task list".into())),
    };

    list.iter()
        .map(|item| match item {
            Value::String(task) => Ok(ActionItem {
                task: task.clone(),
                deadline: None,
            }),
            other => serde_json::from_value(other.clone())
                .map_err(|e| ReplyError::Shape(format!("bad task entry: {e}"))),
        })
        .collect()
}

fn draft_from(response: &Value, data: Option<&Value>) -> Result<DraftReply, ReplyError> {
    let source = match (response, data) {
        (Value::Null, Some(d)) => d,
        (r, _) => r,
    };

    match source {
        Value::String(body) => Ok(DraftReply {
            subject: None,
            body: body.clone(),
        }),
        Value::Object(map) => {
            let body = map
                .get("body")
                .and_then(Value::as_str)
                .ok_or_else(|| ReplyError::Shape("draft reply is missing 'body'".into()))?;
            Ok(DraftReply {
                subject: map.get("subject").and_then(Value::as_str).map(str::to_string),
                body: body.to_string(),
            })
        }
        _ => Err(ReplyError::Shape("draft reply has no subject/body".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_renders_subject_blank_line_body() {
        let reply = AgentReply::from_value(json!({
            "status": "ok",
            "type": "draft",
            "response": {"subject": "Re: Q4 merge plan", "body": "Sounds good."}
        }))
        .unwrap();

        assert!(matches!(reply, AgentReply::Draft(_)));
        assert_eq!(
            reply.render(Some("ignored")),
            "Subject: Re: Q4 merge plan\n\nSounds good."
        );
    }

    #[test]
    fn draft_without_subject_falls_back_to_re_original() {
        let reply = AgentReply::from_value(json!({
            "type": "draft",
            "response": {"body": "On it."}
        }))
        .unwrap();
        assert_eq!(reply.render(Some("Lunch")), "Subject: Re: Lunch\n\nOn it.");

        let plain = AgentReply::from_value(json!({"type": "draft", "response": "Hi"})).unwrap();
        assert_eq!(plain.render(Some("Lunch")), "Subject: Re: Lunch\n\nHi");
    }

    #[test]
    fn draft_without_body_is_malformed() {
        let err = AgentReply::from_value(json!({
            "type": "draft",
            "response": {"subject": "Re: x"}
        }))
        .unwrap_err();
        assert!(matches!(err, ReplyError::Shape(_)));
    }

    #[test]
    fn tasks_render_one_line_per_item_with_optional_deadline() {
        let reply = AgentReply::from_value(json!({
            "status": "ok",
            "type": "tasks",
            "response": "- Merge branch\n- Send notes",
            "data": [
                {"task": "Merge branch", "deadline": "2025-11-20"},
                {"task": "Send notes", "deadline": null},
                {"task": "Book room"}
            ]
        }))
        .unwrap();

        let AgentReply::Tasks(items) = &reply else {
            panic!("expected tasks, got {reply:?}");
        };
        let lines = task_lines(items);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "• Merge branch (deadline: 2025-11-20)");
        assert_eq!(lines[1], "• Send notes");
        assert_eq!(lines[2], "• Book room");
        assert_eq!(reply.render(None), lines.join("\n"));
    }

    #[test]
    fn tasks_fall_back_to_bullet_text() {
        let reply = AgentReply::from_value(json!({
            "type": "tasks",
            "response": "- Merge branch\n- Send notes"
        }))
        .unwrap();
        assert_eq!(reply.render(None), "• Merge branch\n• Send notes");
    }

    #[test]
    fn text_replies_stringify_other_shapes() {
        let wrapped =
            AgentReply::from_value(json!({"type": "summary", "response": {"response": "Short"}}))
                .unwrap();
        assert_eq!(wrapped, AgentReply::Summary("Short".into()));

        let empty = AgentReply::from_value(json!({"type": "global", "response": null})).unwrap();
        assert_eq!(empty, AgentReply::Global(String::new()));

        let list = AgentReply::from_value(json!({"type": "custom", "response": [1, 2]})).unwrap();
        assert_eq!(list.render(None), "[\n  1,\n  2\n]");
    }

    #[test]
    fn unknown_type_is_treated_as_custom_text() {
        let reply = AgentReply::from_value(json!({"response": "hello"})).unwrap();
        assert_eq!(reply, AgentReply::Custom("hello".into()));
    }

    #[test]
    fn non_ok_status_is_an_error() {
        let err = AgentReply::from_value(json!({"status": "error", "response": "quota"}))
            .unwrap_err();
        assert_eq!(
            err,
            ReplyError::Failed {
                status: "error".into(),
                message: "quota".into()
            }
        );
    }

    #[test]
    fn global_query_serializes_null_email_id() {
        let q = AgentQuery {
            email_id: None,
            instruction: "What is urgent?".into(),
            tone: None,
        };
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            json!({"email_id": null, "instruction": "What is urgent?"})
        );
    }
}
