use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{RecordId, null_as_default};

pub type EmailId = RecordId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub task: String,
    #[serde(default)]
    pub deadline: Option<String>,
}

impl ActionItem {
    /// Deadline text worth showing; the model sometimes writes a literal "null".
    pub fn deadline(&self) -> Option<&str> {
        self.deadline
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("null"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_items: Option<Vec<ActionItem>>,
}

impl Email {
    /// One-line preview of the body for list rows.
    pub fn snippet(&self, max_chars: usize) -> String {
        let mut out = String::new();
        for line in self.body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(line);
            if out.chars().count() >= max_chars {
                break;
            }
        }
        out.chars().take(max_chars).collect()
    }

    pub fn apply_record(&mut self, record: &ProcessedRecord) {
        self.category = record.category.clone();
        self.action_items = Some(record.action_items.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub email_id: EmailId,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_items: Vec<ActionItem>,
}

/// Left-join processed metadata onto the inbox by string-compared id.
///
/// Emails without a record are kept as they are; records pointing at unknown
/// emails are dropped. When an id appears twice the later record wins.
pub fn merge_processed(emails: Vec<Email>, processed: &[ProcessedRecord]) -> Vec<Email> {
    let by_id: HashMap<String, &ProcessedRecord> =
        processed.iter().map(|p| (p.email_id.key(), p)).collect();

    emails
        .into_iter()
        .map(|mut email| {
            if let Some(record) = by_id.get(&email.id.key()) {
                email.apply_record(record);
            }
            email
        })
        .collect()
}
