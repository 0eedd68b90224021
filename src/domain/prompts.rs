use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::null_as_default;

/// The instruction templates the backend agent runs with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub categorization: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_item: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auto_reply: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKey {
    Categorization,
    ActionItem,
    AutoReply,
}

impl PromptKey {
    pub const ALL: [PromptKey; 3] = [
        PromptKey::Categorization,
        PromptKey::ActionItem,
        PromptKey::AutoReply,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PromptKey::Categorization => "categorization",
            PromptKey::ActionItem => "action_item",
            PromptKey::AutoReply => "auto_reply",
        }
    }

    pub fn label(self) -> String {
        self.name().replace('_', " ")
    }
}

impl fmt::Display for PromptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PromptKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PromptKey::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown prompt '{s}' (expected categorization, action_item or auto_reply)"))
    }
}

impl PromptSet {
    pub fn get(&self, key: PromptKey) -> &str {
        match key {
            PromptKey::Categorization => &self.categorization,
            PromptKey::ActionItem => &self.action_item,
            PromptKey::AutoReply => &self.auto_reply,
        }
    }

    pub fn set(&mut self, key: PromptKey, value: impl Into<String>) {
        let slot = match key {
            PromptKey::Categorization => &mut self.categorization,
            PromptKey::ActionItem => &mut self.action_item,
            PromptKey::AutoReply => &mut self.auto_reply,
        };
        *slot = value.into();
    }
}
