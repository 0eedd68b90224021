//! Page-scoped view models. Each page owns its state; nothing is shared
//! between pages except the request [`Outbox`](crate::worker::Outbox).

pub mod chat;
pub mod drafts;
pub mod email;
pub mod inbox;
pub mod input;
pub mod prompts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Short message shown in the footer for a few seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Agent settings shared by the pages that talk to the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentSettings {
    pub tone: Option<String>,
    pub auto_save_drafts: bool,
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::api::MailboxApi;
    use crate::worker::{Completion, Outbox, execute};

    /// Run every queued request synchronously, in submission order.
    pub fn run_all(out: &mut Outbox, api: &dyn MailboxApi) -> Vec<Completion> {
        out.drain()
            .into_iter()
            .map(|req| Completion {
                ticket: req.ticket,
                slot: req.slot,
                result: execute(api, req.job),
            })
            .collect()
    }
}
