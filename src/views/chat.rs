use ratatui::widgets::ListState;

use crate::domain::agent::AgentQuery;
use crate::domain::email::{Email, EmailId};
use crate::views::email::unexpected;
use crate::views::input::TextInput;
use crate::views::{AgentSettings, Notice};
use crate::worker::{Completion, Job, Outbox, Output, Pending, Slot};

#[derive(Debug, Clone, PartialEq)]
pub enum ChatScope {
    Global,
    Email { id: EmailId, subject: String },
}

impl ChatScope {
    pub fn email_id(&self) -> Option<EmailId> {
        match self {
            ChatScope::Global => None,
            ChatScope::Email { id, .. } => Some(id.clone()),
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            ChatScope::Global => None,
            ChatScope::Email { subject, .. } => Some(subject),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

/// Free-form agent conversation. Row 0 of the context list is the global
/// inbox view, row `n` is `emails[n - 1]`.
#[derive(Debug)]
pub struct ChatView {
    pub emails: Vec<Email>,
    pub context_state: ListState,
    pub scope: ChatScope,
    /// Newest exchange first.
    pub log: Vec<Exchange>,
    pub input: TextInput,
    context: Pending,
    ask: Pending,
    asking: Option<String>,
}

impl Default for ChatView {
    fn default() -> Self {
        let mut context_state = ListState::default();
        context_state.select(Some(0));
        Self {
            emails: Vec::new(),
            context_state,
            scope: ChatScope::Global,
            log: Vec::new(),
            input: TextInput::default(),
            context: Pending::default(),
            ask: Pending::default(),
            asking: None,
        }
    }
}

impl ChatView {
    pub fn activate(&mut self, out: &mut Outbox) {
        self.context
            .start(out.submit(Slot::ChatContext, Job::FetchInbox));
    }

    pub fn is_thinking(&self) -> bool {
        self.ask.is_loading()
    }

    pub fn pending_question(&self) -> Option<&str> {
        self.asking.as_deref()
    }

    pub fn move_cursor(&mut self, delta: i32) {
        let rows = self.emails.len() as i32 + 1;
        let cur = self.context_state.selected().unwrap_or(0) as i32;
        self.context_state
            .select(Some((cur + delta).clamp(0, rows - 1) as usize));
    }

    /// Switch to the row under the cursor.
    pub fn select_cursor(&mut self) {
        match self.context_state.selected().unwrap_or(0) {
            0 => self.select_global(),
            n => self.select_email(n - 1),
        }
    }

    pub fn select_global(&mut self) {
        self.context_state.select(Some(0));
        self.set_scope(ChatScope::Global);
    }

    pub fn select_email(&mut self, idx: usize) {
        let Some(email) = self.emails.get(idx) else {
            return;
        };
        let scope = ChatScope::Email {
            id: email.id.clone(),
            subject: email.subject.clone(),
        };
        self.context_state.select(Some(idx + 1));
        self.set_scope(scope);
    }

    /// A new scope starts a new conversation; answers still in flight for
    /// the old scope are dropped. Re-selecting the current scope keeps it.
    fn set_scope(&mut self, scope: ChatScope) {
        if scope == self.scope {
            return;
        }
        self.scope = scope;
        self.log.clear();
        self.ask.cancel();
        self.asking = None;
    }

    pub fn submit(&mut self, settings: &AgentSettings, out: &mut Outbox) -> bool {
        if self.input.is_blank() {
            return false;
        }
        let question = self.input.take().trim().to_string();
        let query = AgentQuery {
            email_id: self.scope.email_id(),
            instruction: question.clone(),
            tone: settings.tone.clone(),
        };
        self.ask.start(out.submit(Slot::ChatAsk, Job::Agent(query)));
        self.asking = Some(question);
        true
    }

    pub fn apply(&mut self, done: Completion) -> Option<Notice> {
        match done.slot {
            Slot::ChatContext => {
                if !self.context.settle(done.ticket) {
                    return None;
                }
                match done.result {
                    Ok(Output::Inbox(emails)) => {
                        self.emails = emails;
                        None
                    }
                    Ok(other) => unexpected(done.slot, &other),
                    Err(_) => Some(Notice::error("Failed to load email context")),
                }
            }
            Slot::ChatAsk => {
                if !self.ask.settle(done.ticket) {
                    return None;
                }
                let question = self.asking.take().unwrap_or_default();
                match done.result {
                    Ok(Output::Agent(reply)) => {
                        let answer = reply.render(self.scope.subject());
                        self.log.insert(0, Exchange { question, answer });
                        None
                    }
                    Ok(other) => unexpected(done.slot, &other),
                    Err(_) => Some(Notice::error("Agent request failed")),
                }
            }
            _ => None,
        }
    }
}
