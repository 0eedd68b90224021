use log::warn;

use crate::domain::agent::{AgentQuery, AgentReply, Instruction};
use crate::domain::draft::{Draft, NewDraft};
use crate::domain::email::Email;
use crate::views::input::TextInput;
use crate::views::{AgentSettings, Notice};
use crate::worker::{Completion, Job, Outbox, Output, Pending, Slot};

/// An opened email and whatever the agent last said about it.
#[derive(Debug)]
pub struct EmailDetail {
    pub email: Email,
    pub reply: Option<AgentReply>,
    pub instruction: TextInput,
    pub saved_draft: Option<Draft>,
    pub scroll: u16,
    agent: Pending,
    ingest: Pending,
    draft: Pending,
}

impl EmailDetail {
    pub fn new(email: Email) -> Self {
        Self {
            email,
            reply: None,
            instruction: TextInput::default(),
            saved_draft: None,
            scroll: 0,
            agent: Pending::default(),
            ingest: Pending::default(),
            draft: Pending::default(),
        }
    }

    pub fn is_thinking(&self) -> bool {
        self.agent.is_loading()
    }

    pub fn is_ingesting(&self) -> bool {
        self.ingest.is_loading()
    }

    pub fn is_saving_draft(&self) -> bool {
        self.draft.is_loading()
    }

    pub fn run(&mut self, instruction: Instruction, settings: &AgentSettings, out: &mut Outbox) {
        self.ask(instruction.text().to_string(), settings, out);
    }

    /// Send whatever is in the instruction box.
    pub fn ask_typed(&mut self, settings: &AgentSettings, out: &mut Outbox) -> bool {
        if self.instruction.is_blank() {
            return false;
        }
        let text = self.instruction.take();
        self.ask(text.trim().to_string(), settings, out);
        true
    }

    fn ask(&mut self, instruction: String, settings: &AgentSettings, out: &mut Outbox) {
        let query = AgentQuery {
            email_id: Some(self.email.id.clone()),
            instruction,
            tone: settings.tone.clone(),
        };
        self.agent.start(out.submit(Slot::EmailAgent, Job::Agent(query)));
    }

    pub fn ingest(&mut self, out: &mut Outbox) {
        let job = Job::IngestOne(self.email.id.clone());
        self.ingest.start(out.submit(Slot::EmailIngest, job));
    }

    /// Rendered text of the current reply.
    pub fn rendered(&self) -> Option<String> {
        self.reply
            .as_ref()
            .map(|r| r.render(Some(&self.email.subject)))
    }

    /// Queue the current draft reply for `POST /drafts`. False when there is
    /// no draft reply to save.
    pub fn save_draft(&mut self, out: &mut Outbox) -> bool {
        let Some(AgentReply::Draft(draft)) = &self.reply else {
            return false;
        };
        let new = NewDraft {
            email_id: Some(self.email.id.clone()),
            subject: draft.subject_or_default(Some(&self.email.subject)),
            body: draft.body.clone(),
            suggested_followups: Vec::new(),
        };
        self.draft.start(out.submit(Slot::EmailDraft, Job::CreateDraft(new)));
        true
    }

    pub fn apply(
        &mut self,
        done: Completion,
        settings: &AgentSettings,
        out: &mut Outbox,
    ) -> Option<Notice> {
        match done.slot {
            Slot::EmailAgent => {
                if !self.agent.settle(done.ticket) {
                    return None;
                }
                match done.result {
                    Ok(Output::Agent(reply)) => {
                        self.scroll = 0;
                        self.saved_draft = None;
                        self.reply = Some(reply);
                        if settings.auto_save_drafts {
                            self.save_draft(out);
                        }
                        None
                    }
                    Ok(other) => unexpected(done.slot, &other),
                    Err(_) => Some(Notice::error("Agent request failed")),
                }
            }
            Slot::EmailIngest => {
                if !self.ingest.settle(done.ticket) {
                    return None;
                }
                match done.result {
                    Ok(Output::Ingested(record)) => {
                        self.email.apply_record(&record);
                        Some(Notice::info("Email processed"))
                    }
                    Ok(other) => unexpected(done.slot, &other),
                    Err(_) => Some(Notice::error("Failed to process email")),
                }
            }
            Slot::EmailDraft => {
                if !self.draft.settle(done.ticket) {
                    return None;
                }
                match done.result {
                    Ok(Output::DraftCreated(draft)) => {
                        self.saved_draft = Some(draft);
                        Some(Notice::info("Draft saved"))
                    }
                    Ok(other) => unexpected(done.slot, &other),
                    Err(_) => Some(Notice::error("Failed to save draft")),
                }
            }
            _ => None,
        }
    }
}

pub(crate) fn unexpected(slot: Slot, output: &Output) -> Option<Notice> {
    warn!("{slot:?} received unexpected {output:?}");
    None
}
