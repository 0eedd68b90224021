//! Background execution of backend calls.
//!
//! Views never talk to the network themselves: they queue a [`Request`] in the
//! [`Outbox`] and keep the returned [`Ticket`]. The terminal loop hands the
//! queue to a [`Dispatcher`], which runs each job on its own thread and
//! reports a [`Completion`] carrying the same ticket. A view only accepts the
//! completion for the latest ticket it issued on that slot.

use log::{debug, warn};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::api::{ApiError, MailboxApi};
use crate::domain::agent::{AgentQuery, AgentReply};
use crate::domain::draft::{Draft, DraftId, DraftUpdate, NewDraft};
use crate::domain::email::{Email, EmailId, ProcessedRecord, merge_processed};
use crate::domain::prompts::PromptSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Which piece of page state a request feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    InboxList,
    EmailAgent,
    EmailIngest,
    EmailDraft,
    ChatContext,
    ChatAsk,
    DraftList,
    DraftSave,
    PromptsLoad,
    PromptsSave,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// `GET /inbox` + `GET /processed`, joined.
    FetchInbox,
    ReloadInbox,
    /// `POST /ingest`, then the same fetch as [`Job::FetchInbox`].
    ProcessInbox,
    IngestOne(EmailId),
    Agent(AgentQuery),
    CreateDraft(NewDraft),
    FetchDrafts,
    SaveDraft(DraftUpdate),
    FetchPrompts,
    SavePrompts(PromptSet),
}

#[derive(Debug)]
pub enum Output {
    Inbox(Vec<Email>),
    Reloaded(Vec<Email>),
    /// The count survives a failed refetch; the backend has already
    /// processed the emails by then.
    Processed {
        count: u64,
        emails: Result<Vec<Email>, ApiError>,
    },
    Ingested(ProcessedRecord),
    Agent(AgentReply),
    DraftCreated(Draft),
    Drafts(Vec<Draft>),
    DraftSaved(DraftId),
    Prompts(PromptSet),
    PromptsSaved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub ticket: Ticket,
    pub slot: Slot,
    pub job: Job,
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub slot: Slot,
    pub result: Result<Output, ApiError>,
}

/// Requests queued by the views since the last drain.
#[derive(Debug, Default)]
pub struct Outbox {
    next: u64,
    queued: Vec<Request>,
}

impl Outbox {
    pub fn submit(&mut self, slot: Slot, job: Job) -> Ticket {
        self.next += 1;
        let ticket = Ticket(self.next);
        self.queued.push(Request { ticket, slot, job });
        ticket
    }

    pub fn drain(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.queued)
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}

/// Run one job against the backend, synchronously.
pub fn execute(api: &dyn MailboxApi, job: Job) -> Result<Output, ApiError> {
    match job {
        Job::FetchInbox => Ok(Output::Inbox(fetch_merged(api)?)),
        Job::ReloadInbox => Ok(Output::Reloaded(api.reload_inbox()?)),
        Job::ProcessInbox => {
            let count = api.ingest_all()?;
            let emails = fetch_merged(api);
            Ok(Output::Processed { count, emails })
        }
        Job::IngestOne(id) => Ok(Output::Ingested(api.ingest_one(&id)?)),
        Job::Agent(query) => Ok(Output::Agent(api.agent_query(&query)?)),
        Job::CreateDraft(draft) => Ok(Output::DraftCreated(api.create_draft(&draft)?)),
        Job::FetchDrafts => Ok(Output::Drafts(api.list_drafts()?)),
        Job::SaveDraft(update) => {
            api.update_draft(&update)?;
            Ok(Output::DraftSaved(update.id))
        }
        Job::FetchPrompts => Ok(Output::Prompts(api.get_prompts()?)),
        Job::SavePrompts(prompts) => {
            api.save_prompts(&prompts)?;
            Ok(Output::PromptsSaved)
        }
    }
}

pub fn fetch_merged(api: &dyn MailboxApi) -> Result<Vec<Email>, ApiError> {
    let emails = api.list_inbox()?;
    let processed = api.list_processed()?;
    Ok(merge_processed(emails, &processed))
}

pub struct Dispatcher {
    api: Arc<dyn MailboxApi>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn MailboxApi>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { api, tx, rx }
    }

    pub fn spawn(&self, req: Request) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        debug!("dispatch {:?} on {:?}", req.ticket, req.slot);
        thread::spawn(move || {
            let result = execute(api.as_ref(), req.job);
            if let Err(e) = &result {
                warn!("{:?} failed: {e}", req.slot);
            }
            // The receiver only goes away when the UI is shutting down.
            let _ = tx.send(Completion {
                ticket: req.ticket,
                slot: req.slot,
                result,
            });
        });
    }

    /// Completions that arrived since the last call; never blocks.
    pub fn completed(&self) -> Vec<Completion> {
        self.rx.try_iter().collect()
    }
}

/// Latest outstanding ticket for one slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pending(Option<Ticket>);

impl Pending {
    pub fn start(&mut self, ticket: Ticket) {
        self.0 = Some(ticket);
    }

    pub fn is_loading(&self) -> bool {
        self.0.is_some()
    }

    /// True when `ticket` is the latest one; the slot is then idle again.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if self.0 == Some(ticket) {
            self.0 = None;
            true
        } else {
            debug!("dropping stale completion {ticket:?}");
            false
        }
    }

    pub fn cancel(&mut self) {
        self.0 = None;
    }
}
