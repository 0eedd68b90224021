use std::time::{Duration, Instant};

use crate::views::chat::ChatView;
use crate::views::drafts::DraftsView;
use crate::views::inbox::InboxView;
use crate::views::input::TextInput;
use crate::views::prompts::PromptsView;
use crate::views::{AgentSettings, Notice};
use crate::worker::{Completion, Outbox, Slot};

const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Inbox,
    Prompts,
    Agent,
    Drafts,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Inbox, Page::Prompts, Page::Agent, Page::Drafts];

    pub fn title(self) -> &'static str {
        match self {
            Page::Inbox => "Inbox",
            Page::Prompts => "Prompt Brain",
            Page::Agent => "Agent Chat",
            Page::Drafts => "Drafts",
        }
    }

    pub fn next(self) -> Page {
        let idx = Page::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Page::ALL[(idx + 1) % Page::ALL.len()]
    }
}

/// Normal mode moves around; Editing sends keystrokes to the active text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

pub struct AppState {
    pub page: Page,
    pub mode: InputMode,

    pub inbox: InboxView,
    pub prompts: PromptsView,
    pub chat: ChatView,
    pub drafts: DraftsView,

    pub settings: AgentSettings,
    pub notice: Option<(Notice, Instant)>,
    pub outbox: Outbox,
}

impl AppState {
    pub fn new(settings: AgentSettings) -> Self {
        let mut s = Self {
            page: Page::Inbox,
            mode: InputMode::Normal,
            inbox: InboxView::default(),
            prompts: PromptsView::default(),
            chat: ChatView::default(),
            drafts: DraftsView::default(),
            settings,
            notice: None,
            outbox: Outbox::default(),
        };
        s.inbox.activate(&mut s.outbox);
        s
    }

    /// Pages start fresh every time they are shown, like a remount.
    pub fn switch_to(&mut self, page: Page) {
        if page == self.page {
            return;
        }
        self.page = page;
        self.mode = InputMode::Normal;
        match page {
            Page::Inbox => {
                self.inbox = InboxView::default();
                self.inbox.activate(&mut self.outbox);
            }
            Page::Prompts => {
                self.prompts = PromptsView::default();
                self.prompts.activate(&mut self.outbox);
            }
            Page::Agent => {
                self.chat = ChatView::default();
                self.chat.activate(&mut self.outbox);
            }
            Page::Drafts => {
                self.drafts = DraftsView::default();
                self.drafts.activate(&mut self.outbox);
            }
        }
    }

    pub fn apply(&mut self, done: Completion) {
        let notice = match done.slot {
            Slot::InboxList | Slot::EmailAgent | Slot::EmailIngest | Slot::EmailDraft => {
                self.inbox.apply(done, &self.settings, &mut self.outbox)
            }
            Slot::ChatContext | Slot::ChatAsk => self.chat.apply(done),
            Slot::DraftList | Slot::DraftSave => self.drafts.apply(done, &mut self.outbox),
            Slot::PromptsLoad | Slot::PromptsSave => self.prompts.apply(done),
        };
        if let Some(n) = notice {
            self.notify(n);
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notice = Some((notice, Instant::now()));
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some((_, shown)) = &self.notice
            && now.duration_since(*shown) >= NOTICE_TTL
        {
            self.notice = None;
        }
    }

    /// The text input keystrokes go to in Editing mode, if any.
    pub fn active_input(&mut self) -> Option<&mut TextInput> {
        match self.page {
            Page::Inbox => self.inbox.selected.as_mut().map(|d| &mut d.instruction),
            Page::Agent => Some(&mut self.chat.input),
            Page::Drafts => self.drafts.editor.as_mut().map(|e| e.active()),
            Page::Prompts => Some(self.prompts.focused()),
        }
    }

    /// Whether Enter submits (single line) rather than inserting a newline.
    pub fn enter_submits(&self) -> bool {
        matches!(self.page, Page::Inbox | Page::Agent)
    }

    /// Ctrl-S / Enter in a single-line input.
    pub fn submit_input(&mut self) {
        match self.page {
            Page::Inbox => {
                if let Some(d) = self.inbox.selected.as_mut() {
                    d.ask_typed(&self.settings, &mut self.outbox);
                }
                self.mode = InputMode::Normal;
            }
            Page::Agent => {
                self.chat.submit(&self.settings, &mut self.outbox);
            }
            Page::Drafts => {
                if self.drafts.save(&mut self.outbox) {
                    self.mode = InputMode::Normal;
                }
            }
            Page::Prompts => {
                self.prompts.save(&mut self.outbox);
                self.mode = InputMode::Normal;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::chat::Exchange;
    use crate::worker::Job;

    #[test]
    fn starts_on_inbox_with_a_fetch_queued() {
        let mut s = AppState::new(AgentSettings::default());
        let queued = s.outbox.drain();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].job, Job::FetchInbox);
    }

    #[test]
    fn switching_pages_remounts_and_fetches() {
        let mut s = AppState::new(AgentSettings::default());
        s.outbox.drain();
        s.switch_to(Page::Agent);
        s.chat.log.push(Exchange {
            question: "q".into(),
            answer: "a".into(),
        });

        s.switch_to(Page::Drafts);
        s.switch_to(Page::Agent);

        assert!(s.chat.log.is_empty());
        let jobs: Vec<Job> = s.outbox.drain().into_iter().map(|r| r.job).collect();
        assert_eq!(jobs, vec![Job::FetchInbox, Job::FetchDrafts, Job::FetchInbox]);
    }

    #[test]
    fn notices_expire() {
        let mut s = AppState::new(AgentSettings::default());
        s.notify(Notice::info("Prompts saved!"));
        let shown = s.notice.as_ref().unwrap().1;
        s.tick(shown + Duration::from_secs(1));
        assert!(s.notice.is_some());
        s.tick(shown + NOTICE_TTL);
        assert!(s.notice.is_none());
    }

    #[test]
    fn page_cycle_wraps() {
        assert_eq!(Page::Drafts.next(), Page::Inbox);
        assert_eq!(Page::Inbox.next(), Page::Prompts);
    }
}
