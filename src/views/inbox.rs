use ratatui::widgets::ListState;

use crate::domain::email::Email;
use crate::views::email::{EmailDetail, unexpected};
use crate::views::{AgentSettings, Notice};
use crate::worker::{Completion, Job, Outbox, Output, Pending, Slot};

pub fn inbox_header(total: usize, processed: u64) -> String {
    format!("{total} total emails • {processed} processed")
}

#[derive(Debug, Default)]
pub struct InboxView {
    pub emails: Vec<Email>,
    pub processed_count: u64,
    pub list_state: ListState,
    /// Email opened in the detail pane.
    pub selected: Option<EmailDetail>,
    list: Pending,
}

impl InboxView {
    pub fn header(&self) -> String {
        inbox_header(self.emails.len(), self.processed_count)
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn activate(&mut self, out: &mut Outbox) {
        self.list.start(out.submit(Slot::InboxList, Job::FetchInbox));
    }

    /// "Load Inbox": ask the backend to re-read the mailbox.
    pub fn load(&mut self, out: &mut Outbox) {
        self.list.start(out.submit(Slot::InboxList, Job::ReloadInbox));
    }

    /// "Process Inbox": batch ingest, then refetch.
    pub fn process(&mut self, out: &mut Outbox) {
        self.list.start(out.submit(Slot::InboxList, Job::ProcessInbox));
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.emails.is_empty() {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let len = self.emails.len() as i32;
        let next = (cur + delta).clamp(0, len - 1) as usize;
        self.list_state.select(Some(next));
    }

    pub fn open_selected(&mut self) {
        let Some(email) = self
            .list_state
            .selected()
            .and_then(|i| self.emails.get(i))
        else {
            return;
        };
        self.selected = Some(EmailDetail::new(email.clone()));
    }

    pub fn close_email(&mut self) {
        self.selected = None;
    }

    fn replace(&mut self, emails: Vec<Email>) {
        self.emails = emails;
        if self.emails.is_empty() {
            self.list_state.select(None);
        } else {
            let idx = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(idx.min(self.emails.len() - 1)));
        }
        // Keep the opened email in step with fresh categories.
        if let Some(detail) = self.selected.as_mut()
            && let Some(fresh) = self.emails.iter().find(|e| e.id == detail.email.id)
        {
            detail.email = fresh.clone();
        }
    }

    pub fn apply(
        &mut self,
        done: Completion,
        settings: &AgentSettings,
        out: &mut Outbox,
    ) -> Option<Notice> {
        if done.slot != Slot::InboxList {
            let detail = self.selected.as_mut()?;
            let record_id = detail.email.id.clone();
            let notice = detail.apply(done, settings, out);
            // Mirror single-email processing into the list.
            if let Some(category) = detail.email.category.clone()
                && let Some(entry) = self.emails.iter_mut().find(|e| e.id == record_id)
            {
                entry.category = Some(category);
                entry.action_items = detail.email.action_items.clone();
            }
            return notice;
        }

        if !self.list.settle(done.ticket) {
            return None;
        }
        match done.result {
            Ok(Output::Inbox(emails)) => {
                self.replace(emails);
                None
            }
            Ok(Output::Reloaded(emails)) => {
                self.selected = None;
                self.processed_count = 0;
                self.list_state = ListState::default();
                self.replace(emails);
                Some(Notice::info("Inbox loaded"))
            }
            Ok(Output::Processed { count, emails }) => {
                self.processed_count = count;
                match emails {
                    Ok(emails) => {
                        self.replace(emails);
                        Some(Notice::info(format!("Processed {count} emails")))
                    }
                    Err(_) => Some(Notice::error(format!(
                        "Processed {count} emails but failed to reload inbox"
                    ))),
                }
            }
            Ok(other) => unexpected(done.slot, &other),
            Err(_) => Some(Notice::error("Failed to load inbox")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Backend, Call, FakeApi};
    use crate::views::testing::run_all;
    use serde_json::json;

    fn backend() -> Backend {
        Backend {
            emails: serde_json::from_value(json!([
                {"id": 1, "subject": "Merge plan", "sender": "pm@acme.com", "timestamp": "t1", "body": "Please merge."},
                {"id": 2, "subject": "Newsletter", "sender": "news@x.com", "timestamp": "t2", "body": "Weekly."},
                {"id": 3, "subject": "Prize", "sender": "spam@x.com", "timestamp": "t3", "body": "Click!"}
            ]))
            .unwrap(),
            ingest_result: serde_json::from_value(json!([
                {"email_id": 1, "category": "To-Do", "action_items": [{"task": "Merge", "deadline": "2025-11-20"}]},
                {"email_id": 2, "category": "Newsletter", "action_items": []},
                {"email_id": 3, "category": "Spam", "action_items": []}
            ]))
            .unwrap(),
            ..Backend::default()
        }
    }

    fn drive(view: &mut InboxView, api: &FakeApi, out: &mut Outbox) -> Vec<Notice> {
        let settings = AgentSettings::default();
        let mut notices = Vec::new();
        while !out.is_empty() {
            for done in run_all(out, api) {
                notices.extend(view.apply(done, &settings, out));
            }
        }
        notices
    }

    #[test]
    fn process_updates_header_after_refetch() {
        let api = FakeApi::new(backend());
        let mut out = Outbox::default();
        let mut view = InboxView::default();

        view.activate(&mut out);
        drive(&mut view, &api, &mut out);
        assert_eq!(view.header(), "3 total emails • 0 processed");
        assert_eq!(view.emails[0].category, None);

        view.process(&mut out);
        assert!(view.is_loading());
        drive(&mut view, &api, &mut out);

        assert!(!view.is_loading());
        assert!(view.header().ends_with("• 3 processed"));
        assert_eq!(view.emails[0].category.as_deref(), Some("To-Do"));
        assert_eq!(view.emails[2].category.as_deref(), Some("Spam"));
    }

    #[test]
    fn load_resets_counter_and_selection() {
        let api = FakeApi::new(backend());
        let mut out = Outbox::default();
        let mut view = InboxView::default();

        view.process(&mut out);
        drive(&mut view, &api, &mut out);
        view.move_selection(2);
        view.open_selected();
        assert_eq!(view.selected.as_ref().unwrap().email.subject, "Prize");

        view.load(&mut out);
        let notices = drive(&mut view, &api, &mut out);

        assert_eq!(notices, vec![Notice::info("Inbox loaded")]);
        assert_eq!(view.processed_count, 0);
        assert!(view.selected.is_none());
        assert_eq!(view.list_state.selected(), Some(0));
        assert!(api.calls().contains(&Call::Reload));
    }

    #[test]
    fn failed_fetch_keeps_previous_list() {
        let api = FakeApi::new(backend());
        let mut out = Outbox::default();
        let mut view = InboxView::default();
        view.activate(&mut out);
        drive(&mut view, &api, &mut out);

        api.backend.lock().unwrap().failing.push("processed");
        view.activate(&mut out);
        let notices = drive(&mut view, &api, &mut out);

        assert_eq!(notices, vec![Notice::error("Failed to load inbox")]);
        assert_eq!(view.emails.len(), 3);
        assert!(!view.is_loading());
    }

    #[test]
    fn processed_count_kept_when_refetch_fails() {
        let api = FakeApi::new(backend());
        let mut out = Outbox::default();
        let mut view = InboxView::default();
        view.activate(&mut out);
        drive(&mut view, &api, &mut out);

        api.backend.lock().unwrap().failing.push("processed");
        view.process(&mut out);
        let notices = drive(&mut view, &api, &mut out);

        assert_eq!(view.processed_count, 3);
        assert_eq!(view.header(), "3 total emails • 3 processed");
        assert_eq!(
            notices,
            vec![Notice::error("Processed 3 emails but failed to reload inbox")]
        );
        assert_eq!(view.emails[0].category, None);
        assert!(!view.is_loading());
        assert_eq!(
            api.calls()[2..],
            [Call::IngestAll, Call::Inbox, Call::Processed]
        );
    }

    #[test]
    fn overlapping_fetches_keep_latest() {
        let api = FakeApi::new(backend());
        let mut out = Outbox::default();
        let mut view = InboxView::default();

        view.process(&mut out);
        let processed = run_all(&mut out, &api);
        view.load(&mut out);
        let reloaded = run_all(&mut out, &api);

        let settings = AgentSettings::default();
        for done in reloaded.into_iter().chain(processed) {
            view.apply(done, &settings, &mut out);
        }
        assert_eq!(view.processed_count, 0);
    }

    #[test]
    fn ingesting_the_open_email_patches_the_list() {
        let api = FakeApi::new(backend());
        let mut out = Outbox::default();
        let mut view = InboxView::default();
        view.activate(&mut out);
        drive(&mut view, &api, &mut out);

        view.open_selected();
        view.selected.as_mut().unwrap().ingest(&mut out);
        drive(&mut view, &api, &mut out);

        assert_eq!(view.emails[0].category.as_deref(), Some("To-Do"));
        assert_eq!(view.emails[0].action_items.as_ref().map(Vec::len), Some(1));
    }
}
