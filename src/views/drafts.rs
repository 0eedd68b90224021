use ratatui::widgets::ListState;

use crate::domain::draft::{Draft, DraftId, DraftUpdate};
use crate::domain::email::EmailId;
use crate::views::email::unexpected;
use crate::views::input::TextInput;
use crate::views::Notice;
use crate::worker::{Completion, Job, Outbox, Output, Pending, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftField {
    #[default]
    Subject,
    Body,
}

#[derive(Debug, Clone)]
pub struct DraftEditor {
    pub id: DraftId,
    pub email_id: Option<EmailId>,
    pub subject: TextInput,
    pub body: TextInput,
    pub field: DraftField,
}

impl DraftEditor {
    fn from_draft(d: &Draft) -> Self {
        Self {
            id: d.id.clone(),
            email_id: d.email_id.clone(),
            subject: TextInput::new(d.subject.clone()),
            body: TextInput::new(d.body.clone()),
            field: DraftField::Subject,
        }
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            DraftField::Subject => DraftField::Body,
            DraftField::Body => DraftField::Subject,
        };
    }

    pub fn active(&mut self) -> &mut TextInput {
        match self.field {
            DraftField::Subject => &mut self.subject,
            DraftField::Body => &mut self.body,
        }
    }

    pub fn update(&self) -> DraftUpdate {
        DraftUpdate {
            id: self.id.clone(),
            subject: self.subject.as_str().to_string(),
            body: self.body.as_str().to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DraftsView {
    pub drafts: Vec<Draft>,
    pub list_state: ListState,
    pub editor: Option<DraftEditor>,
    list: Pending,
    save: Pending,
}

impl DraftsView {
    pub fn activate(&mut self, out: &mut Outbox) {
        self.list.start(out.submit(Slot::DraftList, Job::FetchDrafts));
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn is_saving(&self) -> bool {
        self.save.is_loading()
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.drafts.is_empty() {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let len = self.drafts.len() as i32;
        self.list_state
            .select(Some((cur + delta).clamp(0, len - 1) as usize));
    }

    pub fn open_selected(&mut self) {
        if let Some(d) = self.list_state.selected().and_then(|i| self.drafts.get(i)) {
            self.editor = Some(DraftEditor::from_draft(d));
        }
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Full replace of subject and body for the draft being edited.
    pub fn save(&mut self, out: &mut Outbox) -> bool {
        let Some(editor) = &self.editor else {
            return false;
        };
        let job = Job::SaveDraft(editor.update());
        self.save.start(out.submit(Slot::DraftSave, job));
        true
    }

    pub fn apply(&mut self, done: Completion, out: &mut Outbox) -> Option<Notice> {
        match done.slot {
            Slot::DraftList => {
                if !self.list.settle(done.ticket) {
                    return None;
                }
                match done.result {
                    Ok(Output::Drafts(drafts)) => {
                        self.drafts = drafts;
                        if self.drafts.is_empty() {
                            self.list_state.select(None);
                        } else {
                            let idx = self.list_state.selected().unwrap_or(0);
                            self.list_state
                                .select(Some(idx.min(self.drafts.len() - 1)));
                        }
                        None
                    }
                    Ok(other) => unexpected(done.slot, &other),
                    Err(_) => Some(Notice::error("Failed to load drafts")),
                }
            }
            Slot::DraftSave => {
                if !self.save.settle(done.ticket) {
                    return None;
                }
                match done.result {
                    Ok(Output::DraftSaved(id)) => {
                        if self.editor.as_ref().is_some_and(|e| e.id == id) {
                            self.editor = None;
                        }
                        self.activate(out);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Backend, Call, FakeApi};
    use crate::views::testing::run_all;
    use serde_json::json;

    fn api() -> FakeApi {
        FakeApi::new(Backend {
            drafts: serde_json::from_value(json!([
                {"id": "2", "email_id": 1, "subject": "Re: Merge plan", "body": "Sure.", "suggested_followups": []},
                {"id": "1", "email_id": 2, "subject": "Re: Lunch", "body": "Yes"}
            ]))
            .unwrap(),
            ..Backend::default()
        })
    }

    fn drive(view: &mut DraftsView, api: &FakeApi, out: &mut Outbox) -> Vec<Notice> {
        let mut notices = Vec::new();
        while !out.is_empty() {
            for done in run_all(out, api) {
                notices.extend(view.apply(done, out));
            }
        }
        notices
    }

    #[test]
    fn save_sends_last_edits_and_clears_selection() {
        let api = api();
        let mut out = Outbox::default();
        let mut view = DraftsView::default();
        view.activate(&mut out);
        drive(&mut view, &api, &mut out);

        view.move_selection(1);
        view.open_selected();
        let editor = view.editor.as_mut().unwrap();
        assert_eq!(editor.subject.as_str(), "Re: Lunch");
        editor.subject.insert('!');
        editor.toggle_field();
        editor.active().set("Yes, 12:30 works.");

        assert!(view.save(&mut out));
        let notices = drive(&mut view, &api, &mut out);

        assert_eq!(notices, vec![Notice::info("Draft saved")]);
        assert!(view.editor.is_none());
        let calls = api.calls();
        assert!(calls.contains(&Call::UpdateDraft(DraftUpdate {
            id: "1".into(),
            subject: "Re: Lunch!".into(),
            body: "Yes, 12:30 works.".into(),
        })));
        assert_eq!(calls.last(), Some(&Call::Drafts));
        assert_eq!(view.drafts[1].body, "Yes, 12:30 works.");
    }

    #[test]
    fn failed_save_keeps_editor() {
        let api = api();
        api.backend.lock().unwrap().failing.push("update_draft");
        let mut out = Outbox::default();
        let mut view = DraftsView::default();
        view.activate(&mut out);
        drive(&mut view, &api, &mut out);
        view.open_selected();

        view.save(&mut out);
        let notices = drive(&mut view, &api, &mut out);

        assert_eq!(notices, vec![Notice::error("Failed to save draft")]);
        assert!(view.editor.is_some());
        assert!(!view.is_saving());
    }

    #[test]
    fn save_without_selection_does_nothing() {
        let mut out = Outbox::default();
        let mut view = DraftsView::default();
        assert!(!view.save(&mut out));
        assert!(out.is_empty());
    }
}
