use crate::domain::prompts::{PromptKey, PromptSet};
use crate::views::Notice;
use crate::views::email::unexpected;
use crate::views::input::TextInput;
use crate::worker::{Completion, Job, Outbox, Output, Pending, Slot};

/// One editor per prompt, in [`PromptKey::ALL`] order. Edits stay local
/// until [`PromptsView::save`] writes the whole set.
#[derive(Debug, Default)]
pub struct PromptsView {
    editors: [TextInput; 3],
    pub focus: usize,
    load: Pending,
    save: Pending,
}

impl PromptsView {
    pub fn activate(&mut self, out: &mut Outbox) {
        self.load.start(out.submit(Slot::PromptsLoad, Job::FetchPrompts));
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_loading()
    }

    pub fn is_saving(&self) -> bool {
        self.save.is_loading()
    }

    pub fn entries(&self) -> impl Iterator<Item = (PromptKey, &TextInput)> {
        PromptKey::ALL.into_iter().zip(self.editors.iter())
    }

    pub fn focused_key(&self) -> PromptKey {
        PromptKey::ALL[self.focus]
    }

    pub fn focused(&mut self) -> &mut TextInput {
        &mut self.editors[self.focus]
    }

    pub fn move_focus(&mut self, delta: i32) {
        let last = PromptKey::ALL.len() as i32 - 1;
        self.focus = (self.focus as i32 + delta).clamp(0, last) as usize;
    }

    pub fn prompt_set(&self) -> PromptSet {
        let mut set = PromptSet::default();
        for (key, editor) in self.entries() {
            set.set(key, editor.as_str());
        }
        set
    }

    fn fill(&mut self, set: &PromptSet) {
        for (key, editor) in PromptKey::ALL.into_iter().zip(self.editors.iter_mut()) {
            editor.set(set.get(key));
        }
    }

    pub fn save(&mut self, out: &mut Outbox) {
        let job = Job::SavePrompts(self.prompt_set());
        self.save.start(out.submit(Slot::PromptsSave, job));
    }

    pub fn apply(&mut self, done: Completion) -> Option<Notice> {
        match done.slot {
            Slot::PromptsLoad => {
                if !self.load.settle(done.ticket) {
                    return None;
                }
                match done.result {
                    Ok(Output::Prompts(set)) => {
                        self.fill(&set);
                        None
                    }
                    Ok(other) => unexpected(done.slot, &other),
                    Err(_) => Some(Notice::error("Failed to load prompts")),
                }
            }
            Slot::PromptsSave => {
                if !self.save.settle(done.ticket) {
                    return None;
                }
                match done.result {
                    Ok(Output::PromptsSaved) => Some(Notice::info("Prompts saved!")),
                    Ok(other) => unexpected(done.slot, &other),
                    Err(_) => Some(Notice::error("Failed to save prompts")),
                }
            }
            _ => None,
        }
    }
}
