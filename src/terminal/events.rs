use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::domain::agent::Instruction;
use crate::terminal::state::{AppState, InputMode, Page};
use crate::views::Notice;

/// Returns true when the app should quit.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if state.mode == InputMode::Editing {
        handle_editing_keys(key, state);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('1') => state.switch_to(Page::Inbox),
        KeyCode::Char('2') => state.switch_to(Page::Prompts),
        KeyCode::Char('3') => state.switch_to(Page::Agent),
        KeyCode::Char('4') => state.switch_to(Page::Drafts),
        KeyCode::Tab => state.switch_to(state.page.next()),
        _ => match state.page {
            Page::Inbox => handle_inbox_keys(key, state),
            Page::Prompts => handle_prompt_keys(key, state),
            Page::Agent => handle_chat_keys(key, state),
            Page::Drafts => handle_draft_keys(key, state),
        },
    }
    false
}

fn handle_editing_keys(key: KeyEvent, state: &mut AppState) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => {
            state.mode = InputMode::Normal;
            return;
        }
        KeyCode::Char('s') if ctrl => {
            state.submit_input();
            return;
        }
        KeyCode::Enter if state.enter_submits() => {
            state.submit_input();
            return;
        }
        KeyCode::Tab if state.page == Page::Drafts => {
            if let Some(editor) = state.drafts.editor.as_mut() {
                editor.toggle_field();
            }
            return;
        }
        _ => {}
    }

    let Some(input) = state.active_input() else {
        state.mode = InputMode::Normal;
        return;
    };
    match key.code {
        KeyCode::Char(c) if !ctrl => input.insert(c),
        KeyCode::Enter => input.insert('\n'),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => {}
    }
}

fn handle_inbox_keys(key: KeyEvent, state: &mut AppState) {
    let out = &mut state.outbox;
    let inbox = &mut state.inbox;

    match key.code {
        KeyCode::Char('l') => inbox.load(out),
        KeyCode::Char('p') => inbox.process(out),
        KeyCode::Down | KeyCode::Char('j') => inbox.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => inbox.move_selection(-1),
        KeyCode::Enter => inbox.open_selected(),
        KeyCode::Esc => inbox.close_email(),
        _ => {
            let Some(detail) = inbox.selected.as_mut() else {
                return;
            };
            match key.code {
                KeyCode::Char('s') => detail.run(Instruction::Summarize, &state.settings, out),
                KeyCode::Char('t') => detail.run(Instruction::ExtractTasks, &state.settings, out),
                KeyCode::Char('d') => detail.run(Instruction::DraftReply, &state.settings, out),
                KeyCode::Char('i') => detail.ingest(out),
                KeyCode::Char('w') => {
                    if !detail.save_draft(out) {
                        state.notify(Notice::error("Generate a draft first"));
                    }
                }
                KeyCode::Char('/') => state.mode = InputMode::Editing,
                KeyCode::PageDown => detail.scroll = detail.scroll.saturating_add(10),
                KeyCode::PageUp => detail.scroll = detail.scroll.saturating_sub(10),
                _ => {}
            }
        }
    }
}

fn handle_chat_keys(key: KeyEvent, state: &mut AppState) {
    let chat = &mut state.chat;
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => chat.move_cursor(1),
        KeyCode::Up | KeyCode::Char('k') => chat.move_cursor(-1),
        KeyCode::Enter => chat.select_cursor(),
        KeyCode::Char('g') => chat.select_global(),
        KeyCode::Char('i') | KeyCode::Char('/') => state.mode = InputMode::Editing,
        _ => {}
    }
}

fn handle_draft_keys(key: KeyEvent, state: &mut AppState) {
    let drafts = &mut state.drafts;
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => drafts.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => drafts.move_selection(-1),
        KeyCode::Enter => {
            drafts.open_selected();
            if drafts.editor.is_some() {
                state.mode = InputMode::Editing;
            }
        }
        KeyCode::Char('e') if drafts.editor.is_some() => state.mode = InputMode::Editing,
        KeyCode::Char('S') => {
            drafts.save(&mut state.outbox);
        }
        KeyCode::Esc => drafts.close_editor(),
        KeyCode::Char('r') => drafts.activate(&mut state.outbox),
        _ => {}
    }
}

fn handle_prompt_keys(key: KeyEvent, state: &mut AppState) {
    let prompts = &mut state.prompts;
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => prompts.move_focus(1),
        KeyCode::Up | KeyCode::Char('k') => prompts.move_focus(-1),
        KeyCode::Enter | KeyCode::Char('e') => state.mode = InputMode::Editing,
        KeyCode::Char('S') => prompts.save(&mut state.outbox),
        KeyCode::Char('r') => prompts.activate(&mut state.outbox),
        _ => {}
    }
}
