use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::domain::agent::AgentReply;
use crate::terminal::state::{AppState, InputMode, Page};
use crate::views::NoticeLevel;
use crate::views::drafts::DraftField;
use crate::views::input::TextInput;

const SNIPPET_CHARS: usize = 60;

pub fn render(f: &mut Frame, state: &AppState) {
    let [sidebar, main] =
        Layout::horizontal([Constraint::Length(24), Constraint::Fill(1)]).areas(f.area());
    let [body, footer] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(main);

    render_sidebar(f, sidebar, state.page);
    match state.page {
        Page::Inbox => render_inbox(f, body, state),
        Page::Prompts => render_prompts(f, body, state),
        Page::Agent => render_chat(f, body, state),
        Page::Drafts => render_drafts(f, body, state),
    }
    render_footer(f, footer, state);
}

fn border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn busy() -> Style {
    Style::default().fg(Color::Yellow)
}

fn bold(s: impl Into<String>) -> Span<'static> {
    Span::styled(s.into(), Style::default().add_modifier(Modifier::BOLD))
}

fn dim(s: impl Into<String>) -> Span<'static> {
    Span::styled(s.into(), Style::default().fg(Color::Gray))
}

fn placeholder(f: &mut Frame, area: Rect, block: Block, text: &str) {
    let p = Paragraph::new(dim(text.to_string())).block(block);
    f.render_widget(p, area);
}

/// Draw `input` in `area` and, when editing, put the caret on it.
fn render_input(f: &mut Frame, area: Rect, block: Block, input: &TextInput, editing: bool) {
    let inner = block.inner(area);
    let p = Paragraph::new(input.as_str().to_string()).block(block);
    f.render_widget(p, area);
    if editing {
        let (line, col) = input.cursor_position();
        let x = (inner.x + col).min(inner.right().saturating_sub(1));
        let y = (inner.y + line).min(inner.bottom().saturating_sub(1));
        f.set_cursor_position((x, y));
    }
}

fn render_sidebar(f: &mut Frame, area: Rect, current: Page) {
    let block = Block::default()
        .title(" MailboxIQ ")
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines = vec![Line::from(dim("AI-Powered Email Agent")), Line::raw("")];
    for (i, page) in Page::ALL.iter().enumerate() {
        let label = format!("{} {}", i + 1, page.title());
        lines.push(if *page == current {
            Line::from(Span::styled(
                format!("➜ {label}"),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(format!("  {label}"))
        });
    }
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_inbox(f: &mut Frame, area: Rect, state: &AppState) {
    let inbox = &state.inbox;
    let [header, rest] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(area);
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).areas(rest);

    let mut head = vec![bold(" Inbox  "), dim(inbox.header())];
    if inbox.is_loading() {
        head.push(Span::styled("  loading…", busy()));
    }
    f.render_widget(Paragraph::new(Line::from(head)), header);

    let list_block = Block::default()
        .title(" Emails ")
        .borders(Borders::ALL)
        .border_style(border(inbox.selected.is_none()));

    if inbox.emails.is_empty() {
        placeholder(f, left, list_block, "No emails loaded yet");
    } else {
        let items: Vec<ListItem> = inbox
            .emails
            .iter()
            .map(|e| {
                let mut top = vec![bold(e.subject.clone())];
                if let Some(cat) = &e.category {
                    top.push(Span::styled(
                        format!("  [{cat}]"),
                        Style::default().fg(Color::Magenta),
                    ));
                }
                ListItem::new(Text::from(vec![
                    Line::from(top),
                    Line::from(dim(e.sender.clone())),
                    Line::from(dim(e.snippet(SNIPPET_CHARS))),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(list_block)
            .highlight_symbol("➜ ")
            .highlight_style(Style::default().fg(Color::Green));
        f.render_stateful_widget(list, left, &mut inbox.list_state.clone());
    }

    let mut detail_block = Block::default()
        .title(" Email ")
        .borders(Borders::ALL)
        .border_style(border(inbox.selected.is_some()));

    let Some(detail) = &inbox.selected else {
        placeholder(f, right, detail_block, "Select an email to view details");
        return;
    };
    if detail.is_ingesting() {
        detail_block = detail_block.title(Line::styled("processing… ", busy()).right_aligned());
    }
    if detail.is_saving_draft() {
        detail_block = detail_block.title(Line::styled("saving draft… ", busy()).right_aligned());
    }

    let [content, input_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(right);

    let email = &detail.email;
    let mut lines = vec![
        Line::from(bold(email.subject.clone())),
        Line::from(dim(format!("From {} • {}", email.sender, email.timestamp))),
    ];
    if let Some(cat) = &email.category {
        lines.push(Line::from(vec![dim("Category: "), Span::raw(cat.clone())]));
    }
    lines.push(Line::raw(""));
    lines.extend(email.body.lines().map(|l| Line::raw(l.to_string())));
    lines.push(Line::raw(""));
    lines.push(Line::from(dim("─── Agent ───")));

    if detail.is_thinking() {
        lines.push(Line::styled("Thinking…", busy()));
    } else if let Some(text) = detail.rendered() {
        if matches!(detail.reply, Some(AgentReply::Tasks(ref t)) if t.is_empty()) {
            lines.push(Line::from(dim("No tasks found.")));
        }
        lines.extend(text.lines().map(|l| Line::raw(l.to_string())));
        if let Some(saved) = &detail.saved_draft {
            lines.push(Line::from(dim(format!("Saved as draft #{}", saved.id))));
        }
    } else {
        lines.push(Line::from(dim(
            "s summarize  t tasks  d draft reply  / ask  i process",
        )));
    }

    let p = Paragraph::new(lines)
        .block(detail_block)
        .wrap(Wrap { trim: false })
        .scroll((detail.scroll, 0));
    f.render_widget(p, content);

    let editing = state.mode == InputMode::Editing;
    let input_block = Block::default()
        .title(" Ask about this email ")
        .borders(Borders::ALL)
        .border_style(border(editing));
    render_input(f, input_area, input_block, &detail.instruction, editing);
}

fn render_prompts(f: &mut Frame, area: Rect, state: &AppState) {
    let prompts = &state.prompts;
    let editing = state.mode == InputMode::Editing;
    let areas = Layout::vertical([Constraint::Ratio(1, 3); 3]).split(area);

    for (i, (key, editor)) in prompts.entries().enumerate() {
        let focused = i == prompts.focus;
        let mut title = format!(" {} ", key.label());
        if focused && prompts.is_saving() {
            title.push_str("(saving…) ");
        }
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border(focused));
        if prompts.is_loading() && editor.as_str().is_empty() {
            placeholder(f, areas[i], block, "loading…");
        } else {
            render_input(f, areas[i], block, editor, focused && editing);
        }
    }
}

fn render_chat(f: &mut Frame, area: Rect, state: &AppState) {
    let chat = &state.chat;
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)]).areas(area);

    let mut rows = vec![ListItem::new(Line::from(bold("Global Inbox View")))];
    rows.extend(
        chat.emails
            .iter()
            .map(|e| ListItem::new(Line::raw(e.subject.clone()))),
    );
    let scope_title = match chat.scope.subject() {
        Some(subject) => format!(" Email Context: {subject} "),
        None => " Email Context: Global ".to_string(),
    };
    let list = List::new(rows)
        .block(Block::default().title(scope_title).borders(Borders::ALL))
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));
    let mut cursor: ListState = chat.context_state.clone();
    f.render_stateful_widget(list, left, &mut cursor);

    let [log_area, input_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(right);

    let log_block = Block::default()
        .title(" Email Agent Chat ")
        .borders(Borders::ALL);
    let mut lines: Vec<Line> = Vec::new();
    if let Some(q) = chat.pending_question() {
        lines.push(Line::from(vec![bold("You: "), Span::raw(q.to_string())]));
        lines.push(Line::styled("Thinking…", busy()));
        lines.push(Line::raw(""));
    }
    for ex in &chat.log {
        lines.push(Line::from(vec![bold("You: "), Span::raw(ex.question.clone())]));
        lines.extend(ex.answer.lines().map(|l| Line::from(dim(l.to_string()))));
        lines.push(Line::raw(""));
    }
    if lines.is_empty() {
        placeholder(f, log_area, log_block, "Start a conversation with your agent…");
    } else {
        f.render_widget(
            Paragraph::new(lines).block(log_block).wrap(Wrap { trim: false }),
            log_area,
        );
    }

    let editing = state.mode == InputMode::Editing;
    let input_block = Block::default()
        .title(" Ask anything… ")
        .borders(Borders::ALL)
        .border_style(border(editing));
    render_input(f, input_area, input_block, &chat.input, editing);
}

fn render_drafts(f: &mut Frame, area: Rect, state: &AppState) {
    let drafts = &state.drafts;
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

    let list_block = Block::default()
        .title(format!(" Draft List ({}) ", drafts.drafts.len()))
        .borders(Borders::ALL)
        .border_style(border(drafts.editor.is_none()));
    if drafts.drafts.is_empty() {
        let msg = if drafts.is_loading() { "loading…" } else { "No drafts yet" };
        placeholder(f, left, list_block, msg);
    } else {
        let items: Vec<ListItem> = drafts
            .drafts
            .iter()
            .map(|d| {
                ListItem::new(Text::from(vec![
                    Line::from(bold(d.subject.clone())),
                    Line::from(dim(first_line(&d.body))),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(list_block)
            .highlight_symbol("➜ ")
            .highlight_style(Style::default().fg(Color::Green));
        f.render_stateful_widget(list, left, &mut drafts.list_state.clone());
    }

    let Some(editor) = &drafts.editor else {
        let block = Block::default().borders(Borders::ALL);
        placeholder(f, right, block, "Select a draft or generate new one");
        return;
    };

    let editing = state.mode == InputMode::Editing;
    let [subject_area, body_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(right);
    let on_subject = editor.field == DraftField::Subject;

    let title = if drafts.is_saving() { " Subject (saving…) " } else { " Subject " };
    let subject_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border(on_subject));
    render_input(f, subject_area, subject_block, &editor.subject, editing && on_subject);

    let body_block = Block::default()
        .title(" Body ")
        .borders(Borders::ALL)
        .border_style(border(!on_subject));
    render_input(f, body_area, body_block, &editor.body, editing && !on_subject);
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or_default().to_string()
}

fn render_footer(f: &mut Frame, area: Rect, state: &AppState) {
    if let Some((notice, _)) = &state.notice {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        f.render_widget(
            Paragraph::new(Span::styled(notice.text.clone(), Style::default().fg(color))),
            area,
        );
        return;
    }

    let hints: &[(&str, &str)] = match (state.mode, state.page) {
        (InputMode::Editing, Page::Drafts) => &[("Tab", "field"), ("C-s", "save"), ("Esc", "done")],
        (InputMode::Editing, Page::Prompts) => &[("C-s", "save"), ("Esc", "done")],
        (InputMode::Editing, _) => &[("Enter", "send"), ("Esc", "done")],
        (_, Page::Inbox) => &[
            ("j/k", "move"),
            ("Enter", "open"),
            ("l", "load"),
            ("p", "process"),
            ("Tab", "page"),
            ("q", "quit"),
        ],
        (_, Page::Prompts) => &[("j/k", "move"), ("e", "edit"), ("S", "save"), ("r", "reload"), ("q", "quit")],
        (_, Page::Agent) => &[("j/k", "move"), ("Enter", "context"), ("g", "global"), ("i", "ask"), ("q", "quit")],
        (_, Page::Drafts) => &[("j/k", "move"), ("Enter", "edit"), ("S", "save"), ("Esc", "close"), ("q", "quit")],
    };

    let mut spans = Vec::new();
    for (k, label) in hints {
        spans.push(bold(*k));
        spans.push(Span::raw(format!(" {label}  ")));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
