//! Plain-text rendering of controller state.

use std::fmt::Write;

use crate::inbox::{Inbox, Selection};
use crate::models::{Message, Ticket, TicketDetail, Workspace};
use crate::session::LoginForm;
use crate::workspaces::WorkspaceList;

const SUBJECT_WIDTH: usize = 40;

pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

pub fn ticket_row(ticket: &Ticket, selected: bool) -> String {
    let marker = if selected { ">" } else { " " };
    let status_display = format!("[{}]", ticket.status);
    let mut row = format!(
        "{} #{:<4} {:9} {:<40} {:6}",
        marker,
        ticket.id,
        status_display,
        truncate(&ticket.subject, SUBJECT_WIDTH),
        ticket.priority
    );
    if let Some(created) = ticket.created_at {
        let _ = write!(row, " {}", created.format("%Y-%m-%d"));
    }
    row.trim_end().to_string()
}

pub fn ticket_list(tickets: &[Ticket], selected_id: Option<i64>) -> String {
    if tickets.is_empty() {
        return "No tickets yet.\n".to_string();
    }
    let mut out = String::new();
    for ticket in tickets {
        let _ = writeln!(out, "{}", ticket_row(ticket, Some(ticket.id) == selected_id));
    }
    out
}

fn message_block(out: &mut String, message: &Message) {
    let mut lines = message.body.lines();
    let first = lines.next().unwrap_or("");
    let _ = writeln!(out, "  [{}] {}", message.author_type, first);
    for line in lines {
        let _ = writeln!(out, "      {}", line);
    }
}

pub fn ticket_detail(detail: &TicketDetail) -> String {
    let ticket = &detail.ticket;
    let mut out = String::new();
    let _ = writeln!(out, "Ticket #{}: {}", ticket.id, ticket.subject);
    let _ = writeln!(out, "Status: {}", ticket.status);
    let _ = writeln!(out, "Priority: {}", ticket.priority);
    if let Some(created) = ticket.created_at {
        let _ = writeln!(out, "Created: {}", created.format("%Y-%m-%d %H:%M:%S"));
    }

    out.push('\n');
    if detail.messages.is_empty() {
        out.push_str("No messages yet.\n");
    } else {
        out.push_str("Messages:\n");
        for message in &detail.messages {
            message_block(&mut out, message);
        }
    }
    out
}

fn indented(out: &mut String, heading: &str, text: &str) {
    let _ = writeln!(out, "\n{}", heading);
    for line in text.lines() {
        let _ = writeln!(out, "  {}", line);
    }
}

pub fn inbox(inbox: &Inbox) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Workspace #{} tickets", inbox.org_id());
    if let Some(notice) = inbox.notice() {
        let _ = writeln!(out, "{}", notice);
    }
    out.push('\n');
    out.push_str(&ticket_list(&inbox.tickets, inbox.selected_id()));
    out.push('\n');

    match inbox.selection() {
        Selection::NoSelection => out.push_str("Select a ticket.\n"),
        Selection::Loading { ticket_id } => {
            let _ = writeln!(out, "Loading ticket #{}...", ticket_id);
        }
        Selection::Failed { ticket_id } => {
            let _ = writeln!(out, "Ticket #{} could not be loaded.", ticket_id);
        }
        Selection::Selected(detail) => {
            out.push_str(&ticket_detail(detail));
            if inbox.draft_loading() {
                out.push_str("\nGenerating draft...\n");
            }
            if let Some(draft) = &inbox.draft {
                indented(&mut out, "AI Draft:", draft);
            }
            if !inbox.compose.is_empty() {
                indented(&mut out, "Compose:", &inbox.compose);
            }
        }
    }
    out
}

pub fn workspace_list(workspaces: &[Workspace]) -> String {
    if workspaces.is_empty() {
        return "No workspaces yet.\n".to_string();
    }
    let mut out = String::new();
    for workspace in workspaces {
        let _ = writeln!(out, "#{:<4} {}", workspace.id, workspace.name);
    }
    out
}

pub fn workspaces(list: &WorkspaceList) -> String {
    if list.loading {
        return "Loading...\n".to_string();
    }
    let mut out = String::from("Your Workspaces\n");
    if let Some(notice) = list.notice() {
        let _ = writeln!(out, "{}", notice);
    }
    out.push('\n');
    out.push_str(&workspace_list(&list.workspaces));
    out
}

pub fn login(form: &LoginForm) -> String {
    let mut out = String::from("Login\n");
    let email = if form.email.is_empty() { "(not set)" } else { form.email.as_str() };
    let _ = writeln!(out, "Email: {}", email);
    let _ = writeln!(
        out,
        "Password: {}",
        if form.password.is_empty() { "(not set)" } else { "********" }
    );
    if form.busy {
        out.push_str("...\n");
    }
    if let Some(notice) = form.notice() {
        let _ = writeln!(out, "{}", notice);
    }
    out
}
