//! Interactive shell: login, workspace list and inbox in one process.
//!
//! One command per input line. After each command the current view is
//! rendered again from controller state.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::Context;
use crate::inbox::Inbox;
use crate::models::Priority;
use crate::session::{AuthAction, LoginForm, Navigation};
use crate::transport::Transport;
use crate::view;
use crate::workspaces::WorkspaceList;

const HELP: &str = include_str!("../../resources/shell_help.txt");

enum Screen {
    Login(LoginForm),
    Workspaces(WorkspaceList),
    Inbox(Inbox),
}

impl Screen {
    fn render(&self) -> String {
        match self {
            Screen::Login(form) => view::login(form),
            Screen::Workspaces(list) => view::workspaces(list),
            Screen::Inbox(inbox) => view::inbox(inbox),
        }
    }
}

pub async fn run<T, R, W>(ctx: &mut Context<T>, org: Option<i64>, input: R, out: &mut W) -> Result<()>
where
    T: Transport,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut screen = Screen::Login(LoginForm::new());
    let start = match org {
        Some(id) => Navigation::Inbox(id),
        None => Navigation::Workspaces,
    };
    navigate(ctx, &mut screen, start).await?;
    ctx.persist()?;
    write!(out, "{}", screen.render())?;
    prompt(out)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "" => {}
            "quit" | "exit" => break,
            "help" => write!(out, "{}", HELP)?,
            _ => match handle(ctx, &mut screen, verb, rest).await {
                Some(nav) => {
                    navigate(ctx, &mut screen, nav).await?;
                    ctx.persist()?;
                    write!(out, "\n{}", screen.render())?;
                }
                None => writeln!(out, "Unknown command '{}'. Type 'help' for a list.", verb)?,
            },
        }
        prompt(out)?;
    }
    Ok(())
}

fn prompt<W: Write>(out: &mut W) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

/// Follow navigation until a view decides to stay.
async fn navigate<T: Transport>(
    ctx: &mut Context<T>,
    screen: &mut Screen,
    mut nav: Navigation,
) -> Result<()> {
    loop {
        nav = match nav {
            Navigation::Stay => return Ok(()),
            Navigation::Login => {
                let mut form = LoginForm::new();
                let next = form.enter(&mut ctx.api).await;
                *screen = Screen::Login(form);
                next
            }
            Navigation::Workspaces => {
                let mut list = WorkspaceList::new();
                match list.enter(&mut ctx.api).await {
                    // the gate just rejected the session; no second probe
                    Navigation::Login => {
                        *screen = Screen::Login(LoginForm::new());
                        Navigation::Stay
                    }
                    next => {
                        *screen = Screen::Workspaces(list);
                        next
                    }
                }
            }
            Navigation::Inbox(org_id) => {
                let mut inbox = Inbox::new(org_id, ctx.tone);
                inbox.enter(&mut ctx.api, org_id).await;
                if inbox.error.is_none() {
                    ctx.db.set_current_org(&ctx.api_base, org_id)?;
                }
                *screen = Screen::Inbox(inbox);
                Navigation::Stay
            }
        };
    }
}

/// Run one command against the current view. `None` means the verb is not
/// known there.
async fn handle<T: Transport>(
    ctx: &mut Context<T>,
    screen: &mut Screen,
    verb: &str,
    rest: &str,
) -> Option<Navigation> {
    let api = &mut ctx.api;
    let nav = match screen {
        Screen::Login(form) => match verb {
            "email" => {
                form.email = rest.to_string();
                Navigation::Stay
            }
            "password" => {
                form.password = rest.to_string();
                Navigation::Stay
            }
            "login" => form.submit(api, AuthAction::Login).await,
            "signup" => form.submit(api, AuthAction::Signup).await,
            _ => return None,
        },

        Screen::Workspaces(list) => match verb {
            "orgs" | "refresh" => {
                list.error = None;
                if let Err(e) = list.list(api).await {
                    list.error = Some(e);
                }
                Navigation::Stay
            }
            "create" => {
                list.name = rest.to_string();
                list.error = None;
                if let Err(e) = list.create(api).await {
                    list.error = Some(e);
                }
                Navigation::Stay
            }
            "open" => match rest.parse::<i64>() {
                Ok(org_id) => list.open(org_id),
                Err(_) => Navigation::Stay,
            },
            "logout" => list.logout(api).await,
            _ => return None,
        },

        Screen::Inbox(inbox) => match verb {
            "tickets" | "refresh" => {
                inbox.refresh_tickets(api).await;
                Navigation::Stay
            }
            "select" => {
                if let Ok(id) = rest.parse::<i64>() {
                    inbox.select(api, id).await;
                }
                Navigation::Stay
            }
            "new" => {
                let (priority, subject) = split_priority(rest);
                inbox.form.priority = priority;
                inbox.form.subject = subject.to_string();
                inbox.create_ticket(api).await;
                Navigation::Stay
            }
            "say" => {
                inbox.compose = rest.to_string();
                Navigation::Stay
            }
            "send" => {
                inbox.send_message(api).await;
                Navigation::Stay
            }
            "draft" => {
                inbox.request_draft(api).await;
                Navigation::Stay
            }
            "use" => {
                inbox.use_draft();
                Navigation::Stay
            }
            "edit" => {
                inbox.edit_draft(rest);
                Navigation::Stay
            }
            "toggle" => {
                inbox.toggle_status(api).await;
                Navigation::Stay
            }
            "back" => Navigation::Workspaces,
            _ => return None,
        },
    };
    Some(nav)
}

/// `new high Printer broken` sets the priority; without a leading priority
/// word the whole text is the subject.
fn split_priority(rest: &str) -> (Priority, &str) {
    if let Some((first, subject)) = rest.split_once(char::is_whitespace) {
        if let Ok(priority) = first.parse::<Priority>() {
            return (priority, subject.trim());
        }
    }
    (Priority::default(), rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::*;
    use crate::transport::fake::FakeTransport;
    use crate::transport::{Method, Session};
    use serde_json::{json, Value};

    fn ticket_json(id: i64, subject: &str) -> Value {
        json!({"id": id, "org_id": 3, "subject": subject, "status": "open", "priority": "high"})
    }

    fn seed_inbox(ctx: &Context<FakeTransport>) {
        let t = ctx.api.transport();
        t.on(Method::Get, "/tickets?org_id=3", json!({"items": [ticket_json(7, "Printer broken")]}));
        t.on(
            Method::Get,
            "/tickets/7",
            json!({"ticket": ticket_json(7, "Printer broken"), "messages": []}),
        );
    }

    async fn run_script(ctx: &mut Context<FakeTransport>, org: Option<i64>, script: &str) -> String {
        let mut out = Vec::new();
        run(ctx, org, script.as_bytes(), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn posts(ctx: &Context<FakeTransport>, path: &str) -> Vec<Option<Value>> {
        ctx.api
            .transport()
            .calls()
            .into_iter()
            .filter(|c| c.method == Method::Post && c.path == path)
            .map(|c| c.body)
            .collect()
    }

    // ==================== Unit Tests ====================

    #[test]
    fn test_split_priority() {
        assert_eq!(split_priority("high Printer broken"), (Priority::High, "Printer broken"));
        assert_eq!(split_priority("Printer broken"), (Priority::Medium, "Printer broken"));
        assert_eq!(split_priority("low"), (Priority::Medium, "low"));
    }

    #[tokio::test]
    async fn test_logged_out_shell_starts_at_login() {
        let (mut ctx, _dir) = setup_test_context(Session::default());
        ctx.api.transport().fail(Method::Get, "/auth/me", 401, "");

        let out = run_script(&mut ctx, None, "").await;
        assert!(out.starts_with("Login\n"));
        assert_eq!(ctx.api.transport().calls_to(Method::Get, "/auth/me"), 1);
        assert_eq!(ctx.api.transport().calls_to(Method::Get, "/orgs"), 0);
    }

    #[tokio::test]
    async fn test_login_flow_reaches_workspaces() {
        let (mut ctx, _dir) = setup_test_context(Session::default());
        let t = ctx.api.transport();
        t.fail(Method::Get, "/auth/me", 401, "");
        t.on(Method::Get, "/auth/me", json!({"id": 1, "email": "a@example.com"}));
        t.on_with_cookies(
            Method::Post,
            "/auth/login",
            json!({"id": 1, "email": "a@example.com"}),
            &["access_token=tok; HttpOnly; Path=/"],
        );
        t.on(Method::Get, "/orgs", json!({"items": [{"id": 3, "name": "Acme"}]}));

        let out = run_script(
            &mut ctx,
            None,
            "email a@example.com\npassword secret\nlogin\n",
        )
        .await;

        assert!(out.contains("Your Workspaces"));
        assert!(out.contains("Acme"));
        assert_eq!(ctx.api.transport().calls_to(Method::Get, "/auth/me"), 2);
        let stored = ctx.db.load_session(API_BASE).unwrap();
        assert_eq!(stored.cookie_header().as_deref(), Some("access_token=tok"));
    }

    #[tokio::test]
    async fn test_open_workspace_remembers_it() {
        let (mut ctx, _dir) = logged_in();
        ctx.api
            .transport()
            .on(Method::Get, "/auth/me", json!({"id": 1, "email": "a@example.com"}));
        ctx.api
            .transport()
            .on(Method::Get, "/orgs", json!({"items": [{"id": 3, "name": "Acme"}]}));
        seed_inbox(&ctx);

        let out = run_script(&mut ctx, None, "open 3\n").await;

        assert!(out.contains("Workspace #3 tickets"));
        assert!(out.contains("Ticket #7: Printer broken"));
        assert_eq!(ctx.db.current_org(API_BASE).unwrap().unwrap().org_id, 3);
    }

    #[tokio::test]
    async fn test_draft_use_send() {
        let (mut ctx, _dir) = logged_in();
        seed_inbox(&ctx);
        let t = ctx.api.transport();
        t.on(Method::Post, "/ai/draft-reply", json!({"draft": "We are on it."}));
        t.on(
            Method::Post,
            "/tickets/7/messages",
            json!({"id": 1, "ticket_id": 7, "author_type": "user", "body": "We are on it."}),
        );

        let out = run_script(&mut ctx, Some(3), "draft\nuse\nsend\n").await;

        assert!(out.contains("AI Draft:"));
        assert_eq!(
            posts(&ctx, "/tickets/7/messages"),
            vec![Some(json!({"author_type": "user", "body": "We are on it."}))]
        );
    }

    #[tokio::test]
    async fn test_new_ticket_with_priority() {
        let (mut ctx, _dir) = logged_in();
        seed_inbox(&ctx);
        ctx.api
            .transport()
            .on(Method::Post, "/tickets", ticket_json(8, "Projector dead"));

        run_script(&mut ctx, Some(3), "new low Projector dead\n").await;

        assert_eq!(
            posts(&ctx, "/tickets"),
            vec![Some(json!({"org_id": 3, "subject": "Projector dead", "priority": "low"}))]
        );
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let (mut ctx, _dir) = logged_in();
        seed_inbox(&ctx);

        run_script(&mut ctx, Some(3), "quit\nsay hi\nsend\n").await;
        assert!(posts(&ctx, "/tickets/7/messages").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_and_help() {
        let (mut ctx, _dir) = logged_in();
        seed_inbox(&ctx);

        let out = run_script(&mut ctx, Some(3), "frobnicate\nhelp\n").await;
        assert!(out.contains("Unknown command 'frobnicate'"));
        assert!(out.contains("select <id>"));
    }

    #[tokio::test]
    async fn test_inbox_verbs_are_unknown_at_login() {
        let (mut ctx, _dir) = setup_test_context(Session::default());
        ctx.api.transport().fail(Method::Get, "/auth/me", 401, "");

        let out = run_script(&mut ctx, None, "send\n").await;
        assert!(out.contains("Unknown command 'send'"));
    }
}
