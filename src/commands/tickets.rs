use anyhow::{bail, Result};

use super::Context;
use crate::inbox::Inbox;
use crate::models::{DraftTone, Priority};
use crate::transport::Transport;
use crate::view;

/// Turn a controller notice into a command failure.
fn check(inbox: &mut Inbox) -> Result<()> {
    match inbox.error.take() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Enter the workspace and remember it for the next invocation.
async fn open_inbox<T: Transport>(
    ctx: &mut Context<T>,
    org: Option<i64>,
    tone: DraftTone,
) -> Result<Inbox> {
    let org_id = ctx.resolve_org(org)?;
    let mut inbox = Inbox::new(org_id, tone);
    inbox.enter(&mut ctx.api, org_id).await;
    ctx.persist()?;
    check(&mut inbox)?;
    ctx.db.set_current_org(&ctx.api_base, org_id)?;
    Ok(inbox)
}

/// Enter the workspace and select `id`, failing if its detail cannot load.
async fn open_ticket<T: Transport>(
    ctx: &mut Context<T>,
    org: Option<i64>,
    id: i64,
    tone: DraftTone,
) -> Result<Inbox> {
    let mut inbox = open_inbox(ctx, org, tone).await?;
    if inbox.selected_id() != Some(id) || inbox.detail().is_none() {
        inbox.select(&mut ctx.api, id).await;
        ctx.persist()?;
        check(&mut inbox)?;
    }
    Ok(inbox)
}

pub async fn list<T: Transport>(ctx: &mut Context<T>, org: Option<i64>) -> Result<()> {
    let tone = ctx.tone;
    let inbox = open_inbox(ctx, org, tone).await?;
    print!("{}", view::ticket_list(&inbox.tickets, None));
    Ok(())
}

pub async fn create<T: Transport>(
    ctx: &mut Context<T>,
    org: Option<i64>,
    subject: &str,
    priority: &str,
) -> Result<()> {
    let priority: Priority = priority.parse()?;
    if subject.trim().is_empty() {
        bail!("Subject cannot be empty");
    }

    let tone = ctx.tone;
    let mut inbox = open_inbox(ctx, org, tone).await?;
    inbox.form.subject = subject.to_string();
    inbox.form.priority = priority;
    inbox.create_ticket(&mut ctx.api).await;
    ctx.persist()?;
    check(&mut inbox)?;

    match inbox.detail() {
        Some(detail) => {
            println!("Created ticket #{}", detail.ticket.id);
            print!("{}", view::ticket_detail(detail));
        }
        None => println!("Created ticket"),
    }
    Ok(())
}

pub async fn show<T: Transport>(ctx: &mut Context<T>, org: Option<i64>, id: i64) -> Result<()> {
    let tone = ctx.tone;
    let inbox = open_ticket(ctx, org, id, tone).await?;
    if let Some(detail) = inbox.detail() {
        print!("{}", view::ticket_detail(detail));
    }
    Ok(())
}

pub async fn reply<T: Transport>(
    ctx: &mut Context<T>,
    org: Option<i64>,
    id: i64,
    body: &str,
) -> Result<()> {
    if body.trim().is_empty() {
        bail!("Message cannot be empty");
    }

    let tone = ctx.tone;
    let mut inbox = open_ticket(ctx, org, id, tone).await?;
    inbox.compose = body.to_string();
    inbox.send_message(&mut ctx.api).await;
    ctx.persist()?;
    check(&mut inbox)?;

    println!("Sent message on ticket #{}", id);
    if let Some(detail) = inbox.detail() {
        print!("{}", view::ticket_detail(detail));
    }
    Ok(())
}

pub async fn toggle<T: Transport>(ctx: &mut Context<T>, org: Option<i64>, id: i64) -> Result<()> {
    let tone = ctx.tone;
    let mut inbox = open_ticket(ctx, org, id, tone).await?;
    inbox.toggle_status(&mut ctx.api).await;
    ctx.persist()?;
    check(&mut inbox)?;

    if let Some(detail) = inbox.detail() {
        println!("Ticket #{} is now {}", detail.ticket.id, detail.ticket.status);
    }
    Ok(())
}

pub async fn draft<T: Transport>(
    ctx: &mut Context<T>,
    org: Option<i64>,
    id: i64,
    tone: Option<&str>,
    send: bool,
) -> Result<()> {
    let tone = match tone {
        Some(t) => t.parse::<DraftTone>()?,
        None => ctx.tone,
    };

    let mut inbox = open_ticket(ctx, org, id, tone).await?;
    inbox.request_draft(&mut ctx.api).await;
    ctx.persist()?;
    check(&mut inbox)?;

    let Some(text) = inbox.draft.clone() else {
        bail!("No draft returned for ticket #{}", id);
    };
    println!("AI Draft:");
    for line in text.lines() {
        println!("  {}", line);
    }

    if send {
        inbox.use_draft();
        inbox.send_message(&mut ctx.api).await;
        ctx.persist()?;
        check(&mut inbox)?;
        println!("Sent draft on ticket #{}", id);
    }
    Ok(())
}
