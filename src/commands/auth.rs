use anyhow::{bail, Result};
use std::io::{self, BufRead, Write};
use tracing::warn;

use super::Context;
use crate::session::{AuthAction, LoginForm, Navigation};
use crate::transport::Transport;

pub const NOT_LOGGED_IN: &str = "Not logged in. Run 'ticketdesk login' first.";

pub async fn run<T: Transport>(
    ctx: &mut Context<T>,
    email: &str,
    password: &str,
    action: AuthAction,
) -> Result<()> {
    let mut form = LoginForm {
        email: email.to_string(),
        password: password.to_string(),
        ..LoginForm::default()
    };
    let nav = form.submit(&mut ctx.api, action).await;
    ctx.persist()?;

    if nav == Navigation::Workspaces {
        println!("{} as {}", form.notice().unwrap_or_default(), form.email.trim());
        return Ok(());
    }
    match form.error {
        Some(e) => Err(e.into()),
        None => bail!("Email and password are required"),
    }
}

/// Read a password from `input` after printing a prompt.
pub fn read_password<R: BufRead>(input: &mut R) -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn logout<T: Transport>(ctx: &mut Context<T>) -> Result<()> {
    if let Err(e) = ctx.api.logout().await {
        warn!(error = %e, "server logout failed, dropping local session anyway");
    }
    ctx.persist()?;
    ctx.db.clear_current_org(&ctx.api_base)?;
    println!("Logged out");
    Ok(())
}

pub async fn whoami<T: Transport>(ctx: &mut Context<T>) -> Result<()> {
    let result = ctx.api.me().await;
    ctx.persist()?;
    match result {
        Ok(me) => {
            println!("{} (user #{})", me.email, me.id);
            Ok(())
        }
        Err(e) if e.is_unauthorized() => bail!(NOT_LOGGED_IN),
        Err(e) => Err(e.into()),
    }
}

pub async fn refresh<T: Transport>(ctx: &mut Context<T>) -> Result<()> {
    let result = ctx.api.refresh().await;
    ctx.persist()?;
    match result {
        Ok(()) => {
            println!("Session refreshed");
            Ok(())
        }
        Err(e) if e.is_unauthorized() => bail!(NOT_LOGGED_IN),
        Err(e) => Err(e.into()),
    }
}
