use anyhow::{bail, Result};

use super::auth::NOT_LOGGED_IN;
use super::Context;
use crate::session::Navigation;
use crate::transport::Transport;
use crate::view;
use crate::workspaces::WorkspaceList;

/// Enter the workspace list the way the shell does: probe first, then load.
async fn enter<T: Transport>(ctx: &mut Context<T>) -> Result<WorkspaceList> {
    let mut list = WorkspaceList::new();
    let nav = list.enter(&mut ctx.api).await;
    ctx.persist()?;

    if nav == Navigation::Login {
        bail!(NOT_LOGGED_IN);
    }
    if let Some(e) = list.error.take() {
        return Err(e.into());
    }
    Ok(list)
}

pub async fn list<T: Transport>(ctx: &mut Context<T>) -> Result<()> {
    let list = enter(ctx).await?;
    print!("{}", view::workspace_list(&list.workspaces));
    Ok(())
}

pub async fn create<T: Transport>(ctx: &mut Context<T>, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Workspace name cannot be empty");
    }

    let mut list = enter(ctx).await?;
    list.name = name.to_string();
    let result = list.create(&mut ctx.api).await;
    ctx.persist()?;

    if let Some(workspace) = result? {
        ctx.db.set_current_org(&ctx.api_base, workspace.id)?;
        println!("Created workspace #{}: {}", workspace.id, workspace.name);
    }
    Ok(())
}
