//! Workspace (org) list controller.

use tracing::{info, warn};

use crate::error::HttpError;
use crate::models::Workspace;
use crate::session::{self, Navigation};
use crate::transport::{Api, Transport};

#[derive(Debug, Default)]
pub struct WorkspaceList {
    pub workspaces: Vec<Workspace>,
    /// Pending name in the create box.
    pub name: String,
    pub loading: bool,
    pub error: Option<HttpError>,
}

impl WorkspaceList {
    pub fn new() -> Self {
        WorkspaceList {
            loading: true,
            ..Self::default()
        }
    }

    pub fn notice(&self) -> Option<String> {
        self.error.as_ref().map(|e| format!("Error: {}", e))
    }

    /// Run the session gate, then load. A rejected probe yields `Login`.
    pub async fn enter<T: Transport>(&mut self, api: &mut Api<T>) -> Navigation {
        self.loading = true;
        self.error = None;
        let nav = session::gate(api).await;
        if nav == Navigation::Stay {
            if let Err(e) = self.list(api).await {
                self.error = Some(e);
            }
        }
        self.loading = false;
        nav
    }

    pub async fn list<T: Transport>(&mut self, api: &mut Api<T>) -> Result<&[Workspace], HttpError> {
        self.workspaces = api.list_workspaces().await?;
        Ok(&self.workspaces)
    }

    /// Create from the pending name, then reload the whole list.
    ///
    /// A blank name is ignored without a request and yields `None`.
    pub async fn create<T: Transport>(
        &mut self,
        api: &mut Api<T>,
    ) -> Result<Option<Workspace>, HttpError> {
        let name = self.name.clone();
        if name.trim().is_empty() {
            return Ok(None);
        }

        let created = api.create_workspace(&name).await?;
        info!(org_id = created.id, "workspace created");
        self.name.clear();
        self.list(api).await?;
        Ok(Some(created))
    }

    pub async fn logout<T: Transport>(&mut self, api: &mut Api<T>) -> Navigation {
        if let Err(e) = api.logout().await {
            warn!(error = %e, "logout request failed");
        }
        self.workspaces.clear();
        Navigation::Login
    }

    pub fn open(&self, org_id: i64) -> Navigation {
        Navigation::Inbox(org_id)
    }
}
