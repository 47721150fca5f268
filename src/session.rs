//! Session gate and the login view.

use tracing::{debug, info};

use crate::error::HttpError;
use crate::models::Me;
use crate::transport::{Api, Transport};

/// Where a controller wants the user to go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Login,
    Workspaces,
    Inbox(i64),
}

/// Probe `/auth/me` on entry to the workspace list.
///
/// Any failure redirects to login without surfacing an error. There is no
/// cached auth state; every entry probes again.
pub async fn gate<T: Transport>(api: &mut Api<T>) -> Navigation {
    match api.me().await {
        Ok(me) => {
            debug!(user_id = me.id, "session probe accepted");
            Navigation::Stay
        }
        Err(e) => {
            debug!(error = %e, "session probe rejected, redirecting to login");
            Navigation::Login
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Signup,
}

impl AuthAction {
    fn success_notice(self) -> &'static str {
        match self {
            AuthAction::Login => "Logged in",
            AuthAction::Signup => "Account created",
        }
    }
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub busy: bool,
    pub message: Option<String>,
    pub error: Option<HttpError>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(&self) -> Option<String> {
        match &self.error {
            Some(e) => Some(format!("Error: {}", e)),
            None => self.message.clone(),
        }
    }

    /// An already-valid session skips the login view.
    pub async fn enter<T: Transport>(&mut self, api: &mut Api<T>) -> Navigation {
        match api.me().await {
            Ok(_) => Navigation::Workspaces,
            Err(_) => Navigation::Stay,
        }
    }

    pub async fn submit<T: Transport>(&mut self, api: &mut Api<T>, action: AuthAction) -> Navigation {
        if !self.begin_submit() {
            return Navigation::Stay;
        }

        let result = match action {
            AuthAction::Login => api.login(&self.email, &self.password).await,
            AuthAction::Signup => api.signup(&self.email, &self.password).await,
        };
        self.finish_submit(action, result)
    }

    /// Raise the busy flag. Returns false for blank fields or while a
    /// submit is already running.
    pub fn begin_submit(&mut self) -> bool {
        if self.busy || self.email.trim().is_empty() || self.password.is_empty() {
            return false;
        }

        self.busy = true;
        self.message = None;
        self.error = None;
        true
    }

    pub fn finish_submit(&mut self, action: AuthAction, result: Result<Me, HttpError>) -> Navigation {
        self.busy = false;
        match result {
            Ok(me) => {
                info!(user_id = me.id, ?action, "authenticated");
                self.message = Some(action.success_notice().to_string());
                Navigation::Workspaces
            }
            Err(e) => {
                self.error = Some(e);
                Navigation::Stay
            }
        }
    }
}
