//! The only I/O boundary of the client.
//!
//! Controllers never talk to the network directly. They go through [`Api`],
//! which owns a [`Transport`] and the [`Session`] credential context that is
//! attached to every call.

mod http;
mod session;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpTransport;
pub use session::Session;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::HttpError;
use crate::models::{
    AuthorType, Credentials, DraftReply, DraftRequest, DraftTone, Items, Me, Message, NewMessage,
    NewTicket, NewWorkspace, Priority, StatusUpdate, Ticket, TicketDetail, TicketStatus,
    Workspace,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }
}

/// A successful (2xx) exchange.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub body: Value,
    /// Raw `Set-Cookie` header values, in arrival order.
    pub set_cookies: Vec<String>,
}

#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Send one request. Non-2xx responses come back as `HttpError::Status`
    /// with the message already normalized.
    async fn send(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Reply, HttpError>;
}

/// Typed endpoints over a transport plus the session they run under.
pub struct Api<T> {
    transport: T,
    session: Session,
    session_changed: bool,
}

impl<T: Transport> Api<T> {
    pub fn new(transport: T, session: Session) -> Self {
        Api {
            transport,
            session,
            session_changed: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// True once any response has added, replaced or removed a cookie.
    #[cfg(test)]
    pub(crate) fn session_changed(&self) -> bool {
        self.session_changed
    }

    /// Report and reset the change flag, for callers that persist the session.
    pub fn take_session_changed(&mut self) -> bool {
        std::mem::take(&mut self.session_changed)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<R, HttpError> {
        let reply = self
            .transport
            .send(&self.session, method, path, body.as_ref())
            .await?;

        for header in &reply.set_cookies {
            if self.session.absorb(header) {
                self.session_changed = true;
            }
        }

        serde_json::from_value(reply.body).map_err(|e| {
            debug!(method = method.as_str(), path, error = %e, "response did not match schema");
            HttpError::Decode(e.to_string())
        })
    }

    /// Session liveness probe.
    pub async fn me(&mut self) -> Result<Me, HttpError> {
        self.call(Method::Get, "/auth/me", None).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Me, HttpError> {
        let body = encode(&Credentials { email, password })?;
        self.call(Method::Post, "/auth/login", Some(body)).await
    }

    pub async fn signup(&mut self, email: &str, password: &str) -> Result<Me, HttpError> {
        let body = encode(&Credentials { email, password })?;
        self.call(Method::Post, "/auth/signup", Some(body)).await
    }

    /// Invalidate the session server-side. The local credential is dropped
    /// even when the server call fails.
    pub async fn logout(&mut self) -> Result<(), HttpError> {
        let result: Result<Value, HttpError> = self.call(Method::Post, "/auth/logout", None).await;
        if !self.session.is_empty() {
            self.session.clear();
            self.session_changed = true;
        }
        result.map(|_| ())
    }

    /// Rotate the session cookies.
    pub async fn refresh(&mut self) -> Result<(), HttpError> {
        let _: Value = self.call(Method::Post, "/auth/refresh", None).await?;
        Ok(())
    }

    pub async fn list_workspaces(&mut self) -> Result<Vec<Workspace>, HttpError> {
        let items: Items<Workspace> = self.call(Method::Get, "/orgs", None).await?;
        Ok(items.items)
    }

    pub async fn create_workspace(&mut self, name: &str) -> Result<Workspace, HttpError> {
        let body = encode(&NewWorkspace { name })?;
        self.call(Method::Post, "/orgs", Some(body)).await
    }

    pub async fn list_tickets(&mut self, org_id: i64) -> Result<Vec<Ticket>, HttpError> {
        let path = format!("/tickets?org_id={}", org_id);
        let items: Items<Ticket> = self.call(Method::Get, &path, None).await?;
        Ok(items.items)
    }

    pub async fn create_ticket(
        &mut self,
        org_id: i64,
        subject: &str,
        priority: Priority,
    ) -> Result<Ticket, HttpError> {
        let body = encode(&NewTicket {
            org_id,
            subject,
            priority,
        })?;
        self.call(Method::Post, "/tickets", Some(body)).await
    }

    pub async fn ticket_detail(&mut self, ticket_id: i64) -> Result<TicketDetail, HttpError> {
        let path = format!("/tickets/{}", ticket_id);
        self.call(Method::Get, &path, None).await
    }

    pub async fn post_message(
        &mut self,
        ticket_id: i64,
        author_type: AuthorType,
        body: &str,
    ) -> Result<Message, HttpError> {
        let path = format!("/tickets/{}/messages", ticket_id);
        let payload = encode(&NewMessage { author_type, body })?;
        self.call(Method::Post, &path, Some(payload)).await
    }

    pub async fn set_status(
        &mut self,
        ticket_id: i64,
        status: TicketStatus,
    ) -> Result<Ticket, HttpError> {
        let path = format!("/tickets/{}/status", ticket_id);
        let body = encode(&StatusUpdate { status })?;
        self.call(Method::Patch, &path, Some(body)).await
    }

    pub async fn draft_reply(&mut self, ticket_id: i64, tone: DraftTone) -> Result<String, HttpError> {
        let body = encode(&DraftRequest { ticket_id, tone })?;
        let reply: DraftReply = self.call(Method::Post, "/ai/draft-reply", Some(body)).await?;
        Ok(reply.draft)
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Value, HttpError> {
    serde_json::to_value(body).map_err(|e| HttpError::Decode(format!("request body: {}", e)))
}
