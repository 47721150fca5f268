//! Ticket workspace controller.
//!
//! One instance drives the inbox of a single workspace at a time:
//! ticket list, the selected ticket's detail, message composition, the AI
//! draft and status toggling. Every mutation reloads from the server rather
//! than patching local state.
//!
//! Detail fetches are tagged with a generation number. A response for a
//! request that is no longer current is dropped, so a slow fetch for a
//! previously selected ticket can never overwrite a newer selection.

use tracing::debug;

use crate::error::HttpError;
use crate::models::{AuthorType, DraftTone, Priority, Ticket, TicketDetail};
use crate::transport::{Api, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    NoSelection,
    Loading { ticket_id: i64 },
    /// The detail fetch failed; the ticket stays highlighted without detail.
    Failed { ticket_id: i64 },
    Selected(TicketDetail),
}

impl Selection {
    pub fn ticket_id(&self) -> Option<i64> {
        match self {
            Selection::NoSelection => None,
            Selection::Loading { ticket_id } | Selection::Failed { ticket_id } => Some(*ticket_id),
            Selection::Selected(detail) => Some(detail.ticket.id),
        }
    }
}

/// Handle for one in-flight detail fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRequest {
    pub ticket_id: i64,
    generation: u64,
}

/// Handle for one in-flight draft request. Any later selection or detail
/// reload makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDraft {
    pub ticket_id: i64,
    generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub subject: String,
    pub priority: Priority,
}

#[derive(Debug)]
pub struct Inbox {
    org_id: i64,
    tone: DraftTone,
    pub tickets: Vec<Ticket>,
    selection: Selection,
    generation: u64,
    pub compose: String,
    pub draft: Option<String>,
    draft_loading: bool,
    pub form: CreateForm,
    pub error: Option<HttpError>,
}

impl Inbox {
    pub fn new(org_id: i64, tone: DraftTone) -> Self {
        Inbox {
            org_id,
            tone,
            tickets: Vec::new(),
            selection: Selection::NoSelection,
            generation: 0,
            compose: String::new(),
            draft: None,
            draft_loading: false,
            form: CreateForm::default(),
            error: None,
        }
    }

    pub fn org_id(&self) -> i64 {
        self.org_id
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selection.ticket_id()
    }

    /// True between [`begin_draft`](Self::begin_draft) and its finish.
    pub fn draft_loading(&self) -> bool {
        self.draft_loading
    }

    pub fn detail(&self) -> Option<&TicketDetail> {
        match &self.selection {
            Selection::Selected(detail) => Some(detail),
            _ => None,
        }
    }

    /// Display string for the message area.
    pub fn notice(&self) -> Option<String> {
        self.error.as_ref().map(|e| format!("Error: {}", e))
    }

    /// Enter (or switch to) a workspace: drop everything tied to the
    /// previous one, load its tickets, and auto-select the first.
    pub async fn enter<T: Transport>(&mut self, api: &mut Api<T>, org_id: i64) {
        debug!(org_id, "entering workspace");
        self.org_id = org_id;
        self.tickets.clear();
        self.selection = Selection::NoSelection;
        // invalidates any detail fetch still pending for the old workspace
        self.generation += 1;
        self.compose.clear();
        self.draft = None;
        self.draft_loading = false;
        self.form = CreateForm::default();
        self.error = None;

        if let Err(e) = self.load_tickets(api, true).await {
            self.error = Some(e);
        }
    }

    /// Manual refresh of the ticket list; keeps the current selection.
    pub async fn refresh_tickets<T: Transport>(&mut self, api: &mut Api<T>) {
        self.error = None;
        if let Err(e) = self.load_tickets(api, true).await {
            self.error = Some(e);
        }
    }

    /// List order is whatever the server returns.
    async fn load_tickets<T: Transport>(
        &mut self,
        api: &mut Api<T>,
        auto_select: bool,
    ) -> Result<(), HttpError> {
        self.tickets = api.list_tickets(self.org_id).await?;
        debug!(org_id = self.org_id, count = self.tickets.len(), "tickets loaded");

        if auto_select && self.selection == Selection::NoSelection {
            let first_id = self.tickets.first().map(|t| t.id);
            if let Some(id) = first_id {
                self.select(api, id).await;
            }
        }
        Ok(())
    }

    /// Select a ticket and load its detail.
    pub async fn select<T: Transport>(&mut self, api: &mut Api<T>, ticket_id: i64) {
        let request = self.begin_select(ticket_id);
        let result = api.ticket_detail(ticket_id).await;
        self.finish_select(request, result);
    }

    /// First half of [`select`](Self::select): clears the draft and compose
    /// box and moves to `Loading`. The returned handle must be passed to
    /// [`finish_select`](Self::finish_select) with the fetch result.
    pub fn begin_select(&mut self, ticket_id: i64) -> DetailRequest {
        self.generation += 1;
        self.draft = None;
        self.draft_loading = false;
        self.compose.clear();
        self.selection = Selection::Loading { ticket_id };
        debug!(ticket_id, generation = self.generation, "selecting ticket");
        DetailRequest {
            ticket_id,
            generation: self.generation,
        }
    }

    /// Apply a detail fetch result. Returns false if the request was stale
    /// and the result was discarded.
    pub fn finish_select(
        &mut self,
        request: DetailRequest,
        result: Result<TicketDetail, HttpError>,
    ) -> bool {
        if request.generation != self.generation {
            debug!(
                ticket_id = request.ticket_id,
                generation = request.generation,
                current = self.generation,
                "discarding stale ticket detail"
            );
            return false;
        }

        match result {
            Ok(detail) => {
                self.draft = None;
                self.compose.clear();
                self.selection = Selection::Selected(detail);
            }
            Err(e) => {
                if matches!(self.selection, Selection::Loading { .. }) {
                    self.selection = Selection::Failed {
                        ticket_id: request.ticket_id,
                    };
                }
                self.error = Some(e);
            }
        }
        true
    }

    /// Re-fetch the current ticket without leaving `Selected` while in flight.
    async fn reload_detail<T: Transport>(&mut self, api: &mut Api<T>, ticket_id: i64) {
        self.generation += 1;
        self.draft_loading = false;
        let request = DetailRequest {
            ticket_id,
            generation: self.generation,
        };
        let result = api.ticket_detail(ticket_id).await;
        self.finish_select(request, result);
    }

    /// Create a ticket from the form, reload the list and select it.
    pub async fn create_ticket<T: Transport>(&mut self, api: &mut Api<T>) {
        let subject = self.form.subject.clone();
        if subject.trim().is_empty() {
            return;
        }
        self.error = None;

        let result = api
            .create_ticket(self.org_id, &subject, self.form.priority)
            .await;
        let created = match result {
            Ok(ticket) => ticket,
            Err(e) => {
                self.error = Some(e);
                return;
            }
        };
        debug!(ticket_id = created.id, status = %created.status, "ticket created");

        self.form = CreateForm::default();
        if let Err(e) = self.load_tickets(api, false).await {
            self.error = Some(e);
            return;
        }
        self.select(api, created.id).await;
    }

    /// Post the compose box to the selected ticket, then reload its detail.
    pub async fn send_message<T: Transport>(&mut self, api: &mut Api<T>) {
        let Some(ticket_id) = self.detail().map(|d| d.ticket.id) else {
            return;
        };
        if self.compose.trim().is_empty() {
            return;
        }
        self.error = None;

        let result = api
            .post_message(ticket_id, AuthorType::User, &self.compose)
            .await;
        match result {
            Ok(message) => {
                debug!(ticket_id, message_id = message.id, "message sent");
                self.reload_detail(api, ticket_id).await;
            }
            Err(e) => self.error = Some(e),
        }
    }

    /// Ask the server for a suggested reply. Ignored while a request is
    /// already running; a failure keeps any previous draft.
    pub async fn request_draft<T: Transport>(&mut self, api: &mut Api<T>) {
        let Some(pending) = self.begin_draft() else {
            return;
        };
        let result = api.draft_reply(pending.ticket_id, self.tone).await;
        self.finish_draft(pending, result);
    }

    /// First half of [`request_draft`](Self::request_draft): raises the busy
    /// flag. Returns `None` without a loaded detail or while a draft is
    /// already in flight.
    pub fn begin_draft(&mut self) -> Option<PendingDraft> {
        let ticket_id = self.detail().map(|d| d.ticket.id)?;
        if self.draft_loading {
            debug!(ticket_id, "draft request already in flight");
            return None;
        }

        self.draft_loading = true;
        self.error = None;
        Some(PendingDraft {
            ticket_id,
            generation: self.generation,
        })
    }

    /// Apply a draft result. Returns false if the selection moved on since
    /// the request began and the result was discarded.
    pub fn finish_draft(&mut self, pending: PendingDraft, result: Result<String, HttpError>) -> bool {
        if pending.generation != self.generation {
            debug!(ticket_id = pending.ticket_id, "discarding draft for deselected ticket");
            return false;
        }

        self.draft_loading = false;
        match result {
            Ok(draft) => self.draft = Some(draft),
            Err(e) => self.error = Some(e),
        }
        true
    }

    /// Flip open/closed on the server and take its answer as the new state.
    pub async fn toggle_status<T: Transport>(&mut self, api: &mut Api<T>) {
        let Some(ticket) = self.detail().map(|d| d.ticket.clone()) else {
            return;
        };
        self.error = None;

        let next = ticket.status.toggled();
        let updated = match api.set_status(ticket.id, next).await {
            Ok(updated) => updated,
            Err(e) => {
                self.error = Some(e);
                return;
            }
        };
        debug!(ticket_id = ticket.id, requested = %next, returned = %updated.status, "status updated");

        if let Selection::Selected(detail) = &mut self.selection {
            if detail.ticket.id == updated.id {
                detail.ticket = updated;
            }
        }

        if let Err(e) = self.load_tickets(api, true).await {
            self.error = Some(e);
        }
    }

    /// Copy the draft into the compose box. Local only.
    pub fn use_draft(&mut self) {
        if let Some(draft) = &self.draft {
            self.compose = draft.clone();
        }
    }

    /// Local edit of the draft text; never sent on its own.
    pub fn edit_draft(&mut self, text: &str) {
        if self.draft.is_some() {
            self.draft = Some(text.to_string());
        }
    }
}
