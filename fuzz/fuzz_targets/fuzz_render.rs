#![no_main]

//! Fuzz target for error normalization and plain-text rendering.
//!
//! Error bodies and ticket text come straight from the server. Neither
//! message extraction nor truncation may panic on arbitrary Unicode.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use ticketdesk::error::HttpError;
use ticketdesk::models::{AuthorType, Message, Priority, Ticket, TicketDetail, TicketStatus};
use ticketdesk::view;

#[derive(Arbitrary, Debug)]
struct RenderInput {
    status: u16,
    error_body: String,
    subject: String,
    author: String,
    body: String,
    width: u8,
}

fuzz_target!(|input: RenderInput| {
    let err = HttpError::from_response(input.status, &input.error_body);
    assert!(!err.to_string().is_empty());

    let _ = view::truncate(&input.subject, input.width as usize);

    let ticket = Ticket {
        id: 1,
        org_id: 1,
        subject: input.subject,
        status: TicketStatus::Open,
        priority: Priority::Medium,
        created_at: None,
        updated_at: None,
    };
    let _ = view::ticket_row(&ticket, true);

    let detail = TicketDetail {
        ticket,
        messages: vec![Message {
            id: 1,
            ticket_id: 1,
            author_type: AuthorType::from(input.author),
            body: input.body,
        }],
    };
    let _ = view::ticket_detail(&detail);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&input.error_body) {
        let _ = serde_json::from_value::<TicketDetail>(value);
    }
});
