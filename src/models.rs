use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const VALID_PRIORITIES: [&str; 3] = ["low", "medium", "high"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Pending,
    Closed,
}

impl TicketStatus {
    /// Open tickets close; everything else reopens.
    pub fn toggled(self) -> Self {
        match self {
            TicketStatus::Open => TicketStatus::Closed,
            TicketStatus::Pending | TicketStatus::Closed => TicketStatus::Open,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Pending => "pending",
            TicketStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => bail!(
                "Invalid priority '{}'. Must be one of: {}",
                other,
                VALID_PRIORITIES.join(", ")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub org_id: i64,
    pub subject: String,
    pub status: TicketStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Who wrote a message. The server may grow new roles, so unknown values are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthorType {
    User,
    Agent,
    Ai,
    Other(String),
}

impl AuthorType {
    pub fn as_str(&self) -> &str {
        match self {
            AuthorType::User => "user",
            AuthorType::Agent => "agent",
            AuthorType::Ai => "ai",
            AuthorType::Other(s) => s,
        }
    }
}

impl From<String> for AuthorType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "user" => AuthorType::User,
            "agent" => AuthorType::Agent,
            "ai" => AuthorType::Ai,
            _ => AuthorType::Other(s),
        }
    }
}

impl From<AuthorType> for String {
    fn from(a: AuthorType) -> Self {
        a.as_str().to_string()
    }
}

impl fmt::Display for AuthorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub ticket_id: i64,
    pub author_type: AuthorType,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Me {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftTone {
    #[default]
    Friendly,
    Professional,
    Short,
}

impl DraftTone {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftTone::Friendly => "friendly",
            DraftTone::Professional => "professional",
            DraftTone::Short => "short",
        }
    }
}

impl FromStr for DraftTone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "friendly" => Ok(DraftTone::Friendly),
            "professional" => Ok(DraftTone::Professional),
            "short" => Ok(DraftTone::Short),
            other => bail!(
                "Invalid tone '{}'. Must be one of: friendly, professional, short",
                other
            ),
        }
    }
}

/// `{items: [...]}` envelope used by the list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftReply {
    pub draft: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewWorkspace<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTicket<'a> {
    pub org_id: i64,
    pub subject: &'a str,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessage<'a> {
    pub author_type: AuthorType,
    pub body: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftRequest {
    pub ticket_id: i64,
    pub tone: DraftTone,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ticket_decodes_without_timestamps() {
        let ticket: Ticket = serde_json::from_str(
            r#"{"id":7,"org_id":3,"subject":"Printer broken","status":"open","priority":"high"}"#,
        )
        .unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, Priority::High);
        assert!(ticket.created_at.is_none());
    }

    #[test]
    fn test_ticket_decodes_timestamps() {
        let ticket: Ticket = serde_json::from_str(
            r#"{"id":1,"org_id":1,"subject":"x","status":"closed","priority":"low",
                "created_at":"2026-01-02T03:04:05Z","updated_at":"2026-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert_eq!(
            ticket.created_at.unwrap().format("%Y-%m-%d").to_string(),
            "2026-01-02"
        );
    }

    #[test]
    fn test_unknown_priority_is_rejected() {
        let result: std::result::Result<Ticket, _> = serde_json::from_str(
            r#"{"id":1,"org_id":1,"subject":"x","status":"open","priority":"critical"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_author_type_keeps_unknown_roles() {
        let msg: Message =
            serde_json::from_str(r#"{"id":1,"ticket_id":2,"author_type":"system","body":"hi"}"#)
                .unwrap();
        assert_eq!(msg.author_type, AuthorType::Other("system".to_string()));
        assert_eq!(
            serde_json::to_value(&msg).unwrap()["author_type"],
            serde_json::json!("system")
        );
    }

    #[test]
    fn test_new_message_body_shape() {
        let body = serde_json::to_value(NewMessage {
            author_type: AuthorType::User,
            body: "hello",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"author_type": "user", "body": "hello"}));
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert!(err.to_string().contains("low, medium, high"));
    }

    #[test]
    fn test_pending_toggles_to_open() {
        assert_eq!(TicketStatus::Pending.toggled(), TicketStatus::Open);
    }

    fn any_status() -> impl Strategy<Value = TicketStatus> {
        prop_oneof![
            Just(TicketStatus::Open),
            Just(TicketStatus::Closed),
        ]
    }

    proptest! {
        #[test]
        fn prop_toggle_twice_is_identity(status in any_status()) {
            prop_assert_eq!(status.toggled().toggled(), status);
        }

        #[test]
        fn prop_toggle_always_changes(status in any_status()) {
            prop_assert_ne!(status.toggled(), status);
        }
    }
}
