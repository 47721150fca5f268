use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::transport::Session;

const SCHEMA_VERSION: i32 = 1;

/// Local state kept between invocations: the session cookies and the last
/// workspace entered, both keyed by API base URL.
pub struct Database {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContext {
    pub org_id: i64,
    pub updated_at: DateTime<Utc>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }
        }
        let conn = Connection::open(path).context("Failed to open database")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap_or(0);

        if version < SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                -- Session cookies, one jar per API base
                CREATE TABLE IF NOT EXISTS credentials (
                    api_base TEXT PRIMARY KEY,
                    cookie_header TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                -- Last workspace entered
                CREATE TABLE IF NOT EXISTS context (
                    api_base TEXT PRIMARY KEY,
                    org_id INTEGER NOT NULL,
                    updated_at TEXT NOT NULL
                );
                "#,
            )?;

            self.conn
                .execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
        }

        Ok(())
    }

    // Credentials
    pub fn load_session(&self, api_base: &str) -> Result<Session> {
        let header: Option<String> = self
            .conn
            .query_row(
                "SELECT cookie_header FROM credentials WHERE api_base = ?1",
                [api_base],
                |row| row.get(0),
            )
            .optional()?;

        Ok(header
            .map(|h| Session::from_cookie_header(&h))
            .unwrap_or_default())
    }

    /// Persist the jar; an empty session deletes the row.
    pub fn save_session(&self, api_base: &str, session: &Session) -> Result<()> {
        match session.cookie_header() {
            Some(header) => {
                let now = Utc::now().to_rfc3339();
                self.conn.execute(
                    "INSERT INTO credentials (api_base, cookie_header, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(api_base) DO UPDATE SET cookie_header = excluded.cookie_header, updated_at = excluded.updated_at",
                    params![api_base, header, now],
                )?;
            }
            None => {
                self.conn
                    .execute("DELETE FROM credentials WHERE api_base = ?1", [api_base])?;
            }
        }
        Ok(())
    }

    // Context
    pub fn set_current_org(&self, api_base: &str, org_id: i64) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO context (api_base, org_id, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(api_base) DO UPDATE SET org_id = excluded.org_id, updated_at = excluded.updated_at",
            params![api_base, org_id, now],
        )?;
        Ok(())
    }

    pub fn current_org(&self, api_base: &str) -> Result<Option<StoredContext>> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT org_id, updated_at FROM context WHERE api_base = ?1",
                [api_base],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(row.map(|(org_id, updated_at)| StoredContext {
            org_id,
            updated_at: parse_datetime(updated_at),
        }))
    }

    pub fn clear_current_org(&self, api_base: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM context WHERE api_base = ?1", [api_base])?;
        Ok(rows > 0)
    }
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
