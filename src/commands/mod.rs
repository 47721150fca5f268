pub mod auth;
pub mod orgs;
pub mod shell;
pub mod tickets;

use anyhow::{bail, Context as _, Result};
use tracing::debug;

use crate::config::Config;
use crate::db::Database;
use crate::models::DraftTone;
use crate::transport::{Api, HttpTransport, Transport};

/// Everything a command needs: the API client, the local store and the
/// settings it was started with.
pub struct Context<T> {
    pub api: Api<T>,
    pub db: Database,
    pub api_base: String,
    pub tone: DraftTone,
}

impl Context<HttpTransport> {
    /// Open the local store and resume the stored session for `config.api_base`.
    pub fn open(config: &Config) -> Result<Self> {
        let db = Database::open(&config.db_path()).context("Failed to open local store")?;
        let session = db.load_session(&config.api_base)?;
        let transport = HttpTransport::new(&config.api_base, config.timeout)?;
        debug!(api_base = transport.base(), resumed = !session.is_empty(), "client ready");
        Ok(Context::new(
            Api::new(transport, session),
            db,
            &config.api_base,
            config.draft_tone,
        ))
    }
}

impl<T: Transport> Context<T> {
    pub fn new(api: Api<T>, db: Database, api_base: &str, tone: DraftTone) -> Self {
        Context {
            api,
            db,
            api_base: api_base.to_string(),
            tone,
        }
    }

    /// Write the session back if any response touched its cookies.
    pub fn persist(&mut self) -> Result<()> {
        if self.api.take_session_changed() {
            self.db.save_session(&self.api_base, self.api.session())?;
        }
        Ok(())
    }

    /// `--org` wins, then the last workspace entered against this API base.
    pub fn resolve_org(&self, org: Option<i64>) -> Result<i64> {
        if let Some(id) = org {
            return Ok(id);
        }
        match self.db.current_org(&self.api_base)? {
            Some(stored) => {
                debug!(org_id = stored.org_id, since = %stored.updated_at, "using last workspace");
                Ok(stored.org_id)
            }
            None => bail!("No workspace selected. Pass --org <id>."),
        }
    }
}
