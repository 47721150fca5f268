use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::io;
use tracing_subscriber::EnvFilter;

use ticketdesk::commands::{self, Context};
use ticketdesk::config::{Config, LogFormat};
use ticketdesk::session::AuthAction;

#[derive(Parser)]
#[command(name = "ticketdesk")]
#[command(about = "Support-ticket inbox client with AI draft replies")]
#[command(version)]
struct Cli {
    /// API base URL (overrides TICKETDESK_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,
        /// Prompted on stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account and log in
    Signup {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: Option<String>,
    },

    /// End the session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Session commands
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },

    /// Workspace commands
    Orgs {
        #[command(subcommand)]
        action: OrgCommands,
    },

    /// Ticket commands
    Tickets {
        #[command(subcommand)]
        action: TicketCommands,
    },

    /// Interactive shell over the login, workspace and inbox views
    Shell {
        /// Open this workspace's inbox directly
        #[arg(long)]
        org: Option<i64>,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Rotate the session cookies
    Refresh,
}

#[derive(Subcommand)]
enum OrgCommands {
    /// List your workspaces
    List,
    /// Create a workspace
    Create {
        /// Workspace name
        name: String,
    },
}

#[derive(Subcommand)]
enum TicketCommands {
    /// List tickets in a workspace
    List {
        /// Workspace ID (defaults to the last one used)
        #[arg(long)]
        org: Option<i64>,
    },

    /// Create a ticket
    Create {
        /// Ticket subject
        subject: String,
        /// Priority (low, medium, high)
        #[arg(short, long, default_value = "medium")]
        priority: String,
        #[arg(long)]
        org: Option<i64>,
    },

    /// Show a ticket and its messages
    Show {
        /// Ticket ID
        id: i64,
        #[arg(long)]
        org: Option<i64>,
    },

    /// Post a message to a ticket
    Reply {
        /// Ticket ID
        id: i64,
        /// Message text
        body: String,
        #[arg(long)]
        org: Option<i64>,
    },

    /// Close an open ticket or reopen a closed one
    Toggle {
        /// Ticket ID
        id: i64,
        #[arg(long)]
        org: Option<i64>,
    },

    /// Ask for an AI draft reply
    Draft {
        /// Ticket ID
        id: i64,
        /// Tone (friendly, professional, short)
        #[arg(short, long)]
        tone: Option<String>,
        /// Send the draft as a message
        #[arg(long)]
        send: bool,
        #[arg(long)]
        org: Option<i64>,
    },
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => commands::auth::read_password(&mut io::stdin().lock()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?.with_api_base(cli.api_base.as_deref())?;
    init_logging(config.log_format);
    let mut ctx = Context::open(&config).context("Failed to start client")?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            commands::auth::run(&mut ctx, &email, &password, AuthAction::Login).await
        }

        Commands::Signup { email, password } => {
            let password = password_or_prompt(password)?;
            commands::auth::run(&mut ctx, &email, &password, AuthAction::Signup).await
        }

        Commands::Logout => commands::auth::logout(&mut ctx).await,

        Commands::Whoami => commands::auth::whoami(&mut ctx).await,

        Commands::Auth { action } => match action {
            AuthCommands::Refresh => commands::auth::refresh(&mut ctx).await,
        },

        Commands::Orgs { action } => match action {
            OrgCommands::List => commands::orgs::list(&mut ctx).await,
            OrgCommands::Create { name } => commands::orgs::create(&mut ctx, &name).await,
        },

        Commands::Tickets { action } => match action {
            TicketCommands::List { org } => commands::tickets::list(&mut ctx, org).await,
            TicketCommands::Create {
                subject,
                priority,
                org,
            } => commands::tickets::create(&mut ctx, org, &subject, &priority).await,
            TicketCommands::Show { id, org } => commands::tickets::show(&mut ctx, org, id).await,
            TicketCommands::Reply { id, body, org } => {
                commands::tickets::reply(&mut ctx, org, id, &body).await
            }
            TicketCommands::Toggle { id, org } => {
                commands::tickets::toggle(&mut ctx, org, id).await
            }
            TicketCommands::Draft {
                id,
                tone,
                send,
                org,
            } => commands::tickets::draft(&mut ctx, org, id, tone.as_deref(), send).await,
        },

        Commands::Shell { org } => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = io::stdout();
            commands::shell::run(&mut ctx, org, stdin, &mut stdout).await
        }
    }
}
