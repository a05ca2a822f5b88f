pub mod client;
pub mod commands;
pub mod dashboard;
pub mod session;
pub mod store;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub use client::{ClientError, LoginReply, PortalClient, WhoamiReply};
pub use dashboard::{Dashboard, QuestionView, ShuffleMode};
pub use session::{Session, SessionManager, SessionState};
pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError};

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Portal CLI - interview practice and GRC project dashboard")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "PORTAL_SERVER",
        default_value = "http://localhost:5000",
        help = "Portal API base URL"
    )]
    pub server: String,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Auth(commands::auth::AuthCommands),

    #[command(about = "Browse and manage interview questions")]
    Questions {
        #[command(subcommand)]
        cmd: commands::questions::QuestionCommands,
    },

    #[command(about = "Browse and manage GRC projects")]
    Projects {
        #[command(subcommand)]
        cmd: commands::projects::ProjectCommands,
    },

    #[command(about = "Administrative operations")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Print a bcrypt hash for seeding users.json by hand")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: String,
        #[arg(long, default_value_t = 10, help = "bcrypt cost factor")]
        cost: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

fn open_dashboard(server: &str) -> anyhow::Result<Dashboard<FileStore>> {
    let client = PortalClient::new(server)?;
    Ok(Dashboard::open(client, FileStore::from_env()?)?)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::HashPassword { password, cost } => {
            commands::admin::hash_password(password, cost, &output_format).await
        }
        Commands::Auth(cmd) => {
            let mut dashboard = open_dashboard(&cli.server)?;
            commands::auth::handle(cmd, &mut dashboard, output_format).await
        }
        Commands::Questions { cmd } => {
            let mut dashboard = open_dashboard(&cli.server)?;
            commands::questions::handle(cmd, &mut dashboard, output_format).await
        }
        Commands::Projects { cmd } => {
            let mut dashboard = open_dashboard(&cli.server)?;
            commands::projects::handle(cmd, &mut dashboard, output_format).await
        }
        Commands::Admin { cmd } => {
            let mut dashboard = open_dashboard(&cli.server)?;
            commands::admin::handle(cmd, &mut dashboard, output_format).await
        }
    }
}
