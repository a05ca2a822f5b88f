use clap::Subcommand;
use serde_json::json;

use crate::auth::{hash_password as bcrypt_hash, MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::cli::utils::*;
use crate::cli::{Dashboard, KeyValueStore, OutputFormat};

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "List registered accounts")]
    Users,
}

pub async fn handle<S: KeyValueStore>(
    cmd: AdminCommands,
    dashboard: &mut Dashboard<S>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Users => {
            let users = dashboard.users().await?;
            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users registered");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "users": users })),
                OutputFormat::Text => {
                    println!("{:<32} {:<8} {}", "EMAIL", "ROLE", "NAME");
                    println!("{}", "-".repeat(64));
                    for user in &users {
                        println!("{:<32} {:<8} {}", truncate(&user.email, 32), user.role, user.name);
                    }
                    Ok(())
                }
            }
        }
    }
}

/// Local bcrypt hashing; no server involved
pub async fn hash_password(password: String, cost: u32, output_format: &OutputFormat) -> anyhow::Result<()> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        anyhow::bail!("bcrypt cost must be between {} and {}", MIN_BCRYPT_COST, MAX_BCRYPT_COST);
    }

    let hash = bcrypt_hash(password, cost).await?;
    match output_format {
        OutputFormat::Json => output_json(&json!({ "hash": hash, "cost": cost })),
        OutputFormat::Text => {
            println!("{}", hash);
            Ok(())
        }
    }
}
