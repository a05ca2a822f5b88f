use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{Dashboard, KeyValueStore, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Logout and forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Display name (defaults to the email)")]
        name: Option<String>,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Show the identity the server sees for the stored token")]
    Whoami,
}

pub async fn handle<S: KeyValueStore>(
    cmd: AuthCommands,
    dashboard: &mut Dashboard<S>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let session = dashboard.login(&email, &password).await?;
            output_success(
                &output_format,
                &format!("Logged in as {} ({})", session.name, session.role),
                Some(json!({
                    "email": session.email,
                    "name": session.name,
                    "role": session.role,
                })),
            )
        }
        AuthCommands::Logout => {
            dashboard.logout()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let server = dashboard.client().base_url().to_string();
            let reachable = dashboard.client().health().await.is_ok();
            match (dashboard.session(), &output_format) {
                (Some(session), OutputFormat::Json) => output_json(&json!({
                    "authenticated": true,
                    "server": server,
                    "reachable": reachable,
                    "email": session.email,
                    "name": session.name,
                    "role": session.role,
                })),
                (None, OutputFormat::Json) => output_json(&json!({
                    "authenticated": false,
                    "server": server,
                    "reachable": reachable,
                })),
                (Some(session), OutputFormat::Text) => {
                    println!("Server: {} ({})", server, if reachable { "reachable" } else { "unreachable" });
                    println!("Logged in as {} <{}> ({})", session.name, session.email, session.role);
                    Ok(())
                }
                (None, OutputFormat::Text) => {
                    println!("Server: {} ({})", server, if reachable { "reachable" } else { "unreachable" });
                    println!("Not logged in");
                    Ok(())
                }
            }
        }
        AuthCommands::Register { email, name, password } => {
            let message = dashboard.register(name.as_deref(), &email, &password).await?;
            output_success(&output_format, &message, Some(json!({ "email": email })))
        }
        AuthCommands::Whoami => {
            let reply = dashboard.whoami().await?;
            match output_format {
                OutputFormat::Json => output_json(&reply),
                OutputFormat::Text => {
                    println!("{} <{}>", reply.user.name, reply.user.email);
                    println!("Role: {}", reply.user.role);
                    if let Some(expires_at) = reply.expires_at {
                        println!("Token expires: {}", expires_at);
                    }
                    Ok(())
                }
            }
        }
    }
}
