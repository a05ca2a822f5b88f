use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{Dashboard, KeyValueStore, OutputFormat};
use crate::database::models::{NewProject, ProjectPatch};

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List GRC projects")]
    List,

    #[command(about = "Show one project")]
    Show {
        #[arg(help = "Project id")]
        id: i64,
    },

    #[command(about = "Create a project (admin)")]
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, help = "Framework, e.g. SOC 2 or ISO 27001")]
        compliance: String,
        #[arg(long)]
        risk_level: String,
        #[arg(long)]
        status: String,
        #[arg(long, help = "YYYY-MM-DD, defaults to today")]
        last_audit: Option<String>,
        #[arg(long, help = "Defaults to GRC Team")]
        assigned_to: Option<String>,
    },

    #[command(about = "Update a project (admin)")]
    Update {
        #[arg(help = "Project id")]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        compliance: Option<String>,
        #[arg(long)]
        risk_level: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, help = "YYYY-MM-DD")]
        last_audit: Option<String>,
        #[arg(long)]
        assigned_to: Option<String>,
    },

    #[command(about = "Delete a project (admin)")]
    Delete {
        #[arg(help = "Project id")]
        id: i64,
    },
}

pub async fn handle<S: KeyValueStore>(
    cmd: ProjectCommands,
    dashboard: &mut Dashboard<S>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        ProjectCommands::List => {
            let projects = dashboard.projects().await?;
            if projects.is_empty() {
                return output_empty_collection(&output_format, "projects", "No projects yet");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "projects": projects })),
                OutputFormat::Text => {
                    println!(
                        "{:<6} {:<28} {:<14} {:<8} {:<12} {:<11} {}",
                        "ID", "PROJECT", "COMPLIANCE", "RISK", "STATUS", "LAST AUDIT", "ASSIGNED"
                    );
                    println!("{}", "-".repeat(96));
                    for p in &projects {
                        println!(
                            "{:<6} {:<28} {:<14} {:<8} {:<12} {:<11} {}",
                            p.id,
                            truncate(&p.project_name, 28),
                            truncate(&p.compliance, 14),
                            truncate(&p.risk_level, 8),
                            truncate(&p.status, 12),
                            p.last_audit,
                            p.assigned_to
                        );
                    }
                    Ok(())
                }
            }
        }
        ProjectCommands::Show { id } => {
            let project = dashboard.project(id).await?;
            match output_format {
                OutputFormat::Json => output_json(&project),
                OutputFormat::Text => {
                    println!("{} (#{})", project.project_name, project.id);
                    println!("Compliance:  {}", project.compliance);
                    println!("Risk level:  {}", project.risk_level);
                    println!("Status:      {}", project.status);
                    println!("Last audit:  {}", project.last_audit);
                    println!("Assigned to: {}", project.assigned_to);
                    Ok(())
                }
            }
        }
        ProjectCommands::Add {
            name,
            compliance,
            risk_level,
            status,
            last_audit,
            assigned_to,
        } => {
            let created = dashboard
                .add_project(&NewProject {
                    project_name: name,
                    compliance,
                    risk_level,
                    status,
                    last_audit,
                    assigned_to,
                })
                .await?;
            output_success(
                &output_format,
                &format!("Project {} created", created.id),
                Some(json!({ "project": created })),
            )
        }
        ProjectCommands::Update {
            id,
            name,
            compliance,
            risk_level,
            status,
            last_audit,
            assigned_to,
        } => {
            let updated = dashboard
                .update_project(
                    id,
                    &ProjectPatch {
                        project_name: name,
                        compliance,
                        risk_level,
                        status,
                        last_audit,
                        assigned_to,
                    },
                )
                .await?;
            output_success(
                &output_format,
                &format!("Project {} updated", updated.id),
                Some(json!({ "project": updated })),
            )
        }
        ProjectCommands::Delete { id } => {
            let removed = dashboard.delete_project(id).await?;
            output_success(
                &output_format,
                &format!("Project {} deleted", removed.id),
                Some(json!({ "project": removed })),
            )
        }
    }
}
