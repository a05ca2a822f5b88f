use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{Dashboard, KeyValueStore, OutputFormat, ShuffleMode};
use crate::database::models::{NewQuestion, QuestionPatch};
use crate::filter::{CategoryFilter, QuestionQuery, DEFAULT_PAGE_SIZE};

#[derive(Subcommand)]
pub enum QuestionCommands {
    #[command(about = "List questions with filtering and paging")]
    List {
        #[arg(long, default_value = "All", help = "Exact category, or All")]
        category: CategoryFilter,
        #[arg(long, help = "Case-insensitive text to find in question or answer")]
        search: Option<String>,
        #[arg(long, default_value_t = 1, help = "1-based page number")]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, help = "Questions per page")]
        page_size: usize,
        #[arg(long, help = "Shuffle the matching questions")]
        shuffle: bool,
        #[arg(long, help = "Seed for a reproducible shuffle")]
        seed: Option<u64>,
    },

    #[command(about = "Show one question with its answer")]
    Show {
        #[arg(help = "Question id")]
        id: i64,
    },

    #[command(about = "Add a question (admin)")]
    Add {
        #[arg(long)]
        question: String,
        #[arg(long)]
        answer: String,
        #[arg(long, help = "Defaults to General")]
        category: Option<String>,
    },

    #[command(about = "Update a question (admin)")]
    Update {
        #[arg(help = "Question id")]
        id: i64,
        #[arg(long)]
        question: Option<String>,
        #[arg(long)]
        answer: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },

    #[command(about = "Delete a question (admin)")]
    Delete {
        #[arg(help = "Question id")]
        id: i64,
    },
}

pub async fn handle<S: KeyValueStore>(
    cmd: QuestionCommands,
    dashboard: &mut Dashboard<S>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        QuestionCommands::List {
            category,
            search,
            page,
            page_size,
            shuffle,
            seed,
        } => {
            let mode = match (shuffle, seed) {
                (_, Some(seed)) => ShuffleMode::Seeded(seed),
                (true, None) => ShuffleMode::Random,
                (false, None) => ShuffleMode::Off,
            };
            let query = QuestionQuery::new(category, search);
            let view = dashboard.question_page(&query, page, page_size, mode).await?;

            if view.page.total == 0 {
                return output_empty_collection(&output_format, "items", "No questions match");
            }

            match output_format {
                OutputFormat::Json => output_json(&view),
                OutputFormat::Text => {
                    println!("Categories: All, {}", view.categories.join(", "));
                    println!("{:<15} {:<12} {}", "ID", "CATEGORY", "QUESTION");
                    println!("{}", "-".repeat(80));
                    for q in &view.page.items {
                        println!("{:<15} {:<12} {}", q.id, truncate(&q.category, 12), truncate(&q.question, 52));
                    }
                    println!(
                        "Page {} of {} ({} matching)",
                        view.page.page, view.page.total_pages, view.page.total
                    );
                    Ok(())
                }
            }
        }
        QuestionCommands::Show { id } => {
            let question = dashboard.question(id).await?;

            match output_format {
                OutputFormat::Json => output_json(&question),
                OutputFormat::Text => {
                    println!("[{}] {}", question.category, question.question);
                    println!();
                    println!("{}", question.answer);
                    Ok(())
                }
            }
        }
        QuestionCommands::Add {
            question,
            answer,
            category,
        } => {
            let created = dashboard
                .add_question(&NewQuestion {
                    question,
                    answer,
                    category,
                })
                .await?;
            output_success(
                &output_format,
                &format!("Question added with id {}", created.id),
                Some(json!({ "question": created })),
            )
        }
        QuestionCommands::Update {
            id,
            question,
            answer,
            category,
        } => {
            let updated = dashboard
                .update_question(
                    id,
                    &QuestionPatch {
                        question,
                        answer,
                        category,
                    },
                )
                .await?;
            output_success(
                &output_format,
                &format!("Question {} updated", updated.id),
                Some(json!({ "question": updated })),
            )
        }
        QuestionCommands::Delete { id } => {
            let removed = dashboard.delete_question(id).await?;
            output_success(
                &output_format,
                &format!("Question {} deleted", removed.id),
                Some(json!({ "question": removed })),
            )
        }
    }
}
