use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use lectern::{
    Config, ContentLibrary, Database, PreferenceManager, Session,
};

/// Get the config directory path (~/.config/lectern/)
fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("lectern"))
}

#[derive(Parser, Debug)]
#[command(name = "lectern", about = "Terminal study tracker for hierarchical checklists")]
struct Args {
    /// Content directory holding subject JSON files (overrides config)
    #[arg(long, value_name = "DIR")]
    content: Option<PathBuf>,

    /// Database file (defaults to <config dir>/progress.db)
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Show only this subject
    #[arg(long, value_name = "ID")]
    subject: Option<String>,

    /// Reset the progress database (delete and recreate)
    #[arg(long)]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lectern=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = config_dir()?;
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config dir '{}'", config_dir.display()))?;
    let config = Config::load(&config_dir.join("config.toml"))?;

    let db_path = args.db.unwrap_or_else(|| config_dir.join("progress.db"));
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path)
            .with_context(|| format!("Failed to remove '{}'", db_path.display()))?;
        tracing::info!(path = %db_path.display(), "Progress database reset");
    }

    let db = Database::open(&db_path.display().to_string()).await?;
    let mut prefs = PreferenceManager::load(&config, &db).await;

    let content_dir = args.content.unwrap_or_else(|| config.content_dir.clone());
    let library = Arc::new(
        ContentLibrary::load_dir(&content_dir)
            .with_context(|| format!("Failed to load content from '{}'", content_dir.display()))?,
    );
    if library.subjects().is_empty() {
        println!("No subjects found in '{}'.", content_dir.display());
        return Ok(());
    }

    // --subject wins; otherwise fall back to the last-opened subject, then
    // everything.
    let selected: Vec<String> = match &args.subject {
        Some(id) => vec![id.clone()],
        None if config.restore_last_subject => match prefs.last_subject() {
            Some(id) if library.subject(id).is_some() => vec![id.to_owned()],
            _ => library.subjects().iter().map(|s| s.id.clone()).collect(),
        },
        None => library.subjects().iter().map(|s| s.id.clone()).collect(),
    };

    for subject_id in &selected {
        let session = Session::open(
            Arc::clone(&library),
            db.clone(),
            subject_id,
            PreferenceManager::load(&config, &db).await,
        )
        .await
        .with_context(|| format!("Unknown subject '{subject_id}'"))?;
        print_summary(&session);
    }

    if let Some(id) = args.subject {
        if let Err(e) = prefs.set(&db, "last_subject", &id).await {
            tracing::warn!(error = %e, "Failed to remember last subject");
        }
    }

    Ok(())
}

fn print_summary<S: lectern::ProgressStore>(session: &Session<S>) {
    let view = session.subject_view();
    println!("{} — {:.0}%", view.title, view.progress_percent);
    for topic in &view.topics {
        println!(
            "  {} [{}/{}] {:.0}%",
            topic.title, topic.completed_count, topic.total_count, topic.progress_percent
        );
        for lesson in &topic.lessons {
            let bookmark = if lesson.bookmarked { " *" } else { "" };
            println!(
                "    {}{} [{}/{}]",
                lesson.title, bookmark, lesson.done_count, lesson.visible_count
            );
            for objective in &lesson.objectives {
                let mark = if objective.effective_done { "x" } else { " " };
                println!("      [{}] {}", mark, objective.text);
            }
        }
    }
}
