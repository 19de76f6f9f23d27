//! Terminal front-end: ask questions, watch the pipeline work.

use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use transparency_chat::application::{AskQuestionResult, ChatSession};
use transparency_chat::config::{AppConfig, LoggingConfig};
use transparency_chat::domain::transparency::{StageStatus, TransparencyState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let session = ChatSession::start(&config).await?;
    tracing::info!(backend = %config.api.base_url, "chat session started");

    let renderer = tokio::spawn(render(session.transparency().subscribe()));

    println!("Ask a question. Commands: /new, /list, /clear, /quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "/quit" => break,
            "/new" => {
                let id = session.new_conversation().await;
                println!("Started conversation {}", id);
            }
            "/clear" => {
                session.clear_history().await;
                println!("Cleared all conversations");
            }
            "/list" => {
                let store = session.store().read().await;
                let current = store.current_id();
                for conversation in store.conversations() {
                    let marker = if Some(conversation.id()) == current { "*" } else { " " };
                    println!(
                        "{} {}  {} ({} messages)",
                        marker,
                        conversation.id(),
                        conversation.title().unwrap_or("Untitled"),
                        conversation.message_count()
                    );
                }
            }
            question => match session.ask(question).await {
                AskQuestionResult::Answered { answer, .. } => println!("\n{}\n", answer),
                AskQuestionResult::Failed(err) => eprintln!("Error: {}", err),
                AskQuestionResult::Ignored => {}
            },
        }
    }

    session.shutdown();
    renderer.abort();
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.as_str().into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Prints stage transitions and progress as they are pushed.
async fn render(mut rx: watch::Receiver<TransparencyState>) {
    let mut seen: HashMap<String, StageStatus> = HashMap::new();
    let mut last_percent = None;

    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        if !state.is_active() {
            seen.clear();
            last_percent = None;
            continue;
        }

        for stage in state.stages() {
            let key = stage.id().to_string();
            if seen.get(&key) == Some(&stage.status()) {
                continue;
            }
            seen.insert(key, stage.status());
            if stage.status() != StageStatus::Pending {
                println!(
                    "  {} {} [{}] {}",
                    stage.icon().unwrap_or("-"),
                    stage.name(),
                    stage.status(),
                    stage.description()
                );
            }
        }

        let percent = state.progress().as_percent();
        if last_percent != Some(percent) && percent > 0 {
            println!("  progress {}%", percent);
        }
        last_percent = Some(percent);
    }
}
