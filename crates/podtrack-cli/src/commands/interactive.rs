use super::catalog::{render_heading, render_result_set, ListenMarks};
use super::context::AppContext;
use crate::output::Output;
use color_eyre::Result;
use owo_colors::OwoColorize;
use podcast_core::{AcquisitionPipeline, FetchOutcome, ListenLog, PipelineSnapshot, SkipReason};
use podcast_models::Session;
use podcast_sources::CatalogSource;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info};

const HELP: &str = "\
Type to search (results appear once you stop typing). Commands:
  :more                 load the next page of results
  :log <id> [rating]    record a listen (rating 1-5)
  :trending             refresh trending podcasts
  :clear                clear the search and show trending
  :dismiss              hide the current notice
  :help                 show this help
  :quit                 exit";

#[derive(Debug, PartialEq)]
enum Command {
    Query(String),
    More,
    Log { podcast_id: String, rating: Option<u8> },
    Trending,
    Clear,
    Dismiss,
    Help,
    Quit,
    Invalid(String),
}

fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(':') else {
        return Command::Query(trimmed.to_string());
    };

    let mut parts = rest.split_whitespace();
    match parts.next().unwrap_or_default() {
        "more" | "m" => Command::More,
        "trending" | "t" => Command::Trending,
        "clear" | "c" => Command::Clear,
        "dismiss" | "d" => Command::Dismiss,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        "log" | "l" => {
            let Some(podcast_id) = parts.next() else {
                return Command::Invalid("Usage: :log <podcast-id> [rating]".to_string());
            };
            let rating = match parts.next().map(str::parse::<u8>) {
                None => None,
                Some(Ok(r)) if (1..=5).contains(&r) => Some(r),
                Some(_) => return Command::Invalid("Rating must be a number from 1 to 5".to_string()),
            };
            Command::Log { podcast_id: podcast_id.to_string(), rating }
        }
        other => Command::Invalid(format!("Unknown command ':{}'. Type :help for commands.", other)),
    }
}

pub async fn run_interactive(ctx: &AppContext, output: &Output) -> Result<()> {
    let pipeline = ctx.pipeline()?;
    let sessions = ctx.session_store();
    // Shared with the renderer so tables mark podcasts logged this session
    let listen_log = Arc::new(Mutex::new(ctx.listen_log()));

    if let Some(session) = sessions.current() {
        output.info(format!("Signed in as {}", session.display_name));
    } else {
        output.info("Not signed in; listens will not be recorded. Run 'podtrack login' first.");
    }
    output.info(HELP);

    let renderer = tokio::spawn(render_loop(
        pipeline.clone(),
        listen_log.clone(),
        sessions.current().cloned(),
        *output,
    ));
    pipeline.fetch_trending().await;
    info!(operation = "interactive", "Interactive session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output.print("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            Command::Query(query) => pipeline.on_query_change(query).await,
            Command::More => match pipeline.load_more().await {
                FetchOutcome::Skipped(reason) => output.info(skip_message(reason)),
                outcome => debug!(?outcome, "Load more finished"),
            },
            Command::Log { podcast_id, rating } => {
                record_listen(&pipeline, sessions.current(), &listen_log, &podcast_id, rating, output).await
            }
            Command::Trending => {
                pipeline.fetch_trending().await;
            }
            Command::Clear => {
                pipeline.cancel_pending().await;
                pipeline.search("", 1).await;
            }
            Command::Dismiss => pipeline.dismiss_diagnostic().await,
            Command::Help => output.info(HELP),
            Command::Quit => break,
            Command::Invalid(message) => output.warn(message),
        }
    }

    pipeline.cancel_pending().await;
    renderer.abort();
    info!(operation = "interactive", "Interactive session ended");
    Ok(())
}

async fn record_listen<S: CatalogSource + 'static>(
    pipeline: &AcquisitionPipeline<S>,
    session: Option<&Session>,
    listen_log: &Mutex<ListenLog>,
    podcast_id: &str,
    rating: Option<u8>,
    output: &Output,
) {
    let Some(session) = session else {
        output.warn("Not signed in. Run 'podtrack login' first.");
        return;
    };

    let title = pipeline
        .find_podcast(podcast_id)
        .await
        .map(|p| p.title)
        .unwrap_or_else(|| podcast_id.to_string());

    let recorded = listen_log
        .lock()
        .await
        .record(Some(&session.id), podcast_id, rating, None);
    if recorded.is_some() {
        output.success(format!("Logged listen of {}", title));
    }
}

fn skip_message(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::AlreadyLoading => "Still loading, try again in a moment",
        SkipReason::NoMorePages => "No more results",
        SkipReason::QueryMismatch => "Search for something first",
    }
}

/// Re-render whenever the pipeline settles after a change
async fn render_loop<S: CatalogSource + 'static>(
    pipeline: AcquisitionPipeline<S>,
    listen_log: Arc<Mutex<ListenLog>>,
    session: Option<Session>,
    output: Output,
) {
    let mut revisions = pipeline.subscribe();
    while revisions.changed().await.is_ok() {
        let snapshot = pipeline.snapshot().await;
        if snapshot.trending_loading || snapshot.search_loading {
            continue;
        }
        let log = listen_log.lock().await;
        render_snapshot(&snapshot, &ListenMarks::new(&log, session.as_ref()), &output);
    }
}

fn render_snapshot(snapshot: &PipelineSnapshot, marks: &ListenMarks, output: &Output) {
    if !output.is_human() {
        if let Ok(mut value) = serde_json::to_value(snapshot) {
            if let Some(fields) = value.as_object_mut() {
                fields.insert("logged".to_string(), json!(marks.logged_ids(&snapshot.discover.items)));
            }
            output.json(&value);
        }
        return;
    }

    println!();
    if let Some(diagnostic) = &snapshot.diagnostic {
        output.diagnostic(diagnostic);
    }
    if snapshot.discover.is_empty() {
        return;
    }

    let title = match &snapshot.active_query {
        Some(query) => format!("Results for '{}'", query),
        None => "Discover".to_string(),
    };
    render_heading(&title, snapshot.discover.source, output);
    render_result_set(&snapshot.discover, marks, output);
    if snapshot.discover.has_more && !output.is_quiet() {
        println!("{}", "Type :more to load the next page".bright_black());
    }
}
