use super::context::AppContext;
use super::ui::FetchSpinner;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use podcast_core::{filter_podcasts, FetchOutcome, ListenLog, PipelineSnapshot};
use podcast_models::{DataSource, Podcast, ResultSet, Session};
use serde_json::json;

const DESCRIPTION_WIDTH: usize = 60;

/// Which rows the signed-in session has already listened to
pub struct ListenMarks<'a> {
    log: Option<&'a ListenLog>,
    session_id: Option<&'a str>,
}

impl<'a> ListenMarks<'a> {
    pub fn new(log: &'a ListenLog, session: Option<&'a Session>) -> Self {
        Self {
            log: Some(log),
            session_id: session.map(|s| s.id.as_str()),
        }
    }

    pub fn none() -> Self {
        Self { log: None, session_id: None }
    }

    /// Marks are only shown while someone is signed in
    pub fn is_active(&self) -> bool {
        self.log.is_some() && self.session_id.is_some()
    }

    pub fn is_logged(&self, podcast_id: &str) -> bool {
        match (self.log, self.session_id) {
            (Some(log), Some(session_id)) => log.has_logged(session_id, podcast_id),
            _ => false,
        }
    }

    pub fn logged_ids<'p>(&self, podcasts: &'p [Podcast]) -> Vec<&'p str> {
        podcasts
            .iter()
            .filter(|p| self.is_logged(&p.id))
            .map(|p| p.id.as_str())
            .collect()
    }
}

pub async fn run_trending(ctx: &AppContext, filter: Option<String>, output: &Output) -> Result<()> {
    let pipeline = ctx.pipeline()?;
    let sessions = ctx.session_store();
    let log = ctx.listen_log();
    let marks = ListenMarks::new(&log, sessions.current());

    let spinner = FetchSpinner::start("Fetching trending podcasts...", output.is_human());
    pipeline.fetch_trending().await;
    spinner.finish();

    let snapshot = pipeline.snapshot().await;
    let needle = filter.unwrap_or_default();
    let shown: Vec<Podcast> = filter_podcasts(&snapshot.trending.items, &needle)
        .into_iter()
        .cloned()
        .collect();

    if !output.is_human() {
        output.json(&json!({
            "view": "trending",
            "filter": needle,
            "source": snapshot.trending.source,
            "diagnostic": diagnostic_json(&snapshot),
            "podcasts": shown,
            "logged": marks.logged_ids(&shown),
        }));
        return Ok(());
    }

    if let Some(diagnostic) = &snapshot.diagnostic {
        output.diagnostic(diagnostic);
    }
    if shown.is_empty() && !needle.trim().is_empty() {
        output.info(format!("No trending podcasts match '{}'", needle.trim()));
        return Ok(());
    }

    render_heading("Trending Podcasts", snapshot.trending.source, output);
    render_podcasts(&shown, &marks, output);
    Ok(())
}

pub async fn run_search(ctx: &AppContext, query: String, pages: u32, output: &Output) -> Result<()> {
    let pipeline = ctx.pipeline()?;
    let sessions = ctx.session_store();
    let log = ctx.listen_log();
    let marks = ListenMarks::new(&log, sessions.current());

    let spinner = FetchSpinner::start(&format!("Searching for '{}'...", query.trim()), output.is_human());
    let mut outcome = pipeline.search(&query, 1).await;
    for page in 2..=pages.max(1) {
        if !matches!(outcome, FetchOutcome::Applied(_)) {
            break;
        }
        spinner.set_message(format!("Loading page {}...", page));
        outcome = pipeline.load_more().await;
    }
    spinner.finish();

    let snapshot = pipeline.snapshot().await;

    if !output.is_human() {
        output.json(&json!({
            "view": "search",
            "query": snapshot.active_query,
            "page": snapshot.discover.page,
            "has_more": snapshot.discover.has_more,
            "source": snapshot.discover.source,
            "diagnostic": diagnostic_json(&snapshot),
            "podcasts": snapshot.discover.items,
            "logged": marks.logged_ids(&snapshot.discover.items),
        }));
        return Ok(());
    }

    if let Some(diagnostic) = &snapshot.diagnostic {
        output.diagnostic(diagnostic);
    }
    if snapshot.discover.is_empty() {
        return Ok(());
    }

    render_heading(&format!("Results for '{}'", query.trim()), snapshot.discover.source, output);
    render_result_set(&snapshot.discover, &marks, output);
    Ok(())
}

pub fn diagnostic_json(snapshot: &PipelineSnapshot) -> serde_json::Value {
    match &snapshot.diagnostic {
        Some(diagnostic) => json!({
            "kind": diagnostic,
            "message": diagnostic.message(),
        }),
        None => serde_json::Value::Null,
    }
}

pub fn render_heading(title: &str, source: DataSource, output: &Output) {
    if output.is_quiet() {
        return;
    }
    let badge = match source {
        DataSource::Live => "live".green().to_string(),
        DataSource::Fallback => "sample data".yellow().to_string(),
    };
    println!("\n{} ({})", title.bright_cyan().bold(), badge);
}

/// Podcasts table plus a "more available" hint
pub fn render_result_set(results: &ResultSet, marks: &ListenMarks, output: &Output) {
    render_podcasts(&results.items, marks, output);
    if results.has_more && !output.is_quiet() {
        println!(
            "{}",
            format!("Page {} of results. More available.", results.page).bright_black()
        );
    }
}

pub fn render_podcasts(podcasts: &[Podcast], marks: &ListenMarks, output: &Output) {
    if output.is_quiet() {
        return;
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    let mut header = vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Category").add_attribute(Attribute::Bold),
        Cell::new("Rating").add_attribute(Attribute::Bold),
        Cell::new("Episodes").add_attribute(Attribute::Bold),
        Cell::new("Listen on").add_attribute(Attribute::Bold),
    ];
    if marks.is_active() {
        header.push(Cell::new("Logged").add_attribute(Attribute::Bold));
    }
    table.set_header(header);

    for podcast in podcasts {
        let platforms: Vec<&str> = podcast.links.available().into_iter().map(|(name, _)| name).collect();
        let mut row = vec![
            Cell::new(&podcast.id).fg(Color::DarkGrey),
            Cell::new(format!("{}\n{}", podcast.title, truncate(&podcast.description, DESCRIPTION_WIDTH))),
            Cell::new(&podcast.category).fg(Color::Cyan),
            Cell::new(format!("{:.1}", podcast.rating)),
            Cell::new(podcast.episode_count),
            Cell::new(if platforms.is_empty() { "-".to_string() } else { platforms.join(", ") }),
        ];
        if marks.is_active() {
            row.push(Cell::new(if marks.is_logged(&podcast.id) { "✓" } else { "" }).fg(Color::Green));
        }
        table.add_row(row);
    }

    println!("{}", table);
}

fn truncate(text: &str, width: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}
