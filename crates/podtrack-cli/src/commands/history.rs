use super::context::AppContext;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use podcast_core::FallbackDataset;
use podcast_models::ListenLogEntry;
use serde_json::json;

pub async fn run_log(
    ctx: &AppContext,
    podcast_id: String,
    rating: Option<u8>,
    notes: Option<String>,
    output: &Output,
) -> Result<()> {
    let sessions = ctx.session_store();
    let Some(session) = sessions.current() else {
        output.warn("Not signed in. Run 'podtrack login' first.");
        return Ok(());
    };

    let mut log = ctx.listen_log();
    if log.has_logged(&session.id, &podcast_id) {
        output.info(format!("You've listened to {} before; recording another listen", podcast_id));
    }

    match log.record(Some(&session.id), &podcast_id, rating, notes) {
        Some(entry) => {
            if output.is_human() {
                let samples = FallbackDataset::bundled().ok();
                output.success(format!("Logged listen of {}", title_for(samples.as_ref(), &entry.podcast_id)));
            } else {
                output.json(&json!({ "type": "listen", "entry": entry }));
            }
        }
        None => output.warn("Listen was not recorded"),
    }
    Ok(())
}

pub async fn run_history(ctx: &AppContext, recent: Option<usize>, output: &Output) -> Result<()> {
    let sessions = ctx.session_store();
    let Some(session) = sessions.current() else {
        output.warn("Not signed in. Run 'podtrack login' first.");
        return Ok(());
    };

    let limit = recent.unwrap_or(ctx.config.history.recent_limit);
    if limit == 0 {
        return Err(eyre!("--recent must be greater than zero"));
    }

    let log = ctx.listen_log();
    let entries = log.recent(&session.id, limit);
    let stats = log.stats_for(&session.id);

    if !output.is_human() {
        output.json(&json!({ "type": "history", "stats": stats, "recent": entries }));
        return Ok(());
    }

    output.info(format!(
        "{} listens across {} podcasts",
        stats.total_listens, stats.distinct_podcasts
    ));
    if entries.is_empty() {
        output.info("No listens yet. Use 'podtrack log <podcast-id>' to record one.");
        return Ok(());
    }

    let samples = FallbackDataset::bundled().ok();
    render_entries(&entries, samples.as_ref(), output);
    Ok(())
}

/// Title from the bundled samples when known, otherwise the raw id
fn title_for(samples: Option<&FallbackDataset>, podcast_id: &str) -> String {
    samples
        .and_then(|samples| samples.find(podcast_id))
        .map(|p| p.title.clone())
        .unwrap_or_else(|| podcast_id.to_string())
}

fn render_entries(entries: &[&ListenLogEntry], samples: Option<&FallbackDataset>, output: &Output) {
    if output.is_quiet() {
        return;
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("When").add_attribute(Attribute::Bold),
        Cell::new("Podcast").add_attribute(Attribute::Bold),
        Cell::new("Rating").add_attribute(Attribute::Bold),
        Cell::new("Notes").add_attribute(Attribute::Bold),
    ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
            Cell::new(title_for(samples, &entry.podcast_id)),
            Cell::new(entry.rating.map(|r| "★".repeat(r as usize)).unwrap_or_else(|| "-".to_string()))
                .fg(Color::Yellow),
            Cell::new(entry.notes.as_deref().unwrap_or("")),
        ]);
    }

    println!("{}", table);
}
