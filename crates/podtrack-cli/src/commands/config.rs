use super::context::AppContext;
use super::prompts;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use podcast_config::{is_usable_api_key, Config, PLACEHOLDER_API_KEY};
use serde_json::json;

pub async fn run_config(ctx: AppContext, cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(&ctx, full, output).await,
        crate::ConfigCommands::SetKey { key } => set_key(ctx, key, output).await,
        crate::ConfigCommands::Init { force } => init_config(&ctx, force, output).await,
    }
}

async fn show_config(ctx: &AppContext, full: bool, output: &Output) -> Result<()> {
    let config_file = ctx.paths.config_file();
    let key = ctx.api_key();
    let key_display = match &key {
        Some(k) if full => k.clone(),
        Some(k) => mask_string(k),
        None => "<not set>".to_string(),
    };
    let key_source = ctx.key_source();

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "config_file_exists": config_file.exists(),
            "catalog": {
                "base_url": ctx.config.catalog.base_url,
                "api_key": key_display,
                "api_key_source": key_source.label(),
                "request_timeout_secs": ctx.config.catalog.request_timeout_secs,
                "search_type": ctx.config.catalog.search_type,
            },
            "search": { "debounce_ms": ctx.config.search.debounce_ms },
            "history": { "recent_limit": ctx.config.history.recent_limit },
            "data_dir": ctx.paths.data_dir().display().to_string(),
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    if !config_file.exists() {
        output.warn(format!("No config file at {}; showing defaults", config_file.display()));
        output.info("Run 'podtrack config init' to create one.");
    }

    println!("\n{}", "Configuration".bright_cyan().bold());

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("Setting").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Config file"), Cell::new(config_file.display().to_string())]);
    table.add_row(vec![Cell::new("Data directory"), Cell::new(ctx.paths.data_dir().display().to_string())]);
    table.add_row(vec![Cell::new("Catalog URL"), Cell::new(&ctx.config.catalog.base_url)]);
    table.add_row(vec![
        Cell::new("API key"),
        Cell::new(format!("{} ({})", key_display, key_source.label())).fg(if key.is_some() {
            Color::Green
        } else {
            Color::Yellow
        }),
    ]);
    table.add_row(vec![
        Cell::new("Request timeout"),
        Cell::new(format!("{}s", ctx.config.catalog.request_timeout_secs)),
    ]);
    table.add_row(vec![Cell::new("Search type"), Cell::new(&ctx.config.catalog.search_type)]);
    table.add_row(vec![
        Cell::new("Search debounce"),
        Cell::new(format!("{}ms", ctx.config.search.debounce_ms)),
    ]);
    table.add_row(vec![
        Cell::new("Recent history limit"),
        Cell::new(ctx.config.history.recent_limit),
    ]);
    println!("{}", table);

    if key.is_none() {
        output.warn("No API key configured. Catalog views will show sample data.");
    }
    Ok(())
}

async fn set_key(mut ctx: AppContext, key: Option<String>, output: &Output) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => prompts::prompt_password("Listen Notes API key")?,
    };
    let key = key.trim().to_string();

    if !is_usable_api_key(&key) {
        return Err(eyre!("API key cannot be empty or the '{}' placeholder", PLACEHOLDER_API_KEY));
    }

    ctx.credentials.set_listen_api_key(key);
    ctx.credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    output.success(format!("API key saved to {}", ctx.paths.credentials_file().display()));
    Ok(())
}

async fn init_config(ctx: &AppContext, force: bool, output: &Output) -> Result<()> {
    let config_file = ctx.paths.config_file();

    if config_file.exists() && !force {
        let overwrite = output.is_human()
            && prompts::prompt_yes_no_with_output(
                &format!("{} already exists. Overwrite with defaults?", config_file.display()),
                Some(false),
                Some(output),
            )?;
        if !overwrite {
            output.info("Keeping existing configuration");
            return Ok(());
        }
    }

    let mut config = Config::default();
    config.catalog.api_key = Some(PLACEHOLDER_API_KEY.to_string());

    ctx.paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create directories: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    output.info("Set your API key with 'podtrack config set-key' or the LISTEN_API_KEY environment variable.");
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
