use super::context::AppContext;
use super::prompts;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;

pub async fn run_login(ctx: &AppContext, email: Option<String>, output: &Output) -> Result<()> {
    let identity = match email {
        Some(email) => email,
        None => prompts::prompt_string("Email (or any name)", None)?,
    };

    let mut sessions = ctx.session_store();
    if let Some(existing) = sessions.current() {
        output.info(format!("Replacing session for {}", existing.display_name));
    }

    let session = sessions
        .sign_in(&identity)
        .map_err(|e| eyre!("Failed to save session: {}", e))?;

    if output.is_human() {
        output.success(format!("Signed in as {}", session.display_name));
    } else {
        output.json(&json!({ "type": "session", "session": session }));
    }
    Ok(())
}

pub async fn run_logout(ctx: &AppContext, output: &Output) -> Result<()> {
    let mut sessions = ctx.session_store();
    if sessions.current().is_none() {
        output.info("Not signed in");
        return Ok(());
    }

    sessions
        .sign_out()
        .map_err(|e| eyre!("Failed to remove session: {}", e))?;
    output.success("Signed out. Your listen history is kept.");
    Ok(())
}

pub async fn run_whoami(ctx: &AppContext, output: &Output) -> Result<()> {
    let sessions = ctx.session_store();
    let Some(session) = sessions.current() else {
        if output.is_human() {
            output.info("Not signed in. Run 'podtrack login' to start tracking listens.");
        } else {
            output.json(&json!({ "type": "session", "session": null }));
        }
        return Ok(());
    };

    let stats = ctx.listen_log().stats_for(&session.id);

    if !output.is_human() {
        output.json(&json!({ "type": "session", "session": session, "stats": stats }));
        return Ok(());
    }

    output.info(format!("Signed in as {} ({})", session.display_name, session.identity));
    output.info(format!(
        "Since {}: {} listens across {} podcasts",
        session.signed_in_at.format("%Y-%m-%d %H:%M UTC"),
        stats.total_listens,
        stats.distinct_podcasts
    ));
    Ok(())
}
