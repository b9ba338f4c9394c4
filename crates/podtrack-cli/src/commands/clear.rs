use super::context::AppContext;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;

/// Remove local state that is safe to drop. The listen log is append-only and
/// is never cleared here.
pub async fn run_clear(ctx: &AppContext, session: bool, output: &Output) -> Result<()> {
    if !session {
        output.warn("No clear option specified. Use --session");
        output.info("\nExample: podtrack clear --session");
        return Ok(());
    }

    clear_session(ctx, output)
}

fn clear_session(ctx: &AppContext, output: &Output) -> Result<()> {
    let mut sessions = ctx.session_store();
    if sessions.current().is_none() && !ctx.paths.session_file().exists() {
        output.info("No session found to clear");
        return Ok(());
    }

    sessions
        .sign_out()
        .map_err(|e| eyre!("Failed to remove session: {}", e))?;
    output.success("Cleared session");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use podcast_config::PathManager;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clear_session_keeps_listen_log() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::load_from(PathManager::with_base(dir.path().to_path_buf())).unwrap();
        let output = Output::new(OutputFormat::Human, true);

        let session = ctx.session_store().sign_in("ada@example.com").unwrap();
        ctx.listen_log().record(Some(&session.id), "sample-1", None, None).unwrap();

        run_clear(&ctx, true, &output).await.unwrap();

        assert!(ctx.session_store().current().is_none());
        assert!(ctx.paths.listen_log_file().exists());
        assert_eq!(ctx.listen_log().entries_for(&session.id).len(), 1);
    }

    #[tokio::test]
    async fn test_clear_without_flag_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::load_from(PathManager::with_base(dir.path().to_path_buf())).unwrap();
        let output = Output::new(OutputFormat::Human, true);

        ctx.session_store().sign_in("ada").unwrap();
        run_clear(&ctx, false, &output).await.unwrap();

        assert!(ctx.session_store().current().is_some());
    }
}
