use anyhow::Context;
use roost_engine::CancellationToken;

/// A token that Ctrl+C cancels, so a long run stops between draws.
pub fn cancel_on_interrupt() -> anyhow::Result<CancellationToken> {
    let token = CancellationToken::new();
    let handle = token.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("interrupt received, stopping after in-flight draws");
        handle.cancel();
    })
    .context("failed to install Ctrl+C handler")?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The handler is process-wide and can be installed once per test binary.
    #[test]
    fn installed_token_starts_live_and_cancels_its_clones() {
        let token = cancel_on_interrupt().unwrap();
        assert!(!token.is_cancelled());
        token.clone().cancel();
        assert!(token.is_cancelled());
    }
}
