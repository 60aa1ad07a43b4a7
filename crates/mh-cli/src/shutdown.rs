use tokio_util::sync::CancellationToken;

/// Token cancelled on Ctrl+C. A save still in flight rolls back.
pub fn create_shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("interrupted; cancelling pending save");
                token_clone.cancel();
            }
            Err(error) => tracing::warn!(%error, "failed to install Ctrl+C handler"),
        }
    });

    token
}
