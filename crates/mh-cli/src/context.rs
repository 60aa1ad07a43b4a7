use anyhow::Context;
use mh_auth::ActorResolver;
use mh_config::MhConfig;
use mh_core::identity::Actor;
use mh_db::service::MhService;
use tokio_util::sync::CancellationToken;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: MhService,
    pub config: MhConfig,
    pub resolver: ActorResolver,
    pub cancel: CancellationToken,
    token: Option<String>,
}

impl AppContext {
    /// Open the database named by `--db` or `database.path`.
    pub async fn init(
        config: MhConfig,
        flags: &GlobalFlags,
        cancel: CancellationToken,
    ) -> anyhow::Result<Self> {
        let db_path = flags
            .db
            .clone()
            .unwrap_or_else(|| config.database.path.clone());

        if db_path != mh_config::IN_MEMORY {
            if let Some(parent) = std::path::Path::new(&db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create database directory {}", parent.display())
                    })?;
                }
            }
        }

        let service = MhService::new_local(&db_path)
            .await
            .with_context(|| format!("failed to open database at {db_path}"))?;
        let resolver = ActorResolver::new(&config.auth);

        Ok(Self {
            service,
            config,
            resolver,
            cancel,
            token: flags.token.clone(),
        })
    }

    /// Resolve who is making this change. Called before every write.
    pub fn actor(&self) -> anyhow::Result<Actor> {
        let header = self.token.as_deref().map(|token| format!("Bearer {token}"));
        let actor = self
            .resolver
            .resolve(header.as_deref())
            .context("failed to resolve change author")?;
        tracing::debug!(author = actor.author_id.as_deref().unwrap_or("system"), "actor resolved");
        Ok(actor)
    }
}

/// Warn when a token is supplied but attribution cannot verify it.
pub fn warn_unconfigured(config: &MhConfig, has_token: bool) {
    if has_token && !config.auth.is_configured() {
        tracing::warn!(
            "a token was supplied but auth.jwt_secret is empty; writes will fail (set MH_AUTH__JWT_SECRET)"
        );
    }
}
