use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::History { action } => commands::history::handle(&action, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::House { action } => commands::house::handle(&action, ctx, flags).await,
        Commands::Post { action } => commands::post::handle(&action, ctx, flags).await,
        Commands::Week { action } => commands::week::handle(&action, ctx, flags).await,
        Commands::Mark { action } => commands::mark::handle(&action, ctx, flags).await,
    }
}
