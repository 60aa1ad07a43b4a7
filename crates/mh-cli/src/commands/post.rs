use mh_core::ids::PostId;
use mh_core::requests::UpdatePostRequest;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::PostCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mh post`.
pub async fn handle(action: &PostCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        PostCommands::Create { name, area } => {
            let actor = ctx.actor()?;
            let post = ctx
                .service
                .create_post(name, *area, &actor, &ctx.cancel)
                .await?;
            output(&post, flags.format)
        }
        PostCommands::Update { id, name, area } => {
            let actor = ctx.actor()?;
            let current = ctx.service.get_post(PostId(*id)).await?;
            let request = UpdatePostRequest {
                id: PostId(*id),
                name: name.clone().unwrap_or(current.name),
                area: area.unwrap_or(current.area),
            };
            let post = ctx.service.update_post(request, &actor, &ctx.cancel).await?;
            output(&post, flags.format)
        }
        PostCommands::Delete { id } => {
            let actor = ctx.actor()?;
            ctx.service
                .delete_post(PostId(*id), &actor, &ctx.cancel)
                .await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        PostCommands::List => {
            let posts = ctx.service.list_posts().await?;
            output(&posts, flags.format)
        }
    }
}
