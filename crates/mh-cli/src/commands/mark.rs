use mh_core::enums::MarkType;
use mh_core::ids::{HouseWeekInfoId, WeekMarkId};
use mh_core::requests::{CreateWeekMarkRequest, UpdateWeekMarkRequest};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::MarkCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mh mark`.
pub async fn handle(action: &MarkCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        MarkCommands::Create {
            week,
            mark_type,
            comment,
        } => {
            let request = CreateWeekMarkRequest {
                house_week_info_id: HouseWeekInfoId(*week),
                mark_type: parse_enum::<MarkType>(mark_type, "type")?,
                comment: comment.clone(),
            };
            let actor = ctx.actor()?;
            let mark = ctx
                .service
                .create_week_mark(request, &actor, &ctx.cancel)
                .await?;
            output(&mark, flags.format)
        }
        MarkCommands::Update {
            id,
            mark_type,
            comment,
        } => {
            let actor = ctx.actor()?;
            let current = ctx.service.get_week_mark(WeekMarkId(*id)).await?;
            let request = UpdateWeekMarkRequest {
                id: WeekMarkId(*id),
                mark_type: mark_type
                    .as_deref()
                    .map(|value| parse_enum::<MarkType>(value, "type"))
                    .transpose()?
                    .unwrap_or(current.mark_type),
                comment: comment.clone().unwrap_or(current.comment),
            };
            let mark = ctx
                .service
                .update_week_mark(request, &actor, &ctx.cancel)
                .await?;
            output(&mark, flags.format)
        }
        MarkCommands::Delete { id } => {
            let actor = ctx.actor()?;
            ctx.service
                .delete_week_mark(WeekMarkId(*id), &actor, &ctx.cancel)
                .await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
