use mh_core::enums::WeekStatus;
use mh_core::ids::{HouseId, HouseWeekInfoId};
use mh_core::requests::{CreateWeekInfoRequest, UpdateWeekInfoRequest};
use mh_core::responses::WeekDetailResponse;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::WeekCommands;
use crate::commands::shared::parse::{parse_date, parse_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `mh week`.
pub async fn handle(action: &WeekCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        WeekCommands::Create {
            house,
            start,
            status,
            on_time,
        } => {
            let request = CreateWeekInfoRequest {
                house_id: HouseId::new(house.as_str()),
                start_date: parse_date(start, "start")?,
                status: parse_enum::<WeekStatus>(status, "status")?,
                on_time: *on_time,
            };
            let actor = ctx.actor()?;
            let week = ctx
                .service
                .create_week_info(request, &actor, &ctx.cancel)
                .await?;
            output(&week, flags.format)
        }
        WeekCommands::Update {
            id,
            start,
            status,
            on_time,
        } => {
            let actor = ctx.actor()?;
            let current = ctx.service.get_week_info(HouseWeekInfoId(*id)).await?;
            let request = UpdateWeekInfoRequest {
                id: HouseWeekInfoId(*id),
                start_date: match start {
                    Some(value) => parse_date(value, "start")?,
                    None => current.start_date,
                },
                status: match status {
                    Some(value) => parse_enum::<WeekStatus>(value, "status")?,
                    None => current.status,
                },
                on_time: on_time.unwrap_or(current.on_time),
            };
            let week = ctx
                .service
                .update_week_info(request, &actor, &ctx.cancel)
                .await?;
            output(&week, flags.format)
        }
        WeekCommands::Delete { id } => {
            let actor = ctx.actor()?;
            ctx.service
                .delete_week_info(HouseWeekInfoId(*id), &actor, &ctx.cancel)
                .await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        WeekCommands::Get { id } => {
            let week = ctx.service.get_week_info(HouseWeekInfoId(*id)).await?;
            let marks = ctx
                .service
                .list_week_marks_for_week(HouseWeekInfoId(*id))
                .await?;
            output(&WeekDetailResponse { week, marks }, flags.format)
        }
        WeekCommands::List { house } => {
            let weeks = ctx
                .service
                .list_week_infos_for_house(&HouseId::new(house.as_str()))
                .await?;
            output(&weeks, flags.format)
        }
    }
}
