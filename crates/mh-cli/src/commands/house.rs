use mh_core::enums::HouseStatus;
use mh_core::ids::{HouseId, PostId};
use mh_core::requests::{CreateHouseRequest, UpdateHouseRequest};
use mh_core::responses::HouseDetailResponse;
use mh_core::values::DateSpan;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::HouseCommands;
use crate::commands::shared::parse::{parse_date, parse_enum, parse_opt_date};
use crate::context::AppContext;
use crate::output::output;

/// Handle `mh house`.
#[allow(clippy::too_many_lines)]
pub async fn handle(action: &HouseCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        HouseCommands::Create {
            id,
            length,
            width,
            x,
            y,
            state,
            start,
            end,
            brigade,
            post,
        } => {
            let request = CreateHouseRequest {
                id: HouseId::new(id.as_str()),
                length: *length,
                width: *width,
                top_left_corner_x: *x,
                top_left_corner_y: *y,
                current_state: parse_enum::<HouseStatus>(state, "state")?,
                official_start_date: parse_date(start, "start")?,
                official_end_date: parse_opt_date(end.as_deref(), "end")?,
                brigade: brigade.clone(),
                post_ids: post.iter().copied().map(PostId).collect(),
            };
            let actor = ctx.actor()?;
            let house = ctx
                .service
                .create_house(request, &actor, &ctx.cancel)
                .await?;
            output(&house, flags.format)
        }
        HouseCommands::Update {
            id,
            length,
            width,
            x,
            y,
            state,
            start,
            end,
            real_start,
            real_end,
            brigade,
            post,
        } => {
            let actor = ctx.actor()?;
            let house_id = HouseId::new(id.as_str());
            let current = ctx.service.get_house(&house_id).await?;
            let post_ids = match post {
                Some(ids) => ids.iter().copied().map(PostId).collect(),
                None => ctx
                    .service
                    .list_house_posts(&house_id)
                    .await?
                    .into_iter()
                    .map(|link| link.post_id)
                    .collect(),
            };

            let request = UpdateHouseRequest {
                id: house_id,
                length: length.unwrap_or(current.length),
                width: width.unwrap_or(current.width),
                top_left_corner_x: x.unwrap_or(current.top_left_corner_x),
                top_left_corner_y: y.unwrap_or(current.top_left_corner_y),
                current_state: match state {
                    Some(value) => parse_enum::<HouseStatus>(value, "state")?,
                    None => current.current_state,
                },
                official_start_date: match start {
                    Some(value) => parse_date(value, "start")?,
                    None => current.official_start_date,
                },
                official_end_date: parse_opt_date(end.as_deref(), "end")?
                    .or(current.official_end_date),
                real_start_date: parse_opt_date(real_start.as_deref(), "real-start")?
                    .or(current.real_start_date),
                real_end_date: parse_opt_date(real_end.as_deref(), "real-end")?
                    .or(current.real_end_date),
                brigade: brigade.clone().unwrap_or(current.brigade),
                post_ids,
            };
            let house = ctx
                .service
                .update_house(request, &actor, &ctx.cancel)
                .await?;
            output(&house, flags.format)
        }
        HouseCommands::Delete { id } => {
            let actor = ctx.actor()?;
            ctx.service
                .delete_house(&HouseId::new(id.as_str()), &actor, &ctx.cancel)
                .await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        HouseCommands::Get { id } => {
            let house_id = HouseId::new(id.as_str());
            let house = ctx.service.get_house(&house_id).await?;
            let posts = ctx.service.list_posts_for_house(&house_id).await?;
            let weeks = ctx.service.list_week_infos_for_house(&house_id).await?;
            output(&HouseDetailResponse { house, posts, weeks }, flags.format)
        }
        HouseCommands::List { state, from, to } => {
            let state = state
                .as_deref()
                .map(|value| parse_enum::<HouseStatus>(value, "state"))
                .transpose()?;
            let houses = match (from, state) {
                (Some(from), state) => {
                    let span = DateSpan::new(
                        parse_date(from, "from")?,
                        parse_opt_date(to.as_deref(), "to")?,
                    )?;
                    let mut houses = ctx.service.list_houses_in_range(span).await?;
                    if let Some(state) = state {
                        houses.retain(|house| house.current_state == state);
                    }
                    houses
                }
                (None, Some(state)) => ctx.service.list_houses_by_state(state).await?,
                (None, None) => ctx.service.list_houses().await?,
            };
            output(&houses, flags.format)
        }
    }
}
