use mh_core::ids::{HouseId, HouseWeekInfoId};
use mh_core::responses::AuditResponse;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::HistoryCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mh history`.
pub async fn handle(
    action: &HistoryCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let records = match action {
        HistoryCommands::Full { house } => {
            ctx.service.get_full_history(&HouseId::new(house.as_str())).await?
        }
        HistoryCommands::House { house } => {
            ctx.service.get_root_history(&HouseId::new(house.as_str())).await?
        }
        HistoryCommands::Week { id } => {
            ctx.service
                .get_sub_entity_history(HouseWeekInfoId(*id))
                .await?
        }
    };

    let responses: Vec<AuditResponse> = records.into_iter().map(Into::into).collect();
    output(&responses, flags.format)
}
