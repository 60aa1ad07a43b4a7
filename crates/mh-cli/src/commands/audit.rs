use mh_core::enums::AuditOperation;
use mh_core::responses::AuditResponse;
use mh_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mh audit`.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = build_filter(args, flags.limit, ctx.config.general.default_limit)?;
    let records = ctx.service.query_audit(&filter).await?;
    let responses: Vec<AuditResponse> = records.into_iter().map(Into::into).collect();
    output(&responses, flags.format)
}

fn build_filter(
    args: &AuditArgs,
    limit: Option<u32>,
    default_limit: u32,
) -> anyhow::Result<AuditFilter> {
    Ok(AuditFilter {
        table_name: args.table.clone(),
        record_id: args.record.clone(),
        operation: args
            .operation
            .as_deref()
            .map(parse_operation)
            .transpose()?,
        change_author_id: args.author.clone(),
        limit: Some(limit.unwrap_or(default_limit)),
    })
}

/// Operations are stored capitalized; accept any casing on the command line.
fn parse_operation(raw: &str) -> anyhow::Result<AuditOperation> {
    let mut chars = raw.chars();
    let normalized = chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    });
    normalized
        .parse()
        .map_err(|error| anyhow::anyhow!("invalid operation '{raw}': {error}"))
}
