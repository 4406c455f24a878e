use technitium_api::{ResolveQuery, StatsRange};

use crate::cli::{LogsCommand, ResolveArgs, StatsArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::write_raw;

pub(crate) async fn handle_stats(ctx: &AppContext, args: StatsArgs) -> CliResult<()> {
    let range = stats_range(args)?;
    let stats = ctx.api.dashboard_stats(range).await?;
    ctx.renderer.value(&stats)
}

pub(crate) async fn handle_logs(ctx: &AppContext, command: LogsCommand) -> CliResult<()> {
    match command {
        LogsCommand::List => {
            let logs = ctx.api.list_logs().await?;
            ctx.renderer.value(&logs)
        }
        LogsCommand::Download { name, output_file } => {
            let bytes = ctx.api.download_log(&name).await?;
            write_raw(&bytes, output_file.as_deref())
        }
    }
}

pub(crate) async fn handle_resolve(ctx: &AppContext, args: ResolveArgs) -> CliResult<()> {
    let query = ResolveQuery {
        domain: args.domain,
        record_type: args.record_type,
        server: args.server,
        protocol: args.protocol,
        dnssec: args.dnssec,
    };
    let answer = ctx.api.resolve_dns(&query).await?;
    ctx.renderer.value(&answer)
}

pub(crate) async fn handle_settings(ctx: &AppContext) -> CliResult<()> {
    let settings = ctx.api.get_settings().await?;
    ctx.renderer.value(&settings)
}

fn stats_range(args: StatsArgs) -> CliResult<StatsRange> {
    match (args.start, args.end) {
        (Some(start), Some(end)) => Ok(StatsRange::Custom { start, end }),
        (None, None) => StatsRange::parse(&args.range).ok_or_else(|| {
            CliError::validation(format!(
                "unknown range '{}'; expected hour, day, week, month or year",
                args.range
            ))
        }),
        _ => Err(CliError::validation(
            "--start and --end must be supplied together",
        )),
    }
}
