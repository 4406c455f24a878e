use technitium_api::{RecordQuery, RecordSpec};

use crate::cli::{RecordArgs, RecordsCommand};
use crate::client::{AppContext, CliError, CliResult};

pub(crate) async fn handle_records(ctx: &AppContext, command: RecordsCommand) -> CliResult<()> {
    match command {
        RecordsCommand::Get {
            domain,
            zone,
            list_zone,
        } => {
            let query = RecordQuery {
                domain,
                zone,
                list_zone,
            };
            let records = ctx.api.get_records(&query).await?;
            ctx.renderer.value(&records)
        }
        RecordsCommand::Add(args) => {
            let record = record_spec(args)?;
            let added = ctx.api.add_record(&record).await?;
            ctx.renderer.value(&added)
        }
        RecordsCommand::Delete(args) => {
            let record = record_spec(args)?;
            ctx.api.delete_record(&record).await?;
            ctx.renderer.done(&format!(
                "{} record deleted from {}",
                record.record_type, record.domain
            ))
        }
    }
}

fn record_spec(args: RecordArgs) -> CliResult<RecordSpec> {
    let record_type = args.record_type.trim().to_ascii_uppercase();
    if record_type.is_empty() {
        return Err(CliError::validation("--type cannot be empty"));
    }
    Ok(RecordSpec {
        domain: args.domain,
        zone: args.zone,
        record_type,
        ttl: args.ttl,
        data: args.data,
    })
}
