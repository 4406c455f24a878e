use anyhow::Context;

use crate::cli::ZonesCommand;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::write_raw;

pub(crate) async fn handle_zones(ctx: &AppContext, command: ZonesCommand) -> CliResult<()> {
    match command {
        ZonesCommand::List => {
            let zones = ctx.api.list_zones().await?;
            ctx.renderer.value(&zones)
        }
        ZonesCommand::Create { zone, zone_type } => {
            let created = ctx.api.create_zone(&zone, zone_type.as_deref()).await?;
            ctx.renderer.value(&created)
        }
        ZonesCommand::Delete { zone } => {
            ctx.api.delete_zone(&zone).await?;
            ctx.renderer.done(&format!("zone {zone} deleted"))
        }
        ZonesCommand::Enable { zone } => {
            ctx.api.enable_zone(&zone).await?;
            ctx.renderer.done(&format!("zone {zone} enabled"))
        }
        ZonesCommand::Disable { zone } => {
            ctx.api.disable_zone(&zone).await?;
            ctx.renderer.done(&format!("zone {zone} disabled"))
        }
        ZonesCommand::Export { zone, output_file } => {
            let text = ctx.api.export_zone(&zone).await?;
            write_raw(text.as_bytes(), output_file.as_deref())
        }
        ZonesCommand::Import {
            zone,
            file,
            overwrite,
        } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))
                .map_err(CliError::failure)?;
            if text.trim().is_empty() {
                return Err(CliError::validation(format!(
                    "{} is empty; nothing to import",
                    file.display()
                )));
            }
            ctx.api.import_zone(&zone, text, overwrite).await?;
            ctx.renderer.done(&format!("zone {zone} imported"))
        }
    }
}
