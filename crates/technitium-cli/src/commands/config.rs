use anyhow::anyhow;
use serde_json::json;
use technitium_config::{ConfigStore, Configuration};

use crate::cli::ConfigCommand;
use crate::client::{CliError, CliResult};
use crate::output::Renderer;

pub(crate) fn handle_config(
    renderer: &Renderer,
    config: &Configuration,
    store: Option<&ConfigStore>,
    command: ConfigCommand,
) -> CliResult<()> {
    match command {
        ConfigCommand::Show => {
            let value = serde_json::to_value(config.redacted())
                .map_err(|err| CliError::failure(anyhow!("failed to serialize config: {err}")))?;
            renderer.value(&value)
        }
        ConfigCommand::Path => {
            let store = store.ok_or_else(|| {
                CliError::validation("no configuration home found; pass --config <PATH>")
            })?;
            renderer.value(&json!({ "path": store.path().display().to_string() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use technitium_config::defaults;

    fn renderer() -> Renderer {
        Renderer::new(OutputFormat::Json, false, false)
    }

    #[test]
    fn show_masks_secrets() -> anyhow::Result<()> {
        let mut config = defaults::embedded();
        config.auth.token = Some("secret-token".into());
        let value = serde_json::to_value(config.redacted())?;
        let rendered = renderer()
            .render(&value)
            .map_err(|err| anyhow!(err.display_message()))?;
        assert!(!rendered.contains("secret-token"));

        handle_config(&renderer(), &config, None, ConfigCommand::Show)
            .map_err(|err| anyhow!(err.display_message()))?;
        Ok(())
    }

    #[test]
    fn path_requires_a_store() {
        let err = handle_config(
            &renderer(),
            &defaults::embedded(),
            None,
            ConfigCommand::Path,
        )
        .expect_err("no store");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn path_prints_store_location() {
        let store = ConfigStore::new("/tmp/technitium-test/config.toml");
        handle_config(
            &renderer(),
            &defaults::embedded(),
            Some(&store),
            ConfigCommand::Path,
        )
        .expect("path renders");
    }
}
