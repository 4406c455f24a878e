//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write as _};
use std::path::Path;

use anyhow::{Context, anyhow};
use serde_json::{Value, json};
use technitium_config::CliSettings;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

const KEY: &str = "\x1b[34m";
const STRING: &str = "\x1b[32m";
const NUMBER: &str = "\x1b[33m";
const LITERAL: &str = "\x1b[35m";
const RESET: &str = "\x1b[0m";

/// Renders command results according to `--output` and the `[cli]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Renderer {
    format: OutputFormat,
    pretty: bool,
    color: bool,
}

impl Renderer {
    pub(crate) const fn new(format: OutputFormat, pretty: bool, color: bool) -> Self {
        Self {
            format,
            pretty,
            color,
        }
    }

    /// Flag wins over `cli.defaultOutputFormat`; colour only applies on a
    /// terminal.
    pub(crate) fn from_settings(settings: &CliSettings, flag: Option<OutputFormat>) -> Self {
        Self::for_stdout(settings, flag, io::stdout().is_terminal())
    }

    fn for_stdout(settings: &CliSettings, flag: Option<OutputFormat>, terminal: bool) -> Self {
        let format = flag.unwrap_or_else(|| {
            OutputFormat::from_config(&settings.default_output_format).unwrap_or_else(|| {
                tracing::warn!(
                    value = %settings.default_output_format,
                    "unknown cli.defaultOutputFormat; using json"
                );
                OutputFormat::Json
            })
        });
        let color = settings.colorize_json && terminal && format == OutputFormat::Json;
        Self::new(format, settings.pretty_print_json, color)
    }

    pub(crate) fn render(&self, value: &Value) -> CliResult<String> {
        match self.format {
            OutputFormat::Json if self.color => {
                let mut out = String::new();
                write_colored(&mut out, value, self.pretty, 0);
                Ok(out)
            }
            OutputFormat::Json => {
                let text = if self.pretty {
                    serde_json::to_string_pretty(value)
                } else {
                    serde_json::to_string(value)
                };
                text.map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
            }
            OutputFormat::Table => Ok(render_table(value)),
        }
    }

    pub(crate) fn value(&self, value: &Value) -> CliResult<()> {
        println!("{}", self.render(value)?);
        Ok(())
    }

    /// Confirmation for commands with no payload.
    pub(crate) fn done(&self, message: &str) -> CliResult<()> {
        match self.format {
            OutputFormat::Json => self.value(&json!({ "status": "ok", "message": message })),
            OutputFormat::Table => {
                println!("{message}");
                Ok(())
            }
        }
    }
}

/// Write `bytes` to `target`, or stdout when no file is given.
pub(crate) fn write_raw(bytes: &[u8], target: Option<&Path>) -> CliResult<()> {
    match target {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))
            .map_err(CliError::failure),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .context("failed to write to stdout")
                .map_err(CliError::failure)
        }
    }
}

/// Plain-text rendering: scalar fields as `key: value`, arrays of objects as
/// aligned columns.
pub(crate) fn render_table(value: &Value) -> String {
    match value {
        Value::Array(items) => render_rows(items),
        Value::Object(map) => {
            let mut blocks = Vec::with_capacity(map.len());
            for (key, item) in map {
                match item {
                    Value::Array(rows) if rows.iter().any(Value::is_object) => {
                        blocks.push(format!("{key}:\n{}", render_rows(rows)));
                    }
                    other => blocks.push(format!("{key}: {}", cell(other))),
                }
            }
            blocks.join("\n")
        }
        scalar => cell(scalar),
    }
}

fn render_rows(items: &[Value]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    if !items.iter().all(Value::is_object) {
        return items.iter().map(cell).collect::<Vec<_>>().join("\n");
    }

    let mut columns: Vec<&str> = Vec::new();
    for item in items {
        if let Some(map) = item.as_object() {
            for key in map.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }
    }

    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|column| item.get(*column).map_or_else(String::new, cell))
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(ToString::to_string).collect();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let mut line = String::new();
        for (index, value) in row.iter().enumerate() {
            if index > 0 {
                line.push_str("  ");
            }
            let _ = write!(line, "{value:<width$}", width = widths[index]);
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line.trim_end());
    }
    out
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn paint(out: &mut String, color: &str, text: &str) {
    out.push_str(color);
    out.push_str(text);
    out.push_str(RESET);
}

fn newline(out: &mut String, pretty: bool, depth: usize) {
    if pretty {
        out.push('\n');
        out.push_str(&"  ".repeat(depth));
    }
}

fn write_colored(out: &mut String, value: &Value, pretty: bool, depth: usize) {
    match value {
        Value::Null => paint(out, LITERAL, "null"),
        Value::Bool(flag) => paint(out, LITERAL, if *flag { "true" } else { "false" }),
        Value::Number(number) => paint(out, NUMBER, &number.to_string()),
        Value::String(_) => paint(out, STRING, &value.to_string()),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                newline(out, pretty, depth + 1);
                write_colored(out, item, pretty, depth + 1);
            }
            newline(out, pretty, depth);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push('{');
            for (index, (key, item)) in map.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                newline(out, pretty, depth + 1);
                paint(out, KEY, &Value::String(key.clone()).to_string());
                out.push_str(if pretty { ": " } else { ":" });
                write_colored(out, item, pretty, depth + 1);
            }
            newline(out, pretty, depth);
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use technitium_config::defaults;

    #[test]
    fn rows_render_as_aligned_columns() {
        let value = json!([
            {"name": "a", "type": "Primary"},
            {"name": "bb", "type": "Forwarder"},
        ]);
        assert_eq!(
            render_table(&value),
            "name  type\na     Primary\nbb    Forwarder"
        );
    }

    #[test]
    fn objects_render_scalars_and_nested_rows() {
        let value = json!({
            "pageNumber": 1,
            "zones": [{"disabled": false, "name": "example.com"}],
        });
        let rendered = render_table(&value);
        assert!(rendered.contains("pageNumber: 1"));
        assert!(rendered.contains("zones:\ndisabled  name"));
        assert!(rendered.contains("false     example.com"));
    }

    #[test]
    fn empty_and_scalar_lists() {
        assert_eq!(render_table(&json!([])), "(none)");
        assert_eq!(render_table(&json!(["a", null])), "a\n-");
        assert_eq!(render_table(&json!("plain")), "plain");
    }

    #[test]
    fn json_respects_pretty_flag() -> CliResult<()> {
        let value = json!({"a": 1});
        assert_eq!(
            Renderer::new(OutputFormat::Json, false, false).render(&value)?,
            r#"{"a":1}"#
        );
        assert_eq!(
            Renderer::new(OutputFormat::Json, true, false).render(&value)?,
            "{\n  \"a\": 1\n}"
        );
        Ok(())
    }

    #[test]
    fn colored_output_wraps_tokens() -> CliResult<()> {
        let rendered =
            Renderer::new(OutputFormat::Json, false, true).render(&json!({"ok": true}))?;
        assert_eq!(
            rendered,
            format!("{{{KEY}\"ok\"{RESET}:{LITERAL}true{RESET}}}")
        );
        Ok(())
    }

    #[test]
    fn flag_overrides_configured_format() {
        let mut settings = defaults::embedded().cli;
        settings.default_output_format = "table".into();
        assert_eq!(
            Renderer::from_settings(&settings, None).format,
            OutputFormat::Table
        );
        assert_eq!(
            Renderer::from_settings(&settings, Some(OutputFormat::Json)).format,
            OutputFormat::Json
        );
        settings.default_output_format = "yaml".into();
        assert_eq!(
            Renderer::from_settings(&settings, None).format,
            OutputFormat::Json
        );
    }

    #[test]
    fn colour_needs_a_terminal() -> CliResult<()> {
        let mut settings = defaults::embedded().cli;
        settings.colorize_json = true;
        settings.default_output_format = "json".into();

        let piped = Renderer::for_stdout(&settings, None, false);
        assert!(!piped.color);
        assert!(!piped.render(&json!({"ok": true}))?.contains('\x1b'));

        assert!(Renderer::for_stdout(&settings, None, true).color);
        assert!(!Renderer::for_stdout(&settings, Some(OutputFormat::Table), true).color);
        Ok(())
    }

    #[test]
    fn raw_output_goes_to_the_named_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("zone.txt");
        write_raw(b"$ORIGIN example.com.\n", Some(&path))
            .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(std::fs::read_to_string(&path)?, "$ORIGIN example.com.\n");
        Ok(())
    }
}
