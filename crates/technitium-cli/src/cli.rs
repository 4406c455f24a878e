//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use technitium_config::{ConfigResolver, ConfigStore, Resolution};
use technitium_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult, apply_overrides};
use crate::commands::{auth, call, config, lists, records, server, zones};
use crate::output::Renderer;

/// Parses CLI arguments, executes the requested command, and reports
/// failures on stderr. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let trace_id = Uuid::new_v4().to_string();

    let logging = LoggingConfig {
        level: &cli.global.log_level,
        format: cli.global.log_format.unwrap_or_else(LogFormat::infer),
    };
    if let Err(err) = init_logging(&logging) {
        let err = CliError::validation(format!("failed to initialise logging: {err}"));
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }
    tracing::debug!(
        %trace_id,
        version = env!("CARGO_PKG_VERSION"),
        command = command_label(&cli.command),
        "starting"
    );

    match dispatch(cli, &trace_id).await {
        Ok(()) => 0,
        Err(err) => {
            tracing::debug!(%trace_id, exit_code = err.exit_code(), "command failed");
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let store = cli.global.config.clone().map(ConfigStore::new);
    let resolver = ConfigResolver::from_env(store);
    let Resolution { mut config, .. } = resolver.resolve_with_diagnostics();
    let store = resolver.store().cloned();

    match cli.command {
        Command::Endpoints => {
            let renderer = Renderer::from_settings(&config.cli, cli.global.output);
            return call::handle_endpoints(&renderer);
        }
        Command::Config(command) => {
            apply_overrides(&mut config, &cli.global);
            let renderer = Renderer::from_settings(&config.cli, cli.global.output);
            return config::handle_config(&renderer, &config, store.as_ref(), command);
        }
        _ => {}
    }

    let mut ctx = AppContext::new(config, store, &cli.global, trace_id)?;
    match cli.command {
        Command::Login(args) => auth::handle_login(&mut ctx, args).await,
        Command::Logout => auth::handle_logout(&mut ctx).await,
        Command::Session => auth::handle_session(&ctx).await,
        Command::Zones(command) => zones::handle_zones(&ctx, command).await,
        Command::Records(command) => records::handle_records(&ctx, command).await,
        Command::Cache(command) => lists::handle_cache(&ctx, command).await,
        Command::Allowed(command) => {
            lists::handle_domain_list(&ctx, technitium_api::DomainList::Allowed, command).await
        }
        Command::Blocked(command) => {
            lists::handle_domain_list(&ctx, technitium_api::DomainList::Blocked, command).await
        }
        Command::Stats(args) => server::handle_stats(&ctx, args).await,
        Command::Logs(command) => server::handle_logs(&ctx, command).await,
        Command::Resolve(args) => server::handle_resolve(&ctx, args).await,
        Command::Settings => server::handle_settings(&ctx).await,
        Command::Call(args) => call::handle_call(&ctx, args).await,
        Command::Endpoints | Command::Config(_) => Ok(()),
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Logout => "logout",
        Command::Session => "session",
        Command::Zones(_) => "zones",
        Command::Records(_) => "records",
        Command::Cache(_) => "cache",
        Command::Allowed(_) => "allowed",
        Command::Blocked(_) => "blocked",
        Command::Stats(_) => "stats",
        Command::Logs(_) => "logs",
        Command::Resolve(_) => "resolve",
        Command::Settings => "settings",
        Command::Endpoints => "endpoints",
        Command::Config(_) => "config",
        Command::Call(_) => "call",
    }
}

#[derive(Parser)]
#[command(
    name = "technitium",
    version,
    about = "Command-line client for the Technitium DNS Server HTTP API"
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct GlobalArgs {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Configuration file to use instead of the platform default"
    )]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override api.baseUrl")]
    pub(crate) base_url: Option<String>,
    #[arg(long, global = true, help = "Session or API token for this invocation")]
    pub(crate) token: Option<String>,
    #[arg(long, global = true, help = "Override api.timeoutMs")]
    pub(crate) timeout_ms: Option<u64>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        help = "Select output format; defaults to cli.defaultOutputFormat"
    )]
    pub(crate) output: Option<OutputFormat>,
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(long, global = true, value_parser = parse_log_format)]
    pub(crate) log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Log in and store the session token.
    Login(LoginArgs),
    /// End the session and forget the stored token.
    Logout,
    /// Show the current session.
    Session,
    /// Manage zones.
    #[command(subcommand)]
    Zones(ZonesCommand),
    /// Manage records within a zone.
    #[command(subcommand)]
    Records(RecordsCommand),
    /// Inspect or flush the resolver cache.
    #[command(subcommand)]
    Cache(CacheCommand),
    /// Manage the allowed domain list.
    #[command(subcommand)]
    Allowed(DomainListCommand),
    /// Manage the blocked domain list.
    #[command(subcommand)]
    Blocked(DomainListCommand),
    /// Dashboard statistics.
    Stats(StatsArgs),
    /// Server log files.
    #[command(subcommand)]
    Logs(LogsCommand),
    /// Resolve a name through the server.
    Resolve(ResolveArgs),
    /// Show server settings.
    Settings,
    /// List every known endpoint identifier.
    Endpoints,
    /// Inspect the local configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Invoke any endpoint by identifier.
    Call(CallArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct LoginArgs {
    #[arg(long, short = 'u', help = "Defaults to auth.username")]
    pub(crate) username: Option<String>,
    #[arg(long, short = 'p', help = "Defaults to auth.password; prompted when absent")]
    pub(crate) password: Option<String>,
    #[arg(long, help = "Two-factor code")]
    pub(crate) totp: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ZonesCommand {
    List,
    Create {
        zone: String,
        #[arg(long = "type", value_name = "TYPE")]
        zone_type: Option<String>,
    },
    Delete {
        zone: String,
    },
    Enable {
        zone: String,
    },
    Disable {
        zone: String,
    },
    Export {
        zone: String,
        #[arg(long, value_name = "PATH")]
        output_file: Option<PathBuf>,
    },
    Import {
        zone: String,
        #[arg(value_name = "PATH")]
        file: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum RecordsCommand {
    Get {
        domain: String,
        #[arg(long)]
        zone: Option<String>,
        #[arg(long, help = "List every record in the zone")]
        list_zone: bool,
    },
    Add(RecordArgs),
    Delete(RecordArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct RecordArgs {
    pub(crate) domain: String,
    #[arg(long = "type", value_name = "TYPE")]
    pub(crate) record_type: String,
    #[arg(long)]
    pub(crate) zone: Option<String>,
    #[arg(long)]
    pub(crate) ttl: Option<u32>,
    #[arg(
        long = "data",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Type-specific parameter, e.g. ipAddress=192.0.2.1"
    )]
    pub(crate) data: Vec<(String, String)>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum CacheCommand {
    List { domain: Option<String> },
    Delete { domain: String },
    Flush,
}

#[derive(Subcommand, Debug)]
pub(crate) enum DomainListCommand {
    List { domain: Option<String> },
    Add { domain: String },
    Delete { domain: String },
    Flush,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StatsArgs {
    #[arg(long, default_value = "hour", help = "hour, day, week, month or year")]
    pub(crate) range: String,
    #[arg(long, requires = "end", help = "Custom window start (ISO 8601)")]
    pub(crate) start: Option<String>,
    #[arg(long, requires = "start", help = "Custom window end (ISO 8601)")]
    pub(crate) end: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum LogsCommand {
    List,
    Download {
        name: String,
        #[arg(long, value_name = "PATH")]
        output_file: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ResolveArgs {
    pub(crate) domain: String,
    #[arg(long = "type", value_name = "TYPE")]
    pub(crate) record_type: Option<String>,
    #[arg(long)]
    pub(crate) server: Option<String>,
    #[arg(long)]
    pub(crate) protocol: Option<String>,
    #[arg(long)]
    pub(crate) dnssec: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ConfigCommand {
    /// Print the resolved configuration with secrets masked.
    Show,
    /// Print the configuration file location.
    Path,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CallArgs {
    pub(crate) endpoint: String,
    #[arg(
        long = "query",
        short = 'q',
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Query parameter; repeat a key to send a list"
    )]
    pub(crate) query: Vec<(String, String)>,
    #[arg(long, value_name = "JSON")]
    pub(crate) body: Option<String>,
    #[arg(long, value_name = "METHOD")]
    pub(crate) method: Option<String>,
    #[arg(long, help = "Print the response body as received")]
    pub(crate) raw: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Json,
    Table,
}

impl OutputFormat {
    pub(crate) fn from_config(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "table" | "text" => Some(Self::Table),
            _ => None,
        }
    }
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    LogFormat::parse(input).ok_or_else(|| format!("unknown log format '{input}'"))
}

pub(crate) fn parse_key_value(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{input}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{input}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_pairs_require_a_key() {
        assert_eq!(
            parse_key_value("tag=a=b"),
            Ok(("tag".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommands() {
        let cli = Cli::try_parse_from([
            "technitium",
            "zones",
            "list",
            "--base-url",
            "http://dns.local:5380",
            "--timeout-ms",
            "9000",
            "--output",
            "table",
        ])
        .expect("parses");
        assert_eq!(cli.global.base_url.as_deref(), Some("http://dns.local:5380"));
        assert_eq!(cli.global.timeout_ms, Some(9_000));
        assert_eq!(cli.global.output, Some(OutputFormat::Table));
        assert_eq!(cli.global.log_level, DEFAULT_LOG_LEVEL);
        assert!(matches!(cli.command, Command::Zones(ZonesCommand::List)));
    }

    #[test]
    fn call_collects_repeated_queries() {
        let cli = Cli::try_parse_from([
            "technitium",
            "call",
            "zones.records.get",
            "-q",
            "tag=a",
            "--query",
            "tag=b",
            "--raw",
        ])
        .expect("parses");
        let Command::Call(args) = cli.command else {
            panic!("expected call");
        };
        assert_eq!(args.endpoint, "zones.records.get");
        assert_eq!(args.query.len(), 2);
        assert!(args.raw);
    }

    #[test]
    fn stats_custom_window_requires_both_bounds() {
        assert!(Cli::try_parse_from(["technitium", "stats", "--start", "2024-01-01"]).is_err());
        assert!(
            Cli::try_parse_from([
                "technitium",
                "stats",
                "--start",
                "2024-01-01",
                "--end",
                "2024-01-02"
            ])
            .is_ok()
        );
    }

    #[test]
    fn output_format_reads_config_names() {
        assert_eq!(OutputFormat::from_config("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_config("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_config("xml"), None);
    }

    #[test]
    fn labels_cover_commands() {
        assert_eq!(command_label(&Command::Settings), "settings");
        assert_eq!(command_label(&Command::Endpoints), "endpoints");
    }
}
