//! CLI entrypoint for toolbridge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use toolbridge_application::ToolSchemaPort;
use toolbridge_infrastructure::config::FileLogConfig;
use toolbridge_infrastructure::{
    AdapterKind, ConfigLoader, FileConfig, JsonSchemaToolConverter, McpServer, build_adapter,
    catalogue,
};
use toolbridge_presentation::{AdapterArg, Cli, Command, ConsoleFormatter, SourceRow};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Grace period for blocking tasks at shutdown; a pending stdin read never finishes.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    let _log_guard = init_logging(cli.verbose, &config.log)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(cli, config));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn run(cli: Cli, config: FileConfig) -> Result<()> {
    match cli.command {
        Command::Serve { adapter } => serve(adapter_kind(adapter), &config).await,
        Command::Tools { adapter, json } => {
            let kind = adapter_kind(adapter);
            let tools = catalogue(kind);
            if json {
                let descriptors: Vec<_> = tools
                    .iter()
                    .map(|tool| JsonSchemaToolConverter.describe(tool))
                    .collect();
                println!("{}", ConsoleFormatter::format_json(&descriptors));
            } else {
                print!("{}", ConsoleFormatter::format_catalogue(kind.label(), &tools));
            }
            Ok(())
        }
        Command::Config => {
            if cli.no_config {
                println!("Configuration files disabled (--no-config); using defaults.");
            } else {
                let sources: Vec<SourceRow> = ConfigLoader::sources(cli.config.as_deref())
                    .into_iter()
                    .map(|source| SourceRow {
                        label: source.label.to_string(),
                        location: source.location,
                        found: source.found,
                    })
                    .collect();
                print!("{}", ConsoleFormatter::format_sources(&sources));
            }
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn serve(kind: AdapterKind, config: &FileConfig) -> Result<()> {
    info!("Starting toolbridge {} adapter", kind);

    // Credentials are checked here; a missing one ends the process with exit 1.
    let adapter = build_adapter(kind, config)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            interrupt.cancel();
        }
    });

    McpServer::new(adapter).serve_stdio(cancel).await?;
    info!("Server stopped");
    Ok(())
}

fn adapter_kind(arg: AdapterArg) -> AdapterKind {
    match arg {
        AdapterArg::Kv => AdapterKind::Kv,
        AdapterArg::Npm => AdapterKind::Npm,
        AdapterArg::Github => AdapterKind::Github,
        AdapterArg::Slack => AdapterKind::Slack,
    }
}

/// Install the tracing subscriber. Stdout carries the protocol, so logs go
/// to stderr or to `log.file`.
fn init_logging(verbose: u8, log: &FileLogConfig) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 if std::env::var_os("RUST_LOG").is_some() => EnvFilter::from_default_env(),
        0 => EnvFilter::try_new(log.level.as_deref().unwrap_or("warn"))?,
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &log.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("log.file has no file name: {}", file))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            builder.with_writer(writer).with_ansi(false).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}
