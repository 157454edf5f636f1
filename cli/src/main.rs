//! CLI entrypoint for toolrelay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolrelay_application::{
    ChatObserver, ConversationLogger, ConversationLoop, LlmGateway, ProviderGroup,
};
use toolrelay_infrastructure::config::Severity;
use toolrelay_infrastructure::{
    BedrockGateway, ConfigLoader, FileConfig, JsonlConversationLogger, McpToolProvider,
};
use toolrelay_presentation::{ChatRepl, Cli, ConsoleReporter};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// SDK crates that are noisy below warn
const QUIET_TARGETS: &[&str] = &["aws_config", "aws_smithy_runtime", "aws_sdk", "hyper", "h2"];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };
    apply_overrides(&cli, &mut config);

    let _log_guard = init_logging(cli.verbose, config.logging.log_file.as_deref())?;
    info!("Starting toolrelay");

    let mut has_errors = false;
    for issue in config.validate() {
        match issue.severity {
            Severity::Warning => ConsoleReporter::print_warning(&issue.message),
            Severity::Error => {
                ConsoleReporter::print_error(&issue.message);
                has_errors = true;
            }
        }
    }
    if has_errors {
        bail!("Configuration is invalid");
    }
    let servers = config.server_configs().map_err(|e| anyhow!(e))?;

    // === Dependency Injection ===
    let reporter = Arc::new(ConsoleReporter::new(!cli.quiet));
    let gateway: Arc<dyn LlmGateway> =
        Arc::new(BedrockGateway::new(config.model.to_bedrock_config()).await);
    let transcript: Option<Arc<dyn ConversationLogger>> = match &config.logging.transcript {
        Some(path) => Some(Arc::new(JsonlConversationLogger::open(path).with_context(
            || format!("Failed to open transcript {}", path.display()),
        )?)),
        None => None,
    };

    // Servers are started before the first message and stopped after the last
    let group = ProviderGroup::open_with_observer(
        McpToolProvider::from_configs(&servers),
        reporter.clone(),
    )
    .await?;

    let outcome = tokio::select! {
        result = run_session(&cli, &config, &group, gateway, reporter, transcript) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, shutting down tool servers");
            Ok(())
        }
    };

    let report = group.close().await;
    for (provider, error) in &report.failures {
        ConsoleReporter::print_warning(&format!("Failed to stop '{}': {}", provider, error));
    }
    info!(
        stopped = report.stopped.len(),
        failed = report.failures.len(),
        "Tool servers stopped"
    );

    outcome
}

async fn run_session(
    cli: &Cli,
    config: &FileConfig,
    group: &ProviderGroup,
    gateway: Arc<dyn LlmGateway>,
    observer: Arc<dyn ChatObserver>,
    transcript: Option<Arc<dyn ConversationLogger>>,
) -> Result<()> {
    let mut chat = ConversationLoop::new(group, gateway, config.chat.to_chat_params())
        .with_observer(observer);
    if let Some(logger) = transcript {
        chat = chat.with_conversation_logger(logger);
    }

    if cli.chat {
        ChatRepl::new().run(&mut chat).await?;
        return Ok(());
    }

    let utterances = if cli.utterances.is_empty() {
        &config.chat.utterances
    } else {
        &cli.utterances
    };
    if utterances.is_empty() {
        bail!("No utterances to send. Pass some as arguments or use --chat.");
    }

    chat.run(utterances).await?;
    Ok(())
}

fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(model) = &cli.model {
        config.model.model_id = model.clone();
    }
    if let Some(region) = &cli.region {
        config.model.region = region.clone();
    }
    if let Some(path) = &cli.transcript {
        config.logging.transcript = Some(path.clone());
    }
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over `-v` when set. The returned guard flushes the log
/// file writer and must be held until exit.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if verbose < 3 {
        for target in QUIET_TARGETS {
            filter = filter.add_directive(format!("{}=warn", target).parse()?);
        }
    }

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(name)))
}
