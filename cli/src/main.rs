//! CLI entrypoint for llm-debate
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use debate_application::{
    AgentRoster, DebateProgressNotifier, NoProgress, RunDebateInput, RunDebateUseCase,
};
use debate_domain::OutputFormat;
use debate_infrastructure::{
    ConfigLoader, FileArtifactWriter, FileConfig, HttpProviderFactory, JsonlDocumentStore,
    load_problems,
};
use debate_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// JSONL collections live under `{output_dir}/collections`
const COLLECTIONS_DIR: &str = "collections";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref())?;

    info!("Starting llm-debate");

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);

    for issue in config.validate().iter().filter(|i| !i.is_error()) {
        warn!("{}", issue);
    }
    let agent_configs = config.agent_configs()?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    let problems = load_problems(&config.run.problems, config.run.skip, config.run.take)?;
    if problems.is_empty() {
        bail!(
            "no problems selected from {} (skip {}, take {:?})",
            config.run.problems.display(),
            config.run.skip,
            config.run.take
        );
    }

    if cli.dry_run {
        println!(
            "Configuration OK: {} agent(s), {} problem(s), session limit {}",
            agent_configs.len(),
            problems.len(),
            config.run.sessions
        );
        return Ok(());
    }

    // === Dependency Injection ===
    let factory = HttpProviderFactory::new(config.providers.endpoints());
    let roster = AgentRoster::build(&agent_configs, &factory)?;

    let output_dir = &config.run.output_dir;
    let store = JsonlDocumentStore::new(output_dir.join(COLLECTIONS_DIR))
        .context("failed to open the document store")?;
    let artifacts = FileArtifactWriter::new(output_dir.clone());

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();

    let progress: Arc<dyn DebateProgressNotifier> = if cli.quiet {
        Arc::new(NoProgress)
    } else if config.output.show_progress {
        Arc::new(ProgressReporter::new(problems.len()))
    } else if format == OutputFormat::Json {
        // Plain progress lines would interleave with the JSON on stdout
        Arc::new(NoProgress)
    } else {
        Arc::new(SimpleProgress)
    };

    let use_case = RunDebateUseCase::new(
        roster,
        config.execution_params(),
        Arc::new(store),
        Arc::new(artifacts),
        progress,
    );

    let cancel = use_case.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted: no new sessions will start, running sessions will finish");
            cancel.cancel();
        }
    });

    let report = use_case.execute(RunDebateInput::new(problems)).await?;
    // Finish progress bars before printing the report
    drop(use_case);

    println!("{}", ConsoleFormatter::render(&report, format));

    if report.all_failed() {
        bail!("no debate session completed ({} aborted)", report.aborted());
    }
    Ok(())
}

/// Initialize logging based on verbosity level; `RUST_LOG` wins when set
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "llm-debate.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

/// CLI flags take precedence over every configuration source
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(problems) = &cli.problems {
        config.run.problems = problems.clone();
    }
    if let Some(skip) = cli.skip {
        config.run.skip = skip;
    }
    if let Some(take) = cli.take {
        config.run.take = Some(take);
    }
    if let Some(sessions) = cli.sessions {
        config.run.sessions = sessions;
    }
    if let Some(output_dir) = &cli.output_dir {
        config.run.output_dir = output_dir.clone();
    }
    if cli.strict_persistence {
        config.run.strict_persistence = true;
    }
}
