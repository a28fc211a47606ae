mod cli;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod notify;
mod pipeline;
mod resume;
mod routes;
mod scheduler;
mod scoring;
mod sources;
mod state;
mod store;
mod submission;
mod tailoring;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::notify::{LogNotifier, Notifier, WebhookNotifier};
use crate::pipeline::criteria::JobCriteria;
use crate::pipeline::policy::ApplyPolicy;
use crate::pipeline::{Collaborators, Orchestrator, PipelineSettings, RunMode};
use crate::routes::build_router;
use crate::scheduler::{console, BotController};
use crate::scoring::{KeywordMatchScorer, MatchScorer, RemoteMatchScorer};
use crate::sources::{SourceAggregator, SourceRegistry};
use crate::state::AppState;
use crate::store::postgres::PgApplicationStore;
use crate::store::RecordStore;
use crate::submission::{ApplicationSubmitter, CommandSubmitter};
use crate::tailoring::{LlmResumeTailor, ResumeTailor, UnavailableTailor};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting applier v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and the record store
    let db = create_pool(&config.database_url).await?;
    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone(), config.call_timeout)?),
        None => {
            info!("NOTIFY_WEBHOOK_URL not set; notifications go to the log");
            Arc::new(LogNotifier)
        }
    };
    let store = RecordStore::new(Arc::new(PgApplicationStore::new(db)), notifier);
    store.initialize().await?;

    match cli.command {
        Command::Export { output } => {
            let destination = output.unwrap_or_else(|| config.export_path.clone());
            let summary = store.export_successful(&destination).await?;
            println!(
                "Exported {} successful applications to {}",
                summary.rows,
                destination.display()
            );
        }
        Command::RunOnce { dry_run } => {
            let orchestrator = build_orchestrator(&config, store)?;
            let report = orchestrator.run_cycle(RunMode::from_dry_run(dry_run)).await?;
            println!("{}", report.summary_line());
        }
        Command::Schedule { interval, dry_run } => {
            let orchestrator = Arc::new(build_orchestrator(&config, store)?);
            let interval = match interval {
                Some(value) => config::minutes(value).context("--interval is too large")?,
                None => config.run_interval,
            };
            let bot = BotController::new(
                orchestrator.clone(),
                interval,
                RunMode::from_dry_run(dry_run),
            );
            bot.start()?;

            tokio::spawn(console::listen_for_stop(
                console::spawn_stdin_reader(),
                bot.clone(),
            ));
            tokio::spawn(stop_on_ctrl_c(bot.clone()));

            bot.stopped().await;
            final_export(&orchestrator, &config.export_path).await;
        }
        Command::Serve { schedule } => {
            let orchestrator = Arc::new(build_orchestrator(&config, store)?);
            let bot = BotController::new(orchestrator.clone(), config.run_interval, RunMode::Live);
            if schedule {
                bot.start()?;
            }

            let state = AppState {
                orchestrator,
                bot: bot.clone(),
            };
            let app = build_router(state)
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive());

            let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
            info!("Listening on {addr}");

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if bot.request_stop() {
                bot.stopped().await;
            }
        }
    }

    Ok(())
}

/// Wires the configured collaborators into an orchestrator.
fn build_orchestrator(config: &Config, store: RecordStore) -> Result<Orchestrator> {
    let http = reqwest::Client::builder()
        .timeout(config.call_timeout)
        .user_agent(concat!("applier/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let registry = SourceRegistry::load(&config.job_sources_path)?;
    let sources = SourceAggregator::new(registry.build(&http), config.call_timeout);
    info!("{} job sources configured", sources.source_count());

    let scorer: Arc<dyn MatchScorer> = match &config.ats_api_url {
        Some(url) => {
            info!("Scoring with remote ATS service at {url}");
            Arc::new(RemoteMatchScorer::new(http.clone(), url.clone()))
        }
        None => Arc::new(KeywordMatchScorer),
    };

    let tailor: Arc<dyn ResumeTailor> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.call_timeout)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmResumeTailor::new(llm, config.resume_output_dir.clone()))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; every job will fail at tailoring");
            Arc::new(UnavailableTailor::new("ANTHROPIC_API_KEY is not set"))
        }
    };

    let submitter = config
        .submit_command
        .as_deref()
        .and_then(CommandSubmitter::from_command_line)
        .map(|submitter| Arc::new(submitter) as Arc<dyn ApplicationSubmitter>);
    if submitter.is_none() {
        warn!("SUBMIT_COMMAND not set; cycles run as dry runs");
    }

    let criteria = config
        .job_criteria_path
        .as_deref()
        .map(JobCriteria::load)
        .transpose()?;

    let settings = PipelineSettings {
        policy: ApplyPolicy {
            min_match_score: config.min_match_score,
            max_failed_attempts: config.max_failed_attempts,
        },
        batch_notify_every: config.batch_notify_every,
        export_path: config.export_path.clone(),
        base_resume_path: config.base_resume_path.clone(),
        call_timeout: config.call_timeout,
        submit_timeout: config.submit_timeout,
    };

    Ok(Orchestrator::new(
        settings,
        Collaborators {
            sources,
            scorer,
            tailor,
            submitter,
            criteria,
        },
        store,
    ))
}

async fn stop_on_ctrl_c(bot: BotController) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Ctrl-C received");
        bot.request_stop();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn final_export(orchestrator: &Orchestrator, destination: &Path) {
    match orchestrator.store().export_successful(destination).await {
        Ok(summary) => println!(
            "Final export: {} successful applications in {}",
            summary.rows,
            destination.display()
        ),
        Err(e) => error!("Final export failed: {e}"),
    }
}
