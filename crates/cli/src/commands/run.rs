//! Run command - one fetch, select, publish, save cycle

use anyhow::{Context, Result};
use hn_drip_adapters::{JsonCursorStore, OutboxPublisher};
use hn_drip_domain::{Publisher, RunOutcome, SystemClock, usecases::DripRunner};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::RunArgs;
use crate::commands::{build_bluesky_publisher, build_source, run_config};
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let require_approval = args.require_approval;
    let outbox_path = if require_approval {
        Some(args.outbox.clone().unwrap_or_else(default_outbox_path))
    } else {
        None
    };

    if args.outbox.is_some() && !require_approval {
        tracing::warn!("--outbox is ignored without --require-approval");
    }

    let mut dry_run = args.dry_run || config.general.dry_run;
    if require_approval && dry_run {
        tracing::info!("--require-approval overrides dry-run");
        dry_run = false;
    }

    let state_path = args
        .state
        .clone()
        .unwrap_or_else(|| config.general.state_path.clone());

    tracing::info!(
        dry_run = dry_run,
        require_approval = require_approval,
        outbox = ?outbox_path,
        state = %state_path.display(),
        feed = %config.feed.feed,
        min_score = config.feed.min_score,
        "Starting hn-drip run"
    );

    // Build dependencies
    let source = Arc::new(build_source(&config));
    let cursor_store = Arc::new(JsonCursorStore::new(&state_path));

    let publisher: Arc<dyn Publisher> = match outbox_path {
        Some(outbox_path) => {
            let outbox = OutboxPublisher::new(outbox_path.clone())
                .await
                .context("Failed to initialize outbox")?;
            tracing::info!(outbox = %outbox_path.display(), "Writing posts to outbox");
            Arc::new(outbox)
        }
        None => Arc::new(build_bluesky_publisher(&config, dry_run)?),
    };

    let runner = DripRunner::new(
        source,
        publisher,
        cursor_store,
        Arc::new(SystemClock),
        run_config(&config, dry_run),
    );

    let outcome = runner.run_once().await?;

    match outcome {
        RunOutcome::Idle => tracing::info!("Nothing to do"),
        RunOutcome::BacklogSkipped { last_id } => {
            tracing::info!(last_id = last_id, "Skipped stale backlog")
        }
        RunOutcome::Posted { item_id, post_id } => {
            tracing::info!(item_id = item_id, post_id = %post_id, "Posted story")
        }
        RunOutcome::DryRun { item_id, text } => {
            tracing::info!(item_id = item_id, text = %text, "[DRY RUN] Story not posted")
        }
    }

    tracing::info!("hn-drip run completed");
    Ok(())
}

fn default_outbox_path() -> PathBuf {
    PathBuf::from("./outbox.jsonl")
}
