//! Preview command - show the next run's decision without side effects

use anyhow::Result;
use hn_drip_adapters::{BlueskyPublisher, JsonCursorStore};
use hn_drip_domain::{
    Selection, SystemClock,
    usecases::{DripRunner, Plan},
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::PreviewArgs;
use crate::commands::{build_source, run_config};
use crate::config::AppConfig;

pub async fn execute(args: PreviewArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let state_path = args
        .state
        .unwrap_or_else(|| config.general.state_path.clone());

    let runner = DripRunner::new(
        Arc::new(build_source(&config)),
        Arc::new(BlueskyPublisher::disabled()),
        Arc::new(JsonCursorStore::new(&state_path)),
        Arc::new(SystemClock),
        run_config(&config, true),
    );

    let plan = runner.plan().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan_json(&plan))?);
    } else {
        print_plan(&plan);
    }

    Ok(())
}

fn plan_json(plan: &Plan) -> serde_json::Value {
    let (decision, item) = match &plan.selection {
        Selection::NoOp => ("noop", None),
        Selection::AdvanceOnly { .. } => ("advance_only", None),
        Selection::PostAndAdvance { item, .. } => ("post", Some(item)),
    };

    json!({
        "last_id": plan.cursor.last_id,
        "candidates": plan.candidates,
        "decision": decision,
        "new_last_id": plan.selection.new_last_id(),
        "item": item,
        "text": plan.rendered.as_ref().map(|post| post.text.as_str()),
    })
}

fn print_plan(plan: &Plan) {
    println!("Cursor: lastStoryId = {}", plan.cursor.last_id);
    println!("Candidates: {}", plan.candidates);
    println!();

    match &plan.selection {
        Selection::NoOp => println!("Nothing new to post."),
        Selection::AdvanceOnly { new_last_id } => {
            println!(
                "Only stale stories are new; the cursor would advance to {} without posting.",
                new_last_id
            );
        }
        Selection::PostAndAdvance { item, new_last_id } => {
            println!("Would post story {} ({})", item.id, item.discussion_url);
            println!("Cursor would advance to {}", new_last_id);

            if let Some(post) = &plan.rendered {
                println!();
                println!("{}", post.text);
            }
        }
    }
}
