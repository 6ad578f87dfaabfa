//! Doctor command - validate configuration and show status

use anyhow::Result;
use hn_drip_adapters::JsonCursorStore;
use hn_drip_domain::ItemSource;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

use crate::args::{DoctorArgs, DoctorCheck};
use crate::commands::build_source;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feed: Option<CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bluesky: Option<CheckResult>,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let wants = |check: DoctorCheck| args.check.is_none_or(|only| only == check);

    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        state: None,
        feed: None,
        bluesky: None,
        overall: "error".to_string(),
    };

    // Config is always loaded, every other check needs it
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = check_config(&c);
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        if wants(DoctorCheck::State) {
            report.state = Some(check_state(&config.general.state_path).await);
        }

        if wants(DoctorCheck::Feed) {
            report.feed = Some(check_feed(config).await);
        }

        if wants(DoctorCheck::Bluesky) {
            report.bluesky = Some(check_bluesky(config));
        }
    }

    // Determine overall status
    let checks: Vec<&CheckResult> = std::iter::once(&report.config)
        .chain(report.state.as_ref())
        .chain(report.feed.as_ref())
        .chain(report.bluesky.as_ref())
        .collect();

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_config(config: &AppConfig) -> CheckResult {
    CheckResult::ok("Configuration loaded successfully").with_details(serde_json::json!({
        "feed": config.feed.feed,
        "format": config.feed.format,
        "min_score": config.feed.min_score,
        "max_age_hours": config.selection.max_age_hours,
        "dry_run": config.general.dry_run,
    }))
}

async fn check_state(path: &Path) -> CheckResult {
    let store = JsonCursorStore::new(path);

    match store.read().await {
        Ok(Some(cursor)) => CheckResult::ok(format!(
            "{}: lastStoryId = {}",
            path.display(),
            cursor.last_id
        ))
        .with_details(serde_json::json!({ "last_id": cursor.last_id })),
        Ok(None) => CheckResult::warn(format!(
            "{} does not exist yet, first run starts at 0",
            path.display()
        )),
        Err(e) => CheckResult::warn(format!(
            "{} is unreadable ({}), next run restarts at 0",
            path.display(),
            e
        )),
    }
}

async fn check_feed(config: &AppConfig) -> CheckResult {
    let source = build_source(config);
    let url = source.feed_url(config.feed.min_score);

    match source.fetch_candidates(config.feed.min_score).await {
        Ok(items) => CheckResult::ok(format!("{} stories from {}", items.len(), url))
            .with_details(serde_json::json!({
                "url": url,
                "count": items.len(),
                "max_id": items.iter().map(|item| item.id).max(),
            })),
        Err(e) => CheckResult::error(format!("Fetching {} failed: {}", url, e)),
    }
}

fn check_bluesky(config: &AppConfig) -> CheckResult {
    let identifier_env = &config.bluesky.identifier_env;
    let password_env = &config.bluesky.password_env;

    let is_set = |name: &str| {
        !name.is_empty() && std::env::var(name).is_ok_and(|value| !value.trim().is_empty())
    };

    let missing: Vec<&str> = [identifier_env.as_str(), password_env.as_str()]
        .into_iter()
        .filter(|name| !is_set(name))
        .collect();

    if missing.is_empty() {
        return CheckResult::ok(format!(
            "Credentials: {} and {} (set), Service: {}",
            identifier_env, password_env, config.bluesky.service_url
        ));
    }

    let message = format!("Credentials not set: {}", missing.join(", "));
    if config.general.dry_run {
        CheckResult::warn(message)
    } else {
        CheckResult::error(message)
    }
}

fn print_report(report: &DoctorReport) {
    println!("hn-drip Doctor Report");
    println!("=====================");
    println!();

    print_check("Config", &report.config);
    if let Some(ref state) = report.state {
        print_check("State", state);
    }
    if let Some(ref feed) = report.feed {
        print_check("Feed", feed);
    }
    if let Some(ref bluesky) = report.bluesky {
        print_check("Bluesky", bluesky);
    }

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: hn-drip preview");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
