//! Command implementations

pub mod config;
pub mod doctor;
pub mod preview;
pub mod run;

use anyhow::{Context, Result, bail};
use hn_drip_adapters::{BlueskyPublisher, HnFeedSource};
use hn_drip_domain::usecases::{RenderConfig, RetryPolicy, RunConfig, SelectionPolicy};
use secrecy::SecretString;
use std::time::Duration;

use crate::config::AppConfig;

pub(crate) fn build_source(config: &AppConfig) -> HnFeedSource {
    HnFeedSource::with_base_url(
        config.feed.base_url.clone(),
        config.feed.feed.clone(),
        config.feed.format,
        Duration::from_secs(config.feed.timeout_secs),
    )
}

/// Bluesky publisher, or a disabled one when nothing will be published
pub(crate) fn build_bluesky_publisher(
    config: &AppConfig,
    dry_run: bool,
) -> Result<BlueskyPublisher> {
    if dry_run {
        return Ok(BlueskyPublisher::disabled());
    }

    let identifier = load_env(&config.bluesky.identifier_env, "identifier")?;
    let password = load_secret(&config.bluesky.password_env, "app password")?;

    Ok(BlueskyPublisher::with_service_url(
        identifier,
        password,
        config.bluesky.service_url.clone(),
        config.render.max_chars,
        Duration::from_secs(config.bluesky.timeout_secs),
    ))
}

pub(crate) fn run_config(config: &AppConfig, dry_run: bool) -> RunConfig {
    RunConfig {
        min_score: config.feed.min_score,
        selection: SelectionPolicy::from_hours(config.selection.max_age_hours),
        dry_run,
        retry: RetryPolicy::new(Duration::from_millis(config.retry.base_delay_ms)),
        render_config: RenderConfig {
            max_chars: config.render.max_chars,
            discussion_label: config.render.discussion_label.clone(),
        },
    }
}

pub(crate) fn load_secret(env_var: &str, what: &str) -> Result<SecretString> {
    Ok(SecretString::new(load_env(env_var, what)?.into()))
}

pub(crate) fn load_env(env_var: &str, what: &str) -> Result<String> {
    if env_var.trim().is_empty() {
        bail!("No env var configured for Bluesky {}", what);
    }

    let value = std::env::var(env_var)
        .with_context(|| format!("Missing env var {} for Bluesky {}", env_var, what))?;

    if value.trim().is_empty() {
        bail!("Env var {} is empty for Bluesky {}", env_var, what);
    }

    Ok(value)
}
