//! Drip run use case - orchestrates one fetch, select, publish, save cycle

use std::sync::Arc;

use crate::{
    model::{Cursor, RenderedPost, RunOutcome, Selection},
    ports::{
        Clock, CursorError, CursorStore, ItemSource, PublishError, Publisher, SourceError,
    },
    usecases::{
        render::{RenderConfig, Renderer},
        retry::RetryPolicy,
        select::{SelectionPolicy, select},
    },
};

/// Configuration for a run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Minimum upstream score, forwarded to the source
    pub min_score: u32,
    /// Freshness policy for the selector
    pub selection: SelectionPolicy,
    /// Dry run mode (don't publish, don't record posts)
    pub dry_run: bool,
    /// Retry policy for fetch and publish
    pub retry: RetryPolicy,
    /// Render config
    pub render_config: RenderConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            min_score: 100,
            selection: SelectionPolicy::default(),
            dry_run: false,
            retry: RetryPolicy::default(),
            render_config: RenderConfig::default(),
        }
    }
}

/// What a run would do, computed without side effects
#[derive(Debug, Clone)]
pub struct Plan {
    /// Cursor as loaded at the start of the run
    pub cursor: Cursor,
    /// Number of candidates the source returned
    pub candidates: usize,
    /// Selector decision
    pub selection: Selection,
    /// Rendered post when the decision is to post
    pub rendered: Option<RenderedPost>,
}

/// Run orchestrator
pub struct DripRunner<S, P, C, Cl>
where
    S: ItemSource + ?Sized,
    P: Publisher + ?Sized,
    C: CursorStore + ?Sized,
    Cl: Clock + ?Sized,
{
    source: Arc<S>,
    publisher: Arc<P>,
    cursor_store: Arc<C>,
    clock: Arc<Cl>,
    config: RunConfig,
    renderer: Renderer,
}

impl<S, P, C, Cl> DripRunner<S, P, C, Cl>
where
    S: ItemSource + ?Sized,
    P: Publisher + ?Sized,
    C: CursorStore + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        source: Arc<S>,
        publisher: Arc<P>,
        cursor_store: Arc<C>,
        clock: Arc<Cl>,
        config: RunConfig,
    ) -> Self {
        let renderer = Renderer::new(config.render_config.clone());
        Self {
            source,
            publisher,
            cursor_store,
            clock,
            config,
            renderer,
        }
    }

    /// Load the cursor, fetch candidates and decide. Never publishes or saves.
    pub async fn plan(&self) -> Result<Plan, RunError> {
        let cursor = self.cursor_store.load().await;
        let min_score = self.config.min_score;

        tracing::info!(
            last_id = cursor.last_id,
            min_score = min_score,
            "Fetching candidates"
        );

        let candidates = self
            .config
            .retry
            .run(
                "fetch_candidates",
                |_: &SourceError| true,
                || self.source.fetch_candidates(min_score),
            )
            .await?;

        let count = candidates.len();
        tracing::info!(count = count, "Fetched candidates");

        let selection = select(
            candidates,
            cursor,
            self.clock.now(),
            &self.config.selection,
        );

        let rendered = match &selection {
            Selection::PostAndAdvance { item, .. } => Some(self.renderer.render(item)),
            _ => None,
        };

        Ok(Plan {
            cursor,
            candidates: count,
            selection,
            rendered,
        })
    }

    /// Run a single cycle and persist its outcome
    pub async fn run_once(&self) -> Result<RunOutcome, RunError> {
        let Plan {
            selection,
            rendered,
            ..
        } = self.plan().await?;

        match selection {
            Selection::NoOp => {
                tracing::info!("No new stories");
                Ok(RunOutcome::Idle)
            }
            Selection::AdvanceOnly { new_last_id } => {
                // Saved under dry run too, so a stale backlog is still skipped.
                tracing::info!(
                    new_last_id = new_last_id,
                    dry_run = self.config.dry_run,
                    "Only stale stories are new, skipping backlog"
                );
                self.save(new_last_id).await?;
                Ok(RunOutcome::BacklogSkipped {
                    last_id: new_last_id,
                })
            }
            Selection::PostAndAdvance { item, new_last_id } => {
                let post = rendered.unwrap_or_else(|| self.renderer.render(&item));

                if self.config.dry_run {
                    tracing::info!(
                        item_id = item.id,
                        title = %item.title,
                        rendered_text = %post.text,
                        "[DRY RUN] Would publish"
                    );
                    return Ok(RunOutcome::DryRun {
                        item_id: item.id,
                        text: post.text,
                    });
                }

                let result = self
                    .config
                    .retry
                    .run("publish", PublishError::is_retryable, || {
                        self.publisher.publish(&post)
                    })
                    .await?;

                tracing::info!(
                    item_id = item.id,
                    platform = self.publisher.platform(),
                    post_id = %result.id,
                    url = ?result.url,
                    "Published"
                );

                self.save(new_last_id).await?;

                Ok(RunOutcome::Posted {
                    item_id: item.id,
                    post_id: result.id,
                })
            }
        }
    }

    async fn save(&self, last_id: u64) -> Result<(), RunError> {
        self.cursor_store.save(Cursor::new(last_id)).await?;
        tracing::debug!(last_id = last_id, "Saved cursor");
        Ok(())
    }
}

/// Errors from a run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Fetching candidates failed: {0}")]
    Fetch(#[from] SourceError),
    #[error("Publishing failed: {0}")]
    Publish(#[from] PublishError),
    #[error("Saving cursor failed: {0}")]
    State(#[from] CursorError),
}
