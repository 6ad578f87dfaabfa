//! Application use cases / business logic

pub mod drip_run;
pub mod render;
pub mod retry;
pub mod select;

pub use drip_run::{DripRunner, Plan, RunConfig, RunError};
pub use render::{RenderConfig, Renderer};
pub use retry::{MAX_ATTEMPTS, RetryPolicy};
pub use select::{SelectionPolicy, select};
