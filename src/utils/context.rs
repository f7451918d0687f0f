use crate::models::error::SError;
use tokio::task::spawn_blocking;
use tracing::Span;

pub struct TaskContext;

impl TaskContext {
    /// Runs blocking filesystem work on tokio's blocking pool, inside the caller's span.
    pub async fn run<F, R>(f: F) -> Result<R, SError>
    where
        F: FnOnce() -> Result<R, SError> + Send + 'static, // F is a standard closure, not a Future
        R: Send + 'static,
    {
        let span = Span::current();
        spawn_blocking(move || span.in_scope(f))
            .await
            .map_err(|e| SError::AsyncRuntimeError(e.to_string()))?
    }
}
