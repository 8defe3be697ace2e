//! Use-case plumbing: run an operation on a runtime handle under a
//! cancellation scope and fold its result into an [`Outcome`].
//!
//! Classification of the operation's result:
//! - `Ok(value)` becomes `Outcome::Success`
//! - an error whose chain contains [`Cancelled`] is returned as `Err(Cancelled)`
//! - an [`AppError`] becomes `Outcome::Failure` unchanged
//! - any other error, or a panic, becomes `Outcome::Failure` with kind `Other`
//!
//! Cancelling the scope while an operation is in flight aborts the spawned
//! task and returns `Err(Cancelled)` to the caller.

use std::future::Future;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use weatherboard_core::{AppError, Cancelled, Outcome};

/// Runtime handle plus the cancellation scope use cases run under
#[derive(Debug, Clone)]
pub struct Dispatcher {
    handle: Handle,
    scope: CancellationToken,
}

impl Dispatcher {
    pub fn new(handle: Handle, scope: CancellationToken) -> Self {
        Self { handle, scope }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn scope(&self) -> &CancellationToken {
        &self.scope
    }

    /// A dispatcher on the same runtime whose scope is a child of this one
    pub fn child(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            scope: self.scope.child_token(),
        }
    }

    /// Run `operation` on the runtime and wait for its outcome.
    pub async fn run<T, F>(&self, operation: F) -> Result<Outcome<T>, Cancelled>
    where
        T: Send + 'static,
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        if self.scope.is_cancelled() {
            return Err(Cancelled);
        }

        let mut task = AbortOnDrop(self.handle.spawn(operation));

        tokio::select! {
            biased;
            _ = self.scope.cancelled() => {
                tracing::debug!("Scope cancelled, aborting operation");
                Err(Cancelled)
            }
            joined = &mut task.0 => classify(joined),
        }
    }
}

/// Aborts the spawned operation if the caller stops waiting for it.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn classify<T>(joined: Result<anyhow::Result<T>, JoinError>) -> Result<Outcome<T>, Cancelled> {
    match joined {
        Ok(Ok(value)) => Ok(Outcome::Success(value)),
        Ok(Err(err)) => classify_error(err).map(Outcome::Failure),
        Err(err) if err.is_cancelled() => Err(Cancelled),
        Err(err) => {
            tracing::error!("Operation panicked: {}", err);
            Ok(Outcome::Failure(AppError::other(err)))
        }
    }
}

fn classify_error(err: anyhow::Error) -> Result<AppError, Cancelled> {
    if err.chain().any(|cause| cause.is::<Cancelled>()) {
        return Err(Cancelled);
    }

    match err.downcast::<AppError>() {
        Ok(app_error) => Ok(app_error),
        Err(other) => {
            tracing::warn!("Unclassified failure: {:#}", other);
            Ok(AppError::other(other))
        }
    }
}

/// A single application operation taking `Params` and producing `Output`.
///
/// Implementors supply [`UseCase::execute`]; callers use [`UseCase::invoke`],
/// which runs `execute` on the dispatcher and classifies the result.
#[async_trait]
pub trait UseCase: Clone + Send + Sync + 'static {
    type Params: Send + 'static;
    type Output: Send + 'static;

    fn dispatcher(&self) -> &Dispatcher;

    async fn execute(&self, params: Self::Params) -> anyhow::Result<Self::Output>;

    async fn invoke(&self, params: Self::Params) -> Result<Outcome<Self::Output>, Cancelled> {
        let this = self.clone();
        self.dispatcher()
            .run(async move { this.execute(params).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use weatherboard_core::ErrorKind;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Handle::current(), CancellationToken::new())
    }

    #[tokio::test]
    async fn test_success() {
        let outcome = dispatcher().run(async { Ok::<_, anyhow::Error>(42) }).await.unwrap();
        assert_eq!(outcome.into_data(), Some(42));
    }

    #[tokio::test]
    async fn test_app_error_passes_through() {
        let outcome = dispatcher()
            .run(async { Err::<(), anyhow::Error>(AppError::invalid_input("empty").into()) })
            .await
            .unwrap();
        assert_eq!(outcome.error().unwrap().kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_cancelled_in_chain() {
        let result = dispatcher()
            .run(async { Err::<(), anyhow::Error>(anyhow::Error::new(Cancelled)).context("fetching") })
            .await;
        assert_eq!(result.unwrap_err(), Cancelled);
    }

    #[tokio::test]
    async fn test_already_cancelled_scope_skips_operation() {
        let dispatcher = dispatcher();
        dispatcher.scope().cancel();

        let result = dispatcher.run(async { Ok::<_, anyhow::Error>(()) }).await;
        assert_eq!(result.unwrap_err(), Cancelled);
    }

    #[tokio::test]
    async fn test_child_follows_parent() {
        let parent = dispatcher();
        let child = parent.child();
        parent.scope().cancel();
        assert!(child.scope().is_cancelled());
    }
}
