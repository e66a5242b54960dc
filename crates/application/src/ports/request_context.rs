use ferrous_flatten_domain::DomainError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-request cancellation scope.
///
/// Every upstream round-trip made on behalf of a request is raced against
/// the request's token and deadline; whichever fires first drops the
/// in-flight future and yields `QueryTimeout`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// A context bound to `parent`: cancelling the parent cancels this one.
    /// A timeout too large to represent leaves the context without deadline.
    pub fn with_timeout(parent: &CancellationToken, timeout: Duration) -> Self {
        Self {
            token: parent.child_token(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// No deadline, never cancelled from outside.
    pub fn background() -> Self {
        Self::new(CancellationToken::new())
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub async fn run<T, F>(&self, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        if self.is_done() {
            return Err(DomainError::QueryTimeout);
        }

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(DomainError::QueryTimeout),
            _ = expired => Err(DomainError::QueryTimeout),
            result = fut => result,
        }
    }
}
