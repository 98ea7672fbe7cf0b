use std::future::Future;
use std::time::Duration;

use crate::domain::DomainError;

/// Run a storage call under a deadline
///
/// On expiry the inner future is dropped, which rolls back any open
/// transaction it holds.
pub(crate) async fn with_deadline<T, F>(
    limit: Duration,
    operation: &'static str,
    future: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| DomainError::timeout(operation))?
}
