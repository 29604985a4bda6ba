//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap backend calls with a deadline
//! - Cancel the in-flight call when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future aborts the connection
//! - Timeout errors are distinct from other errors
//! - The deadline covers connect + request write + response headers, not the body

use std::future::Future;

use hyper_util::client::legacy;
use tokio::time;

use crate::config::TimeoutConfig;
use crate::proxy::ForwardError;

/// Run an upstream client call under the upstream deadline.
pub async fn with_deadline<F, T>(timeouts: &TimeoutConfig, call: F) -> Result<T, ForwardError>
where
    F: Future<Output = Result<T, legacy::Error>>,
{
    let limit = timeouts.upstream();
    match time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ForwardError::from_client(&e, timeouts.connect())),
        Err(_) => Err(ForwardError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn timeouts(upstream_ms: u64) -> TimeoutConfig {
        TimeoutConfig {
            connect_ms: 100,
            upstream_ms,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let slow = async {
            time::sleep(Duration::from_secs(60)).await;
            Ok::<_, legacy::Error>(())
        };
        let err = with_deadline(&timeouts(250), slow).await.unwrap_err();
        assert!(matches!(err, ForwardError::Timeout(d) if d == Duration::from_millis(250)));
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let fast = async { Ok::<_, legacy::Error>(7) };
        assert_eq!(with_deadline(&timeouts(1_000), fast).await.unwrap(), 7);
    }
}
