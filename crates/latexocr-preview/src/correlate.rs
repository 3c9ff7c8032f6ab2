use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use kanal::AsyncReceiver;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Request/response matching over a queue that carries `(id, value)` pairs.
///
/// Ids are monotonic. One round trip runs at a time, and responses whose id
/// is not the awaited one are dropped, including late answers to requests
/// that already timed out.
pub struct ResponseMatcher<T> {
    next_id: AtomicU64,
    responses: Mutex<AsyncReceiver<(u64, T)>>,
}

impl<T: Send> ResponseMatcher<T> {
    pub fn new(responses: AsyncReceiver<(u64, T)>) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            responses: Mutex::new(responses),
        }
    }

    /// Allocate an id, hand it to `send`, then wait for the matching answer.
    ///
    /// `send` returns false when the request could not be delivered.
    pub async fn round_trip<F, Fut>(&self, timeout: Duration, send: F) -> Option<T>
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = bool>,
    {
        let responses = self.responses.lock().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        if !send(id).await {
            tracing::debug!("Request {} could not be sent", id);
            return None;
        }

        let deadline = Instant::now() + timeout;
        loop {
            match tokio::time::timeout_at(deadline, responses.recv()).await {
                Err(_) => {
                    tracing::warn!("Request {} timed out after {:?}", id, timeout);
                    return None;
                }
                Ok(Err(_)) => {
                    tracing::debug!("Response channel closed while awaiting {}", id);
                    return None;
                }
                Ok(Ok((got, value))) if got == id => return Some(value),
                Ok(Ok((got, _))) => {
                    tracing::debug!("Discarding response {} while awaiting {}", got, id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mismatched_ids_are_discarded() {
        let (tx, rx) = kanal::unbounded_async();
        let matcher = ResponseMatcher::new(rx);

        let result = matcher
            .round_trip(Duration::from_secs(1), |id| {
                let tx = tx.clone();
                async move {
                    tx.send((id + 5, "stale")).await.unwrap();
                    tx.send((id.wrapping_sub(1), "older")).await.unwrap();
                    tx.send((id, "fresh")).await.unwrap();
                    true
                }
            })
            .await;

        assert_eq!(result, Some("fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_yields_none_and_late_answer_is_skipped() {
        let (tx, rx) = kanal::unbounded_async();
        let matcher = ResponseMatcher::new(rx);

        let first = matcher
            .round_trip(Duration::from_secs(6), |_| async { true })
            .await;
        assert_eq!(first, None);

        // late reply for request 1 arrives before the reply for request 2
        let second = matcher
            .round_trip(Duration::from_secs(6), |id| {
                let tx = tx.clone();
                async move {
                    tx.send((1, 10)).await.unwrap();
                    tx.send((id, 20)).await.unwrap();
                    true
                }
            })
            .await;
        assert_eq!(second, Some(20));
    }

    #[tokio::test]
    async fn unsent_request_returns_none() {
        let (_tx, rx) = kanal::unbounded_async::<(u64, ())>();
        let matcher = ResponseMatcher::new(rx);
        assert_eq!(
            matcher
                .round_trip(Duration::from_secs(1), |_| async { false })
                .await,
            None
        );
    }

    #[tokio::test]
    async fn closed_channel_returns_none() {
        let (tx, rx) = kanal::unbounded_async::<(u64, ())>();
        drop(tx);
        let matcher = ResponseMatcher::new(rx);
        assert_eq!(
            matcher
                .round_trip(Duration::from_secs(1), |_| async { true })
                .await,
            None
        );
    }
}
