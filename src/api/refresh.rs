//! Single-flight access token refresh
//!
//! Every 401 that needs a refresh joins the same in-flight future, so a burst
//! of expired requests produces one call to the refresh endpoint.

use std::sync::Mutex;

use futures::future::{BoxFuture, FutureExt, Shared};

/// Why a refresh did not produce a new access token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshFailure {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("refresh rejected with HTTP {status}")]
    Rejected { status: u16 },

    #[error("refresh request failed: {0}")]
    Network(String),

    #[error("refresh response malformed: {0}")]
    Malformed(String),

    #[error("token storage failed during refresh: {0}")]
    Storage(String),
}

pub(crate) type RefreshOutcome = Result<(), RefreshFailure>;
pub(crate) type RefreshFuture = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Default)]
pub(crate) struct RefreshGate {
    in_flight: Mutex<Option<RefreshFuture>>,
}

impl RefreshGate {
    /// Join the refresh already running, or start one with `start`.
    pub(crate) fn join_or_start<F>(&self, start: F) -> RefreshFuture
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let mut slot = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(running) = slot.as_ref() {
            tracing::debug!("joining in-flight token refresh");
            return running.clone();
        }
        let fut = start().shared();
        *slot = Some(fut.clone());
        fut
    }

    /// Called by the refresh future itself once it has an outcome, so the
    /// next 401 after this point starts a fresh refresh.
    pub(crate) fn finish(&self) {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_concurrent_joiners_share_one_start() {
        let gate = Arc::new(RefreshGate::default());
        let starts = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let release_rx = Arc::new(Mutex::new(Some(release_rx)));

        let start = |gate: Arc<RefreshGate>| {
            let starts = starts.clone();
            let release_rx = release_rx.clone();
            move || {
                starts.fetch_add(1, Ordering::SeqCst);
                let rx = release_rx.lock().unwrap().take();
                async move {
                    if let Some(rx) = rx {
                        let _ = rx.await;
                    }
                    gate.finish();
                    Ok(())
                }
                .boxed()
            }
        };

        let first = gate.join_or_start(start(gate.clone()));
        let second = gate.join_or_start(start(gate.clone()));
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        release_tx.send(()).unwrap();
        let (a, b) = tokio::join!(first, second);
        assert_eq!(a, Ok(()));
        assert_eq!(b, Ok(()));
        assert!(gate.is_idle());

        let _third = gate.join_or_start(start(gate.clone()));
        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }
}
