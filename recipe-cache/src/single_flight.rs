//! The process's one mutable shared structure outside the cache store
//! itself: a registry ensuring at most one build is in flight per
//! fingerprint at any moment.
//!
//! Same actor shape as [`crate::memory::InMemoryCacheStore`] — a single
//! task owns the map, callers talk to it over an `mpsc` channel with
//! `oneshot` responders.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};

use crate::fingerprint::Fingerprint;

enum Call<T> {
    Join {
        fp: Fingerprint,
        resp: oneshot::Sender<JoinOutcome<T>>,
    },
    Complete {
        fp: Fingerprint,
        result: T,
    },
    Abort {
        fp: Fingerprint,
    },
}

pub enum JoinOutcome<T> {
    /// The caller is the leader: it must perform the build and call
    /// [`SingleFlight::complete`], or [`SingleFlight::abort`] if it
    /// cannot finish, which releases followers with an error instead of
    /// a value.
    Leader,
    /// Another caller is already building this fingerprint; wait for it
    /// to finish. Resolves to `None` if the leader was aborted.
    Follower(oneshot::Receiver<T>),
}

/// A process-wide in-flight registry, generic over the outcome type each
/// use site publishes to its followers.
#[derive(Clone)]
pub struct SingleFlight<T: Clone + Send + 'static> {
    calls_tx: mpsc::Sender<Call<T>>,
}

impl<T: Clone + Send + 'static> SingleFlight<T> {
    pub fn new() -> Self {
        let (calls_tx, mut calls_rx) = mpsc::channel::<Call<T>>(128);

        tokio::spawn(async move {
            let mut in_flight: HashMap<Fingerprint, Vec<oneshot::Sender<T>>> = HashMap::new();
            while let Some(call) = calls_rx.recv().await {
                match call {
                    Call::Join { fp, resp } => {
                        if let Some(waiters) = in_flight.get_mut(&fp) {
                            let (tx, rx) = oneshot::channel();
                            waiters.push(tx);
                            let _ = resp.send(JoinOutcome::Follower(rx));
                        } else {
                            in_flight.insert(fp, Vec::new());
                            let _ = resp.send(JoinOutcome::Leader);
                        }
                    }
                    Call::Complete { fp, result } => {
                        if let Some(waiters) = in_flight.remove(&fp) {
                            for waiter in waiters {
                                let _ = waiter.send(result.clone());
                            }
                        }
                    }
                    Call::Abort { fp } => {
                        // Dropping the senders without a value resolves
                        // followers' `rx.await` to `Err`; callers treat
                        // that the same as a miss and retry on their own.
                        in_flight.remove(&fp);
                    }
                }
            }
        });

        Self { calls_tx }
    }

    /// Joins the in-flight build for `fingerprint`, either becoming the
    /// leader or waiting on one.
    pub async fn join(&self, fingerprint: Fingerprint) -> JoinOutcome<T> {
        let (tx, rx) = oneshot::channel();
        if self
            .calls_tx
            .send(Call::Join {
                fp: fingerprint,
                resp: tx,
            })
            .await
            .is_err()
        {
            // actor gone; degrade to "always leader" so callers proceed
            return JoinOutcome::Leader;
        }
        rx.await.unwrap_or(JoinOutcome::Leader)
    }

    pub async fn complete(&self, fingerprint: Fingerprint, result: T) {
        let _ = self
            .calls_tx
            .send(Call::Complete {
                fp: fingerprint,
                result,
            })
            .await;
    }

    pub async fn abort(&self, fingerprint: Fingerprint) {
        let _ = self.calls_tx.send(Call::Abort { fp: fingerprint }).await;
    }
}

impl<T: Clone + Send + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}
