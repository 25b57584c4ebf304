use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use tracing::{debug, info, warn};

use crate::verify::{VerificationResult, VerificationStatus, Verify};

pub const DEFAULT_WORKERS: usize = 10;

/// Completed/total pair emitted once per finished address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkProgress {
    pub completed: usize,
    pub total: usize,
}

impl BulkProgress {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Verifies every address in `emails` on at most `workers` threads.
///
/// Exactly one result is returned per input address, in completion order.
/// `workers == 0` is treated as 1.
pub fn bulk_verify<V, S>(verifier: &V, emails: &[S], workers: usize) -> Vec<VerificationResult>
where
    V: Verify + Sync + ?Sized,
    S: AsRef<str> + Sync,
{
    run(verifier, emails, workers, None)
}

/// Same as [`bulk_verify`], additionally sending a [`BulkProgress`] to
/// `progress` after each address. `completed` increases by one per event.
/// A dropped receiver does not affect the batch.
pub fn bulk_verify_with_progress<V, S>(
    verifier: &V,
    emails: &[S],
    workers: usize,
    progress: Sender<BulkProgress>,
) -> Vec<VerificationResult>
where
    V: Verify + Sync + ?Sized,
    S: AsRef<str> + Sync,
{
    run(verifier, emails, workers, Some(progress))
}

fn run<V, S>(
    verifier: &V,
    emails: &[S],
    workers: usize,
    progress: Option<Sender<BulkProgress>>,
) -> Vec<VerificationResult>
where
    V: Verify + Sync + ?Sized,
    S: AsRef<str> + Sync,
{
    let total = emails.len();
    let mut results = Vec::with_capacity(total);
    if total == 0 {
        return results;
    }
    let workers = workers.max(1).min(total);
    info!(total, workers, "starting bulk verification");

    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<VerificationResult>();

    thread::scope(|scope| {
        for worker_id in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || {
                let mut handled = 0usize;
                while let Some(email) = emails.get(next.fetch_add(1, Ordering::Relaxed)) {
                    let result = verify_contained(verifier, email.as_ref().trim());
                    handled += 1;
                    if tx.send(result).is_err() {
                        break;
                    }
                }
                debug!(worker_id, handled, "worker drained queue");
            });
        }
        drop(tx);

        // results are collected here so progress is emitted from one thread only
        for result in rx {
            results.push(result);
            if let Some(progress) = &progress {
                let _ = progress.send(BulkProgress {
                    completed: results.len(),
                    total,
                });
            }
        }
    });

    debug_assert_eq!(results.len(), total);
    info!(total, "bulk verification finished");
    results
}

/// Runs one verification, turning a panic into an `unknown` result so the
/// address is never lost from the batch.
fn verify_contained<V>(verifier: &V, email: &str) -> VerificationResult
where
    V: Verify + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| verifier.verify(email))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(email, message = message.as_str(), "verification panicked");
            VerificationResult::new(
                email,
                VerificationStatus::Unknown,
                format!("A verification error occurred: {message}"),
            )
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
