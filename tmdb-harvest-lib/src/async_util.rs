//! Drive a pipeline run while draining its event channel.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

/// Upper bound on draining events once the task has finished. Only reached
/// if a sender outlives the task.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `task` to completion, calling `on_event` for every event it sends.
///
/// Events still queued when the task finishes are delivered before this
/// returns, so `on_event` sees `HarvestEvent::Done` before the result.
pub async fn run_with_events<F, E, R>(
    task: F,
    mut event_rx: mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);

    let result = loop {
        tokio::select! {
            r = &mut task => break Some(r),
            event = event_rx.recv() => match event {
                Some(e) => on_event(e),
                // All senders gone: only the task is left to wait for
                None => break None,
            },
        }
    };

    let result = match result {
        Some(r) => r,
        None => return task.await,
    };

    let deadline = Instant::now() + DRAIN_TIMEOUT;
    loop {
        match tokio::time::timeout_at(deadline, event_rx.recv()).await {
            Ok(Some(e)) => on_event(e),
            Ok(None) => break,
            Err(_) => {
                log::warn!(
                    "Event drain timed out after {}s",
                    DRAIN_TIMEOUT.as_secs()
                );
                break;
            }
        }
    }

    result
}
