//! Background delivery tasks for list and watch streams.

use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A live stream of items delivered by a background task.
///
/// Each list or watch call spawns one task that reads from the map, decodes
/// records, and forwards them over a bounded channel. The subscription owns
/// that task:
///
/// - Dropping the subscription (or calling [`Subscription::cancel`]) stops it
/// - Closing the store stops every subscription it handed out
/// - When the source ends (list exhausted, map closed) the task exits and
///   [`Subscription::recv`] returns `None` after the buffered items
///
/// Items are never split or duplicated; each `recv` yields one whole item.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Subscription<T> {
    /// Spawns a task that pumps `source` through `convert` into a new
    /// subscription.
    ///
    /// Items for which `convert` returns `None` are skipped. The task stops
    /// when the source ends, when `cancel` fires, or when the consumer goes
    /// away.
    pub(crate) fn spawn<S, I, F>(
        label: &'static str,
        mut source: S,
        buffer: usize,
        cancel: CancellationToken,
        mut convert: F,
    ) -> Self
    where
        S: Stream<Item = I> + Send + Unpin + 'static,
        I: Send + 'static,
        F: FnMut(I) -> Option<T> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut delivered: u64 = 0;
            let mut skipped: u64 = 0;
            loop {
                let next = tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    () = tx.closed() => break,
                    next = source.next() => next,
                };
                let Some(item) = next else { break };
                let Some(item) = convert(item) else {
                    skipped += 1;
                    continue;
                };
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    sent = tx.send(item) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
                delivered += 1;
            }
            debug!(stream = label, delivered, skipped, "subscription finished");
        });

        Self { rx, cancel, task }
    }
}

impl<T> Subscription<T> {
    /// Receives the next item, or `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Stops the background task. Items already buffered can still be
    /// received.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the background task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}
