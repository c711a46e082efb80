//! Async event stream over a blocking subscription client.
//!
//! Moves a [`SubClient`] onto a dedicated receiver thread and forwards each
//! received event through a bounded channel. The bound keeps backpressure
//! with the consumer: when the buffer is full, the loop stops reading.
//!
//! The thread is detached rather than taken from Tokio's blocking pool, so an
//! idle subscription never holds up runtime shutdown.

use crate::pubsub::{SubClient, SubscriptionEvent, SubscriptionResult};
use crate::transport::Transport;
use futures_util::Stream;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;

/// Default number of events buffered between the receive loop and the consumer
pub const DEFAULT_STREAM_BUFFER: usize = 256;

/// Receiving half of a background receive loop
pub struct EventStream {
    rx: mpsc::Receiver<SubscriptionResult<SubscriptionEvent>>,
    handle: JoinHandle<()>,
}

impl<C: Transport + Send + 'static> SubClient<C> {
    /// Run [`SubClient::receive`] in a loop on its own thread.
    ///
    /// The loop ends after forwarding the first error, or once the stream is
    /// dropped (noticed on the next received event, which is discarded).
    /// Until then the thread stays blocked in the read; set a read timeout
    /// on the connection if it must not outlive the stream for long.
    #[must_use]
    pub fn into_event_stream(self, buffer: usize) -> EventStream {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let handle = thread::spawn(move || receive_loop(self, &tx));
        EventStream { rx, handle }
    }
}

fn receive_loop<C: Transport>(
    mut client: SubClient<C>,
    tx: &mpsc::Sender<SubscriptionResult<SubscriptionEvent>>,
) {
    loop {
        let result = client.receive();
        let failed = result.is_err();

        if tx.blocking_send(result).is_err() {
            tracing::debug!("Event stream dropped, stopping receive loop");
            return;
        }
        if failed {
            tracing::warn!("Receive loop stopped after error");
            return;
        }
    }
}

impl EventStream {
    /// Next event; `None` once the receive loop has stopped and the buffer is drained
    pub async fn recv(&mut self) -> Option<SubscriptionResult<SubscriptionEvent>> {
        self.rx.recv().await
    }

    /// Whether the background receive loop has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Adapt into a [`Stream`] of events
    pub fn into_stream(self) -> impl Stream<Item = SubscriptionResult<SubscriptionEvent>> {
        futures_util::stream::unfold(self.rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
    }
}
