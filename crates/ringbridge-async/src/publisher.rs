//! Demand-driven element publisher.
//!
//! A [`Publisher`] and its [`Emitter`] share a demand counter. The emitter
//! must obtain one unit of demand per element, and the publisher grants
//! demand in batches of `prefetch` only once every previously granted
//! element has been delivered. At most `prefetch` elements can therefore
//! sit between producer and consumer at any time.
//!
//! Dropping or cancelling the publisher closes the demand counter; a
//! pending or later [`Emitter::emit()`] then returns [`Error::Cancelled`]
//! so the producer stops generating elements.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::{mpsc, Semaphore};

use crate::Error;

/// Demand granted per batch when none is specified.
pub const DEFAULT_PREFETCH: usize = 16;

/// Create a connected emitter/publisher pair.
///
/// `prefetch` is the demand batch size; zero is treated as one.
pub fn publisher<T>(prefetch: usize) -> (Emitter<T>, Publisher<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let demand = Arc::new(Semaphore::new(0));
    let emitter = Emitter {
        tx,
        demand: demand.clone(),
    };
    let publisher = Publisher {
        rx,
        demand,
        prefetch: prefetch.max(1),
        outstanding: 0,
        done: false,
    };
    (emitter, publisher)
}

/// Producer half of a [`publisher`] pair.
///
/// Dropping the emitter completes the publisher once buffered elements
/// have been delivered.
pub struct Emitter<T> {
    tx: mpsc::UnboundedSender<Result<T, Error>>,
    demand: Arc<Semaphore>,
}

impl<T> Emitter<T> {
    /// Wait for demand, then hand `item` to the consumer.
    pub async fn emit(&self, item: T) -> Result<(), Error> {
        let permit = self.demand.acquire().await.map_err(|_| Error::Cancelled)?;
        permit.forget();
        self.tx.send(Ok(item)).map_err(|_| Error::Cancelled)
    }

    /// Terminate the publisher with `error`. Needs no demand.
    pub fn fail(self, error: Error) {
        let _ = self.tx.send(Err(error));
    }

    /// Signal completion. Equivalent to dropping the emitter.
    pub fn complete(self) {}

    pub fn is_cancelled(&self) -> bool {
        self.tx.is_closed() || self.demand.is_closed()
    }
}

/// Consumer half of a [`publisher`] pair.
///
/// Implements `Stream<Item = Result<T, Error>>`; polling requests more
/// demand automatically when everything requested so far has arrived.
pub struct Publisher<T> {
    rx: mpsc::UnboundedReceiver<Result<T, Error>>,
    demand: Arc<Semaphore>,
    prefetch: usize,
    outstanding: usize,
    done: bool,
}

impl<T> Unpin for Publisher<T> {}

impl<T> Publisher<T> {
    /// Grant the emitter demand for `n` more elements.
    ///
    /// Demand saturates at the semaphore's permit ceiling, so `usize::MAX`
    /// asks for an effectively unbounded stream.
    pub fn request(&mut self, n: usize) {
        let room = Semaphore::MAX_PERMITS.saturating_sub(self.demand.available_permits());
        let n = n.min(room);
        if self.done || n == 0 {
            return;
        }
        self.demand.add_permits(n);
        self.outstanding = self.outstanding.saturating_add(n);
    }

    /// Stop the subscription; the emitter observes cancellation.
    pub fn cancel(&mut self) {
        self.done = true;
        self.demand.close();
        self.rx.close();
    }

    /// Elements requested but not yet delivered.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn prefetch(&self) -> usize {
        self.prefetch
    }
}

impl<T> Stream for Publisher<T> {
    type Item = Result<T, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        if this.outstanding == 0 {
            let batch = this.prefetch;
            this.request(batch);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(Ok(item))) => {
                this.outstanding = this.outstanding.saturating_sub(1);
                Poll::Ready(Some(Ok(item)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.cancel();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.done = true;
                this.demand.close();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for Publisher<T> {
    fn drop(&mut self) {
        self.demand.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn delivers_in_emission_order() {
        let (emitter, publisher) = publisher::<u32>(2);
        tokio::spawn(async move {
            for i in 0..10 {
                emitter.emit(i).await.unwrap();
            }
        });

        let items: Vec<u32> = publisher.map(|r| r.unwrap()).collect().await;
        assert_eq!(items, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn emitter_waits_for_demand() {
        let (emitter, mut publisher) = publisher::<usize>(2);
        let emitted = Arc::new(AtomicUsize::new(0));
        let counter = emitted.clone();
        tokio::spawn(async move {
            for i in 0..10 {
                if emitter.emit(i).await.is_err() {
                    break;
                }
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        // Nothing is requested until the consumer polls.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(emitted.load(Ordering::SeqCst), 0);

        // First poll grants a batch of two.
        assert_eq!(publisher.next().await, Some(Ok(0)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(emitted.load(Ordering::SeqCst), 2);
        assert_eq!(publisher.outstanding(), 1);

        // Draining the batch does not grant more until the next poll.
        assert_eq!(publisher.next().await, Some(Ok(1)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(emitted.load(Ordering::SeqCst), 2);

        assert_eq!(publisher.next().await, Some(Ok(2)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(emitted.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn explicit_request_grants_demand() {
        let (emitter, mut publisher) = publisher::<&'static str>(1);
        publisher.request(3);
        assert_eq!(publisher.outstanding(), 3);

        emitter.emit("a").await.unwrap();
        emitter.emit("b").await.unwrap();
        emitter.emit("c").await.unwrap();
        drop(emitter);

        let items: Vec<_> = publisher.map(|r| r.unwrap()).collect().await;
        assert_eq!(items, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn unbounded_request_saturates() {
        let (emitter, mut publisher) = publisher::<u32>(1);
        publisher.request(usize::MAX);
        publisher.request(usize::MAX);
        assert!(publisher.outstanding() >= 3);

        for i in 0..3 {
            emitter.emit(i).await.unwrap();
        }
        drop(emitter);

        let items: Vec<_> = publisher.map(|r| r.unwrap()).collect().await;
        assert_eq!(items, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn failure_terminates_stream() {
        let (emitter, publisher) = publisher::<u8>(4);
        tokio::spawn(async move {
            emitter.emit(1).await.unwrap();
            emitter.fail(Error::producer("upstream gone"));
        });

        let items: Vec<_> = publisher.collect().await;
        assert_eq!(items, vec![Ok(1), Err(Error::producer("upstream gone"))]);
    }

    #[tokio::test]
    async fn dropping_publisher_cancels_emitter() {
        let (emitter, publisher) = publisher::<u8>(4);
        drop(publisher);

        assert!(emitter.is_cancelled());
        assert_eq!(emitter.emit(1).await, Err(Error::Cancelled));
    }

    #[tokio::test]
    async fn cancel_wakes_pending_emit() {
        let (emitter, mut publisher) = publisher::<u8>(1);
        let pending = tokio::spawn(async move { emitter.emit(9).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        publisher.cancel();

        assert_eq!(pending.await.unwrap(), Err(Error::Cancelled));
        assert_eq!(publisher.next().await, None);
    }
}
