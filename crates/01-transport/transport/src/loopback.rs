//! In-process broadcaster used when both ends live in one address space
//! (tests, simulators, single-binary deployments).
//!
//! Intents are queued on send and handed to receivers when the owner drains
//! the queue, either explicitly via [`LoopbackBus::deliver_pending`] or from a
//! [`DeliveryWorker`] thread. Delivery keeps the platform's guarantees and no
//! more: an intent with no matching receiver at delivery time is dropped, and
//! a full queue drops the newest intent.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::broadcast::{BroadcastReceiver, Broadcaster, ReceiverHandle, SendOutcome};
use crate::error::{TransportError, TransportResult};
use crate::intent::{Intent, IntentFilter};

/// Construction parameters for a [`LoopbackBus`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BusConfig {
    /// Maximum number of undelivered intents. `None` means unbounded.
    pub queue_capacity: Option<usize>,
}

struct Registered {
    handle: ReceiverHandle,
    filter: IntentFilter,
    receiver: Arc<dyn BroadcastReceiver>,
}

struct BusInner {
    receivers: RwLock<Vec<Registered>>,
    queue_tx: Sender<Intent>,
    queue_rx: Receiver<Intent>,
    next_id: AtomicU64,
    closed: AtomicBool,
    metrics: BusMetrics,
}

impl BusInner {
    fn deliver(&self, intent: Intent) {
        let targets: SmallVec<[Arc<dyn BroadcastReceiver>; 4]> = self
            .receivers
            .read()
            .iter()
            .filter(|entry| entry.filter.matches(&intent))
            .map(|entry| Arc::clone(&entry.receiver))
            .collect();

        if targets.is_empty() {
            tracing::trace!(action = intent.action(), "no receiver bound, dropping intent");
            self.metrics.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        for receiver in targets.iter() {
            receiver.on_receive(&intent);
        }
        self.metrics.delivered.fetch_add(1, Ordering::Relaxed);
    }
}

/// Cloneable handle to a shared in-process broadcast bus.
#[derive(Clone)]
pub struct LoopbackBus {
    inner: Arc<BusInner>,
}

impl Default for LoopbackBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackBus {
    /// Creates a bus with an unbounded queue.
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        let (queue_tx, queue_rx) = match config.queue_capacity {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };
        Self {
            inner: Arc::new(BusInner {
                receivers: RwLock::new(Vec::new()),
                queue_tx,
                queue_rx,
                next_id: AtomicU64::new(1),
                closed: AtomicBool::new(false),
                metrics: BusMetrics::default(),
            }),
        }
    }

    /// Delivers up to `max` queued intents on the calling thread.
    ///
    /// Returns how many intents were taken off the queue, whether or not a
    /// receiver matched them.
    pub fn deliver_pending(&self, max: usize) -> usize {
        let mut processed = 0;
        while processed < max {
            let Ok(intent) = self.inner.queue_rx.try_recv() else {
                break;
            };
            self.inner.deliver(intent);
            processed += 1;
        }
        processed
    }

    /// Delivers until the queue is empty, including intents sent by receivers
    /// while delivering.
    pub fn deliver_all(&self) -> usize {
        let mut processed = 0;
        while let Ok(intent) = self.inner.queue_rx.try_recv() {
            self.inner.deliver(intent);
            processed += 1;
        }
        processed
    }

    /// Discards every queued intent without delivering it.
    pub fn discard_pending(&self) -> usize {
        let mut discarded = 0;
        while self.inner.queue_rx.try_recv().is_ok() {
            self.inner.metrics.dropped.fetch_add(1, Ordering::Relaxed);
            discarded += 1;
        }
        discarded
    }

    pub fn pending(&self) -> usize {
        self.inner.queue_rx.len()
    }

    pub fn receiver_count(&self) -> usize {
        self.inner.receivers.read().len()
    }

    pub fn metrics(&self) -> BusMetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Stops accepting intents and receivers. Already queued intents can still be delivered.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Spawns a thread that delivers intents as they arrive.
    ///
    /// `poll_interval` bounds how long the worker sleeps before re-checking
    /// its stop flag.
    pub fn spawn_delivery(&self, poll_interval: Duration) -> DeliveryWorker {
        let inner = Arc::clone(&self.inner);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::Acquire) {
                match inner.queue_rx.recv_timeout(poll_interval) {
                    Ok(intent) => inner.deliver(intent),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        DeliveryWorker {
            stop,
            handle: Some(handle),
        }
    }
}

impl Broadcaster for LoopbackBus {
    fn send_broadcast(&self, intent: Intent) -> SendOutcome {
        if self.is_closed() {
            self.inner.metrics.dropped.fetch_add(1, Ordering::Relaxed);
            return SendOutcome::Dropped;
        }
        match self.inner.queue_tx.try_send(intent) {
            Ok(()) => {
                self.inner.metrics.accepted.fetch_add(1, Ordering::Relaxed);
                SendOutcome::Accepted
            }
            Err(TrySendError::Full(intent)) => {
                tracing::trace!(action = intent.action(), "queue full, dropping intent");
                self.inner.metrics.dropped.fetch_add(1, Ordering::Relaxed);
                SendOutcome::Dropped
            }
            Err(TrySendError::Disconnected(_)) => {
                self.inner.metrics.dropped.fetch_add(1, Ordering::Relaxed);
                SendOutcome::Dropped
            }
        }
    }

    fn register_receiver(
        &self,
        filter: IntentFilter,
        receiver: Arc<dyn BroadcastReceiver>,
    ) -> TransportResult<ReceiverHandle> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        if filter.action().is_empty() {
            return Err(TransportError::EmptyAction);
        }
        let handle = ReceiverHandle::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%handle, action = filter.action(), "receiver bound");
        self.inner.receivers.write().push(Registered {
            handle,
            filter,
            receiver,
        });
        Ok(handle)
    }

    fn unregister_receiver(&self, handle: ReceiverHandle) -> TransportResult<()> {
        let mut receivers = self.inner.receivers.write();
        let Some(index) = receivers.iter().position(|entry| entry.handle == handle) else {
            return Err(TransportError::UnknownReceiver(handle.id()));
        };
        receivers.swap_remove(index);
        tracing::debug!(%handle, "receiver unbound");
        Ok(())
    }
}

/// Background delivery thread created by [`LoopbackBus::spawn_delivery`].
///
/// Dropping the worker stops and joins the thread.
pub struct DeliveryWorker {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DeliveryWorker {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("delivery worker panicked");
            }
        }
    }
}

impl Drop for DeliveryWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[derive(Default)]
struct BusMetrics {
    accepted: AtomicU32,
    delivered: AtomicU32,
    dropped: AtomicU32,
}

impl BusMetrics {
    fn snapshot(&self) -> BusMetricsSnapshot {
        BusMetricsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the bus counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusMetricsSnapshot {
    /// Intents taken onto the queue.
    pub accepted: u32,
    /// Intents handed to at least one receiver.
    pub delivered: u32,
    /// Intents refused on send or with no receiver at delivery time.
    pub dropped: u32,
}
