//! Lock-free pulse channel between the edge handler and the frame worker.
//!
//! SPSC (single producer, single consumer) ring of [`BitEvent`]s. The producer
//! side runs in edge-interrupt context: [`PulseProducer::push`] never blocks,
//! never allocates and never waits on the consumer. When the ring is full the
//! event is discarded and counted.
//!
//! Each slot is a single `AtomicU64` packing the capture time and the bit:
//!
//! ```text
//! 63                                            1   0
//! +-----------------------------------------------+---+
//! | microseconds since channel creation           |bit|
//! +-----------------------------------------------+---+
//! ```
//!
//! The consumer side is async: [`PulseConsumer::recv`] parks on an
//! [`AtomicWaker`] that the producer wakes after every publish.

use futures::task::AtomicWaker;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::Instant;
use wiegate_core::Bit;

/// A single decoded edge: which line fell and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitEvent {
    /// Bit signalled by the edge.
    pub bit: Bit,

    /// Capture time of the edge.
    pub at: Instant,
}

impl BitEvent {
    /// Create an event captured at `at`.
    pub fn new(bit: Bit, at: Instant) -> Self {
        Self { bit, at }
    }
}

struct Shared {
    slots: Box<[AtomicU64]>,
    mask: usize,
    /// Next slot to write. Only the producer stores.
    head: AtomicUsize,
    /// Next slot to read. Only the consumer stores.
    tail: AtomicUsize,
    dropped: AtomicU64,
    closed: AtomicBool,
    waker: AtomicWaker,
    epoch: Instant,
}

impl Shared {
    fn encode(&self, event: BitEvent) -> u64 {
        let micros = u64::try_from(event.at.saturating_duration_since(self.epoch).as_micros())
            .unwrap_or(u64::MAX)
            .min(u64::MAX >> 1);
        (micros << 1) | u64::from(event.bit.to_u8())
    }

    fn decode(&self, raw: u64) -> BitEvent {
        BitEvent {
            bit: Bit::from(raw & 1 == 1),
            at: self.epoch + Duration::from_micros(raw >> 1),
        }
    }

    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }
}

/// Create a pulse channel holding up to `capacity` events.
///
/// `capacity` is rounded up to the next power of two (minimum 2).
///
/// # Examples
///
/// ```
/// use wiegate_core::Bit;
/// use wiegate_hardware::pulse::pulse_channel;
///
/// let (producer, mut consumer) = pulse_channel(8);
/// assert!(producer.push(Bit::One));
/// assert_eq!(consumer.try_pop().map(|e| e.bit), Some(Bit::One));
/// assert!(consumer.try_pop().is_none());
/// ```
pub fn pulse_channel(capacity: usize) -> (PulseProducer, PulseConsumer) {
    let capacity = capacity.max(2).next_power_of_two();
    let slots = (0..capacity).map(|_| AtomicU64::new(0)).collect();

    let shared = Arc::new(Shared {
        slots,
        mask: capacity - 1,
        head: AtomicUsize::new(0),
        tail: AtomicUsize::new(0),
        dropped: AtomicU64::new(0),
        closed: AtomicBool::new(false),
        waker: AtomicWaker::new(),
        epoch: Instant::now(),
    });

    (
        PulseProducer {
            shared: Arc::clone(&shared),
        },
        PulseConsumer { shared },
    )
}

/// Sending half of a pulse channel. Owned by the edge handler.
///
/// Dropping the producer closes the channel; the consumer drains what is left
/// and then observes the end of the stream.
pub struct PulseProducer {
    shared: Arc<Shared>,
}

impl PulseProducer {
    /// Publish a bit stamped with the current time.
    ///
    /// Returns `false` if the ring was full and the event was dropped.
    #[inline]
    pub fn push(&self, bit: Bit) -> bool {
        self.push_event(BitEvent::new(bit, Instant::now()))
    }

    /// Publish a bit captured at `at`.
    #[inline]
    pub fn push_at(&self, bit: Bit, at: Instant) -> bool {
        self.push_event(BitEvent::new(bit, at))
    }

    fn push_event(&self, event: BitEvent) -> bool {
        let shared = &*self.shared;
        let head = shared.head.load(Ordering::Relaxed);
        let tail = shared.tail.load(Ordering::Acquire);

        if head.wrapping_sub(tail) > shared.mask {
            shared.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        shared.slots[head & shared.mask].store(shared.encode(event), Ordering::Relaxed);
        shared.head.store(head.wrapping_add(1), Ordering::Release);
        shared.waker.wake();
        true
    }

    /// Number of events discarded because the ring was full.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Ring capacity in events.
    pub fn capacity(&self) -> usize {
        self.shared.mask + 1
    }
}

impl Drop for PulseProducer {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        self.shared.waker.wake();
    }
}

impl std::fmt::Debug for PulseProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PulseProducer")
            .field("capacity", &self.capacity())
            .field("pending", &self.shared.len())
            .field("dropped", &self.dropped())
            .finish()
    }
}

/// Receiving half of a pulse channel. Owned by the frame worker.
pub struct PulseConsumer {
    shared: Arc<Shared>,
}

impl PulseConsumer {
    /// Take the oldest pending event, if any.
    pub fn try_pop(&mut self) -> Option<BitEvent> {
        let shared = &*self.shared;
        let tail = shared.tail.load(Ordering::Relaxed);
        let head = shared.head.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        let raw = shared.slots[tail & shared.mask].load(Ordering::Relaxed);
        shared.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(shared.decode(raw))
    }

    /// Poll for the next event.
    ///
    /// Resolves to `None` once the producer is gone and the ring is drained.
    pub fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<BitEvent>> {
        if let Some(event) = self.try_pop() {
            return Poll::Ready(Some(event));
        }

        self.shared.waker.register(cx.waker());

        // Re-check after registering so a publish racing the registration
        // is not missed.
        if let Some(event) = self.try_pop() {
            return Poll::Ready(Some(event));
        }
        if self.shared.closed.load(Ordering::Acquire) {
            return Poll::Ready(self.try_pop());
        }
        Poll::Pending
    }

    /// Wait for the next event.
    ///
    /// Cancel safe: no event is consumed unless the future resolves.
    pub async fn recv(&mut self) -> Option<BitEvent> {
        std::future::poll_fn(|cx| self.poll_recv(cx)).await
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` if no event is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of events discarded because the ring was full.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Returns `true` once the producer has been dropped.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for PulseConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PulseConsumer")
            .field("pending", &self.len())
            .field("dropped", &self.dropped())
            .field("closed", &self.is_closed())
            .finish()
    }
}
