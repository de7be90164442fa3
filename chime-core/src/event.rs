//! Events and the bounded queues that carry them to the consumer workers.
//!
//! Each consumer (animation player, webhook dispatcher) owns one bounded FIFO
//! queue. Producers may enqueue from any thread, including the button
//! interrupt path, so enqueueing never blocks beyond a short timeout: a full
//! queue drops the event and reports it with a boolean.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

/// Maximum number of pending events per queue.
pub const QUEUE_CAPACITY: usize = 10;

/// How long an enqueue attempt waits on a full queue before dropping.
pub const ENQUEUE_TIMEOUT: Duration = Duration::from_millis(10);

/// Poll interval used by the consumer worker loops.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The closed set of occurrences the doorbell firmware reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A chime has started playing for a button press.
    RingStart,
    /// The chime finished.
    RingEnd,
    /// WiFi provisioning portal opened.
    ConfigStart,
    /// WiFi provisioning portal closed.
    ConfigEnd,
    /// New firmware was flashed.
    FirmwareUpdated,
    /// Storage backend failed.
    StorageFault,
    /// Audio device failed.
    AudioFault,
    /// Webhook settings failed to load.
    NotifyFault,
    /// Startup finished.
    Ready,
}

impl EventKind {
    /// The wire/catalog name of this event kind. Animation catalog entries
    /// and webhook `%EVENT%` substitutions both use these names.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::RingStart => "RING_START",
            EventKind::RingEnd => "RING_END",
            EventKind::ConfigStart => "CONFIG_START",
            EventKind::ConfigEnd => "CONFIG_END",
            EventKind::FirmwareUpdated => "FIRMWARE_UPDATED",
            EventKind::StorageFault => "STORAGE_FAULT",
            EventKind::AudioFault => "AUDIO_FAULT",
            EventKind::NotifyFault => "NOTIFY_FAULT",
            EventKind::Ready => "READY",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An immutable notification passed from a producer to one consumer.
///
/// The context carries the sound file that triggered the event, when there is
/// one; an empty context means "no context".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
    context: String,
}

impl Event {
    /// Creates an event with no context.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            context: String::new(),
        }
    }

    /// Creates an event carrying a context string (e.g. a sound file path).
    pub fn with_context(kind: EventKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.context.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}:{}", self.kind, self.context)
        }
    }
}

/// Producer handle for one consumer's queue. Cheap to clone; safe to share
/// across producer threads.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Attempts to enqueue an event.
    ///
    /// Returns false and drops the event if the queue is still full after a
    /// short timeout. The producer is never blocked and never retried for.
    pub fn send(&self, event: Event) -> bool {
        match self.tx.send_timeout(event, ENQUEUE_TIMEOUT) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Event queue full, dropping {}", err.into_inner());
                false
            }
        }
    }
}

/// Result of one consumer poll on the queue.
#[derive(Debug)]
pub(crate) enum QueuePoll {
    /// An event was dequeued.
    Event(Event),
    /// Nothing arrived within the poll interval.
    Idle,
    /// Every producer handle is gone; the worker can stop.
    Closed,
}

/// Consumer handle for a queue. Exactly one worker loop owns it.
pub struct EventReceiver {
    rx: Receiver<Event>,
}

impl EventReceiver {
    /// Waits up to `timeout` for the next event.
    pub fn recv(&self, timeout: Duration) -> Option<Event> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Single worker-loop poll, distinguishing an empty queue from a closed
    /// one so loops run for the process lifetime but can drain in tests.
    pub(crate) fn poll(&self) -> QueuePoll {
        match self.rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => QueuePoll::Event(event),
            Err(RecvTimeoutError::Timeout) => QueuePoll::Idle,
            Err(RecvTimeoutError::Disconnected) => QueuePoll::Closed,
        }
    }
}

/// Creates one consumer queue, returning the producer and consumer halves.
pub fn event_queue() -> (EventSender, EventReceiver) {
    let (tx, rx) = bounded(QUEUE_CAPACITY);
    (EventSender { tx }, EventReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display_with_context() {
        let event = Event::with_context(EventKind::RingStart, "/sounds/chime.mp3");
        assert_eq!(event.to_string(), "RING_START:/sounds/chime.mp3");
        assert_eq!(Event::new(EventKind::Ready).to_string(), "READY");
    }

    #[test]
    fn test_queue_fifo_order() {
        let (tx, rx) = event_queue();
        tx.send(Event::new(EventKind::RingStart));
        tx.send(Event::new(EventKind::RingEnd));

        assert_eq!(
            rx.recv(Duration::from_millis(50)).unwrap().kind(),
            EventKind::RingStart
        );
        assert_eq!(
            rx.recv(Duration::from_millis(50)).unwrap().kind(),
            EventKind::RingEnd
        );
        assert!(rx.recv(Duration::from_millis(20)).is_none());
    }

    #[test]
    fn test_queue_drops_eleventh_event() {
        let (tx, rx) = event_queue();

        let mut accepted = 0;
        let mut dropped = 0;
        for _ in 0..QUEUE_CAPACITY + 1 {
            if tx.send(Event::new(EventKind::Ready)) {
                accepted += 1;
            } else {
                dropped += 1;
            }
        }
        assert_eq!(accepted, QUEUE_CAPACITY);
        assert_eq!(dropped, 1);

        // The accepted events are all still there, in order.
        let mut delivered = 0;
        while rx.recv(Duration::from_millis(20)).is_some() {
            delivered += 1;
        }
        assert_eq!(delivered, QUEUE_CAPACITY);
    }

    #[test]
    fn test_queue_order_preserved_under_drop() {
        let (tx, rx) = event_queue();

        let kinds = [
            EventKind::RingStart,
            EventKind::RingEnd,
            EventKind::ConfigStart,
            EventKind::ConfigEnd,
            EventKind::FirmwareUpdated,
            EventKind::StorageFault,
            EventKind::AudioFault,
            EventKind::NotifyFault,
            EventKind::Ready,
            EventKind::RingStart,
        ];
        for kind in kinds {
            assert!(tx.send(Event::new(kind)));
        }
        // Capacity reached; one more is reported as dropped.
        assert!(!tx.send(Event::new(EventKind::RingEnd)));

        for kind in kinds {
            assert_eq!(rx.recv(Duration::from_millis(20)).unwrap().kind(), kind);
        }
        assert!(rx.recv(Duration::from_millis(20)).is_none());
    }

    #[test]
    fn test_poll_reports_closed_queue() {
        let (tx, rx) = event_queue();
        tx.send(Event::new(EventKind::Ready));
        drop(tx);

        assert!(matches!(rx.poll(), QueuePoll::Event(_)));
        assert!(matches!(rx.poll(), QueuePoll::Closed));
    }

    #[test]
    fn test_concurrent_producers() {
        let (tx, rx) = event_queue();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tx = tx.clone();
                std::thread::spawn(move || tx.send(Event::new(EventKind::Ready)))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        let mut delivered = 0;
        while rx.recv(Duration::from_millis(20)).is_some() {
            delivered += 1;
        }
        assert_eq!(delivered, 4);
    }
}
