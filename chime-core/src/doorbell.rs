//! Event routing from domain occurrences to the consumer queues.
//!
//! Producers (button handler, HTTP routes, provisioning callbacks, startup
//! code) do not talk to consumers directly; they hand a `Doorbell` the
//! occurrence and it decides which queue(s) get which event. Ring events go
//! to both the LED and webhook queues; everything else only drives the ring.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::chime::ChimePlayer;
use crate::event::{Event, EventKind, EventSender};

/// Central event router plus the ringing latch the button interrupt sets.
pub struct Doorbell {
    led_events: EventSender,
    hook_events: EventSender,
    chimes: ChimePlayer,
    ringing: AtomicBool,
}

impl Doorbell {
    pub fn new(led_events: EventSender, hook_events: EventSender, chimes: ChimePlayer) -> Self {
        Self {
            led_events,
            hook_events,
            chimes,
            ringing: AtomicBool::new(false),
        }
    }

    /// Latches the ringing flag from the button interrupt path. Returns
    /// false when a ring is already in progress, so repeated edges while the
    /// chime plays are ignored.
    pub fn request_ring(&self) -> bool {
        !self.ringing.swap(true, Ordering::SeqCst)
    }

    /// True between `request_ring` and `ring_finished`.
    pub fn is_ringing(&self) -> bool {
        self.ringing.load(Ordering::SeqCst)
    }

    /// Starts a ring: picks and plays a random chime, then announces
    /// RING_START on both queues. The LED event carries the sound's short
    /// name (so a sound can select its own animation), the webhook event the
    /// full path. With no chimes configured the ring is announced without a
    /// context.
    ///
    /// Returns the chosen sound path, if any.
    pub fn ring_started(&mut self) -> Option<String> {
        let file = self.chimes.play_random();
        match &file {
            Some(path) => {
                self.led_events
                    .send(Event::with_context(EventKind::RingStart, sound_stem(path)));
                self.hook_events
                    .send(Event::with_context(EventKind::RingStart, path.clone()));
            }
            None => {
                self.led_events.send(Event::new(EventKind::RingStart));
                self.hook_events.send(Event::new(EventKind::RingStart));
            }
        }
        file
    }

    /// Plays a specific chime (the web UI's test-sound route) and announces
    /// it like a real ring.
    pub fn preview(&mut self, path: &str) -> bool {
        let ok = self.chimes.play(path);
        self.led_events
            .send(Event::with_context(EventKind::RingStart, sound_stem(path)));
        self.hook_events
            .send(Event::with_context(EventKind::RingStart, path));
        ok
    }

    /// Ends a ring: releases the latch and announces RING_END on both
    /// queues.
    pub fn ring_finished(&self) {
        self.led_events.send(Event::new(EventKind::RingEnd));
        self.hook_events.send(Event::new(EventKind::RingEnd));
        self.ringing.store(false, Ordering::SeqCst);
    }

    /// WiFi provisioning portal opened.
    pub fn config_started(&self) {
        self.led_events.send(Event::new(EventKind::ConfigStart));
    }

    /// WiFi provisioning portal closed.
    pub fn config_ended(&self) {
        self.led_events.send(Event::new(EventKind::ConfigEnd));
    }

    /// New firmware was flashed.
    pub fn firmware_updated(&self) {
        self.led_events.send(Event::new(EventKind::FirmwareUpdated));
    }

    /// Startup finished.
    pub fn ready(&self) {
        self.led_events.send(Event::new(EventKind::Ready));
    }

    /// Storage backend failed.
    pub fn storage_fault(&self) {
        self.led_events.send(Event::new(EventKind::StorageFault));
    }

    /// Audio device failed.
    pub fn audio_fault(&self) {
        self.led_events.send(Event::new(EventKind::AudioFault));
    }

    /// Webhook settings failed to load.
    pub fn notify_fault(&self) {
        self.led_events.send(Event::new(EventKind::NotifyFault));
    }

    /// True while a chime sound is still playing.
    pub fn is_chime_playing(&self) -> bool {
        self.chimes.is_playing()
    }

    pub fn chimes(&self) -> &ChimePlayer {
        &self.chimes
    }

    pub fn chimes_mut(&mut self) -> &mut ChimePlayer {
        &mut self.chimes
    }
}

/// Short display name of a sound path: the segment after the last slash,
/// truncated at its first dot ("/sounds/chime.mp3" → "chime").
fn sound_stem(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = name.split('.').next().unwrap_or(name);
    stem.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::chime::AudioSink;
    use crate::event::{event_queue, EventReceiver};
    use crate::storage::MemoryStorage;

    #[derive(Clone, Default)]
    struct FakeSink {
        played: Arc<Mutex<Vec<String>>>,
    }

    impl AudioSink for FakeSink {
        fn play(&mut self, path: &str) -> bool {
            self.played.lock().unwrap().push(path.to_string());
            true
        }
        fn is_busy(&self) -> bool {
            false
        }
        fn set_volume(&mut self, _level: u8) {}
    }

    fn doorbell_with_files(files: &str) -> (Doorbell, EventReceiver, EventReceiver) {
        let mut chimes = ChimePlayer::new(
            Arc::new(MemoryStorage::new()),
            "/settings/audio_settings.json",
            Box::new(FakeSink::default()),
        );
        chimes.apply(files).unwrap();

        let (led_tx, led_rx) = event_queue();
        let (hook_tx, hook_rx) = event_queue();
        (Doorbell::new(led_tx, hook_tx, chimes), led_rx, hook_rx)
    }

    fn next(rx: &EventReceiver) -> Option<Event> {
        rx.recv(Duration::from_millis(50))
    }

    #[test]
    fn test_sound_stem() {
        assert_eq!(sound_stem("/sounds/chime.mp3"), "chime");
        assert_eq!(sound_stem("bell.wav"), "bell");
        assert_eq!(sound_stem("plain"), "plain");
    }

    #[test]
    fn test_ring_goes_to_both_queues_with_contexts() {
        let (mut bell, led_rx, hook_rx) =
            doorbell_with_files(r#"{"volume": 10, "files": ["/sounds/chime.mp3"]}"#);

        let chosen = bell.ring_started().unwrap();
        assert_eq!(chosen, "/sounds/chime.mp3");

        let led_event = next(&led_rx).unwrap();
        assert_eq!(led_event.kind(), EventKind::RingStart);
        assert_eq!(led_event.context(), "chime");

        let hook_event = next(&hook_rx).unwrap();
        assert_eq!(hook_event.kind(), EventKind::RingStart);
        assert_eq!(hook_event.context(), "/sounds/chime.mp3");
    }

    #[test]
    fn test_ring_without_chimes_has_no_context() {
        let (mut bell, led_rx, hook_rx) =
            doorbell_with_files(r#"{"volume": 10, "files": []}"#);

        assert!(bell.ring_started().is_none());
        assert_eq!(next(&led_rx).unwrap().context(), "");
        assert_eq!(next(&hook_rx).unwrap().context(), "");
    }

    #[test]
    fn test_ring_finished_goes_to_both_queues() {
        let (bell, led_rx, hook_rx) = doorbell_with_files(r#"{"files": []}"#);
        bell.ring_finished();

        assert_eq!(next(&led_rx).unwrap().kind(), EventKind::RingEnd);
        assert_eq!(next(&hook_rx).unwrap().kind(), EventKind::RingEnd);
    }

    #[test]
    fn test_status_events_only_drive_the_ring() {
        let (bell, led_rx, hook_rx) = doorbell_with_files(r#"{"files": []}"#);

        bell.config_started();
        bell.config_ended();
        bell.firmware_updated();
        bell.storage_fault();
        bell.ready();

        let kinds: Vec<_> = std::iter::from_fn(|| next(&led_rx).map(|e| e.kind())).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::ConfigStart,
                EventKind::ConfigEnd,
                EventKind::FirmwareUpdated,
                EventKind::StorageFault,
                EventKind::Ready,
            ]
        );
        assert!(next(&hook_rx).is_none());
    }

    #[test]
    fn test_request_ring_latches() {
        let (bell, _led_rx, _hook_rx) = doorbell_with_files(r#"{"files": []}"#);

        assert!(bell.request_ring());
        assert!(bell.is_ringing());
        // A second edge while ringing is ignored.
        assert!(!bell.request_ring());

        bell.ring_finished();
        assert!(!bell.is_ringing());
        assert!(bell.request_ring());
    }

    #[test]
    fn test_preview_announces_like_a_ring() {
        let (mut bell, led_rx, hook_rx) = doorbell_with_files(r#"{"files": []}"#);

        assert!(bell.preview("/sounds/big-ben.mp3"));
        assert_eq!(next(&led_rx).unwrap().context(), "big-ben");
        assert_eq!(next(&hook_rx).unwrap().context(), "/sounds/big-ben.mp3");
    }
}
