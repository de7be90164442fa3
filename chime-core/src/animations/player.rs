//! Playback state machine driving the LED strip.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::animations::catalog::AnimationCatalog;
use crate::animations::types::Animation;
use crate::event::{Event, EventReceiver, QueuePoll};

/// Set-pixel/flush capability of the LED hardware.
///
/// The player worker owns the strip exclusively while playing; nothing else
/// writes pixels. Indices beyond the physical LED count are the
/// implementation's problem to ignore.
pub trait LedStrip: Send {
    /// Stages an RGB color for one pixel.
    fn set_pixel(&mut self, index: usize, color: u32);
    /// Flushes staged pixels to the hardware.
    fn show(&mut self);
    /// Stages all pixels off.
    fn clear(&mut self);
}

/// Consumes events from its queue and plays the matching animation to
/// completion, one at a time. Events arriving mid-playback wait in the queue;
/// there is no preemption or cancellation.
pub struct AnimationPlayer {
    catalog: Arc<Mutex<AnimationCatalog>>,
    leds: Box<dyn LedStrip>,
}

impl AnimationPlayer {
    pub fn new(catalog: Arc<Mutex<AnimationCatalog>>, leds: Box<dyn LedStrip>) -> Self {
        Self { catalog, leds }
    }

    /// Plays the animation for one dequeued event.
    ///
    /// The play key is the event's context when an animation by that exact
    /// name exists (a sound-specific light show), otherwise the event kind
    /// name. No match at all is a logged no-op, never an error.
    pub fn handle_event(&mut self, event: &Event) {
        tracing::debug!("Processing event {}", event);

        // Clone the animation so the catalog lock is not held while playing;
        // a settings update lands between events, never mid-animation.
        let animation = {
            let catalog = self.catalog.lock().unwrap();
            let context = event.context();
            let name = if !context.is_empty() && catalog.contains(context) {
                context
            } else {
                event.kind().name()
            };
            match catalog.get(name) {
                Some(animation) => animation.clone(),
                None => {
                    tracing::warn!("No animation for {}", name);
                    return;
                }
            }
        };

        self.play(&animation);
    }

    /// Plays an animation to completion: repeat_count + 1 passes over the
    /// frames, then an optional clear. An animation with no frames writes
    /// nothing and returns immediately.
    fn play(&mut self, animation: &Animation) {
        for _ in 0..=animation.repeat_count {
            for frame in &animation.frames {
                for (i, &color) in frame.colors.iter().enumerate() {
                    self.leds.set_pixel(i, color);
                }
                self.leds.show();
                thread::sleep(Duration::from_millis(u64::from(frame.duration_ms)));
            }
        }
        if animation.clear_on_done {
            self.leds.clear();
            self.leds.show();
        }
    }

    /// Drains the queue for the lifetime of the process. Exits only once
    /// every producer handle is gone.
    pub fn run(mut self, events: EventReceiver) {
        loop {
            match events.poll() {
                QueuePoll::Event(event) => self.handle_event(&event),
                QueuePoll::Idle => continue,
                QueuePoll::Closed => break,
            }
        }
    }

    /// Starts the playback worker thread.
    pub fn spawn(self, events: EventReceiver) -> thread::JoinHandle<()> {
        thread::Builder::new()
            .name("led-events".to_string())
            .spawn(move || self.run(events))
            .expect("failed to spawn LED worker")
    }
}
