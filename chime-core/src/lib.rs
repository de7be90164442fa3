//! Chime Core - Event-driven notification core for a network-connected doorbell.
//!
//! This library provides:
//! - Bounded event queues connecting producers (button handler, HTTP routes,
//!   startup code) to the two consumer workers
//! - Animation catalog and LED playback state machine
//! - Webhook registry and HTTP dispatch engine
//! - Chime sound selection and the JSON settings models for all three
//!
//! Storage, the LED strip, the HTTP transport, and the audio device are
//! collaborators behind traits; the doorbell hardware shell supplies them.
//!
//! # Example
//!
//! ```rust,no_run
//! use chime_core::event::{event_queue, Event, EventKind};
//!
//! let (tx, rx) = event_queue();
//! tx.send(Event::new(EventKind::Ready));
//! ```

pub mod animations;
pub mod chime;
pub mod doorbell;
pub mod error;
pub mod event;
pub mod http;
pub mod storage;
pub mod webhooks;

pub use error::{Error, Result};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::animations::{
        Animation, AnimationCatalog, AnimationPlayer, Frame, LedStrip,
    };
    pub use crate::chime::{AudioSink, ChimePlayer, ChimeSettings};
    pub use crate::doorbell::Doorbell;
    pub use crate::error::{Error, Result};
    pub use crate::event::{event_queue, Event, EventKind, EventReceiver, EventSender};
    pub use crate::http::{HttpClient, HttpResponse, ReqwestClient};
    pub use crate::storage::{DirStorage, MemoryStorage, Storage};
    pub use crate::webhooks::{Webhook, WebhookDispatcher, WebhookRegistry};
}
