//! Animation catalog and LED playback.

mod catalog;
mod defaults;
mod player;
mod types;

pub use catalog::AnimationCatalog;
pub use defaults::default_animations;
pub use player::{AnimationPlayer, LedStrip};
pub use types::{parse_color, Animation, Frame, LED_COUNT};
