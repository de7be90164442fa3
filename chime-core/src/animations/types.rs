//! Animation data model and its JSON wire format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of LEDs on the physical ring. Frames are expected to carry one
/// color per LED, but nothing enforces it; extra entries are simply ignored
/// by the strip.
pub const LED_COUNT: usize = 16;

/// One instant of an animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// How long this frame stays on the LEDs, in milliseconds.
    pub duration_ms: u32,
    /// RGB value for each LED, in pixel order.
    pub colors: Vec<u32>,
}

/// A named LED pattern: an ordered frame sequence plus repeat and cleanup
/// policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    /// How many extra times to repeat: total plays = repeat_count + 1.
    pub repeat_count: u32,
    /// Whether to blank the ring after the last pass, or leave the final
    /// frame showing.
    pub clear_on_done: bool,
    pub frames: Vec<Frame>,
}

/// Parses a color token from the wire format.
///
/// Accepts decimal ("8257359") and hex ("0x7E4F2A") encodings. A token that
/// fails to parse coerces to 0 rather than rejecting the animation, so one
/// bad cell never discards a whole pattern.
pub fn parse_color(token: &str) -> u32 {
    let token = token.trim();
    let parsed = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        token.parse()
    };
    parsed.unwrap_or(0)
}

/// Formats a color for the wire: hex with the 0x prefix, the encoding the
/// default animations and the web UI both use.
fn color_token(color: u32) -> String {
    format!("0x{:06X}", color)
}

/// Wire form of a frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FrameSpec {
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub colors: Vec<String>,
}

/// Wire form of an animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AnimationSpec {
    #[serde(default)]
    pub repetitions: u32,
    #[serde(default, rename = "clearOnDone")]
    pub clear_on_done: bool,
    #[serde(default)]
    pub frames: Vec<FrameSpec>,
}

/// Top level of the animations settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AnimationsFile {
    #[serde(default)]
    pub animations: BTreeMap<String, AnimationSpec>,
}

impl From<AnimationSpec> for Animation {
    fn from(spec: AnimationSpec) -> Self {
        Animation {
            repeat_count: spec.repetitions,
            clear_on_done: spec.clear_on_done,
            frames: spec
                .frames
                .into_iter()
                .map(|f| Frame {
                    duration_ms: f.duration,
                    colors: f.colors.iter().map(|c| parse_color(c)).collect(),
                })
                .collect(),
        }
    }
}

impl Animation {
    pub(crate) fn to_spec(&self) -> AnimationSpec {
        AnimationSpec {
            repetitions: self.repeat_count,
            clear_on_done: self.clear_on_done,
            frames: self
                .frames
                .iter()
                .map(|f| FrameSpec {
                    duration: f.duration_ms,
                    colors: f.colors.iter().map(|&c| color_token(c)).collect(),
                })
                .collect(),
        }
    }
}
