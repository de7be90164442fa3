//! Built-in animations seeded into the catalog at startup.
//!
//! One pattern per event kind, keyed by the event's wire name. Custom
//! settings overlay these by name; kinds left untouched keep their default.

use std::collections::HashMap;

use super::types::{Animation, Frame, LED_COUNT};

const RING_BLUE: u32 = 0x00317F;
const CONFIG_BLUE: u32 = 0x00007F;
const CONFIG_ORANGE: u32 = 0xFF7F00;
const UPDATE_MAGENTA: u32 = 0xFF00C4;
const FAULT_RED: u32 = 0xFF0000;
const READY_GREEN: u32 = 0x007F00;

fn frame(duration_ms: u32, color_at: impl Fn(usize) -> u32) -> Frame {
    Frame {
        duration_ms,
        colors: (0..LED_COUNT).map(color_at).collect(),
    }
}

/// One dark pixel walking around an otherwise lit ring.
fn gap_chase(color: u32, duration_ms: u32) -> Vec<Frame> {
    (0..LED_COUNT)
        .map(|gap| frame(duration_ms, |i| if i == gap { 0 } else { color }))
        .collect()
}

/// A single lit pixel walking around a dark ring.
fn dot_chase(color: u32, duration_ms: u32) -> Vec<Frame> {
    (0..LED_COUNT)
        .map(|dot| frame(duration_ms, |i| if i == dot { color } else { 0 }))
        .collect()
}

/// Two lit pixels half a ring apart, walking half the ring.
fn pair_chase(color: u32, duration_ms: u32) -> Vec<Frame> {
    (0..LED_COUNT / 2)
        .map(|step| {
            frame(duration_ms, |i| {
                if i == step || i == step + LED_COUNT / 2 {
                    color
                } else {
                    0
                }
            })
        })
        .collect()
}

/// Every fourth pixel lit, rotating one step per frame.
fn quarter_spin(color: u32, duration_ms: u32) -> Vec<Frame> {
    (0..4)
        .map(|offset| frame(duration_ms, |i| if i % 4 == offset { color } else { 0 }))
        .collect()
}

/// A steady bar of `width` red pixels; fault displays are left showing.
fn fault_bar(width: usize) -> Animation {
    Animation {
        repeat_count: 0,
        clear_on_done: false,
        frames: vec![frame(50, |i| if i < width { FAULT_RED } else { 0 })],
    }
}

/// The built-in default animation set, one entry per event kind name.
pub fn default_animations() -> HashMap<String, Animation> {
    let mut set = HashMap::new();

    set.insert(
        "RING_START".to_string(),
        Animation {
            repeat_count: 1,
            clear_on_done: true,
            frames: gap_chase(RING_BLUE, 75),
        },
    );
    set.insert(
        "RING_END".to_string(),
        Animation {
            repeat_count: 0,
            clear_on_done: true,
            frames: vec![frame(0, |_| 0)],
        },
    );

    // Provisioning portal: chase in, then hold an alternating pattern until
    // the end animation clears it.
    let mut config_start = pair_chase(CONFIG_BLUE, 50);
    config_start.push(frame(0, |i| if i % 2 == 1 { CONFIG_BLUE } else { 0 }));
    set.insert(
        "CONFIG_START".to_string(),
        Animation {
            repeat_count: 1,
            clear_on_done: false,
            frames: config_start,
        },
    );
    set.insert(
        "CONFIG_END".to_string(),
        Animation {
            repeat_count: 1,
            clear_on_done: true,
            frames: pair_chase(CONFIG_ORANGE, 50),
        },
    );

    set.insert(
        "FIRMWARE_UPDATED".to_string(),
        Animation {
            repeat_count: 3,
            clear_on_done: true,
            frames: quarter_spin(UPDATE_MAGENTA, 50),
        },
    );

    set.insert("STORAGE_FAULT".to_string(), fault_bar(1));
    set.insert("AUDIO_FAULT".to_string(), fault_bar(2));
    set.insert("NOTIFY_FAULT".to_string(), fault_bar(3));

    set.insert(
        "READY".to_string(),
        Animation {
            repeat_count: 0,
            clear_on_done: true,
            frames: dot_chase(READY_GREEN, 50),
        },
    );

    set
}
