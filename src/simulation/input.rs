//! Pointer and scroll state consumed by the force model.
//!
//! Scroll velocity is sampled from successive scroll positions and their
//! timestamps, normalised to a 16 ms frame.

use bevy::math::Vec2;

use super::physics_config::BackdropConfig;

/// Shortest interval used when normalising scroll deltas (one 60 Hz frame).
const MIN_SAMPLE_MS: f64 = 16.0;

/// Tracks how fast the page is being scrolled.
#[derive(Clone, Debug, Default)]
pub struct ScrollTracker {
    last_y: f32,
    last_time_ms: f64,
    velocity: f32,
}

impl ScrollTracker {
    pub fn new(scroll_y: f32, now_ms: f64) -> Self {
        Self {
            last_y: scroll_y,
            last_time_ms: now_ms,
            velocity: 0.0,
        }
    }

    /// Record a scroll event. Events sharing a timestamp only move the reference.
    pub fn record(&mut self, scroll_y: f32, now_ms: f64, config: &BackdropConfig) {
        let dt = now_ms - self.last_time_ms;
        if dt > 0.0 {
            let delta = (scroll_y - self.last_y).abs() as f64;
            let raw = (delta / dt.max(MIN_SAMPLE_MS) * MIN_SAMPLE_MS) as f32;
            self.velocity = (raw * config.scroll_velocity_gain).min(config.scroll_velocity_cap);
        }
        self.last_y = scroll_y;
        self.last_time_ms = now_ms;
    }

    /// Bleed off velocity once per simulated frame.
    pub fn decay(&mut self, config: &BackdropConfig) {
        self.velocity *= config.scroll_velocity_decay;
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn scroll_y(&self) -> f32 {
        self.last_y
    }
}

/// Last known pointer position in canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
}
