//! Plain data structures shared by the simulation and the render pass.
//!
//! Positions are in canvas pixel space: origin at the top-left corner of the
//! window, y growing downwards. Zone bounds are in document space, i.e. the
//! viewport position plus the current scroll offset.

use bevy::math::Vec2;

/// The simulated point.
///
/// Owned exclusively by the particle store; everything outside the simulation
/// only ever sees the draw list built from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position in canvas pixels, always inside `[0, width) x [0, height)`
    pub pos: Vec2,
    /// Per-frame displacement, damped every frame
    pub vel: Vec2,
    /// Draw radius, fixed at spawn
    pub size: f32,
    /// Opacity ceiling before contextual dimming
    pub base_opacity: f32,
    /// Rendered opacity, eased toward a per-frame target
    pub opacity: f32,
    /// Frames lived since spawn
    pub life: u32,
    /// Frame count after which the particle is replaced
    pub max_life: u32,
    /// Local text density exceeded the near-text threshold this frame
    pub is_near_text: bool,
    /// Homing target used while the cinematic regime is active
    pub grid: Vec2,
    /// Direction of the ordered cinematic flow, in radians
    pub drift_angle: f32,
}

impl Particle {
    /// Unit vector of this particle's drift direction.
    pub fn drift_direction(&self) -> Vec2 {
        Vec2::from_angle(self.drift_angle)
    }

    /// Triangular fade in and out over the particle's lifetime (0 at birth and
    /// death, 1 at mid-life).
    pub fn life_fade(&self) -> f32 {
        if self.max_life == 0 {
            return 0.0;
        }
        let t = self.life as f32 / self.max_life as f32;
        (1.0 - (t * 2.0 - 1.0).abs()).max(0.0)
    }
}

/// Geometry of one page section, rebuilt wholesale on every zone refresh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentZone {
    /// Document-space top edge
    pub top: f32,
    /// Document-space bottom edge
    pub bottom: f32,
    /// Normalised text element count, `min(count / 20, 1)`
    pub density: f32,
    /// Section overlaps the 40%..60% band of the viewport
    pub is_active: bool,
}

impl ContentZone {
    /// Inclusive containment test in document space.
    pub fn contains(&self, document_y: f32) -> bool {
        document_y >= self.top && document_y <= self.bottom
    }
}

/// The section straddling the vertical middle of the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveSection {
    pub top: f32,
    pub bottom: f32,
    pub center: f32,
}

/// Hue / saturation / lightness triple in CSS units (degrees, percent, percent).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    /// Warm amber used when the theme does not define a particle colour.
    pub const FALLBACK: Hsl = Hsl {
        h: 35.0,
        s: 50.0,
        l: 40.0,
    };

    /// Parse a CSS custom property value such as `"35 50% 40%"`.
    ///
    /// Percent signs are optional. Returns `None` unless exactly three numbers
    /// are present.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value
            .split_whitespace()
            .map(|part| part.trim_end_matches('%').parse::<f32>());
        let h = parts.next()?.ok()?;
        let s = parts.next()?.ok()?;
        let l = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { h, s, l })
    }
}

impl Default for Hsl {
    fn default() -> Self {
        Self::FALLBACK
    }
}
