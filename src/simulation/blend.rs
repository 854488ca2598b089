//! Smoothed crossfade between the ambient and cinematic regimes.

/// Scalar in `[0, 1]` that eases toward 1 while cinematic mode is on and
/// toward 0 otherwise, closing a fixed fraction of the gap each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeBlend {
    value: f32,
    rate: f32,
}

impl ModeBlend {
    pub fn new(rate: f32) -> Self {
        Self {
            value: 0.0,
            rate: rate.clamp(0.0, 1.0),
        }
    }

    /// Move one frame toward the target for `cinematic` and return the new value.
    pub fn advance(&mut self, cinematic: bool) -> f32 {
        let target = if cinematic { 1.0 } else { 0.0 };
        self.value += (target - self.value) * self.rate;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}
