//! Frame governance: ~30 fps budget and pausing while the window is hidden.

/// What the loop should do with the current scheduler tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Engine not started, or already stopped
    Stopped,
    /// Window not visible; nothing simulated
    Hidden,
    /// Under the frame budget; nothing simulated
    Throttled,
    /// Budget met; simulate and draw one frame
    Stepped,
}

impl FrameOutcome {
    pub fn stepped(self) -> bool {
        self == FrameOutcome::Stepped
    }
}

/// Decides which scheduler ticks run the simulation.
///
/// The host schedule keeps calling [`FrameGovernor::poll`] every tick; the
/// governor only lets through ticks at least one budget apart.
#[derive(Clone, Debug)]
pub struct FrameGovernor {
    budget_ms: f64,
    last_frame_ms: Option<f64>,
    visible: bool,
}

impl FrameGovernor {
    pub fn new(budget_ms: f64) -> Self {
        Self {
            budget_ms: budget_ms.max(0.0),
            last_frame_ms: None,
            visible: true,
        }
    }

    pub fn poll(&mut self, now_ms: f64) -> FrameOutcome {
        if !self.visible {
            return FrameOutcome::Hidden;
        }
        let Some(last) = self.last_frame_ms else {
            self.last_frame_ms = Some(now_ms);
            return FrameOutcome::Stepped;
        };

        let elapsed = now_ms - last;
        if elapsed < self.budget_ms {
            return FrameOutcome::Throttled;
        }
        // Keep the phase so the cadence does not drift with scheduler jitter
        let remainder = if self.budget_ms > 0.0 {
            elapsed % self.budget_ms
        } else {
            0.0
        };
        self.last_frame_ms = Some(now_ms - remainder);
        FrameOutcome::Stepped
    }

    /// Track window visibility. Becoming visible again restarts the time
    /// reference at `now_ms` so hidden time is not simulated.
    pub fn set_visible(&mut self, visible: bool, now_ms: f64) {
        if visible && !self.visible {
            self.last_frame_ms = Some(now_ms);
        }
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Forget the time reference; the next poll steps immediately.
    pub fn reset(&mut self) {
        self.last_frame_ms = None;
    }
}
