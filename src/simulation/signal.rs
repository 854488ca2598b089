//! Cinematic mode: the one piece of state shared across the page.
//!
//! A scroll-progress watcher on the transition section is the single writer;
//! the backdrop engine and the mobile dock are readers. The flag is a plain
//! resource, so tests reset it by inserting a fresh `CinematicMode`.

use bevy::prelude::*;

use crate::page::{PageLayout, PageScroll, PageSection, Viewport};

// Progress band of the transition section during which cinematic mode is on
const CINEMATIC_ENTER: f32 = 0.25;
const CINEMATIC_EXIT: f32 = 0.92;

// Mobile dock behaviour
const DOCK_SCROLL_DEADZONE: f32 = 8.0;
const DOCK_SCROLLED_PAST: f32 = 100.0;
const DOCK_IDLE_SHOW_MS: f64 = 1000.0;

/// Whether the page is inside the cinematic transition zone.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CinematicMode {
    active: bool,
}

impl CinematicMode {
    /// Set the flag. Returns whether the value changed.
    pub fn set(&mut self, active: bool) -> bool {
        let changed = self.active != active;
        self.active = active;
        changed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Sent on every edge of [`CinematicMode`].
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CinematicModeChanged {
    pub active: bool,
}

/// Scroll progress through the section's travel band, from the section's top
/// reaching the bottom of the viewport (0) to its bottom reaching it (1).
pub fn section_progress(section: &PageSection, scroll_y: f32, viewport_height: f32) -> f32 {
    if section.height <= 0.0 {
        return 0.0;
    }
    ((scroll_y + viewport_height - section.top) / section.height).clamp(0.0, 1.0)
}

/// Whether a progress value lies inside the cinematic band (exclusive).
pub fn in_cinematic_band(progress: f32) -> bool {
    progress > CINEMATIC_ENTER && progress < CINEMATIC_EXIT
}

/// Edge detector owned by the watcher, so the setter only fires on transitions.
#[derive(Default)]
pub struct CinematicWatcher {
    last_active: bool,
}

impl CinematicWatcher {
    /// Returns the new state when `progress` crosses a band edge.
    pub fn observe(&mut self, progress: f32) -> Option<bool> {
        let active = in_cinematic_band(progress);
        if active == self.last_active {
            return None;
        }
        self.last_active = active;
        Some(active)
    }
}

/// Writer: follows the transition section's scroll progress.
pub fn watch_cinematic_progress(
    mut watcher: Local<CinematicWatcher>,
    layout: Res<PageLayout>,
    scroll: Res<PageScroll>,
    viewport: Res<Viewport>,
    mut mode: ResMut<CinematicMode>,
    mut changed: EventWriter<CinematicModeChanged>,
) {
    let Some(section) = layout.cinematic_section() else {
        return;
    };
    let progress = section_progress(section, scroll.y, viewport.height);
    if let Some(active) = watcher.observe(progress) {
        if mode.set(active) {
            debug!("cinematic mode {} at progress {:.2}", if active { "on" } else { "off" }, progress);
            changed.send(CinematicModeChanged { active });
        }
    }
}

/// Visibility of the mobile dock chrome.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct DockVisibility {
    /// Last scroll direction was upwards, or scrolling has settled
    visible: bool,
    has_scrolled: bool,
    picker_open: bool,
    last_scroll_y: f32,
    last_scroll_ms: Option<f64>,
    /// Result of the last [`DockVisibility::refresh`]
    shown: bool,
}

impl Default for DockVisibility {
    fn default() -> Self {
        Self {
            visible: true,
            has_scrolled: false,
            picker_open: false,
            last_scroll_y: 0.0,
            last_scroll_ms: None,
            shown: true,
        }
    }
}

impl DockVisibility {
    /// Scrolling down hides the dock, scrolling up shows it; small moves are ignored.
    pub fn on_scroll(&mut self, scroll_y: f32, now_ms: f64) {
        let delta = scroll_y - self.last_scroll_y;
        self.has_scrolled = scroll_y > DOCK_SCROLLED_PAST;
        if delta.abs() > DOCK_SCROLL_DEADZONE {
            self.visible = delta < 0.0;
        }
        self.last_scroll_y = scroll_y;
        self.last_scroll_ms = Some(now_ms);
    }

    pub fn set_picker_open(&mut self, open: bool) {
        self.picker_open = open;
    }

    /// Re-evaluate against the clock and the cinematic flag.
    pub fn refresh(&mut self, cinematic: bool, now_ms: f64) -> bool {
        if let Some(last) = self.last_scroll_ms {
            if now_ms - last >= DOCK_IDLE_SHOW_MS {
                self.visible = true;
                self.last_scroll_ms = None;
            }
        }
        self.shown = !cinematic && !self.picker_open && (self.visible || !self.has_scrolled);
        self.shown
    }

    pub fn should_show(&self) -> bool {
        self.shown
    }
}

/// Reader: hides the dock while cinematic mode is on.
pub fn update_dock_visibility(
    time: Res<Time>,
    scroll: Res<PageScroll>,
    mode: Res<CinematicMode>,
    mut dock: ResMut<DockVisibility>,
) {
    let now_ms = time.elapsed_secs_f64() * 1000.0;
    if scroll.is_changed() {
        dock.on_scroll(scroll.y, now_ms);
    }
    let was_shown = dock.should_show();
    let shown = dock.refresh(mode.is_active(), now_ms);
    if shown != was_shown {
        debug!("mobile dock {}", if shown { "shown" } else { "hidden" });
    }
}

/// Registers the cinematic flag, its change event, the watcher and the dock.
pub struct CinematicSignalPlugin;

impl Plugin for CinematicSignalPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CinematicMode>()
            .init_resource::<DockVisibility>()
            .init_resource::<PageLayout>()
            .init_resource::<PageScroll>()
            .init_resource::<Viewport>()
            .add_event::<CinematicModeChanged>()
            .add_systems(
                Update,
                (watch_cinematic_progress, update_dock_visibility)
                    .chain()
                    .in_set(super::BackdropSet::Signal),
            );
    }
}
