//! Bevy systems driving the backdrop engine.
//!
//! Frame pipeline (all in `Update`):
//! 1. Input: window size, pointer, visibility and wheel scrolling
//! 2. Signal: cinematic watcher and dock visibility
//! 3. Simulate: scroll sampling, zone refresh, engine frame
//! 4. Render: paint the draw list
//!
//! Mount happens at `Startup`; teardown when the window closes or the app exits.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{CursorMoved, PrimaryWindow, WindowClosed, WindowOccluded, WindowResized};

use super::engine::ParticleEngine;
use super::physics_config::BackdropConfig;
use super::signal::CinematicMode;
use crate::error::BackdropError;
use crate::page::{PageLayout, PageScroll, ThemeVars, Viewport};

/// Pixels scrolled per wheel line.
const LINE_HEIGHT_PX: f32 = 40.0;

/// Configuration the engine is mounted with.
#[derive(Resource, Clone, Debug, Default)]
pub struct BackdropSettings(pub BackdropConfig);

/// Repeating timer driving zone rebuilds between scroll events.
#[derive(Resource)]
pub struct ZoneRefreshTimer(pub Timer);

fn now_ms(time: &Time) -> f64 {
    time.elapsed_secs_f64() * 1000.0
}

// ==================== Mount / Teardown ====================

/// Build and start the engine for the primary window.
///
/// Without a window only the backdrop is skipped; the rest of the app runs.
pub fn mount_backdrop(
    mut commands: Commands,
    settings: Res<BackdropSettings>,
    layout: Res<PageLayout>,
    mut viewport: ResMut<Viewport>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(window) = windows.get_single() else {
        warn!("{}; backdrop disabled", BackdropError::NoPrimaryWindow);
        return;
    };
    let canvas = Vec2::new(window.width(), window.height());

    let mut engine = match ParticleEngine::new(settings.0.clone(), canvas) {
        Ok(engine) => engine,
        Err(err) => {
            warn!("{err}; backdrop disabled");
            return;
        }
    };

    viewport.width = canvas.x;
    viewport.height = canvas.y;
    engine.refresh_zones(&layout, canvas.y);
    engine.start();

    let interval = std::time::Duration::from_millis(settings.0.zone_refresh_ms);
    commands.insert_resource(ZoneRefreshTimer(Timer::new(interval, TimerMode::Repeating)));
    commands.insert_resource(engine);
}

/// Stop the engine and release everything mount acquired.
pub fn teardown_backdrop(
    mut commands: Commands,
    mut closed: EventReader<WindowClosed>,
    mut exit: EventReader<AppExit>,
    engine: Option<ResMut<ParticleEngine>>,
) {
    let closing = closed.read().count() > 0;
    let exiting = exit.read().count() > 0;
    if !closing && !exiting {
        return;
    }
    if let Some(mut engine) = engine {
        engine.stop();
        commands.remove_resource::<ParticleEngine>();
        commands.remove_resource::<ZoneRefreshTimer>();
    }
}

// ==================== Input ====================

/// Window geometry, pointer and visibility.
pub fn track_window(
    time: Res<Time>,
    mut resized: EventReader<WindowResized>,
    mut cursor: EventReader<CursorMoved>,
    mut occluded: EventReader<WindowOccluded>,
    mut viewport: ResMut<Viewport>,
    engine: Option<ResMut<ParticleEngine>>,
) {
    let Some(mut engine) = engine else {
        // Drain so stale events do not pile up while unmounted
        resized.clear();
        cursor.clear();
        occluded.clear();
        return;
    };

    if let Some(last) = resized.read().last() {
        if engine.resize(Vec2::new(last.width, last.height)) {
            viewport.width = last.width;
            viewport.height = last.height;
        }
    }
    if let Some(last) = cursor.read().last() {
        engine.pointer_moved(last.position);
    }
    for event in occluded.read() {
        engine.set_visible(!event.occluded, now_ms(&time));
    }
}

/// Mouse wheel scrolls the page.
pub fn scroll_page(
    mut wheel: EventReader<MouseWheel>,
    layout: Res<PageLayout>,
    viewport: Res<Viewport>,
    mut scroll: ResMut<PageScroll>,
) {
    let delta: f32 = wheel
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => -event.y * LINE_HEIGHT_PX,
            MouseScrollUnit::Pixel => -event.y,
        })
        .sum();
    if delta != 0.0 {
        // Only touch the resource on real movement so change detection means "scrolled"
        let mut next = *scroll;
        if next.scroll_by(delta, &layout, viewport.height) {
            *scroll = next;
        }
    }
}

// ==================== Simulation ====================

/// Scroll events sample velocity and rebuild zones immediately.
pub fn sample_scroll(
    time: Res<Time>,
    scroll: Res<PageScroll>,
    layout: Res<PageLayout>,
    viewport: Res<Viewport>,
    engine: Option<ResMut<ParticleEngine>>,
) {
    let Some(mut engine) = engine else {
        return;
    };
    if !scroll.is_changed() {
        return;
    }
    engine.scrolled(scroll.y, now_ms(&time));
    engine.refresh_zones(&layout, viewport.height);
}

/// Periodic zone rebuild, independent of the frame loop.
pub fn refresh_zones_on_timer(
    time: Res<Time>,
    layout: Res<PageLayout>,
    viewport: Res<Viewport>,
    timer: Option<ResMut<ZoneRefreshTimer>>,
    engine: Option<ResMut<ParticleEngine>>,
) {
    let (Some(mut timer), Some(mut engine)) = (timer, engine) else {
        return;
    };
    if timer.0.tick(time.delta()).just_finished() {
        engine.refresh_zones(&layout, viewport.height);
    }
}

/// Offer the engine this tick; it decides whether to simulate.
pub fn step_engine(
    time: Res<Time>,
    mode: Res<CinematicMode>,
    theme: Res<ThemeVars>,
    engine: Option<ResMut<ParticleEngine>>,
) {
    let Some(mut engine) = engine else {
        return;
    };
    engine.frame(now_ms(&time), mode.is_active(), theme.particle_color());
}
