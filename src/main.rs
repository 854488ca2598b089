//! Portfolio Particle Backdrop - Main Entry
//!
//! Scroll the page with the mouse wheel; the transition section two thirds of
//! the way down switches the backdrop into its cinematic regime.

use bevy::prelude::*;
use particle_backdrop::page::{PageLayout, ThemeVars, PARTICLE_COLOR_VAR};
use particle_backdrop::render::BackdropRenderPlugin;
use particle_backdrop::simulation::{
    default_backdrop_config, BackdropPlugin, BackdropSet, CinematicModeChanged, DockVisibility,
};

const WINDOW_HEIGHT: f32 = 720.0;

fn main() {
    // Read once at startup, like the platform's reduced-motion media query
    let reduced_motion = std::env::var("PREFERS_REDUCED_MOTION")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("reduce"))
        .unwrap_or(false);

    let mut theme = ThemeVars::default();
    if let Ok(color) = std::env::var("PARTICLE_COLOR") {
        theme.set(PARTICLE_COLOR_VAR, color);
    }

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Portfolio".into(),
                resolution: (1280.0, WINDOW_HEIGHT).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.04, 0.035, 0.03)))
        .insert_resource(PageLayout::portfolio(WINDOW_HEIGHT))
        .insert_resource(theme)
        .add_plugins(BackdropPlugin::with_config(
            default_backdrop_config().with_reduced_motion(reduced_motion),
        ))
        .add_plugins(BackdropRenderPlugin)
        .add_systems(Startup, setup_camera)
        .add_systems(
            Update,
            (log_cinematic_changes.after(BackdropSet::Signal), log_frame),
        )
        .run();
}

/// Set up the 2D main camera
fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
    commands.insert_resource(FrameCounter(0));
}

/// Frame counter for logging
#[derive(Resource)]
struct FrameCounter(u32);

/// Log every N frames
fn log_frame(mut counter: ResMut<FrameCounter>) {
    counter.0 += 1;
    if counter.0 % 600 == 0 {
        debug!("Frame {}: backdrop running...", counter.0);
    }
}

fn log_cinematic_changes(
    mut changes: EventReader<CinematicModeChanged>,
    dock: Res<DockVisibility>,
) {
    for change in changes.read() {
        info!(
            "Cinematic zone {} (mobile dock {})",
            if change.active { "entered" } else { "left" },
            if dock.should_show() { "shown" } else { "hidden" }
        );
    }
}
