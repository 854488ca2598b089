//! Simulation module - CPU particle backdrop driven by the Bevy schedule.

pub mod blend;
pub mod engine;
pub mod forces;
pub mod frame;
pub mod input;
pub mod physics_config;
pub mod signal;
pub mod store;
mod systems;
pub mod zones;

use bevy::prelude::*;

pub use engine::ParticleEngine;
pub use frame::FrameOutcome;
pub use physics_config::{default_backdrop_config, BackdropConfig};
pub use signal::{CinematicMode, CinematicModeChanged, CinematicSignalPlugin, DockVisibility};
pub use systems::{BackdropSettings, ZoneRefreshTimer};

use crate::page::ThemeVars;

/// Ordering of the backdrop's `Update` work.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackdropSet {
    /// Window, pointer and scroll input
    Input,
    /// Cinematic watcher and its readers
    Signal,
    /// Zone refresh and the engine frame
    Simulate,
    /// Painting the draw list
    Render,
}

/// Plugin that mounts the particle backdrop on the primary window.
#[derive(Default)]
pub struct BackdropPlugin {
    pub config: BackdropConfig,
}

impl BackdropPlugin {
    pub fn with_config(config: BackdropConfig) -> Self {
        Self { config }
    }
}

impl Plugin for BackdropPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<CinematicSignalPlugin>() {
            app.add_plugins(CinematicSignalPlugin);
        }

        app.insert_resource(BackdropSettings(self.config.clone()))
            .init_resource::<ThemeVars>()
            .configure_sets(
                Update,
                (
                    BackdropSet::Input,
                    BackdropSet::Signal,
                    BackdropSet::Simulate,
                    BackdropSet::Render,
                )
                    .chain(),
            )
            .add_systems(Startup, systems::mount_backdrop)
            .add_systems(
                Update,
                (systems::track_window, systems::scroll_page)
                    .chain()
                    .in_set(BackdropSet::Input),
            )
            .add_systems(
                Update,
                (
                    systems::sample_scroll,
                    systems::refresh_zones_on_timer,
                    systems::step_engine,
                )
                    .chain()
                    .in_set(BackdropSet::Simulate),
            )
            .add_systems(PostUpdate, systems::teardown_backdrop);
    }
}
