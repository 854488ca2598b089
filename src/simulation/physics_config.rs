//! Tuning parameters for the backdrop simulation.
//!
//! Every coefficient the force model, render pass and frame loop use is defined
//! here instead of being scattered through the systems. The values are a tunable
//! set, not a numeric contract: change them here and run `cargo test` to verify
//! the regression suite still holds.

/// Complete configuration for one backdrop engine instance.
#[derive(Clone, Debug, PartialEq)]
pub struct BackdropConfig {
    // === Population ===
    /// Particle count under normal motion preferences
    pub particle_count: usize,
    /// Particle count when the user prefers reduced motion
    pub reduced_particle_count: usize,
    /// Read once at mount; disables all velocity-affecting forces
    pub reduced_motion: bool,

    // === Spawn ===
    /// Columns of the cinematic homing grid
    pub grid_cols: usize,
    /// Rows of the cinematic homing grid
    pub grid_rows: usize,
    /// Mean drift direction in radians (~63 degrees, down-right in screen space)
    pub drift_angle: f32,
    /// Total spread around `drift_angle` (uniform, centred)
    pub drift_spread: f32,
    /// Initial velocity components are drawn from ±half of this
    pub spawn_speed: f32,

    // === Timing ===
    /// Minimum milliseconds between simulated frames (~30 fps)
    pub frame_budget_ms: f64,
    /// Interval between content zone rebuilds
    pub zone_refresh_ms: u64,
    /// Per-frame rate at which the mode blend closes on its target
    pub blend_rate: f32,
    /// Blend value above which the cinematic regime takes over
    pub cinematic_threshold: f32,

    // === Content awareness ===
    /// Local density above which a particle counts as near text
    pub near_text_density: f32,
    /// Density above which near-text particles lose their connections
    pub connection_density_cutoff: f32,
    /// Opacity loss per unit of local density
    pub text_fade: f32,
    /// Speed loss per unit of local density
    pub text_slowdown: f32,

    // === Cinematic regime ===
    pub grid_pull: f32,
    pub drift_speed: f32,
    pub cinematic_force_damping: f32,
    pub cinematic_damping: f32,
    /// How much of the scroll boost survives at full blend (1 - x)
    pub cinematic_boost_dampen: f32,
    /// Opacity loss at full blend
    pub cinematic_fade: f32,

    // === Ambient regime ===
    pub pointer_radius: f32,
    pub pointer_strength: f32,
    /// Pointer influence multiplier for near-text particles
    pub pointer_near_text_factor: f32,
    pub fast_scroll_threshold: f32,
    pub very_fast_scroll_threshold: f32,
    pub scroll_energy_gain: f32,
    pub scroll_energy_cap: f32,
    pub expansion_strength: f32,
    pub cluster_distance: f32,
    pub cluster_jitter: f32,
    pub cluster_pull_x: f32,
    pub cluster_pull_y: f32,
    pub near_text_force_damping: f32,
    pub near_text_damping: f32,
    pub ambient_damping: f32,

    // === Scroll tracking ===
    pub scroll_boost_gain: f32,
    pub scroll_velocity_gain: f32,
    pub scroll_velocity_cap: f32,
    pub scroll_velocity_decay: f32,

    // === Rendering ===
    pub opacity_smoothing: f32,
    pub scroll_brightness_gain: f32,
    pub scroll_size_gain: f32,
    pub connection_distance: f32,
    pub connection_distance_fast: f32,
    pub connection_distance_cinematic: f32,
    pub connection_opacity: f32,
    pub connection_opacity_fast: f32,
    pub connection_opacity_cinematic: f32,
    /// Partners checked per anchor, counted in store order
    pub connection_window: usize,
    pub line_width: f32,
    pub line_width_fast: f32,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        default_backdrop_config()
    }
}

impl BackdropConfig {
    /// Number of particles the store is built with.
    pub fn population(&self) -> usize {
        if self.reduced_motion {
            self.reduced_particle_count
        } else {
            self.particle_count
        }
    }

    /// Same configuration with the reduced-motion preference applied.
    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }
}

/// The canonical configuration for the backdrop.
pub fn default_backdrop_config() -> BackdropConfig {
    BackdropConfig {
        particle_count: 80,
        reduced_particle_count: 30,
        reduced_motion: false,

        grid_cols: 12,
        grid_rows: 8,
        drift_angle: std::f32::consts::PI * 0.35,
        drift_spread: 0.3,
        spawn_speed: 0.3,

        frame_budget_ms: 33.0,
        zone_refresh_ms: 500,
        blend_rate: 0.04,
        cinematic_threshold: 0.01,

        near_text_density: 0.3,
        connection_density_cutoff: 0.5,
        text_fade: 0.75,
        text_slowdown: 0.6,

        grid_pull: 0.006,
        drift_speed: 0.08,
        cinematic_force_damping: 0.90,
        cinematic_damping: 0.93,
        cinematic_boost_dampen: 0.85,
        cinematic_fade: 0.55,

        pointer_radius: 180.0,
        pointer_strength: 0.015,
        pointer_near_text_factor: 0.2,
        fast_scroll_threshold: 8.0,
        very_fast_scroll_threshold: 25.0,
        scroll_energy_gain: 0.015,
        scroll_energy_cap: 0.8,
        expansion_strength: 0.00008,
        cluster_distance: 150.0,
        cluster_jitter: 100.0,
        cluster_pull_x: 0.00015,
        cluster_pull_y: 0.0002,
        near_text_force_damping: 0.94,
        near_text_damping: 0.95,
        ambient_damping: 0.98,

        scroll_boost_gain: 0.04,
        scroll_velocity_gain: 1.2,
        scroll_velocity_cap: 60.0,
        scroll_velocity_decay: 0.9,

        opacity_smoothing: 0.08,
        scroll_brightness_gain: 0.006,
        scroll_size_gain: 0.008,
        connection_distance: 90.0,
        connection_distance_fast: 130.0,
        connection_distance_cinematic: 70.0,
        connection_opacity: 0.05,
        connection_opacity_fast: 0.1,
        connection_opacity_cinematic: 0.025,
        connection_window: 10,
        line_width: 0.4,
        line_width_fast: 0.7,
    }
}
