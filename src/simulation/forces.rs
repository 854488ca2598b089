//! Per-particle force model.
//!
//! Order of application per particle and frame:
//! 1. Context: local text density from the zone table
//! 2. Forces: cinematic (grid homing + unified drift) or ambient (pointer,
//!    scroll energy, section-edge clustering), never both
//! 3. Integration with context-dependent damping
//! 4. Toroidal wrap
//! 5. Opacity easing

use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::Rng;

use super::physics_config::BackdropConfig;
use super::zones::ZoneTable;
use crate::resources::{ActiveSection, Particle};

/// Frame-wide inputs shared by every particle update.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub canvas: Vec2,
    pub pointer: Vec2,
    pub scroll_y: f32,
    /// Frame-normalised scroll speed (pixels per 16 ms)
    pub scroll_velocity: f32,
    pub blend: f32,
    pub active_section: Option<ActiveSection>,
    pub reduced_motion: bool,
}

impl FrameContext {
    pub fn is_cinematic(&self, config: &BackdropConfig) -> bool {
        self.blend > config.cinematic_threshold
    }

    pub fn is_scrolling_fast(&self, config: &BackdropConfig) -> bool {
        self.scroll_velocity > config.fast_scroll_threshold
    }

    pub fn is_scrolling_very_fast(&self, config: &BackdropConfig) -> bool {
        self.scroll_velocity > config.very_fast_scroll_threshold
    }
}

/// Run one frame of dynamics for a single particle.
pub fn step_particle(
    particle: &mut Particle,
    ctx: &FrameContext,
    zones: &ZoneTable,
    config: &BackdropConfig,
    rng: &mut StdRng,
) {
    let density = zones.local_density(particle.pos.y, ctx.scroll_y);
    particle.is_near_text = density > config.near_text_density;

    let text_fade = 1.0 - density * config.text_fade;
    let text_speed = 1.0 - density * config.text_slowdown;
    let fast = ctx.is_scrolling_fast(config);

    let scroll_boost = if fast {
        let cinematic_dampen = 1.0 - ctx.blend * config.cinematic_boost_dampen;
        1.0 + ctx.scroll_velocity * config.scroll_boost_gain * cinematic_dampen * text_speed
    } else {
        1.0
    };

    // Reduced motion: particles keep their spawn position, only age and fade
    if !ctx.reduced_motion {
        if ctx.is_cinematic(config) {
            apply_cinematic(particle, ctx.blend, config);
        } else {
            apply_ambient(particle, ctx, text_speed, config, rng);
        }

        let damping = if ctx.is_cinematic(config) {
            config.cinematic_damping
        } else if particle.is_near_text {
            config.near_text_damping
        } else {
            config.ambient_damping
        };
        particle.pos += particle.vel * scroll_boost * text_speed;
        particle.vel *= damping;
    }

    particle.pos.x = wrap_axis(particle.pos.x, ctx.canvas.x);
    particle.pos.y = wrap_axis(particle.pos.y, ctx.canvas.y);

    let cinematic_fade = 1.0 - ctx.blend * config.cinematic_fade;
    let scroll_brightness = if fast {
        1.0 + ctx.scroll_velocity * config.scroll_brightness_gain
    } else {
        1.0
    };
    let target = particle.base_opacity
        * particle.life_fade()
        * text_fade
        * cinematic_fade
        * scroll_brightness;
    particle.opacity += (target - particle.opacity) * config.opacity_smoothing;
}

/// Grid homing plus the shared drift, then heavy damping.
pub fn apply_cinematic(particle: &mut Particle, blend: f32, config: &BackdropConfig) {
    particle.vel += (particle.grid - particle.pos) * config.grid_pull * blend;
    particle.vel += particle.drift_direction() * config.drift_speed * blend;
    particle.vel *= config.cinematic_force_damping;
}

/// Pointer attraction, scroll energy and section-edge clustering.
pub fn apply_ambient(
    particle: &mut Particle,
    ctx: &FrameContext,
    text_speed: f32,
    config: &BackdropConfig,
    rng: &mut StdRng,
) {
    let pointer_factor = if particle.is_near_text {
        config.pointer_near_text_factor
    } else {
        1.0
    };
    let to_pointer = ctx.pointer - particle.pos;
    let dist = to_pointer.length();
    if dist < config.pointer_radius {
        let force = (config.pointer_radius - dist) / config.pointer_radius
            * config.pointer_strength
            * pointer_factor
            * text_speed;
        particle.vel -= to_pointer * force * 0.01;
    }

    let fast = ctx.is_scrolling_fast(config);
    if fast {
        let energy = (ctx.scroll_velocity * config.scroll_energy_gain).min(config.scroll_energy_cap);
        particle.vel.x += (rng.gen::<f32>() - 0.5) * energy * text_speed;
        particle.vel.y += energy * (rng.gen::<f32>() * 0.6 + 0.4) * text_speed;

        if ctx.is_scrolling_very_fast(config) {
            let to_center = ctx.canvas / 2.0 - particle.pos;
            particle.vel -= to_center * config.expansion_strength * ctx.scroll_velocity;
        }
    }

    // Clustering would fight the scroll energy, so it only runs when calm
    if !fast {
        if let Some(target) = cluster_target(particle, ctx, config, rng) {
            let to_target = target - particle.pos;
            particle.vel.x += to_target.x * config.cluster_pull_x * text_speed;
            particle.vel.y += to_target.y * config.cluster_pull_y * text_speed;
        }
    }

    if particle.is_near_text {
        particle.vel *= config.near_text_force_damping;
    }
}

/// Nearest active-section edge, in viewport space, when the particle is
/// within clustering distance of it.
pub fn cluster_target(
    particle: &Particle,
    ctx: &FrameContext,
    config: &BackdropConfig,
    rng: &mut StdRng,
) -> Option<Vec2> {
    let section = ctx.active_section?;
    let top = section.top - ctx.scroll_y;
    let bottom = section.bottom - ctx.scroll_y;

    let to_top = (particle.pos.y - top).abs();
    let to_bottom = (particle.pos.y - bottom).abs();
    if to_top >= config.cluster_distance && to_bottom >= config.cluster_distance {
        return None;
    }

    let y = if to_top < to_bottom { top } else { bottom };
    let x = particle.pos.x + (rng.gen::<f32>() - 0.5) * config.cluster_jitter;
    Some(Vec2::new(x, y))
}

/// Toroidal wrap onto `[0, extent)`.
///
/// Leaving one side re-enters at the opposite boundary rather than at the
/// overshoot distance.
pub fn wrap_axis(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    if value < 0.0 || value.is_nan() {
        // Largest representable value strictly below the far edge
        let below = extent - extent * f32::EPSILON;
        if below < extent {
            below
        } else {
            0.0
        }
    } else if value >= extent {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ContentZone;
    use crate::simulation::physics_config::default_backdrop_config;
    use rand::SeedableRng;

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            size: 1.0,
            base_opacity: 0.3,
            opacity: 0.2,
            life: 100,
            max_life: 400,
            is_near_text: false,
            grid: Vec2::new(x, y),
            drift_angle: std::f32::consts::PI * 0.35,
        }
    }

    fn calm_context() -> FrameContext {
        FrameContext {
            canvas: Vec2::new(1000.0, 800.0),
            pointer: Vec2::new(-10_000.0, -10_000.0),
            scroll_y: 0.0,
            scroll_velocity: 0.0,
            blend: 0.0,
            active_section: None,
            reduced_motion: false,
        }
    }

    #[test]
    fn wrap_keeps_values_in_range() {
        assert_eq!(wrap_axis(1000.0, 1000.0), 0.0);
        assert_eq!(wrap_axis(1500.0, 1000.0), 0.0);
        let wrapped = wrap_axis(-0.5, 1000.0);
        assert!(wrapped < 1000.0 && wrapped > 999.0);
        assert_eq!(wrap_axis(250.0, 1000.0), 250.0);
        assert_eq!(wrap_axis(-3.0, 0.0), 0.0);
    }

    #[test]
    fn pointer_pushes_particle_away_from_cursor() {
        let config = default_backdrop_config();
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = calm_context();
        ctx.pointer = Vec2::new(550.0, 400.0);
        let mut p = particle_at(500.0, 400.0);

        apply_ambient(&mut p, &ctx, 1.0, &config, &mut rng);
        assert!(p.vel.x < 0.0, "velocity {:?}", p.vel);
        assert_eq!(p.vel.y, 0.0);
    }

    #[test]
    fn pointer_is_weaker_near_text() {
        let config = default_backdrop_config();
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = calm_context();
        ctx.pointer = Vec2::new(550.0, 400.0);

        let mut free = particle_at(500.0, 400.0);
        apply_ambient(&mut free, &ctx, 1.0, &config, &mut rng);

        let mut near = particle_at(500.0, 400.0);
        near.is_near_text = true;
        apply_ambient(&mut near, &ctx, 1.0, &config, &mut rng);

        let ratio = near.vel.x / free.vel.x;
        // 0.2 pointer factor, then the extra 0.94 near-text damping
        assert!((ratio - 0.2 * 0.94).abs() < 1e-4, "ratio {ratio}");
    }

    #[test]
    fn fast_scroll_biases_velocity_downward() {
        let config = default_backdrop_config();
        let mut rng = StdRng::seed_from_u64(9);
        let mut ctx = calm_context();
        ctx.scroll_velocity = 20.0;

        for _ in 0..20 {
            let mut p = particle_at(300.0, 300.0);
            apply_ambient(&mut p, &ctx, 1.0, &config, &mut rng);
            assert!(p.vel.y > 0.0);
        }
    }

    #[test]
    fn clustering_pulls_toward_nearest_edge_when_calm() {
        let config = default_backdrop_config();
        let mut rng = StdRng::seed_from_u64(4);
        let mut ctx = calm_context();
        ctx.scroll_y = 1000.0;
        ctx.active_section = Some(ActiveSection {
            top: 1200.0,
            bottom: 2400.0,
            center: 1800.0,
        });

        // Section top sits at viewport y = 200; particle 100 px below it
        let p = particle_at(400.0, 300.0);
        let target = cluster_target(&p, &ctx, &config, &mut rng).expect("within 150 px");
        assert_eq!(target.y, 200.0);
        assert!((target.x - 400.0).abs() <= 50.0);

        let far = particle_at(400.0, 700.0);
        assert!(cluster_target(&far, &ctx, &config, &mut rng).is_none());

        let mut moving = particle_at(400.0, 300.0);
        apply_ambient(&mut moving, &ctx, 1.0, &config, &mut rng);
        assert!(moving.vel.y < 0.0);

        ctx.scroll_velocity = 12.0;
        let mut scrolling = particle_at(400.0, 300.0);
        let mut quiet_rng = StdRng::seed_from_u64(4);
        apply_ambient(&mut scrolling, &ctx, 0.0, &config, &mut quiet_rng);
        // text_speed 0 zeroes scroll energy, and clustering is off while fast
        assert_eq!(scrolling.vel, Vec2::ZERO);
    }

    #[test]
    fn cinematic_drift_follows_particle_angle() {
        let config = default_backdrop_config();
        let mut p = particle_at(400.0, 400.0);
        apply_cinematic(&mut p, 1.0, &config);
        let expected = p.drift_direction() * 0.08 * 0.9;
        assert!((p.vel - expected).length() < 1e-6);
    }

    #[test]
    fn dense_text_slows_and_dims() {
        let config = default_backdrop_config();
        let zones = ZoneTable::from_zones(vec![ContentZone {
            top: 0.0,
            bottom: 800.0,
            density: 1.0,
            is_active: true,
        }]);
        let mut rng = StdRng::seed_from_u64(2);
        let ctx = calm_context();

        let mut p = particle_at(500.0, 400.0);
        p.vel = Vec2::new(1.0, 0.0);
        p.opacity = 0.3;
        step_particle(&mut p, &ctx, &zones, &config, &mut rng);

        assert!(p.is_near_text);
        // 0.94 extra damping then 0.4 text speed on integration
        assert!((p.pos.x - (500.0 + 0.94 * 0.4)).abs() < 1e-4);
        assert!(p.opacity < 0.3);
    }

    #[test]
    fn reduced_motion_skips_integration() {
        let config = default_backdrop_config();
        let mut rng = StdRng::seed_from_u64(2);
        let mut ctx = calm_context();
        ctx.reduced_motion = true;
        ctx.pointer = Vec2::new(510.0, 400.0);

        let mut p = particle_at(500.0, 400.0);
        p.vel = Vec2::new(0.1, -0.1);
        step_particle(&mut p, &ctx, &ZoneTable::default(), &config, &mut rng);
        assert_eq!(p.pos, Vec2::new(500.0, 400.0));
        assert_eq!(p.vel, Vec2::new(0.1, -0.1));
    }
}
