//! Particle store: spawning, aging and in-place replacement.

use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::Rng;

use super::physics_config::BackdropConfig;
use crate::resources::Particle;

// ==================== SPAWN RANGES ====================
const SIZE_MIN: f32 = 0.5;
const SIZE_SPAN: f32 = 2.0; // [0.5, 2.5)
const OPACITY_MIN: f32 = 0.1;
const OPACITY_SPAN: f32 = 0.3; // [0.1, 0.4)
const MAX_LIFE_MIN: u32 = 300;
const MAX_LIFE_MAX: u32 = 800; // exclusive
// ======================================================

/// Result of aging one particle by a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aging {
    Alive,
    /// Life ran out and the slot now holds a fresh particle
    Respawned,
}

/// Fixed-size particle collection.
///
/// The collection never grows or shrinks: an expired particle is replaced in
/// its slot so grid placement and connection order stay index-stable.
pub struct ParticleStore {
    particles: Vec<Particle>,
    canvas: Vec2,
    grid_cols: usize,
    grid_rows: usize,
    drift_angle: f32,
    drift_spread: f32,
    spawn_speed: f32,
}

impl ParticleStore {
    /// Fill a store for the given canvas size, drawing every random field from `rng`.
    pub fn new(config: &BackdropConfig, canvas: Vec2, rng: &mut StdRng) -> Self {
        let mut store = Self {
            particles: Vec::with_capacity(config.population()),
            canvas,
            grid_cols: config.grid_cols.max(1),
            grid_rows: config.grid_rows.max(1),
            drift_angle: config.drift_angle,
            drift_spread: config.drift_spread,
            spawn_speed: config.spawn_speed,
        };
        for index in 0..config.population() {
            let particle = store.spawn(index, rng);
            store.particles.push(particle);
        }
        store
    }

    /// Build a fresh particle for slot `index`.
    pub fn spawn(&self, index: usize, rng: &mut StdRng) -> Particle {
        let (w, h) = (self.canvas.x, self.canvas.y);
        let cell_w = w / self.grid_cols as f32;
        let cell_h = h / self.grid_rows as f32;
        let grid = Vec2::new(
            (index % self.grid_cols) as f32 * cell_w + cell_w / 2.0,
            (index / self.grid_cols) as f32 * cell_h + cell_h / 2.0,
        );

        let drift_angle = self.drift_angle + (rng.gen::<f32>() - 0.5) * self.drift_spread;

        Particle {
            pos: Vec2::new(rng.gen::<f32>() * w, rng.gen::<f32>() * h),
            vel: Vec2::new(
                (rng.gen::<f32>() - 0.5) * self.spawn_speed,
                (rng.gen::<f32>() - 0.5) * self.spawn_speed,
            ),
            size: rng.gen::<f32>() * SIZE_SPAN + SIZE_MIN,
            base_opacity: rng.gen::<f32>() * OPACITY_SPAN + OPACITY_MIN,
            opacity: rng.gen::<f32>() * OPACITY_SPAN + OPACITY_MIN,
            life: 0,
            max_life: rng.gen_range(MAX_LIFE_MIN..MAX_LIFE_MAX),
            is_near_text: false,
            grid,
            drift_angle,
        }
    }

    /// Age one particle, replacing it once `life > max_life`.
    pub fn age(&mut self, index: usize, rng: &mut StdRng) -> Aging {
        let particle = &mut self.particles[index];
        particle.life += 1;
        if particle.life > particle.max_life {
            let fresh = self.spawn(index, rng);
            self.particles[index] = fresh;
            return Aging::Respawned;
        }
        Aging::Alive
    }

    /// Age every particle by one tick. Returns how many were replaced.
    pub fn advance(&mut self, rng: &mut StdRng) -> usize {
        (0..self.particles.len())
            .filter(|&index| self.age(index, rng) == Aging::Respawned)
            .count()
    }

    /// New canvas size for future spawns. Live particles keep their state and
    /// are brought back inside the bounds by the next wrap.
    pub fn resize(&mut self, canvas: Vec2) {
        self.canvas = canvas;
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.particles[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::physics_config::default_backdrop_config;
    use rand::SeedableRng;

    fn store(seed: u64) -> (ParticleStore, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let store = ParticleStore::new(&default_backdrop_config(), Vec2::new(1200.0, 800.0), &mut rng);
        (store, rng)
    }

    #[test]
    fn spawn_fields_fall_in_range() {
        let (store, _) = store(7);
        assert_eq!(store.len(), 80);
        for p in store.particles() {
            assert!(p.pos.x >= 0.0 && p.pos.x < 1200.0);
            assert!(p.pos.y >= 0.0 && p.pos.y < 800.0);
            assert!(p.size >= 0.5 && p.size < 2.5);
            assert!(p.base_opacity >= 0.1 && p.base_opacity < 0.4);
            assert!((300..800).contains(&p.max_life));
            assert!((p.drift_angle - std::f32::consts::PI * 0.35).abs() <= 0.15 + 1e-6);
            assert_eq!(p.life, 0);
        }
    }

    #[test]
    fn grid_targets_follow_index() {
        let (store, _) = store(1);
        let p = store.particles();
        // 1200 / 12 = 100 wide cells, 800 / 8 = 100 tall cells
        assert_eq!(p[0].grid, Vec2::new(50.0, 50.0));
        assert_eq!(p[11].grid, Vec2::new(1150.0, 50.0));
        assert_eq!(p[13].grid, Vec2::new(150.0, 150.0));
    }

    #[test]
    fn reduced_motion_shrinks_population() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = default_backdrop_config().with_reduced_motion(true);
        let store = ParticleStore::new(&config, Vec2::new(640.0, 480.0), &mut rng);
        assert_eq!(store.len(), 30);
    }

    #[test]
    fn expired_particle_is_replaced_in_place() {
        let (mut store, mut rng) = store(11);
        let before = store.len();
        let max_life = store.particles()[5].max_life;
        store.get_mut(5).life = max_life;

        assert_eq!(store.age(5, &mut rng), Aging::Respawned);
        assert_eq!(store.len(), before);
        let fresh = &store.particles()[5];
        assert_eq!(fresh.life, 0);
        assert!((300..800).contains(&fresh.max_life));
        // Index-derived target survives the swap
        assert_eq!(fresh.grid, Vec2::new(550.0, 50.0));
    }

    #[test]
    fn same_seed_same_store() {
        let (a, _) = store(42);
        let (b, _) = store(42);
        assert_eq!(a.particles(), b.particles());
    }
}
