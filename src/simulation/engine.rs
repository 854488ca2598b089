//! The backdrop engine: owns the particles, the zone table and the frame loop
//! state, and exposes a start / stop / resize / frame lifecycle.
//!
//! The engine knows nothing about Bevy's schedule. Systems feed it window
//! events and call [`ParticleEngine::frame`] every tick; the engine decides
//! whether the tick simulates anything.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::blend::ModeBlend;
use super::forces::{self, FrameContext};
use super::frame::{FrameGovernor, FrameOutcome};
use super::input::{PointerState, ScrollTracker};
use super::physics_config::BackdropConfig;
use super::store::{Aging, ParticleStore};
use super::zones::ZoneTable;
use crate::error::{BackdropError, Result};
use crate::page::PageLayout;
use crate::render::{build_draw_list, DrawList};
use crate::resources::{ActiveSection, Hsl, Particle};

/// Self-contained particle backdrop.
#[derive(Resource)]
pub struct ParticleEngine {
    config: BackdropConfig,
    store: ParticleStore,
    zones: ZoneTable,
    active_section: Option<ActiveSection>,
    pointer: PointerState,
    scroll: ScrollTracker,
    governor: FrameGovernor,
    blend: ModeBlend,
    rng: StdRng,
    draw_list: DrawList,
    running: bool,
    frames: u64,
}

impl ParticleEngine {
    /// Build an engine seeded from OS entropy.
    pub fn new(config: BackdropConfig, canvas: Vec2) -> Result<Self> {
        Self::with_rng(config, canvas, StdRng::from_entropy())
    }

    /// Build an engine with an injected random source.
    pub fn with_rng(config: BackdropConfig, canvas: Vec2, mut rng: StdRng) -> Result<Self> {
        validate_canvas(canvas)?;
        let store = ParticleStore::new(&config, canvas, &mut rng);
        Ok(Self {
            governor: FrameGovernor::new(config.frame_budget_ms),
            blend: ModeBlend::new(config.blend_rate),
            store,
            zones: ZoneTable::default(),
            active_section: None,
            pointer: PointerState::default(),
            scroll: ScrollTracker::default(),
            rng,
            draw_list: DrawList::default(),
            running: false,
            frames: 0,
            config,
        })
    }

    /// Begin accepting frames. The first frame after a start always steps.
    pub fn start(&mut self) {
        self.running = true;
        self.governor.reset();
        info!(
            "particle backdrop started: {} particles on {}x{}{}",
            self.store.len(),
            self.store.canvas().x,
            self.store.canvas().y,
            if self.config.reduced_motion { " (reduced motion)" } else { "" }
        );
    }

    /// Stop simulating and drop whatever was last drawn.
    pub fn stop(&mut self) {
        if self.running {
            info!("particle backdrop stopped after {} frames", self.frames);
        }
        self.running = false;
        self.draw_list.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Track a new canvas size. Sizes without area are ignored.
    pub fn resize(&mut self, canvas: Vec2) -> bool {
        if validate_canvas(canvas).is_err() {
            debug!("ignoring resize to {}x{}", canvas.x, canvas.y);
            return false;
        }
        self.store.resize(canvas);
        true
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.pointer.position = position;
    }

    /// Record the page scroll offset at `now_ms`.
    pub fn scrolled(&mut self, scroll_y: f32, now_ms: f64) {
        self.scroll.record(scroll_y, now_ms, &self.config);
    }

    /// Rebuild the zone table from the page at the current scroll offset.
    pub fn refresh_zones(&mut self, layout: &PageLayout, viewport_height: f32) {
        let (zones, active) = ZoneTable::sample(layout, self.scroll.scroll_y(), viewport_height);
        if zones.is_empty() {
            self.active_section = None;
        } else if active.is_some() {
            self.active_section = active;
        }
        self.zones = zones;
    }

    pub fn set_visible(&mut self, visible: bool, now_ms: f64) {
        if visible != self.governor.is_visible() {
            debug!("particle backdrop {}", if visible { "resumed" } else { "paused" });
        }
        self.governor.set_visible(visible, now_ms);
    }

    /// Called on every scheduler tick. Simulates and rebuilds the draw list
    /// only when the frame budget allows it.
    pub fn frame(&mut self, now_ms: f64, cinematic: bool, color: Hsl) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }
        let outcome = self.governor.poll(now_ms);
        if outcome.stepped() {
            self.step(cinematic, color);
        }
        outcome
    }

    /// One simulated frame, unconditionally.
    fn step(&mut self, cinematic: bool, color: Hsl) {
        let blend = self.blend.advance(cinematic);
        let ctx = self.context(blend);

        let mut respawned = Vec::new();
        for index in 0..self.store.len() {
            if self.store.age(index, &mut self.rng) == Aging::Respawned {
                respawned.push(index);
                continue;
            }
            forces::step_particle(
                self.store.get_mut(index),
                &ctx,
                &self.zones,
                &self.config,
                &mut self.rng,
            );
        }

        self.draw_list = build_draw_list(
            self.store.particles(),
            &respawned,
            &self.zones,
            &ctx,
            &self.config,
            color,
        );
        self.scroll.decay(&self.config);
        self.frames += 1;
        if self.frames % 300 == 0 {
            trace!(
                "frame {}: blend {:.3}, scroll velocity {:.1}, {} connections",
                self.frames,
                blend,
                ctx.scroll_velocity,
                self.draw_list.lines.len()
            );
        }
    }

    fn context(&self, blend: f32) -> FrameContext {
        FrameContext {
            canvas: self.store.canvas(),
            pointer: self.pointer.position,
            scroll_y: self.scroll.scroll_y(),
            scroll_velocity: self.scroll.velocity(),
            blend,
            active_section: self.active_section,
            reduced_motion: self.config.reduced_motion,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        self.store.particles()
    }

    pub fn canvas(&self) -> Vec2 {
        self.store.canvas()
    }

    pub fn blend(&self) -> f32 {
        self.blend.value()
    }

    pub fn scroll_velocity(&self) -> f32 {
        self.scroll.velocity()
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn active_section(&self) -> Option<ActiveSection> {
        self.active_section
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }

    /// Simulated frames since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

fn validate_canvas(canvas: Vec2) -> Result<()> {
    if canvas.is_finite() && canvas.x > 0.0 && canvas.y > 0.0 {
        Ok(())
    } else {
        Err(BackdropError::InvalidCanvas {
            width: canvas.x,
            height: canvas.y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::physics_config::default_backdrop_config;

    const FRAME_MS: f64 = 34.0;

    fn engine(seed: u64) -> ParticleEngine {
        let mut engine = ParticleEngine::with_rng(
            default_backdrop_config(),
            Vec2::new(1200.0, 800.0),
            StdRng::seed_from_u64(seed),
        )
        .expect("valid canvas");
        engine.start();
        engine
    }

    fn run(engine: &mut ParticleEngine, frames: usize, cinematic: bool) {
        let start = engine.frames() as f64 * FRAME_MS;
        for i in 0..frames {
            let now = start + i as f64 * FRAME_MS;
            assert!(engine.frame(now, cinematic, Hsl::FALLBACK).stepped());
        }
    }

    #[test]
    fn rejects_canvas_without_area() {
        let err = ParticleEngine::new(default_backdrop_config(), Vec2::new(0.0, 600.0))
            .err()
            .expect("zero width");
        assert_eq!(err, BackdropError::InvalidCanvas { width: 0.0, height: 600.0 });
    }

    #[test]
    fn stopped_engine_does_nothing() {
        let mut engine = engine(1);
        engine.stop();
        assert_eq!(engine.frame(0.0, false, Hsl::FALLBACK), FrameOutcome::Stopped);
        assert_eq!(engine.frames(), 0);
    }

    #[test]
    fn cinematic_flow_aligns_with_drift() {
        let mut engine = engine(5);
        // Start from rest on the grid so only the cinematic forces act
        for index in 0..engine.store.len() {
            let particle = engine.store.get_mut(index);
            particle.pos = particle.grid;
            particle.vel = Vec2::ZERO;
        }

        run(&mut engine, 50, true);
        assert!((engine.blend() - (1.0 - 0.96f32.powi(50))).abs() < 1e-3);

        let particles = engine.particles();
        let mean_vel = particles.iter().map(|p| p.vel).sum::<Vec2>() / particles.len() as f32;
        let mean_drift = particles.iter().map(|p| p.drift_direction()).sum::<Vec2>();

        assert!(mean_vel.length() > 1e-3, "no net flow: {mean_vel:?}");
        let angle = (mean_vel.y.atan2(mean_vel.x) - mean_drift.y.atan2(mean_drift.x)).abs();
        assert!(angle < 0.05, "flow off drift direction by {angle} rad");
    }

    #[test]
    fn respawned_particle_skips_its_first_dot() {
        let mut engine = engine(6);
        run(&mut engine, 1, false);
        assert_eq!(engine.draw_list().circles.len(), 80);

        let particle = engine.store.get_mut(7);
        particle.life = particle.max_life;
        run(&mut engine, 1, false);

        let circles = &engine.draw_list().circles;
        assert_eq!(circles.len(), 79);
        assert!(circles.iter().all(|c| c.index != 7));
        assert_eq!(engine.particles()[7].life, 0);

        // Drawn again from the next frame on
        run(&mut engine, 1, false);
        assert!(engine.draw_list().circles.iter().any(|c| c.index == 7));
    }

    #[test]
    fn resize_ignores_minimised_window() {
        let mut engine = engine(2);
        assert!(!engine.resize(Vec2::new(0.0, 0.0)));
        assert_eq!(engine.canvas(), Vec2::new(1200.0, 800.0));
        assert!(engine.resize(Vec2::new(600.0, 400.0)));
        run(&mut engine, 1, false);
        assert!(engine
            .particles()
            .iter()
            .all(|p| p.pos.x < 600.0 && p.pos.y < 400.0));
    }

    #[test]
    fn active_section_survives_rebuild_without_midline_section() {
        let mut engine = engine(3);
        let layout = PageLayout::new().stack("a", 800.0, 10).stack("b", 800.0, 10);
        engine.refresh_zones(&layout, 800.0);
        let first = engine.active_section().expect("a straddles the midline");

        // Scrolled past the whole page: nothing straddles, last section kept
        engine.scrolled(5000.0, 100.0);
        engine.refresh_zones(&layout, 800.0);
        assert_eq!(engine.active_section(), Some(first));

        engine.refresh_zones(&PageLayout::new(), 800.0);
        assert!(engine.active_section().is_none());
    }
}
