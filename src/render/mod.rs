//! Render pass: turns the particle store into a draw list, and paints it.
//!
//! Particles are filled `Mesh2d` discs, one entity per store slot; connections
//! are gizmo lines. The draw list is rebuilt only on simulated frames; painting
//! happens every Bevy frame so the canvas keeps showing the last simulated
//! state while the frame loop is throttled or hidden.

use bevy::prelude::*;

use crate::resources::{Hsl, Particle};
use crate::simulation::forces::FrameContext;
use crate::simulation::physics_config::BackdropConfig;
use crate::simulation::zones::ZoneTable;
use crate::simulation::{BackdropSet, ParticleEngine};

/// One particle dot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleDraw {
    /// Store slot of the particle
    pub index: usize,
    /// Canvas space
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

/// One connection segment between two particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineDraw {
    pub from: Vec2,
    pub to: Vec2,
    pub alpha: f32,
    /// Store indices of the connected particles
    pub pair: (usize, usize),
}

/// Everything one frame of the backdrop paints.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub color: Hsl,
    pub line_width: f32,
    pub circles: Vec<CircleDraw>,
    pub lines: Vec<LineDraw>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.circles.clear();
        self.lines.clear();
    }
}

/// Build the draw list for the current particle state.
///
/// Slots in `respawned` were replaced this frame and get no dot until the
/// next one; they still take part in connections.
pub fn build_draw_list(
    particles: &[Particle],
    respawned: &[usize],
    zones: &ZoneTable,
    ctx: &FrameContext,
    config: &BackdropConfig,
    color: Hsl,
) -> DrawList {
    let fast = ctx.is_scrolling_fast(config);
    let size_scale = if fast {
        1.0 + ctx.scroll_velocity * config.scroll_size_gain
    } else {
        1.0
    };

    let circles = particles
        .iter()
        .enumerate()
        .filter(|(index, _)| !respawned.contains(index))
        .map(|(index, p)| CircleDraw {
            index,
            center: p.pos,
            radius: p.size * size_scale,
            alpha: p.opacity,
        })
        .collect();

    let lines = if ctx.reduced_motion {
        Vec::new()
    } else {
        connections(particles, zones, ctx, config)
    };

    DrawList {
        color,
        line_width: if fast {
            config.line_width_fast
        } else {
            config.line_width
        },
        circles,
        lines,
    }
}

/// Connection segments between nearby particles.
///
/// Only even-indexed particles anchor, and each anchor looks at the even
/// partners among the next `connection_window` slots. This is a bounded
/// approximation, not a nearest-neighbour search.
pub fn connections(
    particles: &[Particle],
    zones: &ZoneTable,
    ctx: &FrameContext,
    config: &BackdropConfig,
) -> Vec<LineDraw> {
    let cinematic = ctx.is_cinematic(config);
    let fast = ctx.is_scrolling_fast(config);

    let max_dist = if cinematic {
        config.connection_distance_cinematic
    } else if fast {
        config.connection_distance_fast
    } else {
        config.connection_distance
    };
    let base_opacity = if cinematic {
        config.connection_opacity_cinematic * (1.0 - ctx.blend * 0.75)
    } else if fast {
        config.connection_opacity_fast
    } else {
        config.connection_opacity
    };

    let over_text = |p: &Particle| {
        p.is_near_text
            && zones.local_density(p.pos.y, ctx.scroll_y) > config.connection_density_cutoff
    };

    let n = particles.len();
    let mut lines = Vec::new();
    for i in (0..n).step_by(2) {
        let a = &particles[i];
        if over_text(a) {
            continue;
        }
        let end = n.min(i + config.connection_window + 2);
        for j in (i + 2..end).step_by(2) {
            let b = &particles[j];
            if over_text(b) {
                continue;
            }
            let dist_sq = a.pos.distance_squared(b.pos);
            if dist_sq >= max_dist * max_dist {
                continue;
            }
            let dist = dist_sq.sqrt();
            let fade = a.opacity.min(b.opacity) / 0.3;
            lines.push(LineDraw {
                from: a.pos,
                to: b.pos,
                alpha: (1.0 - dist / max_dist) * base_opacity * fade,
                pair: (i, j),
            });
        }
    }
    lines
}

/// Canvas space (top-left origin, y down) to 2D world space centred on the camera.
pub fn canvas_to_world(point: Vec2, canvas: Vec2) -> Vec2 {
    Vec2::new(point.x - canvas.x / 2.0, canvas.y / 2.0 - point.y)
}

fn hsla(color: Hsl, alpha: f32) -> Color {
    Color::hsla(color.h, color.s / 100.0, color.l / 100.0, alpha.clamp(0.0, 1.0))
}

// ==================== Dots ====================

/// Filled disc mirroring store slot `index`.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticleDot {
    pub index: usize,
}

/// Unit disc shared by every dot; each dot scales it to its radius.
#[derive(Resource, Clone, Debug)]
pub struct DotMesh(pub Handle<Mesh>);

pub fn setup_dot_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(DotMesh(meshes.add(Circle::new(1.0))));
}

fn dot_transform(circle: &CircleDraw, canvas: Vec2) -> Transform {
    Transform::from_translation(canvas_to_world(circle.center, canvas).extend(0.0))
        .with_scale(Vec3::new(circle.radius, circle.radius, 1.0))
}

/// Keep one dot entity per store slot in step with the draw list.
///
/// Slots without a circle this frame are hidden; without a mounted engine
/// every dot is despawned.
pub fn sync_particle_dots(
    mut commands: Commands,
    engine: Option<Res<ParticleEngine>>,
    mesh: Option<Res<DotMesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut dots: Query<(
        Entity,
        &ParticleDot,
        &mut Transform,
        &mut Visibility,
        &MeshMaterial2d<ColorMaterial>,
    )>,
) {
    let (Some(engine), Some(mesh)) = (engine, mesh) else {
        for (entity, ..) in &dots {
            commands.entity(entity).despawn();
        }
        return;
    };
    let list = engine.draw_list();
    let canvas = engine.canvas();
    let slots = engine.particles().len();

    let mut drawn: Vec<Option<&CircleDraw>> = vec![None; slots];
    for circle in &list.circles {
        if let Some(slot) = drawn.get_mut(circle.index) {
            *slot = Some(circle);
        }
    }

    let mut spawned = vec![false; slots];
    for (entity, dot, mut transform, mut visibility, material) in &mut dots {
        if dot.index >= slots {
            commands.entity(entity).despawn();
            continue;
        }
        spawned[dot.index] = true;
        match drawn[dot.index] {
            Some(circle) => {
                *transform = dot_transform(circle, canvas);
                *visibility = Visibility::Inherited;
                if let Some(color) = materials.get_mut(&material.0) {
                    color.color = hsla(list.color, circle.alpha);
                }
            }
            None => *visibility = Visibility::Hidden,
        }
    }

    for (index, circle) in drawn.iter().enumerate() {
        let Some(circle) = circle else {
            continue;
        };
        if spawned[index] {
            continue;
        }
        let material = materials.add(ColorMaterial::from_color(hsla(list.color, circle.alpha)));
        commands.spawn((
            ParticleDot { index },
            Mesh2d(mesh.0.clone()),
            MeshMaterial2d(material),
            dot_transform(circle, canvas),
        ));
    }
}

// ==================== Connections ====================

/// Line width follows the scroll state of the last simulated frame.
pub fn apply_line_width(
    engine: Option<Res<ParticleEngine>>,
    mut gizmo_store: ResMut<GizmoConfigStore>,
) {
    let Some(engine) = engine else {
        return;
    };
    let (config, _) = gizmo_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line_width = engine.draw_list().line_width;
}

/// Paint the connection segments of the engine's last draw list.
pub fn paint_connections(engine: Option<Res<ParticleEngine>>, mut gizmos: Gizmos) {
    let Some(engine) = engine else {
        return;
    };
    let list = engine.draw_list();
    let canvas = engine.canvas();

    for line in &list.lines {
        gizmos.line_2d(
            canvas_to_world(line.from, canvas),
            canvas_to_world(line.to, canvas),
            hsla(list.color, line.alpha),
        );
    }
}

/// Plugin painting the backdrop behind everything else.
pub struct BackdropRenderPlugin;

impl Plugin for BackdropRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_dot_mesh).add_systems(
            Update,
            (apply_line_width, paint_connections, sync_particle_dots)
                .chain()
                .in_set(BackdropSet::Render),
        );
    }
}
