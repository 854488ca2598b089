//! Backdrop Render Tests
//!
//! Runs the render plugin in a headless app: dots are filled mesh entities,
//! one per store slot, connections go through the default gizmo group, and
//! everything is cleaned up once the engine is released.
//!
//! # Running tests
//! ```bash
//! cargo test --test backdrop_render
//! ```

use bevy::gizmos::LineGizmo;
use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::{CursorMoved, PrimaryWindow, WindowClosed, WindowOccluded, WindowResized};
use particle_backdrop::page::PageLayout;
use particle_backdrop::render::{BackdropRenderPlugin, ParticleDot};
use particle_backdrop::simulation::{BackdropPlugin, ParticleEngine};

// ==================== HELPER FUNCTIONS ====================

/// Headless app with the asset stores and gizmo group the render pass needs.
fn render_app() -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_event::<WindowResized>()
        .add_event::<CursorMoved>()
        .add_event::<WindowOccluded>()
        .add_event::<WindowClosed>()
        .add_event::<MouseWheel>()
        .init_resource::<Assets<Mesh>>()
        .init_resource::<Assets<ColorMaterial>>()
        .init_resource::<Assets<LineGizmo>>()
        .init_gizmo_group::<DefaultGizmoConfigGroup>()
        .add_plugins((BackdropPlugin::default(), BackdropRenderPlugin))
        .insert_resource(PageLayout::portfolio(720.0));
    let window = app.world_mut().spawn((Window::default(), PrimaryWindow)).id();
    (app, window)
}

fn dot_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&ParticleDot>()
        .iter(app.world())
        .count()
}

fn gizmo_line_width(app: &App) -> f32 {
    let store = app.world().resource::<GizmoConfigStore>();
    store.config::<DefaultGizmoConfigGroup>().0.line_width
}

// ==================== TESTS ====================

#[test]
fn test_first_frame_spawns_one_dot_per_particle() {
    let (mut app, _) = render_app();
    app.update();

    let particles = app.world().resource::<ParticleEngine>().particles().len();
    assert_eq!(particles, 80);
    assert_eq!(dot_count(&mut app), particles);
    assert_eq!(app.world().resource::<Assets<ColorMaterial>>().len(), particles);

    // Later frames reuse the same entities
    app.update();
    app.update();
    assert_eq!(dot_count(&mut app), particles);
}

#[test]
fn test_dots_follow_draw_list() {
    let (mut app, _) = render_app();
    app.update();

    let engine = app.world().resource::<ParticleEngine>();
    let canvas = engine.canvas();
    let circles = engine.draw_list().circles.clone();

    let mut dots = app.world_mut().query::<(&ParticleDot, &Transform, &Mesh2d)>();
    for (dot, transform, _) in dots.iter(app.world()) {
        let circle = circles
            .iter()
            .find(|c| c.index == dot.index)
            .unwrap_or_else(|| panic!("no circle for dot {}", dot.index));
        let expected = Vec2::new(
            circle.center.x - canvas.x / 2.0,
            canvas.y / 2.0 - circle.center.y,
        );
        assert_eq!(transform.translation.truncate(), expected);
        assert_eq!(transform.scale.x, circle.radius);
    }
}

#[test]
fn test_line_width_tracks_draw_list() {
    let (mut app, _) = render_app();
    app.update();
    let expected = app.world().resource::<ParticleEngine>().draw_list().line_width;
    assert_eq!(expected, 0.4);
    assert_eq!(gizmo_line_width(&app), expected);
}

#[test]
fn test_dots_removed_after_teardown() {
    let (mut app, window) = render_app();
    app.update();
    assert_eq!(dot_count(&mut app), 80);

    app.world_mut().send_event(WindowClosed { window });
    app.update();
    assert!(!app.world().contains_resource::<ParticleEngine>());

    app.update();
    assert_eq!(dot_count(&mut app), 0);
}
