//! Portfolio Particle Backdrop Library
//!
//! Exposes the backdrop engine, the cinematic-mode signal and the Bevy plugins
//! for testing and reuse.

pub mod error;
pub mod page;
pub mod render;
pub mod resources;
pub mod simulation;
