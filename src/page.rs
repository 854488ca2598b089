//! The scrolling page the backdrop sits behind.
//!
//! A native window has no document, so the page is described explicitly: a
//! stack of sections in document space, a scroll offset moved by the mouse
//! wheel, the viewport size, and the theme's custom properties.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::resources::Hsl;

/// Custom property holding the particle colour as an `"h s% l%"` triple.
pub const PARTICLE_COLOR_VAR: &str = "--particle-color";

/// One section element of the page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageSection {
    pub id: String,
    /// Document-space top edge
    pub top: f32,
    pub height: f32,
    /// Headings, paragraphs, spans and links inside the section
    pub text_elements: u32,
    /// The scroll-driven transition section that toggles cinematic mode
    pub cinematic: bool,
}

impl PageSection {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Section stack of the page, in document order.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct PageLayout {
    sections: Vec<PageSection>,
}

impl PageLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section directly below the previous one.
    pub fn stack(mut self, id: impl Into<String>, height: f32, text_elements: u32) -> Self {
        self.push(id.into(), height, text_elements, false);
        self
    }

    /// Append the cinematic transition section.
    pub fn stack_cinematic(mut self, id: impl Into<String>, height: f32, text_elements: u32) -> Self {
        self.push(id.into(), height, text_elements, true);
        self
    }

    fn push(&mut self, id: String, height: f32, text_elements: u32, cinematic: bool) {
        let top = self.document_height();
        self.sections.push(PageSection {
            id,
            top,
            height: height.max(0.0),
            text_elements,
            cinematic,
        });
    }

    /// The portfolio page used by the demo binary, sized to the viewport.
    pub fn portfolio(viewport_height: f32) -> Self {
        let vh = viewport_height;
        Self::new()
            .stack("hero", vh, 8)
            .stack("philosophy", vh * 1.2, 14)
            .stack("capabilities", vh * 1.5, 26)
            .stack_cinematic("transition", vh * 3.0, 4)
            .stack("work", vh * 2.0, 30)
            .stack("experience", vh * 1.6, 24)
            .stack("hackathons", vh * 1.2, 18)
            .stack("contact", vh, 10)
    }

    pub fn sections(&self) -> &[PageSection] {
        &self.sections
    }

    pub fn cinematic_section(&self) -> Option<&PageSection> {
        self.sections.iter().find(|s| s.cinematic)
    }

    pub fn document_height(&self) -> f32 {
        self.sections.last().map_or(0.0, PageSection::bottom)
    }
}

/// Document scroll offset, in pixels from the top of the page.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct PageScroll {
    pub y: f32,
}

impl PageScroll {
    /// Scroll by `delta` pixels, clamped to the scrollable range.
    /// Returns whether the offset moved.
    pub fn scroll_by(&mut self, delta: f32, layout: &PageLayout, viewport_height: f32) -> bool {
        let max = (layout.document_height() - viewport_height).max(0.0);
        let next = (self.y + delta).clamp(0.0, max);
        let moved = next != self.y;
        self.y = next;
        moved
    }
}

/// Size of the window, which doubles as the canvas.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Theme custom properties, looked up by name the way a stylesheet would be.
#[derive(Resource, Clone, Debug, Default)]
pub struct ThemeVars {
    vars: HashMap<String, String>,
}

impl ThemeVars {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Particle colour from [`PARTICLE_COLOR_VAR`], falling back to
    /// [`Hsl::FALLBACK`] when unset or malformed.
    pub fn particle_color(&self) -> Hsl {
        self.get(PARTICLE_COLOR_VAR)
            .and_then(Hsl::parse)
            .unwrap_or(Hsl::FALLBACK)
    }
}
