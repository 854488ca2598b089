//! Content zone sampling.
//!
//! Classifies the page by text density so particles can recede from readable
//! content, and tracks which section sits in the middle of the viewport.

use crate::page::PageLayout;
use crate::resources::{ActiveSection, ContentZone};

/// Text elements at which a section counts as fully dense.
const DENSITY_SATURATION: f32 = 20.0;

// Viewport fractions used for classification
const ACTIVE_BAND_TOP: f32 = 0.4;
const ACTIVE_BAND_BOTTOM: f32 = 0.6;
const MIDLINE: f32 = 0.5;

/// Zone table from the most recent rebuild.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneTable {
    zones: Vec<ContentZone>,
}

impl ZoneTable {
    pub fn from_zones(zones: Vec<ContentZone>) -> Self {
        Self { zones }
    }

    /// Rebuild the table from the page layout at the given scroll offset.
    ///
    /// Also returns the section straddling the viewport midline, if any.
    pub fn sample(
        layout: &PageLayout,
        scroll_y: f32,
        viewport_height: f32,
    ) -> (Self, Option<ActiveSection>) {
        let mut zones = Vec::with_capacity(layout.sections().len());
        let mut active = None;

        for section in layout.sections() {
            // Viewport-space rect
            let rect_top = section.top - scroll_y;
            let rect_bottom = section.bottom() - scroll_y;

            let density = (section.text_elements as f32 / DENSITY_SATURATION).min(1.0);
            let is_active = rect_top < viewport_height * ACTIVE_BAND_BOTTOM
                && rect_bottom > viewport_height * ACTIVE_BAND_TOP;

            zones.push(ContentZone {
                top: section.top,
                bottom: section.bottom(),
                density,
                is_active,
            });

            let midline = viewport_height * MIDLINE;
            if is_active && rect_top < midline && rect_bottom > midline {
                active = Some(ActiveSection {
                    top: section.top,
                    bottom: section.bottom(),
                    center: (section.top + section.bottom()) / 2.0,
                });
            }
        }

        (Self { zones }, active)
    }

    pub fn zones(&self) -> &[ContentZone] {
        &self.zones
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Density of the first zone containing `document_y`, or 0.
    pub fn density_at(&self, document_y: f32) -> f32 {
        self.zones
            .iter()
            .find(|zone| zone.contains(document_y))
            .map_or(0.0, |zone| zone.density)
    }

    /// Density under a viewport-space y coordinate.
    pub fn local_density(&self, viewport_y: f32, scroll_y: f32) -> f32 {
        self.density_at(viewport_y + scroll_y)
    }
}
