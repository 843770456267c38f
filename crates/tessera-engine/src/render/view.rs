use std::sync::Arc;

use crate::camera::SharedCamera;

/// Viewport size in pixels.
///
/// SCREEN_SPACE_OVERLAY geometry is expressed in these units, top-left origin.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height; 1 for degenerate viewports.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_valid() { self.width / self.height } else { 1.0 }
    }
}

/// Whether a view is driven by user interaction.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ViewKind {
    #[default]
    Interactive,
    /// Offscreen or presentation views; meshes flagged
    /// `INTERACTIVE_VIEWS_ONLY` are not drawn.
    RenderOnly,
}

/// What one `render` call draws into.
#[derive(Debug, Clone)]
pub struct View {
    pub viewport: Viewport,
    pub camera: Arc<SharedCamera>,
    pub kind: ViewKind,
}

impl View {
    pub fn new(viewport: Viewport, camera: Arc<SharedCamera>) -> Self {
        Self {
            viewport,
            camera,
            kind: ViewKind::Interactive,
        }
    }

    pub fn with_kind(mut self, kind: ViewKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub fn is_interactive(&self) -> bool {
        self.kind == ViewKind::Interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_degenerate_viewport_is_one() {
        assert_eq!(Viewport::new(800.0, 400.0).aspect(), 2.0);
        assert_eq!(Viewport::new(0.0, 400.0).aspect(), 1.0);
        assert_eq!(Viewport::new(f32::NAN, 1.0).aspect(), 1.0);
    }
}
