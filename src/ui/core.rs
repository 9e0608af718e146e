// src/ui/core.rs
//! Core widget traits for the touchgui UI system
//!
//! Every widget is [`Renderable`]; the ones that react to touch are also
//! [`Clickable`]. Widgets never own the surface they draw into: they hold a
//! weak [`SurfaceRef`] which their page swaps whenever the page is shown or
//! hidden.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::engine::ClickContext;
use crate::error::{GuiError, Result};
use crate::framebuffer::{FrameBuffer, Surface, SurfaceRef};

/// Horizontal dead zone excluded from each side of a widget when hit-testing.
pub const HIT_MARGIN_X: i32 = 3;
/// Vertical dead zone excluded from the top and bottom of a widget.
pub const HIT_MARGIN_Y: i32 = 2;

/// Fields shared by every widget.
#[derive(Clone)]
pub struct WidgetBase {
    /// Unique within the page; lookups compare the whole name.
    name: String,
    bounds: Rectangle,
    visible: bool,
    surface: SurfaceRef,
}

impl WidgetBase {
    pub fn new(name: &str, position: Point, size: Size) -> Self {
        Self {
            name: name.to_string(),
            bounds: Rectangle::new(position, size),
            visible: true,
            surface: SurfaceRef::unbound(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Point future renders at `surface`.
    pub fn bind(&mut self, surface: &Surface) {
        self.surface = surface.downgrade();
    }

    pub fn is_bound_to(&self, surface: &Surface) -> bool {
        self.surface.is_bound_to(surface)
    }

    /// Forget the current surface; renders fail until the next [`bind`](Self::bind).
    pub fn unbind(&mut self) {
        self.surface = SurfaceRef::unbound();
    }

    /// The surface this widget currently draws into.
    pub fn target(&self) -> Result<Surface> {
        self.surface
            .upgrade()
            .ok_or_else(|| GuiError::Unbound(self.name.to_string()))
    }

    /// Hit-test against the bounds shrunk by the touch margins.
    ///
    /// Both comparisons are strict, so a point exactly on the shrunk edge
    /// misses.
    pub fn hit(&self, point: Point) -> bool {
        let left = self.bounds.top_left.x;
        let top = self.bounds.top_left.y;
        let right = left + self.bounds.size.width as i32;
        let bottom = top + self.bounds.size.height as i32;

        point.x > left + HIT_MARGIN_X
            && point.x < right - HIT_MARGIN_X
            && point.y > top + HIT_MARGIN_Y
            && point.y < bottom - HIT_MARGIN_Y
    }
}

/// A widget that can paint itself.
pub trait Renderable {
    fn base(&self) -> &WidgetBase;

    fn base_mut(&mut self) -> &mut WidgetBase;

    /// Draw the current visual state into `target`.
    ///
    /// Must not change any widget field.
    fn paint(&self, target: &mut FrameBuffer) -> Result<()>;

    /// Paint into the bound surface.
    fn render(&self) -> Result<()> {
        let surface = self.base().target()?;
        let mut frame = surface.lock();
        self.paint(&mut frame)
    }

    /// Rebind where future renders draw. Nothing changes on screen until the
    /// next [`render`](Self::render).
    fn assign_surface(&mut self, surface: &Surface) {
        self.base_mut().bind(surface);
    }
}

/// A widget that accepts clicks.
pub trait Clickable: Renderable {
    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Handle one click. Disabled widgets ignore it entirely.
    fn click(&mut self, ctx: &mut ClickContext<'_>) -> Result<()>;
}

/// Callback run when a clickable widget is clicked while enabled.
///
/// Runs synchronously on the event loop thread; a slow handler stalls input
/// polling and display flips until it returns.
pub type ClickHandler = Box<dyn FnMut(&mut ClickContext<'_>) -> Result<()> + Send>;

/// Enable flag plus optional handler, shared by every clickable widget.
pub struct ClickBinding {
    enabled: bool,
    handler: Option<ClickHandler>,
}

impl Default for ClickBinding {
    fn default() -> Self {
        Self {
            enabled: true,
            handler: None,
        }
    }
}

impl ClickBinding {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_handler(&mut self, handler: ClickHandler) {
        self.handler = Some(handler);
    }

    /// Run the handler, if there is one and the widget is enabled.
    pub fn fire(&mut self, ctx: &mut ClickContext<'_>) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        match self.handler.as_mut() {
            Some(handler) => handler(ctx),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dispatch::testing::with_context;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn base_at(x: i32, y: i32, w: u32, h: u32) -> WidgetBase {
        WidgetBase::new("w", Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_hit_margins_are_strict() {
        let (x, y, w, h) = (100, 50, 200, 90);
        let base = base_at(x, y, w, h);
        let (w, h) = (w as i32, h as i32);

        assert!(!base.hit(Point::new(x + 3, y + 2)));
        assert!(base.hit(Point::new(x + 4, y + 3)));
        assert!(base.hit(Point::new(x + w - 4, y + h - 3)));
        assert!(!base.hit(Point::new(x + w - 3, y + h - 2)));
        assert!(!base.hit(Point::new(x + 4, y + 2)));
        assert!(!base.hit(Point::new(x + 3, y + 3)));
    }

    #[test]
    fn test_tiny_widget_never_hits() {
        let base = base_at(0, 0, 6, 4);
        for x in -1..8 {
            for y in -1..6 {
                assert!(!base.hit(Point::new(x, y)));
            }
        }
    }

    #[test]
    fn test_long_name_is_kept_whole() {
        let long = "é".repeat(40);
        let base = WidgetBase::new(&long, Point::zero(), Size::new(1, 1));
        assert_eq!(base.name(), long);
    }

    #[test]
    fn test_unbound_render_target_is_error() {
        let base = base_at(0, 0, 10, 10);
        assert!(matches!(base.target(), Err(GuiError::Unbound(name)) if name == "w"));

        let surface = Surface::new(Size::new(10, 10));
        let mut base = base;
        base.bind(&surface);
        assert!(base.is_bound_to(&surface));
        assert!(base.target().is_ok());

        base.unbind();
        assert!(!base.is_bound_to(&surface));
        assert!(matches!(base.target(), Err(GuiError::Unbound(_))));
    }

    #[test]
    fn test_disabled_binding_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let mut binding = ClickBinding::default();
        binding.set_handler(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        binding.set_enabled(false);

        with_context(|ctx| binding.fire(ctx)).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        binding.set_enabled(true);
        with_context(|ctx| binding.fire(ctx)).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
