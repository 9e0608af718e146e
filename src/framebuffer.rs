//! Heap-backed framebuffer with per-pixel change detection.
//!
//! Every page draws into one of these. The engine owns the live buffer and
//! flushes it to the [`Backend`](crate::backend::Backend) on each flip; pages
//! that are not on screen draw into private scratch buffers which are never
//! presented. Only the rectangular region containing changed pixels is
//! flushed, in a single `fill_contiguous` call.

use std::convert::Infallible;
use std::sync::{Arc, Weak};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use log::trace;
use parking_lot::{Mutex, MutexGuard};

/// Unwrap a drawing result whose error type can never be constructed.
pub(crate) fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    /// Expand the dirty region to include the given pixel coordinate.
    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Create a new dirty rect covering a single pixel.
    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }
}

/// Framebuffer implementing `DrawTarget<Color = Rgb565>`.
///
/// A full 800x480 buffer is 768,000 bytes. The dirty bounding box is tracked
/// so that only changed pixels are flushed to the output.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRect>,
}

impl FrameBuffer {
    /// Allocate a new framebuffer filled with black pixels.
    pub fn new(size: Size) -> Self {
        let width = size.width as usize;
        let height = size.height as usize;
        Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; width * height],
            dirty: None,
        }
    }

    /// Color of the pixel at `point`, or `None` when it lies outside the buffer.
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        let (x, y) = self.index_of(point)?;
        Some(self.pixels[y * self.width + x])
    }

    /// Raw pixel storage in row-major order.
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    /// Whether anything changed since the last [`flush`](Self::flush).
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    /// Fill `area` (clipped to the buffer) with a solid color.
    pub fn fill_rect(&mut self, area: &Rectangle, color: Rgb565) {
        let Some(clipped) = self.clip(area) else {
            return;
        };
        let (x0, y0, x1, y1) = clipped;
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Draw the one pixel wide outline of `area`.
    pub fn outline_rect(&mut self, area: &Rectangle, color: Rgb565) {
        infallible(
            area.into_styled(PrimitiveStyle::with_stroke(color, 1))
                .draw(self),
        );
    }

    /// Fill the whole buffer with `color`.
    pub fn fill(&mut self, color: Rgb565) {
        let area = self.bounding_box();
        self.fill_rect(&area, color);
    }

    /// Flush the dirty region to another draw target, then reset the dirty state.
    ///
    /// If nothing changed, this is a no-op.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let width = rect.max_x - rect.min_x + 1;
        let height = rect.max_y - rect.min_y + 1;

        trace!(
            "Flushing {}x{} dirty region at ({}, {})",
            width, height, rect.min_x, rect.min_y
        );

        let area = Rectangle::new(
            Point::new(rect.min_x as i32, rect.min_y as i32),
            Size::new(width as u32, height as u32),
        );

        let pixels = &self.pixels;
        let stride = self.width;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + width].iter().copied()
        });

        display.fill_contiguous(&area, pixel_iter)
    }

    /// Write a single pixel, expanding the dirty rect only if the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * self.width + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    fn index_of(&self, point: Point) -> Option<(usize, usize)> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Clip `area` to the buffer, returning `(x0, y0, x1, y1)` with exclusive ends.
    fn clip(&self, area: &Rectangle) -> Option<(usize, usize, usize, usize)> {
        let left = i64::from(area.top_left.x).max(0);
        let top = i64::from(area.top_left.y).max(0);
        let right = (i64::from(area.top_left.x) + i64::from(area.size.width)).min(self.width as i64);
        let bottom =
            (i64::from(area.top_left.y) + i64::from(area.size.height)).min(self.height as i64);
        (left < right && top < bottom).then_some((
            left as usize,
            top as usize,
            right as usize,
            bottom as usize,
        ))
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if let Some((x, y)) = self.index_of(coord) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let mut colors = colors.into_iter();
        for row in 0..area.size.height as i32 {
            for col in 0..area.size.width as i32 {
                let Some(color) = colors.next() else {
                    return Ok(());
                };
                let point = area.top_left + Point::new(col, row);
                if let Some((x, y)) = self.index_of(point) {
                    self.set_pixel(x, y, color);
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(area, color);
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

/// Shared handle to a [`FrameBuffer`].
///
/// The engine and pages hold these. Widgets only ever hold a [`SurfaceRef`],
/// so dropping a page's scratch surface never leaves a widget drawing into it.
#[derive(Clone)]
pub struct Surface {
    inner: Arc<Mutex<FrameBuffer>>,
}

impl Surface {
    /// Allocate a fresh black surface of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FrameBuffer::new(size))),
        }
    }

    /// Lock the underlying framebuffer for drawing.
    pub fn lock(&self) -> MutexGuard<'_, FrameBuffer> {
        self.inner.lock()
    }

    /// Non-owning reference for widgets.
    pub fn downgrade(&self) -> SurfaceRef {
        SurfaceRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether both handles point at the same framebuffer.
    pub fn ptr_eq(&self, other: &Surface) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copy of every pixel, row-major.
    pub fn snapshot(&self) -> Vec<Rgb565> {
        self.inner.lock().pixels().to_vec()
    }
}

/// Weak back-reference from a widget to the surface its page is bound to.
#[derive(Clone, Default)]
pub struct SurfaceRef {
    inner: Weak<Mutex<FrameBuffer>>,
}

impl SurfaceRef {
    /// Reference bound to nothing.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Resolve to the surface, if it is still alive.
    pub fn upgrade(&self) -> Option<Surface> {
        self.inner.upgrade().map(|inner| Surface { inner })
    }

    /// Whether this reference points at `surface`.
    pub fn is_bound_to(&self, surface: &Surface) -> bool {
        std::ptr::eq(self.inner.as_ptr(), Arc::as_ptr(&surface.inner))
    }

    /// True when the reference was never bound or its surface was dropped.
    pub fn is_unbound(&self) -> bool {
        self.inner.strong_count() == 0
    }
}
