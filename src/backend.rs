//! Display and input backends.
//!
//! The engine never talks to a framebuffer device or input driver directly.
//! It presents its live [`FrameBuffer`] through a [`Backend`] and pulls input
//! from it once per loop iteration.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture;
use crate::framebuffer::{FrameBuffer, infallible};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("display output is no longer available")]
    Disconnected,
    #[error("screen capture to {} failed", .path.display())]
    Capture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Keys the engine can tell apart. Anything else arrives as [`Key::Other`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Escape,
    Enter,
    Char(char),
    Other(i32),
}

/// Input delivered by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Touch or mouse press at a screen coordinate
    PointerDown(Point),
    /// Touch or mouse release
    PointerUp(Point),
    KeyDown(Key),
}

/// Physical output and input queue.
pub trait Backend: Send {
    /// Flip `frame` to the physical display.
    fn present(&mut self, frame: &mut FrameBuffer) -> Result<(), BackendError>;

    /// Service the platform input queue. Must run regularly or input is lost.
    fn pump(&mut self);

    /// Take every event queued since the last call.
    fn drain_events(&mut self) -> Vec<InputEvent>;

    /// Save `frame` to an image file.
    fn capture(&mut self, frame: &FrameBuffer, path: &Path) -> Result<(), BackendError> {
        capture::write_tga(frame, path).map_err(|source| BackendError::Capture {
            path: path.to_path_buf(),
            source,
        })
    }
}

struct MemoryState {
    screen: FrameBuffer,
    input: VecDeque<InputEvent>,
    presents: usize,
    pumps: usize,
    captures: Vec<PathBuf>,
    write_captures: bool,
    connected: bool,
}

/// Backend that "displays" into an in-memory mirror.
///
/// Input is injected and output observed through a [`MemoryHandle`], which
/// may live on another thread (the simulator's SDL thread, or a test).
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    queued: Vec<InputEvent>,
}

impl MemoryBackend {
    pub fn new(size: Size) -> (Self, MemoryHandle) {
        let state = Arc::new(Mutex::new(MemoryState {
            screen: FrameBuffer::new(size),
            input: VecDeque::new(),
            presents: 0,
            pumps: 0,
            captures: Vec::new(),
            write_captures: false,
            connected: true,
        }));
        let handle = MemoryHandle {
            state: Arc::clone(&state),
        };
        (
            Self {
                state,
                queued: Vec::new(),
            },
            handle,
        )
    }
}

impl Backend for MemoryBackend {
    fn present(&mut self, frame: &mut FrameBuffer) -> Result<(), BackendError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if !state.connected {
            return Err(BackendError::Disconnected);
        }
        infallible(frame.flush(&mut state.screen));
        state.presents += 1;
        Ok(())
    }

    fn pump(&mut self) {
        let mut state = self.state.lock();
        state.pumps += 1;
        self.queued.extend(state.input.drain(..));
    }

    fn drain_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.queued)
    }

    fn capture(&mut self, frame: &FrameBuffer, path: &Path) -> Result<(), BackendError> {
        let write = {
            let mut state = self.state.lock();
            state.captures.push(path.to_path_buf());
            state.write_captures
        };
        debug!("capture requested to {}", path.display());
        if write {
            capture::write_tga(frame, path).map_err(|source| BackendError::Capture {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Cloneable remote control for a [`MemoryBackend`].
#[derive(Clone)]
pub struct MemoryHandle {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryHandle {
    pub fn push_input(&self, event: InputEvent) {
        self.state.lock().input.push_back(event);
    }

    pub fn pointer_down(&self, point: Point) {
        self.push_input(InputEvent::PointerDown(point));
    }

    pub fn key_down(&self, key: Key) {
        self.push_input(InputEvent::KeyDown(key));
    }

    /// Number of completed flips.
    pub fn presents(&self) -> usize {
        self.state.lock().presents
    }

    pub fn pumps(&self) -> usize {
        self.state.lock().pumps
    }

    /// Paths of every capture requested so far.
    pub fn captures(&self) -> Vec<PathBuf> {
        self.state.lock().captures.clone()
    }

    /// Also write captures to disk instead of only recording them.
    pub fn set_write_captures(&self, write: bool) {
        self.state.lock().write_captures = write;
    }

    /// Make further presents fail, as an unplugged display would.
    pub fn disconnect(&self) {
        self.state.lock().connected = false;
    }

    /// Pixel currently on the mirrored display.
    pub fn screen_pixel(&self, point: Point) -> Option<Rgb565> {
        self.state.lock().screen.pixel(point)
    }

    /// Run `f` against the mirrored display.
    pub fn with_screen<R>(&self, f: impl FnOnce(&FrameBuffer) -> R) -> R {
        f(&self.state.lock().screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::Rectangle;

    #[test]
    fn test_present_mirrors_frame() {
        let (mut backend, handle) = MemoryBackend::new(Size::new(8, 8));
        let mut frame = FrameBuffer::new(Size::new(8, 8));
        frame.fill_rect(
            &Rectangle::new(Point::new(1, 1), Size::new(2, 2)),
            Rgb565::BLUE,
        );

        backend.present(&mut frame).unwrap();

        assert_eq!(handle.presents(), 1);
        assert_eq!(handle.screen_pixel(Point::new(2, 2)), Some(Rgb565::BLUE));
        assert_eq!(handle.screen_pixel(Point::new(3, 3)), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_events_wait_for_pump() {
        let (mut backend, handle) = MemoryBackend::new(Size::new(8, 8));
        handle.pointer_down(Point::new(4, 4));
        handle.key_down(Key::F12);

        assert!(backend.drain_events().is_empty());
        backend.pump();
        assert_eq!(
            backend.drain_events(),
            vec![
                InputEvent::PointerDown(Point::new(4, 4)),
                InputEvent::KeyDown(Key::F12)
            ]
        );
        assert!(backend.drain_events().is_empty());
        assert_eq!(handle.pumps(), 1);
    }

    #[test]
    fn test_disconnected_present_fails() {
        let (mut backend, handle) = MemoryBackend::new(Size::new(2, 2));
        handle.disconnect();
        let mut frame = FrameBuffer::new(Size::new(2, 2));
        assert!(matches!(
            backend.present(&mut frame),
            Err(BackendError::Disconnected)
        ));
    }

    #[test]
    fn test_capture_is_recorded_without_writing() {
        let (mut backend, handle) = MemoryBackend::new(Size::new(2, 2));
        let frame = FrameBuffer::new(Size::new(2, 2));
        let path = Path::new("/nonexistent/dir/shot.tga");

        backend.capture(&frame, path).unwrap();

        assert_eq!(handle.captures(), vec![path.to_path_buf()]);
    }
}
