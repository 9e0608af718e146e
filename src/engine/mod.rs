// src/engine/mod.rs
//! Page registry, live surface and the background event loop.
//!
//! The [`Engine`] owns one live [`Surface`] that mirrors what is on the
//! display. Exactly one registered page, the current one, draws into it;
//! every other page draws into a private scratch surface so its renders never
//! reach the screen. A background thread polls input, hit-tests pointer
//! presses against the current page and flips the live surface to the
//! [`Backend`].
//!
//! # Locking
//!
//! Page activation and the loop's hit-test/dispatch step both run under the
//! registry lock, so the loop never sees a half-swapped page. Locks are always
//! taken in the order registry, backend, surface.
//!
//! # Failures
//!
//! Render, show and loop failures are fail-stop: the error and its causes are
//! logged, the engine stops running, and the error is returned. There is no
//! recovery short of building a new engine.

pub mod deferred;
pub mod dispatch;
mod event_loop;

use std::error::Error as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{debug, error, info, warn};
use parking_lot::Mutex;

use crate::backend::Backend;
use crate::config::EngineConfig;
use crate::error::{GuiError, Result};
use crate::framebuffer::Surface;
use crate::pages::Page;
use crate::ui::styling::BLACK;
use deferred::DeferredQueue;
use dispatch::{DispatchEnv, Presenter, Request};

pub use dispatch::{ClickContext, WidgetKey};

/// Most pages one engine can hold.
pub const MAX_PAGES: usize = 16;

/// Handle to a registered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(usize);

impl PageId {
    /// Position of the page in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

pub(crate) struct Registry {
    pages: heapless::Vec<Page, MAX_PAGES>,
    current: Option<usize>,
    reverts: DeferredQueue<WidgetKey>,
}

impl Registry {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.name() == name)
    }
}

/// State shared between the control thread and the loop thread.
pub(crate) struct Shared {
    config: EngineConfig,
    registry: Mutex<Registry>,
    live: Surface,
    backend: Mutex<Box<dyn Backend>>,
    running: AtomicBool,
    lock_update: AtomicBool,
}

impl Shared {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Fresh off-screen surface for a page that is not being shown.
    fn scratch(&self) -> Surface {
        Surface::new(self.config.display_size())
    }

    /// Log `err` with its cause chain and stop the engine.
    fn halt(&self, context: &str, err: &GuiError) {
        error!("{context} failed: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            error!("  caused by: {cause}");
            source = cause.source();
        }
        error!("shutting down GUI");
        self.running.store(false, Ordering::SeqCst);
    }

    fn supervise<T>(&self, context: &str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.halt(context, err);
        }
        result
    }

    /// Swap the page at `index` onto the live surface.
    fn show_locked(&self, registry: &mut Registry, index: usize) -> Result<()> {
        if index >= registry.pages.len() {
            return Err(GuiError::UnknownPage(format!("#{index}")));
        }

        if let Some(previous) = registry.current.take() {
            let page = &mut registry.pages[previous];
            page.set_active(false);
            page.bind_surface(self.scratch());
            page.hide_hook()?;
            debug!("page {} hidden", page.name());
        }

        self.live.lock().fill(BLACK);

        registry.current = Some(index);
        let page = &mut registry.pages[index];
        page.bind_surface(self.live.clone());
        page.set_active(true);
        page.show_hook()?;
        page.render()?;
        info!("showing page {}", page.name());
        Ok(())
    }

    /// Click a widget and carry out whatever its handler asked for.
    fn dispatch(&self, registry: &mut Registry, page: usize, widget: usize) -> Result<()> {
        let mut requests = Vec::new();
        {
            let Registry { pages, reverts, .. } = registry;
            let target = pages
                .get_mut(page)
                .ok_or_else(|| GuiError::UnknownPage(format!("#{page}")))?;
            let mut env = DispatchEnv {
                requests: &mut requests,
                reverts,
                presenter: self,
                flash: self.config.flash_duration(),
            };
            target.dispatch_click(page, widget, &mut env)?;
        }
        self.apply(registry, requests)
    }

    fn apply(&self, registry: &mut Registry, requests: Vec<Request>) -> Result<()> {
        for request in requests {
            match request {
                Request::Show(name) => {
                    let index = registry
                        .index_of(&name)
                        .ok_or(GuiError::UnknownPage(name))?;
                    self.show_locked(registry, index)?;
                }
                Request::Shutdown => {
                    info!("shutdown requested from click handler");
                    self.running.store(false, Ordering::SeqCst);
                }
                Request::LockUpdate(locked) => self.lock_update.store(locked, Ordering::SeqCst),
            }
        }
        Ok(())
    }

    /// Flip the live surface to the display.
    fn present(&self) -> Result<()> {
        let mut backend = self.backend.lock();
        let mut frame = self.live.lock();
        backend.present(&mut frame)?;
        Ok(())
    }

    /// Save the live surface to the configured screenshot path.
    fn capture(&self) -> Result<()> {
        let path = &self.config.screenshot_path;
        let mut backend = self.backend.lock();
        let frame = self.live.lock();
        backend.capture(&frame, path)?;
        info!("screenshot saved to {}", path.display());
        Ok(())
    }
}

impl Presenter for Shared {
    fn present_now(&self) -> Result<()> {
        self.present()
    }
}

/// The UI engine: registered pages, the live surface and the loop thread.
///
/// Dropping the engine shuts the loop down and waits for it.
pub struct Engine {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Engine {
    /// Clear the live surface and start the event loop.
    pub fn new(config: EngineConfig, backend: impl Backend + 'static) -> Result<Self> {
        let live = Surface::new(config.display_size());
        live.lock().fill(BLACK);

        let shared = Arc::new(Shared {
            config,
            registry: Mutex::new(Registry {
                pages: heapless::Vec::new(),
                current: None,
                reverts: DeferredQueue::new(),
            }),
            live,
            backend: Mutex::new(Box::new(backend)),
            running: AtomicBool::new(true),
            lock_update: AtomicBool::new(false),
        });

        let loop_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("touchgui-loop".into())
            .spawn(move || event_loop::run(&loop_shared))
            .map_err(|err| {
                shared.running.store(false, Ordering::SeqCst);
                GuiError::Spawn(err)
            })?;

        info!(
            "engine started ({}x{})",
            shared.config.display.width, shared.config.display.height
        );
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Register `page` off-screen and run its `initialize` hook.
    ///
    /// A failing `initialize` stops the engine.
    pub fn add_page(&self, mut page: Page) -> Result<PageId> {
        let mut registry = self.shared.registry.lock();
        if registry.index_of(page.name()).is_some() {
            return Err(GuiError::DuplicatePage(page.name().to_string()));
        }

        let index = registry.pages.len();
        page.bind_surface(self.shared.scratch());
        registry
            .pages
            .push(page)
            .map_err(|_| GuiError::TooManyPages(MAX_PAGES))?;

        let page = &mut registry.pages[index];
        let result = page.initialize();
        debug!("registered page {} at {index}", page.name());
        self.shared.supervise("page initialization", result)?;
        Ok(PageId(index))
    }

    /// Make `page` the active page and render it.
    pub fn show(&self, page: PageId) -> Result<()> {
        let result = {
            let mut registry = self.shared.registry.lock();
            self.shared.show_locked(&mut registry, page.0)
        };
        self.shared.supervise("show", result)
    }

    pub fn show_by_name(&self, name: &str) -> Result<()> {
        let result = {
            let mut registry = self.shared.registry.lock();
            match registry.index_of(name) {
                Some(index) => self.shared.show_locked(&mut registry, index),
                None => Err(GuiError::UnknownPage(name.to_string())),
            }
        };
        self.shared.supervise("show", result)
    }

    /// Render the current page, if there is one.
    pub fn render(&self) -> Result<()> {
        let result = {
            let mut registry = self.shared.registry.lock();
            match registry.current {
                Some(index) => registry.pages[index].render(),
                None => Ok(()),
            }
        };
        self.shared.supervise("render", result)
    }

    /// Flip the live surface to the display now.
    pub fn update(&self) -> Result<()> {
        let result = self.shared.present();
        self.shared.supervise("update", result)
    }

    /// Service the backend's input queue from the calling thread.
    pub fn pump(&self) {
        self.shared.backend.lock().pump();
    }

    /// Click `widget` on `page` as if it had been touched.
    pub fn click(&self, page: PageId, widget: &str) -> Result<()> {
        let result = {
            let mut registry = self.shared.registry.lock();
            let index = registry
                .pages
                .get(page.0)
                .ok_or_else(|| GuiError::UnknownPage(format!("#{}", page.0)))
                .and_then(|p| {
                    p.widget_index(widget).ok_or_else(|| GuiError::UnknownWidget {
                        page: p.name().to_string(),
                        widget: widget.to_string(),
                    })
                });
            index.and_then(|index| self.shared.dispatch(&mut registry, page.0, index))
        };
        self.shared.supervise("click", result)
    }

    pub fn page_by_name(&self, name: &str) -> Option<PageId> {
        self.page_index_by_name(name).map(PageId)
    }

    pub fn page_index_by_name(&self, name: &str) -> Option<usize> {
        self.shared.registry.lock().index_of(name)
    }

    pub fn current_page(&self) -> Option<PageId> {
        self.shared.registry.lock().current.map(PageId)
    }

    /// Run `f` against a page while holding the registry lock.
    pub fn with_page<R>(&self, page: PageId, f: impl FnOnce(&Page) -> R) -> Option<R> {
        self.shared.registry.lock().pages.get(page.0).map(f)
    }

    /// Like [`with_page`](Self::with_page), with mutable access. Changes to
    /// the current page reach the display on the next flip.
    pub fn with_page_mut<R>(&self, page: PageId, f: impl FnOnce(&mut Page) -> R) -> Option<R> {
        self.shared.registry.lock().pages.get_mut(page.0).map(f)
    }

    /// Ask the loop to stop. It exits after its current iteration.
    pub fn shutdown(&self) {
        if self.shared.running.swap(false, Ordering::SeqCst) {
            info!("shutdown requested");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Suppress the loop's per-iteration flips, e.g. while batching redraws.
    /// Click flashes still flip immediately.
    pub fn set_lock_update(&self, locked: bool) {
        self.shared.lock_update.store(locked, Ordering::SeqCst);
    }

    pub fn is_update_locked(&self) -> bool {
        self.shared.lock_update.load(Ordering::SeqCst)
    }

    /// Copy of the live surface, row-major.
    pub fn live_snapshot(&self) -> Vec<Rgb565> {
        self.shared.live.snapshot()
    }

    pub fn live_pixel(&self, point: Point) -> Option<Rgb565> {
        self.shared.live.lock().pixel(point)
    }

    /// Shut down and wait for the loop thread to exit.
    pub fn join(mut self) {
        self.shutdown();
        self.join_worker();
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!("event loop thread panicked");
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
        self.join_worker();
    }
}
