//! Background loop: poll input, dispatch clicks, flip the display.

use std::thread;
use std::time::Instant;

use log::{debug, info, trace};

use super::{Registry, Shared};
use crate::backend::InputEvent;
use crate::error::Result;

pub(crate) fn run(shared: &Shared) {
    info!("event loop started");
    while shared.is_running() {
        thread::sleep(shared.config.poll_interval());
        if let Err(err) = iterate(shared) {
            shared.halt("event loop iteration", &err);
        }
    }
    info!("event loop exiting");
}

/// One poll cycle.
///
/// Click handlers run inline here, so a slow handler delays input polling and
/// display flips until it returns.
fn iterate(shared: &Shared) -> Result<()> {
    let events = {
        let mut backend = shared.backend.lock();
        backend.pump();
        backend.drain_events()
    };

    {
        let mut registry = shared.registry.lock();
        end_due_flashes(shared, &mut registry)?;

        for event in events {
            match event {
                InputEvent::PointerDown(point) => {
                    let Some(page) = registry.current else {
                        trace!("pointer down at {point:?} with no page shown");
                        continue;
                    };
                    match registry.pages[page].hit_test(point) {
                        Some(widget) => shared.dispatch(&mut registry, page, widget)?,
                        None => trace!("pointer down at {point:?} hit nothing"),
                    }
                }
                InputEvent::KeyDown(key) if key == shared.config.screenshot_key => {
                    shared.capture()?;
                }
                InputEvent::KeyDown(_) | InputEvent::PointerUp(_) => {}
            }
        }
    }

    if !shared.lock_update.load(std::sync::atomic::Ordering::SeqCst) {
        shared.present()?;
    }
    Ok(())
}

fn end_due_flashes(shared: &Shared, registry: &mut Registry) -> Result<()> {
    let due = registry.reverts.take_due(Instant::now());
    if due.is_empty() {
        return Ok(());
    }
    for key in due {
        if let Some(page) = registry.pages.get_mut(key.page) {
            page.end_flash(key.widget)?;
            debug!("flash ended on {}/#{}", page.name(), key.widget);
        }
    }
    shared.present()
}
