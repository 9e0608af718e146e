//! Desktop simulator for the touchgui engine.
//!
//! The engine runs its own loop thread against a [`MemoryBackend`]. This
//! thread owns the SDL2 window: it forwards mouse presses and keys into the
//! backend and copies every presented frame into the window.
//!
//! # Key bindings
//!
//! | Key | Action                          |
//! |-----|---------------------------------|
//! | F12 | Save `screenshot.tga`           |
//! | Q   | Quit                            |
//!
//! Mouse clicks are forwarded as touch presses.
//!
//! An optional first argument names a TOML file with an `EngineConfig`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Alignment;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info};
use parking_lot::Mutex;

use touchgui::pages::PageHooks;
use touchgui::ui::TextSize;
use touchgui::{
    Button, Engine, EngineConfig, GuiError, Key, MemoryBackend, MemoryHandle, NumPad, Page,
    TextBox,
};

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 1;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

// ---------------------------------------------------------------------------
// Demo pages
// ---------------------------------------------------------------------------

/// Menu page showing the last value accepted on the keypad.
struct MenuHooks {
    last_value: Arc<Mutex<Option<u64>>>,
}

impl PageHooks for MenuHooks {
    fn initialize(&mut self, page: &mut Page) -> touchgui::Result<()> {
        page.add_widget(
            TextBox::new("title", Point::new(20, 20), Size::new(760, 60), "touchgui demo")
                .with_alignment(Alignment::Left),
        );
        page.add_widget(
            TextBox::new("status", Point::new(20, 100), Size::new(760, 60), "No value yet")
                .with_alignment(Alignment::Left)
                .with_text_size(TextSize::Medium)
                .with_border(true),
        );
        page.add_widget(
            Button::new("enter", Point::new(20, 200), Size::new(360, 120), "Enter value")
                .on_click(|ctx| {
                    ctx.show("keypad");
                    Ok(())
                }),
        );
        page.add_widget(
            Button::new("quit", Point::new(420, 200), Size::new(360, 120), "Quit").on_click(
                |ctx| {
                    ctx.shutdown();
                    Ok(())
                },
            ),
        );
        Ok(())
    }

    fn on_show(&mut self, page: &mut Page) -> touchgui::Result<()> {
        if let (Some(value), Some(status)) = (*self.last_value.lock(), page.text_box_mut("status"))
        {
            status.set_text(&format!("Last value: {value} MHz"));
        }
        Ok(())
    }
}

fn register_pages(engine: &Engine) -> touchgui::Result<()> {
    let last_value = Arc::new(Mutex::new(None));

    let menu = engine.add_page(Page::with_hooks(
        "menu",
        MenuHooks {
            last_value: Arc::clone(&last_value),
        },
    ))?;

    let keypad = NumPad::new("Frequency", "MHz", 6, 100, 999_999)
        .on_accept(move |value, ctx| {
            info!("accepted {value}");
            *last_value.lock() = Some(value);
            ctx.show("menu");
            Ok(())
        })
        .on_cancel(|ctx| {
            ctx.show("menu");
            Ok(())
        });
    engine.add_page(keypad.into_page("keypad"))?;

    engine.show(menu)
}

// ---------------------------------------------------------------------------
// Input mapping
// ---------------------------------------------------------------------------

fn map_key(keycode: Keycode) -> Option<Key> {
    let key = match keycode {
        Keycode::F1 => Key::F1,
        Keycode::F2 => Key::F2,
        Keycode::F3 => Key::F3,
        Keycode::F4 => Key::F4,
        Keycode::F5 => Key::F5,
        Keycode::F6 => Key::F6,
        Keycode::F7 => Key::F7,
        Keycode::F8 => Key::F8,
        Keycode::F9 => Key::F9,
        Keycode::F10 => Key::F10,
        Keycode::F11 => Key::F11,
        Keycode::F12 => Key::F12,
        Keycode::Escape => Key::Escape,
        Keycode::Return => Key::Enter,
        _ => return None,
    };
    Some(key)
}

/// Copy the backend's mirrored screen into the SDL display.
fn mirror(handle: &MemoryHandle, display: &mut SimulatorDisplay<Rgb565>) {
    let area = display.bounding_box();
    handle.with_screen(|frame| {
        let _ = display.fill_contiguous(&area, frame.pixels().iter().copied());
    });
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<(), GuiError> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::default(),
    };
    let size = config.display_size();
    info!("Starting touchgui simulator");
    info!("Display: {}x{} (scale {}x)", size.width, size.height, WINDOW_SCALE);
    info!("Keys: F12=Screenshot  Q=Quit");

    let (backend, handle) = MemoryBackend::new(size);
    handle.set_write_captures(true);
    let engine = Engine::new(config, backend)?;

    if let Err(err) = register_pages(&engine) {
        error!("failed to set up demo pages: {err}");
        engine.join();
        return Err(err);
    }

    let mut display = SimulatorDisplay::<Rgb565>::new(size);
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("touchgui Simulator", &output_settings);

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    mirror(&handle, &mut display);
    window.update(&display);

    'running: while engine.is_running() {
        let frame_start = Instant::now();

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => {
                    if keycode == Keycode::Q {
                        break 'running;
                    }
                    if let Some(key) = map_key(keycode) {
                        handle.key_down(key);
                    }
                }
                SimulatorEvent::MouseButtonDown { point, .. } => handle.pointer_down(point),
                _ => {}
            }
        }

        mirror(&handle, &mut display);
        window.update(&display);

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    engine.join();
    info!("Simulator exiting");
    Ok(())
}
