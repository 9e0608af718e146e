// src/pages/page.rs
//! Full-screen page: an ordered list of widgets plus lifecycle hooks.
//!
//! Widget order is significant twice over. Widgets paint in insertion order,
//! so later widgets draw over earlier ones, and hit-testing scans in the same
//! order, so when clickable widgets overlap the **first** one added wins.
//!
//! # Lifecycle
//!
//! 1. **`initialize`** once, right after the engine registers the page.
//! 2. **`on_show`** every time the engine makes the page active.
//! 3. **`before_render`** at the start of every [`Page::render`].
//! 4. **`after_click`** after any widget on the page handled a click.
//! 5. **`on_hide`** when another page replaces this one on screen.
//!
//! A page that is not on screen is bound to a private scratch surface, so
//! rendering it never touches the display.

use embedded_graphics::prelude::*;
use log::debug;

use crate::engine::dispatch::{ClickContext, DispatchEnv, Siblings, WidgetKey};
use crate::error::{GuiError, Result};
use crate::framebuffer::Surface;
use crate::ui::components::{Button, Frame, TextBox};
use crate::ui::widget::Widget;

/// Override points for a page's behavior.
///
/// Every hook gets the page itself, so hooks can look widgets up by name and
/// re-render them. An error from any hook is a lifecycle failure and stops
/// the engine.
pub trait PageHooks: Send {
    /// Populate the page. Called exactly once, right after registration.
    fn initialize(&mut self, page: &mut Page) -> Result<()>;

    /// Called each time the page becomes the active page, before it renders.
    fn on_show(&mut self, _page: &mut Page) -> Result<()> {
        Ok(())
    }

    /// Called when another page takes over the display.
    fn on_hide(&mut self, _page: &mut Page) -> Result<()> {
        Ok(())
    }

    /// Called at the start of every full-page render.
    fn before_render(&mut self, _page: &mut Page) -> Result<()> {
        Ok(())
    }

    /// Called after the widget named `widget` handled a click.
    fn after_click(&mut self, _page: &mut Page, _widget: &str) -> Result<()> {
        Ok(())
    }
}

pub struct Page {
    /// Unique across the engine.
    name: String,
    widgets: Vec<Widget>,
    active: bool,
    initialized: bool,
    surface: Option<Surface>,
    hooks: Option<Box<dyn PageHooks>>,
}

impl Page {
    /// Page without hooks. Add widgets before or after registering it.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            widgets: Vec::new(),
            active: false,
            initialized: false,
            surface: None,
            hooks: None,
        }
    }

    pub fn with_hooks(name: &str, hooks: impl PageHooks + 'static) -> Self {
        Self {
            hooks: Some(Box::new(hooks)),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this page is the one bound to the live display.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Bind `widget` to this page's surface and append it. On a page with no
    /// surface yet the widget is left unbound.
    pub fn add_widget(&mut self, widget: impl Into<Widget>) -> &mut Widget {
        let mut widget = widget.into();
        match &self.surface {
            Some(surface) => widget.assign_surface(surface),
            None => widget.base_mut().unbind(),
        }
        let index = self.widgets.len();
        self.widgets.push(widget);
        &mut self.widgets[index]
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// First widget with the given name.
    pub fn element_by_name(&self, name: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.name() == name)
    }

    pub fn element_by_name_mut(&mut self, name: &str) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.name() == name)
    }

    pub fn widget_index(&self, name: &str) -> Option<usize> {
        self.widgets.iter().position(|w| w.name() == name)
    }

    pub fn button(&self, name: &str) -> Option<&Button> {
        self.element_by_name(name).and_then(Widget::as_button)
    }

    pub fn button_mut(&mut self, name: &str) -> Option<&mut Button> {
        self.element_by_name_mut(name).and_then(Widget::as_button_mut)
    }

    pub fn text_box(&self, name: &str) -> Option<&TextBox> {
        self.element_by_name(name).and_then(Widget::as_text_box)
    }

    pub fn text_box_mut(&mut self, name: &str) -> Option<&mut TextBox> {
        self.element_by_name_mut(name).and_then(Widget::as_text_box_mut)
    }

    pub fn frame(&self, name: &str) -> Option<&Frame> {
        self.element_by_name(name).and_then(Widget::as_frame)
    }

    pub fn frame_mut(&mut self, name: &str) -> Option<&mut Frame> {
        self.element_by_name_mut(name).and_then(Widget::as_frame_mut)
    }

    /// Render every widget in insertion order. The first failure aborts the
    /// render and is returned.
    pub fn render(&mut self) -> Result<()> {
        self.run_hook(|hooks, page| hooks.before_render(page))?;
        for widget in &self.widgets {
            widget.render()?;
        }
        Ok(())
    }

    /// Re-render one widget by name.
    pub fn render_widget(&self, name: &str) -> Result<()> {
        self.element_by_name(name)
            .ok_or_else(|| GuiError::UnknownWidget {
                page: self.name.to_string(),
                widget: name.to_string(),
            })?
            .render()
    }

    pub(crate) fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;
        self.run_hook(|hooks, page| hooks.initialize(page))
    }

    pub(crate) fn show_hook(&mut self) -> Result<()> {
        self.run_hook(|hooks, page| hooks.on_show(page))
    }

    pub(crate) fn hide_hook(&mut self) -> Result<()> {
        self.run_hook(|hooks, page| hooks.on_hide(page))
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Swap the surface this page and all of its widgets draw into.
    pub(crate) fn bind_surface(&mut self, surface: Surface) {
        for widget in &mut self.widgets {
            widget.assign_surface(&surface);
        }
        self.surface = Some(surface);
    }

    /// Index of the first clickable widget hit by `point`.
    pub(crate) fn hit_test(&self, point: Point) -> Option<usize> {
        self.widgets
            .iter()
            .position(|w| w.is_clickable() && w.base().hit(point))
    }

    /// Click the widget at `index`, then run the page's `after_click` hook.
    /// Disabled widgets swallow the click and the hook does not run.
    pub(crate) fn dispatch_click(
        &mut self,
        page_index: usize,
        index: usize,
        env: &mut DispatchEnv<'_>,
    ) -> Result<()> {
        let widget_name = {
            let (before, rest) = self.widgets.split_at_mut(index);
            let Some((target, after)) = rest.split_first_mut() else {
                return Err(GuiError::UnknownWidget {
                    page: self.name.to_string(),
                    widget: format!("#{index}"),
                });
            };
            let widget_name = target.name().to_string();
            let Some(clickable) = target.as_clickable_mut() else {
                return Ok(());
            };
            if !clickable.is_enabled() {
                debug!("ignoring click on disabled {}/{}", self.name, widget_name);
                return Ok(());
            }

            debug!("click on {}/{}", self.name, widget_name);
            let key = WidgetKey {
                page: page_index,
                widget: index,
            };
            let mut ctx =
                ClickContext::new(key, &self.name, &widget_name, Siblings { before, after }, env);
            clickable.click(&mut ctx)?;
            widget_name
        };

        self.run_hook(|hooks, page| hooks.after_click(page, &widget_name))
    }

    /// End the click flash of the button at `index`, if it still is one.
    pub(crate) fn end_flash(&mut self, index: usize) -> Result<()> {
        match self.widgets.get_mut(index).and_then(Widget::as_button_mut) {
            Some(button) => button.end_flash(),
            None => Ok(()),
        }
    }

    /// Hooks are taken out while they run so they can borrow the page mutably.
    fn run_hook<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut dyn PageHooks, &mut Page) -> Result<()>,
    {
        let Some(mut hooks) = self.hooks.take() else {
            return Ok(());
        };
        let result = f(hooks.as_mut(), self);
        self.hooks = Some(hooks);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dispatch::testing::Harness;
    use crate::ui::core::{Clickable, Renderable};
    use crate::ui::styling::{BLACK, GREEN};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counting {
        inits: Arc<AtomicUsize>,
        shows: Arc<AtomicUsize>,
        clicks: Arc<AtomicUsize>,
    }

    impl PageHooks for Counting {
        fn initialize(&mut self, page: &mut Page) -> Result<()> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            page.add_widget(Button::new("go", Point::new(0, 0), Size::new(40, 20), "Go"));
            Ok(())
        }

        fn on_show(&mut self, _page: &mut Page) -> Result<()> {
            self.shows.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn after_click(&mut self, page: &mut Page, widget: &str) -> Result<()> {
            assert_eq!(widget, "go");
            self.clicks.fetch_add(1, Ordering::SeqCst);
            if let Some(button) = page.button_mut("go") {
                button.set_enabled(false);
            }
            Ok(())
        }
    }

    fn counting_page() -> (Page, [Arc<AtomicUsize>; 3]) {
        let counters = [
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        ];
        let page = Page::with_hooks(
            "counting",
            Counting {
                inits: Arc::clone(&counters[0]),
                shows: Arc::clone(&counters[1]),
                clicks: Arc::clone(&counters[2]),
            },
        );
        (page, counters)
    }

    #[test]
    fn test_initialize_runs_once() {
        let (mut page, counters) = counting_page();
        page.initialize().unwrap();
        page.initialize().unwrap();
        assert_eq!(counters[0].load(Ordering::SeqCst), 1);
        assert_eq!(page.widgets().len(), 1);

        page.show_hook().unwrap();
        page.show_hook().unwrap();
        assert_eq!(counters[1].load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_add_widget_binds_to_current_surface() {
        let surface = Surface::new(Size::new(100, 100));
        let mut page = Page::new("p");
        page.add_widget(Frame::new("early", Point::zero(), Size::new(5, 5)));
        assert!(page.element_by_name("early").unwrap().base().target().is_err());

        page.bind_surface(surface.clone());
        page.add_widget(Frame::new("late", Point::zero(), Size::new(5, 5)));

        for widget in page.widgets() {
            assert!(widget.base().is_bound_to(&surface));
        }
    }

    #[test]
    fn test_add_widget_to_unbound_page_drops_old_binding() {
        let elsewhere = Surface::new(Size::new(20, 20));
        let mut frame = Frame::new("moved", Point::zero(), Size::new(5, 5));
        frame.assign_surface(&elsewhere);

        let mut page = Page::new("p");
        page.add_widget(frame);

        let widget = page.element_by_name("moved").unwrap();
        assert!(!widget.base().is_bound_to(&elsewhere));
        assert!(matches!(widget.base().target(), Err(GuiError::Unbound(_))));
    }

    #[test]
    fn test_long_names_are_found_whole() {
        let page_name = "settings_page_for_frequency_entry_v2_xyz";
        let widget_name = "frequency_entry_confirm_button_long_a";
        let mut page = Page::new(page_name);
        page.add_widget(Button::new(widget_name, Point::zero(), Size::new(40, 20), "OK"));
        page.add_widget(Button::new(
            "frequency_entry_confirm_button_long_b",
            Point::zero(),
            Size::new(40, 20),
            "OK",
        ));

        assert_eq!(page.name(), page_name);
        assert_eq!(page.widget_index(widget_name), Some(0));
        assert_eq!(
            page.widget_index("frequency_entry_confirm_button_long_b"),
            Some(1)
        );
    }

    #[test]
    fn test_hit_test_first_clickable_wins() {
        let mut page = Page::new("p");
        page.add_widget(Frame::new("deco", Point::zero(), Size::new(100, 100)));
        page.add_widget(Button::new("a", Point::new(10, 10), Size::new(50, 50), "A"));
        page.add_widget(Button::new("b", Point::new(10, 10), Size::new(50, 50), "B"));

        assert_eq!(page.hit_test(Point::new(30, 30)), Some(1));
        assert_eq!(page.hit_test(Point::new(5, 5)), None);
        assert_eq!(page.hit_test(Point::new(13, 12)), None);
    }

    #[test]
    fn test_render_paints_in_order_and_propagates_failure() {
        let surface = Surface::new(Size::new(100, 100));
        let mut page = Page::new("p");
        page.bind_surface(surface.clone());
        page.add_widget(Button::new("under", Point::zero(), Size::new(50, 50), ""));
        page.add_widget(Frame::new("over", Point::zero(), Size::new(50, 50)));

        page.render().unwrap();
        assert_eq!(surface.lock().pixel(Point::new(0, 0)), Some(GREEN));
        assert_eq!(surface.lock().pixel(Point::new(10, 10)), Some(BLACK));

        page.add_widget(TextBox::new("bad", Point::zero(), Size::new(20, 20), "Unwrappable"));
        assert!(matches!(page.render(), Err(GuiError::Layout { .. })));
        assert!(matches!(
            page.render_widget("missing"),
            Err(GuiError::UnknownWidget { .. })
        ));
    }

    #[test]
    fn test_dispatch_click_runs_after_click_hook() {
        let (mut page, counters) = counting_page();
        page.bind_surface(Surface::new(Size::new(100, 100)));
        page.initialize().unwrap();

        let mut harness = Harness::default();
        let mut env = harness.env(Duration::from_millis(100));
        page.dispatch_click(3, 0, &mut env).unwrap();

        assert_eq!(counters[2].load(Ordering::SeqCst), 1);
        assert!(!page.button("go").unwrap().is_enabled());
        assert!(page.button("go").unwrap().is_clicked());
        assert!(harness.reverts.is_pending(WidgetKey { page: 3, widget: 0 }));
        assert_eq!(harness.presenter.presents(), 1);

        // the hook disabled the button, so a second press is swallowed
        let mut env = harness.env(Duration::from_millis(100));
        page.dispatch_click(3, 0, &mut env).unwrap();
        assert_eq!(counters[2].load(Ordering::SeqCst), 1);
        assert_eq!(harness.presenter.presents(), 1);
    }

    #[test]
    fn test_rapid_clicks_leave_one_pending_revert() {
        let mut page = Page::new("p");
        page.bind_surface(Surface::new(Size::new(100, 100)));
        page.add_widget(Button::new("b", Point::zero(), Size::new(40, 20), "B"));

        let mut harness = Harness::default();
        {
            let mut env = harness.env(Duration::from_millis(100));
            page.dispatch_click(0, 0, &mut env).unwrap();
            page.dispatch_click(0, 0, &mut env).unwrap();
        }
        assert_eq!(harness.reverts.len(), 1);

        let mut reverts = 0;
        let later = std::time::Instant::now() + Duration::from_secs(1);
        for key in harness.reverts.take_due(later) {
            page.end_flash(key.widget).unwrap();
            reverts += 1;
        }
        assert_eq!(reverts, 1);
        assert!(!page.button("b").unwrap().is_clicked());
    }
}
