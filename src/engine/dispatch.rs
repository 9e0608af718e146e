//! Click dispatch plumbing between the event loop and widget callbacks.
//!
//! A click handler runs while the engine holds its page registry lock, so it
//! cannot call back into the [`Engine`](super::Engine). Instead it gets a
//! [`ClickContext`]: mutable access to the other widgets on its page, an
//! immediate display flip, and a queue of requests (show another page, shut
//! down) that the engine applies as soon as the handler returns.

use std::time::{Duration, Instant};

use crate::engine::deferred::DeferredQueue;
use crate::error::Result;
use crate::ui::components::{Button, Frame, TextBox};
use crate::ui::widget::Widget;

/// Stable address of a widget: page index in the registry and widget index
/// within the page. Pages and widgets are never removed, so these never move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetKey {
    pub page: usize,
    pub widget: usize,
}

/// Work a click handler asks the engine to do once it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    Show(String),
    Shutdown,
    LockUpdate(bool),
}

/// Something that can flip the live surface to the display right now.
pub(crate) trait Presenter {
    fn present_now(&self) -> Result<()>;
}

/// Engine state lent to one dispatch.
pub(crate) struct DispatchEnv<'a> {
    pub requests: &'a mut Vec<Request>,
    pub reverts: &'a mut DeferredQueue<WidgetKey>,
    pub presenter: &'a dyn Presenter,
    pub flash: Duration,
}

/// The widgets on either side of the one being clicked.
pub(crate) struct Siblings<'a> {
    pub before: &'a mut [Widget],
    pub after: &'a mut [Widget],
}

impl<'a> Siblings<'a> {
    fn find(&mut self, name: &str) -> Option<&mut Widget> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find(|w| w.name() == name)
    }
}

/// Handle given to click callbacks.
pub struct ClickContext<'a> {
    key: WidgetKey,
    page: &'a str,
    widget: String,
    siblings: Siblings<'a>,
    requests: &'a mut Vec<Request>,
    reverts: &'a mut DeferredQueue<WidgetKey>,
    presenter: &'a dyn Presenter,
    flash: Duration,
}

impl<'a> ClickContext<'a> {
    pub(crate) fn new(
        key: WidgetKey,
        page: &'a str,
        widget: &str,
        siblings: Siblings<'a>,
        env: &'a mut DispatchEnv<'_>,
    ) -> Self {
        Self {
            key,
            page,
            widget: widget.to_string(),
            siblings,
            requests: &mut *env.requests,
            reverts: &mut *env.reverts,
            presenter: env.presenter,
            flash: env.flash,
        }
    }

    /// Name of the page the clicked widget lives on.
    pub fn page_name(&self) -> &str {
        self.page
    }

    /// Name of the clicked widget.
    pub fn widget_name(&self) -> &str {
        &self.widget
    }

    /// Another widget on the same page. The clicked widget itself is not
    /// reachable here; it already has `&mut self`.
    pub fn widget_mut(&mut self, name: &str) -> Option<&mut Widget> {
        self.siblings.find(name)
    }

    pub fn button_mut(&mut self, name: &str) -> Option<&mut Button> {
        self.widget_mut(name).and_then(Widget::as_button_mut)
    }

    pub fn text_box_mut(&mut self, name: &str) -> Option<&mut TextBox> {
        self.widget_mut(name).and_then(Widget::as_text_box_mut)
    }

    pub fn frame_mut(&mut self, name: &str) -> Option<&mut Frame> {
        self.widget_mut(name).and_then(Widget::as_frame_mut)
    }

    /// Show `page` once this handler returns.
    pub fn show(&mut self, page: &str) {
        self.requests.push(Request::Show(page.to_string()));
    }

    /// Stop the engine once this handler returns.
    pub fn shutdown(&mut self) {
        self.requests.push(Request::Shutdown);
    }

    pub fn set_lock_update(&mut self, locked: bool) {
        self.requests.push(Request::LockUpdate(locked));
    }

    /// Flip the live surface to the display immediately, ignoring the update
    /// lock.
    pub fn present_now(&self) -> Result<()> {
        self.presenter.present_now()
    }

    /// Arrange for the clicked widget's flash to end after the flash delay,
    /// pushing back any revert already pending for it.
    pub(crate) fn schedule_revert(&mut self) {
        self.reverts.schedule(self.key, Instant::now() + self.flash);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use super::*;
    use embedded_graphics::prelude::*;

    #[test]
    fn test_context_reaches_siblings_and_queues_requests() {
        let mut widgets: Vec<Widget> = vec![
            Button::new("first", Point::zero(), Size::new(10, 10), "A").into(),
            Button::new("clicked", Point::zero(), Size::new(10, 10), "B").into(),
            TextBox::new("label", Point::zero(), Size::new(10, 10), "C").into(),
        ];
        let mut harness = Harness::default();
        {
            let mut env = harness.env(Duration::from_millis(50));
            let (before, rest) = widgets.split_at_mut(1);
            let (_, after) = rest.split_at_mut(1);
            let mut ctx = ClickContext::new(
                WidgetKey { page: 2, widget: 1 },
                "menu",
                "clicked",
                Siblings { before, after },
                &mut env,
            );

            assert_eq!(ctx.page_name(), "menu");
            assert_eq!(ctx.widget_name(), "clicked");
            assert!(ctx.button_mut("first").is_some());
            assert!(ctx.text_box_mut("label").is_some());
            assert!(ctx.button_mut("label").is_none());
            assert!(ctx.widget_mut("clicked").is_none());

            ctx.show("settings");
            ctx.set_lock_update(true);
            ctx.shutdown();
            ctx.schedule_revert();
            ctx.present_now().unwrap();
        }

        assert_eq!(
            harness.requests,
            vec![
                Request::Show("settings".into()),
                Request::LockUpdate(true),
                Request::Shutdown
            ]
        );
        assert!(harness.reverts.is_pending(WidgetKey { page: 2, widget: 1 }));
        assert_eq!(harness.presenter.presents(), 1);
    }
}
