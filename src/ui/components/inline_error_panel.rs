//! Inline, dismissable error panel for recoverable failures.

use std::{cell::RefCell, rc::Rc};

use libadwaita::{
    gtk::{
        Align::{End, Start},
        Box as GtkBox, Button, Label,
        Orientation::Vertical,
        Widget,
    },
    prelude::{BoxExt, ButtonExt, Cast, WidgetExt},
};

use crate::{error::normalize::NormalizedError, state::inline_panel::InlinePanelState};

/// Panel showing one transient error next to the action that caused it.
///
/// Hidden while idle. Never touches the global overlay.
#[derive(Clone)]
pub struct InlineErrorPanel {
    /// The underlying GTK widget container.
    pub widget: Widget,
    /// "API Error" title.
    pub title_label: Label,
    /// Error message.
    pub message_label: Label,
    /// Dismiss button.
    pub dismiss_button: Button,
    state: Rc<RefCell<InlinePanelState>>,
}

impl InlineErrorPanel {
    /// Creates an idle, hidden panel.
    pub fn new() -> Self {
        let title_label = Label::builder()
            .label("API Error")
            .halign(Start)
            .css_classes(["heading", "error"])
            .build();

        let message_label = Label::builder()
            .halign(Start)
            .xalign(0.0)
            .wrap(true)
            .build();

        let dismiss_button = Button::builder()
            .label("Dismiss")
            .halign(End)
            .css_classes(["flat"])
            .build();

        let container = GtkBox::builder()
            .orientation(Vertical)
            .spacing(6)
            .css_classes(["card"])
            .visible(false)
            .build();
        container.append(&title_label);
        container.append(&message_label);
        container.append(&dismiss_button);

        let panel = Self {
            widget: container.upcast::<Widget>(),
            title_label,
            message_label,
            dismiss_button,
            state: Rc::new(RefCell::new(InlinePanelState::new())),
        };

        let on_dismiss = panel.clone();
        panel.dismiss_button.connect_clicked(move |_| on_dismiss.dismiss());

        panel
    }

    /// Shows `error`, or hides the panel with `None`.
    pub fn set_error(&self, error: Option<NormalizedError>) {
        self.state.borrow_mut().set_error(error);
        self.sync();
    }

    /// Hides the panel.
    pub fn dismiss(&self) {
        self.state.borrow_mut().dismiss();
        self.sync();
    }

    /// Whether an error is shown.
    pub fn is_showing(&self) -> bool {
        self.state.borrow().is_showing()
    }

    fn sync(&self) {
        let state = self.state.borrow();
        match state.display_message() {
            Some(message) => {
                self.message_label.set_label(message);
                self.widget.set_visible(true);
            }
            None => self.widget.set_visible(false),
        }
    }
}

impl Default for InlineErrorPanel {
    fn default() -> Self {
        Self::new()
    }
}
