//! Full-window blocking error surface.
//!
//! `OverlayRoot` attaches the surface to the window's `gtk::Overlay`, above
//! every other child, and `ErrorOverlaySurface` is the handle the overlay
//! controller keeps to update it in place.

use libadwaita::{
    gtk::{
        Align::{Center, Fill},
        Box as GtkBox, Button, Justification, Label, Overlay,
        Orientation::{Horizontal, Vertical},
        Widget,
    },
    prelude::{BoxExt, ButtonExt, Cast, WidgetExt},
};

use crate::state::overlay::{DisplayRoot, SurfaceActions, SurfaceContent, SurfaceHandle};

/// Widgets making up the attached error surface.
#[derive(Clone)]
pub struct ErrorOverlaySurface {
    /// The underlying GTK widget (full-window backdrop).
    pub widget: Widget,
    /// Heading label.
    pub heading_label: Label,
    /// Selectable, wrapping error message.
    pub message_label: Label,
    /// Full relaunch button.
    pub reload_button: Button,
    /// Hide button, only present when dismissal is allowed.
    pub dismiss_button: Option<Button>,
}

impl ErrorOverlaySurface {
    /// Builds the surface widgets.
    ///
    /// # Arguments
    ///
    /// * `content` - Heading, initial message and reload label
    /// * `actions` - Callbacks for the reload and dismiss buttons
    ///
    /// # Returns
    ///
    /// A new, unattached `ErrorOverlaySurface`.
    pub fn new(content: &SurfaceContent, actions: SurfaceActions) -> Self {
        let heading_label = Label::builder()
            .label(&content.heading)
            .halign(Center)
            .css_classes(["title-1", "error"])
            .build();

        let message_label = Label::builder()
            .label(&content.message)
            .halign(Center)
            .justify(Justification::Center)
            .wrap(true)
            .selectable(true)
            .max_width_chars(60)
            .css_classes(["monospace"])
            .build();

        let reload_button = Button::builder()
            .label(&content.reload_label)
            .halign(Center)
            .css_classes(["suggested-action", "pill"])
            .build();
        let on_reload = actions.on_reload;
        reload_button.connect_clicked(move |_| on_reload());

        let buttons = GtkBox::builder()
            .orientation(Horizontal)
            .halign(Center)
            .spacing(12)
            .build();
        buttons.append(&reload_button);

        let dismiss_button = actions.on_dismiss.map(|on_dismiss| {
            let button = Button::builder()
                .label("Dismiss")
                .css_classes(["pill"])
                .build();
            button.connect_clicked(move |_| on_dismiss());
            buttons.append(&button);
            button
        });

        let card = GtkBox::builder()
            .orientation(Vertical)
            .halign(Center)
            .valign(Center)
            .spacing(18)
            .margin_top(24)
            .margin_bottom(24)
            .margin_start(24)
            .margin_end(24)
            .css_classes(["card"])
            .build();
        card.append(&heading_label);
        card.append(&message_label);
        card.append(&buttons);

        // The backdrop swallows input so nothing underneath stays interactive.
        let backdrop = GtkBox::builder()
            .orientation(Vertical)
            .halign(Fill)
            .valign(Fill)
            .hexpand(true)
            .vexpand(true)
            .can_target(true)
            .css_classes(["osd"])
            .build();
        backdrop.append(&card);

        Self {
            widget: backdrop.upcast::<Widget>(),
            heading_label,
            message_label,
            reload_button,
            dismiss_button,
        }
    }
}

impl SurfaceHandle for ErrorOverlaySurface {
    fn set_message(&self, message: &str) {
        self.message_label.set_label(message);
    }

    fn set_visible(&self, visible: bool) {
        self.widget.set_visible(visible);
    }
}

/// Display root wrapping the window's top-level `gtk::Overlay`.
#[derive(Clone)]
pub struct OverlayRoot {
    overlay: Overlay,
}

impl OverlayRoot {
    /// Creates a root attaching surfaces to `overlay`.
    pub fn new(overlay: &Overlay) -> Self {
        Self {
            overlay: overlay.clone(),
        }
    }
}

impl DisplayRoot for OverlayRoot {
    type Surface = ErrorOverlaySurface;

    fn attach(&self, content: &SurfaceContent, actions: SurfaceActions) -> ErrorOverlaySurface {
        let surface = ErrorOverlaySurface::new(content, actions);
        self.overlay.add_overlay(&surface.widget);
        surface.widget.set_visible(true);
        surface
    }
}
