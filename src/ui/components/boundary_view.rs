//! Widget rendering a `RecoverableBoundary`.
//!
//! While the boundary is idle the view shows the subtree built by its
//! factory; while errored it shows a fallback with a retry button. Every
//! state transition re-renders the view on the GLib main context, and a
//! retry builds the subtree again from the factory.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use {
    anyhow::Result as AnyhowResult,
    libadwaita::{
        glib::MainContext,
        gtk::{
            Align::Center,
            Box as GtkBox, Button, Label,
            Orientation::Vertical,
            Widget,
        },
        prelude::{BoxExt, ButtonExt, Cast, ObjectExt, WidgetExt},
    },
    tracing::debug,
};

use crate::{intercept::GlobalInterceptors, state::boundary::RecoverableBoundary};

/// Builds the guarded subtree; called again after every retry.
pub type SubtreeFactory = Rc<dyn Fn() -> AnyhowResult<Widget>>;

/// Container showing either the guarded subtree or the boundary fallback.
#[derive(Clone)]
pub struct BoundaryView {
    /// The underlying GTK widget container.
    pub widget: Widget,
    container: GtkBox,
    boundary: Arc<RecoverableBoundary>,
    factory: SubtreeFactory,
}

impl BoundaryView {
    /// Creates the view, mounts its boundary and renders the subtree.
    ///
    /// The boundary stays mounted until the container is destroyed.
    ///
    /// # Arguments
    ///
    /// * `interceptors` - Registry the boundary claims subtree failures from
    /// * `factory` - Builder of the guarded subtree
    ///
    /// # Returns
    ///
    /// A new `BoundaryView` instance.
    pub fn new(
        interceptors: &GlobalInterceptors,
        factory: impl Fn() -> AnyhowResult<Widget> + 'static,
    ) -> Self {
        let container = GtkBox::builder()
            .orientation(Vertical)
            .hexpand(true)
            .vexpand(true)
            .build();

        let view = Self {
            widget: container.clone().upcast::<Widget>(),
            container,
            boundary: RecoverableBoundary::new(),
            factory: Rc::new(factory),
        };

        let mount = RefCell::new(Some(view.boundary.mount(interceptors)));
        let transitions = view.boundary.transitions();
        let weak_container = view.container.downgrade();
        let boundary = Arc::clone(&view.boundary);
        let factory = Rc::clone(&view.factory);
        let renderer = MainContext::default().spawn_local(async move {
            while transitions.recv().await.is_ok() {
                // Only the latest state matters.
                while transitions.try_recv().is_ok() {}
                let Some(container) = weak_container.upgrade() else {
                    break;
                };
                render(&container, &boundary, &factory);
            }
        });

        view.container.connect_destroy(move |_| {
            debug!("Unmounting component boundary");
            mount.borrow_mut().take();
            renderer.abort();
        });

        view.render();
        view
    }

    /// The boundary this view renders.
    pub fn boundary(&self) -> &Arc<RecoverableBoundary> {
        &self.boundary
    }

    /// Re-renders from the current boundary state.
    pub fn render(&self) {
        render(&self.container, &self.boundary, &self.factory);
    }
}

fn render(container: &GtkBox, boundary: &Arc<RecoverableBoundary>, factory: &SubtreeFactory) {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }

    match boundary.build_guarded(|| factory()) {
        Some(subtree) => container.append(&subtree),
        None => container.append(&fallback(boundary)),
    }
}

/// Fallback panel with the captured message and a retry button.
fn fallback(boundary: &Arc<RecoverableBoundary>) -> GtkBox {
    let state = boundary.state();
    let message = state
        .error()
        .map(|error| error.message.clone())
        .unwrap_or_default();

    let heading = Label::builder()
        .label("Got an Error!")
        .halign(Center)
        .css_classes(["title-2", "error"])
        .build();

    let message_label = Label::builder()
        .label(&message)
        .halign(Center)
        .wrap(true)
        .selectable(true)
        .css_classes(["monospace"])
        .build();

    let retry_button = Button::builder()
        .label("Try Again")
        .halign(Center)
        .css_classes(["suggested-action"])
        .build();
    let retry_boundary = Arc::clone(boundary);
    retry_button.connect_clicked(move |_| {
        retry_boundary.retry();
    });

    let panel = GtkBox::builder()
        .orientation(Vertical)
        .halign(Center)
        .valign(Center)
        .spacing(12)
        .margin_top(24)
        .margin_bottom(24)
        .css_classes(["card"])
        .build();
    panel.append(&heading);
    panel.append(&message_label);
    panel.append(&retry_button);
    panel
}
