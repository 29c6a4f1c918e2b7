//! Main application window.
//!
//! This module implements the `FaultveilApplication`, which builds the
//! window, attaches the global error overlay to it and wraps the demo form
//! in a recoverable boundary.

use std::{cell::RefCell, rc::Rc};

use {
    libadwaita::{
        Application, ApplicationWindow, HeaderBar,
        gio::ApplicationFlags,
        glib::ExitCode,
        gtk::{Box as GtkBox, Label, Orientation::Vertical, Overlay},
        prelude::{
            AdwApplicationWindowExt, ApplicationExt, ApplicationExtManual, BoxExt, GtkWindowExt,
            ObjectExt,
        },
    },
    tokio::runtime::Handle,
    tracing::{error, info},
};

use crate::{
    config::CaptureSettings,
    error::{
        domain::UiError,
        operational::{ResultExt, overlay_feed},
    },
    intercept::GlobalInterceptors,
    state::overlay::OverlayController,
    ui::{
        components::{BoundaryView, OverlayRoot, PostLookupForm},
        reload::relaunch_application,
    },
};

/// Overlay controller of the main window, once built.
type OverlaySlot = Rc<RefCell<Option<Rc<OverlayController<OverlayRoot>>>>>;

/// Main application class with window management.
pub struct FaultveilApplication {
    /// The main application instance.
    pub app: Application,
    /// Installed process-wide interceptors.
    pub interceptors: &'static GlobalInterceptors,
    /// Capture settings loaded at startup.
    pub settings: CaptureSettings,
    /// Tokio runtime for network work.
    pub runtime: Handle,
    overlay: OverlaySlot,
}

impl FaultveilApplication {
    /// Creates the application.
    ///
    /// # Arguments
    ///
    /// * `interceptors` - Installed process-wide interceptors
    /// * `settings` - Capture settings
    ///
    /// # Returns
    ///
    /// A new `FaultveilApplication`.
    ///
    /// # Errors
    ///
    /// Returns `UiError::InitializationError` when not called from within a
    /// tokio runtime.
    pub fn new(
        interceptors: &'static GlobalInterceptors,
        settings: CaptureSettings,
    ) -> Result<Self, UiError> {
        let runtime = Handle::try_current()
            .map_err(|e| UiError::InitializationError(format!("No tokio runtime: {e}")))?;

        let app = Application::builder()
            .application_id("com.example.faultveil")
            // A relaunched instance must not hand off to the one quitting.
            .flags(ApplicationFlags::NON_UNIQUE)
            .build();

        Ok(Self {
            app,
            interceptors,
            settings,
            runtime,
            overlay: Rc::new(RefCell::new(None)),
        })
    }

    /// Runs the application until its window closes.
    pub fn run(&self) -> ExitCode {
        self.app.connect_activate({
            let interceptors = self.interceptors;
            let settings = self.settings.clone();
            let runtime = self.runtime.clone();
            let overlay = Rc::clone(&self.overlay);

            move |app| {
                build_ui(app, interceptors, &settings, &runtime, &overlay);
            }
        });

        self.app.run()
    }
}

/// Builds the main window.
fn build_ui(
    app: &Application,
    interceptors: &'static GlobalInterceptors,
    settings: &CaptureSettings,
    runtime: &Handle,
    overlay_slot: &OverlaySlot,
) {
    let window = ApplicationWindow::builder()
        .application(app)
        .title("Faultveil")
        .default_width(720)
        .default_height(560)
        .build();

    let main_box = GtkBox::builder().orientation(Vertical).build();
    main_box.append(&HeaderBar::builder().build());

    let description = Label::builder()
        .label("Validation errors block the app, request errors stay in the form.")
        .css_classes(["dim-label"])
        .wrap(true)
        .margin_top(12)
        .build();
    main_box.append(&description);

    let boundary_view = BoundaryView::new(interceptors, {
        let runtime = runtime.clone();
        let base_url = settings.posts_base_url.clone();
        move || {
            let form = PostLookupForm::new(interceptors, runtime.clone(), &base_url)
                .add_contextf(format_args!("Failed to build post lookup form for {base_url}"))?;
            Ok(form.widget)
        }
    });
    main_box.append(&boundary_view.widget);

    // The overlay root is the outermost widget so the error surface covers
    // everything, header bar included.
    let root = Overlay::builder().child(&main_box).build();

    let weak_app = app.downgrade();
    let controller = OverlayController::new(OverlayRoot::new(&root), settings, move || {
        if let Err(e) = relaunch_application() {
            error!("Failed to relaunch application: {e}");
            return;
        }
        if let Some(app) = weak_app.upgrade() {
            app.quit();
        }
    });
    controller.attach_feed(overlay_feed());
    *overlay_slot.borrow_mut() = Some(controller);

    window.set_content(Some(&root));
    window.present();
    info!("Main window presented");
}
