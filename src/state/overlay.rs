//! Singleton full-screen error overlay.
//!
//! The `OverlayController` owns exactly one lazily-created surface. The
//! first `show` asks the display root to build and attach it; later calls
//! update the message in place and make it visible again. Widgets are
//! reached only through the handle the root returned, never by lookup.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use {
    async_channel::Receiver,
    libadwaita::glib::{JoinHandle, MainContext},
    tracing::debug,
};

use crate::config::CaptureSettings;

/// Static content of the overlay surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceContent {
    /// Heading above the message.
    pub heading: String,
    /// Initial message.
    pub message: String,
    /// Label of the reload action.
    pub reload_label: String,
}

/// Callbacks wired to the surface's action controls.
#[derive(Clone)]
pub struct SurfaceActions {
    /// Performs a full application relaunch.
    pub on_reload: Rc<dyn Fn()>,
    /// Hides the surface; absent unless dismissal is allowed.
    pub on_dismiss: Option<Rc<dyn Fn()>>,
}

/// Place the overlay surface gets attached to.
pub trait DisplayRoot {
    /// Handle to an attached surface.
    type Surface: SurfaceHandle;

    /// Builds the surface, attaches it above all other content and shows it.
    fn attach(&self, content: &SurfaceContent, actions: SurfaceActions) -> Self::Surface;
}

/// Mutations available on an attached surface.
pub trait SurfaceHandle {
    /// Replaces the text of the message region.
    fn set_message(&self, message: &str);

    /// Shows or hides the surface.
    fn set_visible(&self, visible: bool);
}

/// Observable state of the overlay surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySurface {
    /// Whether the surface has been built and attached.
    pub mounted: bool,
    /// Message currently displayed.
    pub current_message: String,
    /// Whether the surface is shown.
    pub visible: bool,
}

/// Owner of the single overlay surface.
pub struct OverlayController<R: DisplayRoot> {
    root: R,
    handle: RefCell<Option<R::Surface>>,
    surface: RefCell<OverlaySurface>,
    heading: String,
    reload_label: String,
    allow_dismiss: bool,
    reload: Rc<dyn Fn()>,
    this: Weak<Self>,
}

impl<R: DisplayRoot + 'static> OverlayController<R> {
    /// Creates a controller; nothing is attached until the first `show`.
    ///
    /// # Arguments
    ///
    /// * `root` - Display root the surface will be attached to.
    /// * `settings` - Labels and dismiss policy.
    /// * `reload` - Full relaunch of the application.
    pub fn new(root: R, settings: &CaptureSettings, reload: impl Fn() + 'static) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            root,
            handle: RefCell::new(None),
            surface: RefCell::new(OverlaySurface::default()),
            heading: settings.overlay_heading.clone(),
            reload_label: settings.reload_label.clone(),
            allow_dismiss: settings.allow_dismiss,
            reload: Rc::new(reload),
            this: this.clone(),
        })
    }

    /// Shows the overlay with `message`, creating the surface on first use.
    pub fn show(&self, message: &str) {
        let mut handle = self.handle.borrow_mut();
        match handle.as_ref() {
            Some(surface) => {
                surface.set_message(message);
                surface.set_visible(true);
            }
            None => {
                debug!("Mounting global error overlay");
                let content = SurfaceContent {
                    heading: self.heading.clone(),
                    message: message.to_string(),
                    reload_label: self.reload_label.clone(),
                };
                *handle = Some(self.root.attach(&content, self.actions()));
            }
        }

        let mut surface = self.surface.borrow_mut();
        surface.mounted = true;
        surface.current_message = message.to_string();
        surface.visible = true;
    }

    /// Hides the overlay; a later `show` makes it visible again.
    pub fn dismiss(&self) {
        if let Some(surface) = self.handle.borrow().as_ref() {
            surface.set_visible(false);
            self.surface.borrow_mut().visible = false;
        }
    }

    /// Snapshot of the surface state.
    #[must_use]
    pub fn surface(&self) -> OverlaySurface {
        self.surface.borrow().clone()
    }

    /// Applies every message currently queued on `feed`, in order.
    ///
    /// # Returns
    ///
    /// The number of messages applied.
    pub fn pump(&self, feed: &Receiver<String>) -> usize {
        let mut applied = 0;
        while let Ok(message) = feed.try_recv() {
            self.show(&message);
            applied += 1;
        }
        applied
    }

    /// Applies feed messages as they arrive, on the GLib main context.
    ///
    /// The loop ends when the feed closes or the controller is dropped.
    pub fn attach_feed(self: &Rc<Self>, feed: Receiver<String>) -> JoinHandle<()> {
        let controller = Rc::downgrade(self);
        MainContext::default().spawn_local(async move {
            while let Ok(message) = feed.recv().await {
                match controller.upgrade() {
                    Some(controller) => controller.show(&message),
                    None => break,
                }
            }
        })
    }

    fn actions(&self) -> SurfaceActions {
        let on_dismiss = self.allow_dismiss.then(|| {
            let controller = self.this.clone();
            Rc::new(move || {
                if let Some(controller) = controller.upgrade() {
                    controller.dismiss();
                }
            }) as Rc<dyn Fn()>
        });

        SurfaceActions {
            on_reload: Rc::clone(&self.reload),
            on_dismiss,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    use async_channel::unbounded;

    use crate::{
        config::CaptureSettings,
        state::overlay::{
            DisplayRoot, OverlayController, OverlaySurface, SurfaceActions, SurfaceContent,
            SurfaceHandle,
        },
    };

    /// What the fake display shows.
    #[derive(Default)]
    struct Screen {
        attached: usize,
        heading: String,
        message: String,
        visible: bool,
        actions: Option<SurfaceActions>,
    }

    #[derive(Clone, Default)]
    struct FakeRoot {
        screen: Rc<RefCell<Screen>>,
    }

    struct FakeSurface {
        screen: Rc<RefCell<Screen>>,
    }

    impl DisplayRoot for FakeRoot {
        type Surface = FakeSurface;

        fn attach(&self, content: &SurfaceContent, actions: SurfaceActions) -> FakeSurface {
            let mut screen = self.screen.borrow_mut();
            screen.attached += 1;
            screen.heading = content.heading.clone();
            screen.message = content.message.clone();
            screen.visible = true;
            screen.actions = Some(actions);
            FakeSurface {
                screen: Rc::clone(&self.screen),
            }
        }
    }

    impl SurfaceHandle for FakeSurface {
        fn set_message(&self, message: &str) {
            self.screen.borrow_mut().message = message.to_string();
        }

        fn set_visible(&self, visible: bool) {
            self.screen.borrow_mut().visible = visible;
        }
    }

    fn controller(settings: &CaptureSettings) -> (Rc<OverlayController<FakeRoot>>, FakeRoot, Rc<Cell<usize>>) {
        let root = FakeRoot::default();
        let reloads = Rc::new(Cell::new(0));
        let reload_count = Rc::clone(&reloads);
        let controller = OverlayController::new(root.clone(), settings, move || {
            reload_count.set(reload_count.get() + 1);
        });
        (controller, root, reloads)
    }

    #[test]
    fn test_nothing_attached_before_first_show() {
        let (controller, root, _) = controller(&CaptureSettings::default());
        assert_eq!(controller.surface(), OverlaySurface::default());
        assert_eq!(root.screen.borrow().attached, 0);
    }

    #[test]
    fn test_first_show_mounts_visible_surface() {
        let (controller, root, _) = controller(&CaptureSettings::default());
        controller.show("Post ID cannot be empty.");

        let surface = controller.surface();
        assert!(surface.mounted);
        assert!(surface.visible);
        assert_eq!(surface.current_message, "Post ID cannot be empty.");

        let screen = root.screen.borrow();
        assert_eq!(screen.attached, 1);
        assert_eq!(screen.heading, "Error Detected");
        assert_eq!(screen.message, "Post ID cannot be empty.");
    }

    #[test]
    fn test_second_show_updates_in_place() {
        let (controller, root, _) = controller(&CaptureSettings::default());
        controller.show("first failure");
        controller.show("second failure");

        assert_eq!(root.screen.borrow().attached, 1);
        assert_eq!(root.screen.borrow().message, "second failure");
        assert_eq!(controller.surface().current_message, "second failure");
    }

    #[test]
    fn test_show_after_dismiss_makes_surface_visible() {
        let settings = CaptureSettings {
            allow_dismiss: true,
            ..CaptureSettings::default()
        };
        let (controller, root, _) = controller(&settings);
        controller.show("boom");

        let dismiss = root
            .screen
            .borrow()
            .actions
            .as_ref()
            .and_then(|actions| actions.on_dismiss.clone())
            .unwrap();
        dismiss();
        assert!(!controller.surface().visible);
        assert!(!root.screen.borrow().visible);

        controller.show("boom again");
        assert!(controller.surface().visible);
        assert!(root.screen.borrow().visible);
        assert_eq!(root.screen.borrow().attached, 1);
    }

    #[test]
    fn test_dismiss_not_offered_by_default() {
        let (controller, root, _) = controller(&CaptureSettings::default());
        controller.show("boom");
        assert!(
            root.screen
                .borrow()
                .actions
                .as_ref()
                .is_some_and(|actions| actions.on_dismiss.is_none())
        );
    }

    #[test]
    fn test_dismiss_before_mount_is_noop() {
        let (controller, _, _) = controller(&CaptureSettings::default());
        controller.dismiss();
        assert!(!controller.surface().mounted);
    }

    #[test]
    fn test_reload_action_invokes_reloader() {
        let (controller, root, reloads) = controller(&CaptureSettings::default());
        controller.show("state corrupted");

        let reload = root
            .screen
            .borrow()
            .actions
            .as_ref()
            .map(|actions| Rc::clone(&actions.on_reload))
            .unwrap();
        reload();
        assert_eq!(reloads.get(), 1);
    }

    #[test]
    fn test_pump_applies_feed_in_order() {
        let (controller, root, _) = controller(&CaptureSettings::default());
        let (sender, feed) = unbounded();
        sender.try_send("m1".to_string()).unwrap();
        sender.try_send("m2".to_string()).unwrap();

        assert_eq!(controller.pump(&feed), 2);
        assert_eq!(controller.surface().current_message, "m2");
        assert_eq!(root.screen.borrow().attached, 1);
        assert_eq!(controller.pump(&feed), 0);
    }
}
