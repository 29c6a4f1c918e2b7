//! Post lookup form exercising the three error paths.
//!
//! Validation failures go to the global overlay, transport failures to the
//! inline panel under the form, and "Break This Panel" signals a subtree
//! failure to the enclosing boundary.

use std::sync::Arc;

use {
    libadwaita::{
        gtk::{
            Align::{Center, Start},
            Box as GtkBox, Button, Entry, Label,
            Orientation::{Horizontal, Vertical},
            Widget,
        },
        prelude::{BoxExt, ButtonExt, Cast, EditableExt, WidgetExt},
    },
    serde_json::to_string_pretty,
    tokio::{runtime::Handle, task::JoinError},
};

use crate::{
    error::{domain::TransportError, normalize::NormalizedError, operational::ResultExt},
    intercept::{GlobalInterceptors, events::ErrorEvent},
    posts::{HttpPostSource, LookupOutcome, PostLookup, trigger_syntax_error},
    ui::components::inline_error_panel::InlineErrorPanel,
};

/// Message carried by the "Break This Panel" subtree failure.
pub const BROKEN_PANEL_MESSAGE: &str = "Post panel state is no longer consistent";

/// Form fetching a post by id.
#[derive(Clone)]
pub struct PostLookupForm {
    /// The underlying GTK widget container.
    pub widget: Widget,
    /// Post id input.
    pub entry: Entry,
    /// Starts a lookup.
    pub fetch_button: Button,
    /// Reports a parser failure to the overlay.
    pub syntax_error_button: Button,
    /// Signals a subtree failure to the enclosing boundary.
    pub break_button: Button,
    /// Pretty-printed post.
    pub result_label: Label,
    /// Inline panel for transport failures.
    pub error_panel: InlineErrorPanel,
}

impl PostLookupForm {
    /// Creates the form.
    ///
    /// # Arguments
    ///
    /// * `interceptors` - Registry used for reporting and supervised tasks
    /// * `runtime` - Tokio runtime the network requests run on
    /// * `base_url` - Root of the posts API
    ///
    /// # Returns
    ///
    /// A new `PostLookupForm` instance.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the HTTP client cannot be built.
    pub fn new(
        interceptors: &'static GlobalInterceptors,
        runtime: Handle,
        base_url: &str,
    ) -> Result<Self, TransportError> {
        let lookup = Arc::new(PostLookup::new(
            HttpPostSource::new(base_url)?,
            interceptors.reporter().clone(),
        ));

        let entry = Entry::builder()
            .placeholder_text("Enter Post ID (1-100)")
            .hexpand(true)
            .build();

        let fetch_button = Button::builder()
            .label("Fetch Post")
            .css_classes(["suggested-action"])
            .build();

        let syntax_error_button = Button::builder()
            .label("Trigger Syntax Error")
            .build();

        let break_button = Button::builder()
            .label("Break This Panel")
            .css_classes(["destructive-action"])
            .build();

        let result_label = Label::builder()
            .halign(Start)
            .xalign(0.0)
            .selectable(true)
            .wrap(true)
            .css_classes(["monospace"])
            .visible(false)
            .build();

        let error_panel = InlineErrorPanel::new();

        let input_row = GtkBox::builder().orientation(Horizontal).spacing(6).build();
        input_row.append(&entry);
        input_row.append(&fetch_button);

        let actions_row = GtkBox::builder()
            .orientation(Horizontal)
            .halign(Center)
            .spacing(6)
            .build();
        actions_row.append(&syntax_error_button);
        actions_row.append(&break_button);

        let container = GtkBox::builder()
            .orientation(Vertical)
            .spacing(12)
            .margin_top(24)
            .margin_bottom(24)
            .margin_start(24)
            .margin_end(24)
            .build();
        container.append(&input_row);
        container.append(&actions_row);
        container.append(&error_panel.widget);
        container.append(&result_label);

        let form = Self {
            widget: container.upcast::<Widget>(),
            entry,
            fetch_button,
            syntax_error_button,
            break_button,
            result_label,
            error_panel,
        };

        form.connect_fetch(interceptors, runtime, lookup);

        form.syntax_error_button
            .connect_clicked(move |_| trigger_syntax_error(interceptors.reporter()));

        form.break_button.connect_clicked(move |_| {
            interceptors.dispatch_error(ErrorEvent::subtree_failure(
                NormalizedError::from_message(BROKEN_PANEL_MESSAGE),
            ));
        });

        Ok(form)
    }

    fn connect_fetch(
        &self,
        interceptors: &'static GlobalInterceptors,
        runtime: Handle,
        lookup: Arc<PostLookup<HttpPostSource>>,
    ) {
        let form = self.clone();
        self.fetch_button.connect_clicked(move |button| {
            let input = form.entry.text().to_string();
            form.error_panel.set_error(None);
            form.result_label.set_visible(false);
            button.set_sensitive(false);
            button.set_label("Loading...");

            let lookup = Arc::clone(&lookup);
            let request = runtime.spawn(async move { lookup.lookup(&input).await });

            let form = form.clone();
            interceptors.spawn_local_watched(async move {
                let outcome = request.await;
                form.fetch_button.set_sensitive(true);
                form.fetch_button.set_label("Fetch Post");

                match outcome? {
                    LookupOutcome::Found(post) => {
                        if let Some(json) =
                            to_string_pretty(&post).or_report(interceptors.reporter(), "Failed to render post")
                        {
                            form.result_label.set_label(&json);
                            form.result_label.set_visible(true);
                        }
                    }
                    LookupOutcome::Rejected(_) => {}
                    LookupOutcome::Failed(error) => form.error_panel.set_error(Some(error)),
                }

                Ok::<(), JoinError>(())
            });
        });
    }
}
