//! Supervision of asynchronous work whose failures nobody awaits.
//!
//! A future spawned through these helpers that resolves to `Err`, or whose
//! task panics, is reported as an unhandled rejection.

use std::{fmt::Display, future::Future};

use {
    libadwaita::glib::{JoinHandle as GlibJoinHandle, MainContext},
    tokio::{runtime::Handle, task::JoinHandle},
    tracing::debug,
};

use crate::error::{normalize::ErrorNormalizer, operational::ErrorReporter};

/// Formats the overlay message for an unhandled asynchronous failure.
pub fn unhandled_rejection(reason: impl Display) -> String {
    format!("Unhandled Promise Rejection: {reason}")
}

/// Spawns `future` on the tokio runtime and reports its failure.
///
/// # Arguments
///
/// * `handle` - Runtime to spawn on.
/// * `reporter` - Where failures are forwarded.
/// * `future` - The supervised work.
///
/// # Returns
///
/// A handle to the supervising task, completing after the work finished
/// and any failure was reported.
pub fn spawn_watched<F, E>(handle: &Handle, reporter: ErrorReporter, future: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let task = handle.spawn(future);
    handle.spawn(async move {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => reporter.report(unhandled_rejection(error)),
            Err(join_error) if join_error.is_panic() => {
                let payload = join_error.into_panic();
                let reason = ErrorNormalizer::from_panic_payload(payload.as_ref()).message;
                reporter.report(unhandled_rejection(reason));
            }
            Err(_) => debug!("Watched task was cancelled"),
        }
    })
}

/// Spawns `future` on the GLib main context and reports its failure.
///
/// Used for UI-thread work that touches widgets.
pub fn spawn_local_watched<F, E>(reporter: ErrorReporter, future: F) -> GlibJoinHandle<()>
where
    F: Future<Output = Result<(), E>> + 'static,
    E: Display + 'static,
{
    MainContext::default().spawn_local(async move {
        if let Err(error) = future.await {
            reporter.report(unhandled_rejection(error));
        }
    })
}

#[cfg(test)]
mod tests {
    use std::io::{Error, ErrorKind::ConnectionReset};

    use tokio::runtime::Handle;

    use crate::{
        error::operational::ErrorReporter,
        intercept::rejection::{spawn_watched, unhandled_rejection},
    };

    #[test]
    fn test_unhandled_rejection_format() {
        assert_eq!(
            unhandled_rejection("timeout"),
            "Unhandled Promise Rejection: timeout"
        );
    }

    #[tokio::test]
    async fn test_successful_task_reports_nothing() {
        let (reporter, feed) = ErrorReporter::channel();
        spawn_watched(&Handle::current(), reporter, async { Ok::<(), Error>(()) })
            .await
            .unwrap();
        assert!(feed.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_task_is_reported() {
        let (reporter, feed) = ErrorReporter::channel();
        spawn_watched(&Handle::current(), reporter, async {
            Err::<(), _>(Error::new(ConnectionReset, "peer went away"))
        })
        .await
        .unwrap();
        assert_eq!(
            feed.try_recv().unwrap(),
            "Unhandled Promise Rejection: peer went away"
        );
    }

    #[tokio::test]
    async fn test_panicked_task_is_reported() {
        let (reporter, feed) = ErrorReporter::channel();
        spawn_watched(&Handle::current(), reporter, async {
            if true {
                panic!("task exploded");
            }
            Ok::<(), Error>(())
        })
        .await
        .unwrap();
        assert_eq!(
            feed.try_recv().unwrap(),
            "Unhandled Promise Rejection: task exploded"
        );
    }
}
