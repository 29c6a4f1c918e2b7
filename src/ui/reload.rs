//! Full application relaunch, the overlay's recovery path.

use std::{
    env::{args_os, current_exe},
    process::Command,
};

use tracing::info;

use crate::error::domain::UiError;

/// Builds the command starting a fresh instance with the same arguments.
///
/// # Errors
///
/// Returns `UiError::RelaunchError` if the executable path is unavailable.
pub fn relaunch_command() -> Result<Command, UiError> {
    let mut command = Command::new(current_exe()?);
    command.args(args_os().skip(1));
    Ok(command)
}

/// Starts a fresh instance of the application.
///
/// The caller is expected to quit the current instance afterwards.
///
/// # Errors
///
/// Returns `UiError::RelaunchError` if the new process cannot be spawned.
pub fn relaunch_application() -> Result<(), UiError> {
    let child = relaunch_command()?.spawn()?;
    info!(pid = child.id(), "Relaunched application");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::env::current_exe;

    use crate::ui::reload::relaunch_command;

    #[test]
    fn test_relaunch_command_targets_current_executable() {
        let command = relaunch_command().unwrap();
        assert_eq!(command.get_program(), current_exe().unwrap().as_os_str());
    }
}
