use std::process::Command;

use order_core::message::{LinkOpener, OpenError};
use tracing::debug;

/// Opens links with the platform's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

fn command_for(url: &str) -> Option<Command> {
    #[cfg(target_os = "windows")]
    {
        let mut command = Command::new("explorer.exe");
        command.arg(url);
        Some(command)
    }

    #[cfg(target_os = "macos")]
    {
        let mut command = Command::new("open");
        command.arg(url);
        Some(command)
    }

    #[cfg(target_os = "linux")]
    {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        Some(command)
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        let _ = url;
        None
    }
}

impl LinkOpener for SystemOpener {
    fn open(
        &self,
        url: &str,
    ) -> Result<(), OpenError> {
        let mut command = command_for(url)
            .ok_or_else(|| OpenError("no link handler on this platform".to_string()))?;
        command
            .spawn()
            .map_err(|e| OpenError(format!("failed to launch {:?}: {e}", command.get_program())))?;
        debug!(%url, "link handed to the system");
        Ok(())
    }
}
