use crate::error::AppError;
use std::path::Path;
use std::process::Command;

/// Seam for the OS "open this image in a viewer for printing" action, so
/// the web layer never talks to the shell directly.
pub trait PrintAction: Send + Sync {
    fn open_for_print(&self, path: &Path) -> Result<(), AppError>;
}

/// Opens the file in the platform's default image viewer.
pub struct SystemViewer;

impl SystemViewer {
    fn command(path: &Path) -> Command {
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg("-a").arg("Preview").arg(path);
            cmd
        }
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg("start").arg("").arg(path);
            cmd
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

impl PrintAction for SystemViewer {
    fn open_for_print(&self, path: &Path) -> Result<(), AppError> {
        log::info!("Opening {:?} in the system viewer", path);
        let status = Self::command(path)
            .status()
            .map_err(|e| AppError::Print(format!("failed to launch viewer: {}", e)))?;
        if !status.success() {
            return Err(AppError::Print(format!(
                "viewer exited with status {} for {:?}",
                status, path
            )));
        }
        Ok(())
    }
}
