//! 用系统默认程序打开文件（fire-and-forget，不等待子进程退出）。

use std::path::Path;
use std::process::Command;

use crate::error::AppError;

/// 用系统默认程序打开 `path`。
pub fn open_path(path: &Path) -> Result<(), AppError> {
    if !path.exists() {
        return Err(AppError::Host(format!("file not found: {}", path.display())));
    }

    let mut command = open_command(path);
    command
        .spawn()
        .map_err(|e| AppError::Host(format!("failed to open {}: {}", path.display(), e)))?;

    log::info!("📂 已用默认程序打开 {}", path.display());
    Ok(())
}

#[cfg(target_os = "windows")]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("explorer");
    command.arg(path);
    command
}

#[cfg(target_os = "macos")]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
