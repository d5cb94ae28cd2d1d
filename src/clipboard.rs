use anyhow::{Context, Result};
use arboard::Clipboard;
#[cfg(target_os = "linux")]
use arboard::SetExtLinux;
use tracing::{debug, warn};

/// Hidden argument that turns a child process into the clipboard owner.
pub const DAEMON_FLAG: &str = "__repostitch_clipboard_daemon";

/// On X11/Wayland the clipboard content dies with the owning process, so a
/// detached copy of ourselves keeps serving it after the main process exits.
#[cfg(target_os = "linux")]
fn serve_clipboard_forever() -> Result<()> {
    let text = std::io::read_to_string(std::io::stdin())?;
    let mut clipboard = Clipboard::new()?;
    // Blocks until another application takes the clipboard over.
    clipboard.set().wait().text(text)?;
    Ok(())
}

/// Runs the clipboard daemon when [`DAEMON_FLAG`] is on the command line.
/// Returns `Ok(true)` if it did, in which case the caller should exit.
pub fn check_and_run_daemon_if_requested() -> Result<bool> {
    if !std::env::args().any(|a| a == DAEMON_FLAG) {
        return Ok(false);
    }
    #[cfg(target_os = "linux")]
    {
        serve_clipboard_forever()?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        warn!("{} is only meaningful on Linux; ignoring", DAEMON_FLAG);
    }
    Ok(true)
}

pub fn copy_text_to_clipboard(text: &str) -> Result<()> {
    #[cfg(not(target_os = "linux"))]
    {
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text.to_string())?;
    }

    #[cfg(target_os = "linux")]
    {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let mut child = Command::new(std::env::current_exe()?)
            .arg(DAEMON_FLAG)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .current_dir("/")
            .spawn()
            .context("failed to spawn clipboard daemon")?;

        let mut stdin = child
            .stdin
            .take()
            .context("failed to get stdin for clipboard daemon")?;
        stdin.write_all(text.as_bytes())?;
        stdin.flush()?;
    }
    debug!("copied {} bytes to the clipboard", text.len());
    Ok(())
}

/// Current clipboard text, used for pasting hierarchy text into a selection.
pub fn read_text_from_clipboard() -> Result<String> {
    let mut clipboard = Clipboard::new().context("clipboard unavailable")?;
    let text = clipboard
        .get_text()
        .context("clipboard does not hold text")?;
    if text.trim().is_empty() {
        warn!("clipboard text is empty");
    }
    Ok(text)
}
