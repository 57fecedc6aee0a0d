//! Desktop side effects
//!
//! Clipboard, browser and user dialogs, invoked by the core as opaque
//! synchronous calls.

use crate::utils::browser;
use log::{error, info};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("Could not access the clipboard: {0}")]
    Clipboard(String),

    #[error("Could not open the browser: {0}")]
    Browser(String),
}

/// Side-effect collaborators of the tray
pub trait Desktop: Send + Sync {
    /// Put `text` on the system clipboard
    fn copy_to_clipboard(&self, text: &str) -> Result<(), DesktopError>;

    /// Open `url` in the default browser
    fn open_url(&self, url: &str) -> Result<(), DesktopError>;

    /// Tell the user something went wrong
    fn show_error(&self, title: &str, message: &str);

    /// Tell the user something they need to act on
    fn show_info(&self, title: &str, message: &str);
}

/// The real desktop: `arboard` clipboard, platform browser opener, and
/// dialogs written to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDesktop;

impl SystemDesktop {
    pub fn new() -> Self {
        Self
    }
}

impl Desktop for SystemDesktop {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), DesktopError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| DesktopError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| DesktopError::Clipboard(e.to_string()))
    }

    fn open_url(&self, url: &str) -> Result<(), DesktopError> {
        info!("Opening {} in browser", url);
        browser::open_url(url).map_err(|e| DesktopError::Browser(e.to_string()))
    }

    fn show_error(&self, title: &str, message: &str) {
        error!("{}: {}", title, message);
        eprintln!("\n[!] {}\n    {}\n", title, message);
    }

    fn show_info(&self, title: &str, message: &str) {
        info!("{}: {}", title, message);
        eprintln!("\n[i] {}\n    {}\n", title, message);
    }
}
