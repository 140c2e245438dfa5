//! Scoped borrowing of the shared clipboard.

use tracing::warn;

use crate::errors::AutomationError;
use crate::platforms::Clipboard;

/// Holds the clipboard's prior text and puts it back when released.
///
/// Call [`ClipboardLease::release`] to observe restore failures. A lease
/// that is dropped without being released (early return, panic unwinding)
/// restores on drop and can only log a failure.
///
/// Nothing here locks the clipboard against other writers; concurrent
/// leases on different threads will race.
pub struct ClipboardLease<'a> {
    clipboard: &'a dyn Clipboard,
    saved: Option<String>,
}

impl<'a> ClipboardLease<'a> {
    /// Save the current text.
    pub fn acquire(clipboard: &'a dyn Clipboard) -> Result<Self, AutomationError> {
        let saved = clipboard.read_text()?;
        Ok(Self {
            clipboard,
            saved: Some(saved),
        })
    }

    pub fn saved_text(&self) -> Option<&str> {
        self.saved.as_deref()
    }

    /// Restore the saved text.
    pub fn release(mut self) -> Result<(), AutomationError> {
        match self.saved.take() {
            Some(text) => self.clipboard.write_text(&text),
            None => Ok(()),
        }
    }
}

impl Drop for ClipboardLease<'_> {
    fn drop(&mut self) {
        if let Some(text) = self.saved.take() {
            if let Err(e) = self.clipboard.write_text(&text) {
                warn!("failed to restore clipboard: {e}");
            }
        }
    }
}
