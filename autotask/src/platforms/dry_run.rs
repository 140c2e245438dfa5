use super::{AutomationBackend, Clipboard};
use crate::errors::AutomationError;
use crate::result::Point;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

/// Logs every primitive instead of performing it.
///
/// Image lookups never match, so an image click under dry-run polls until
/// its deadline. Waits between repeated clicks and presses are still slept
/// so chain timing stays realistic.
#[derive(Debug, Default)]
pub struct DryRunBackend {
    calls: AtomicUsize,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of primitives invoked so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

async fn pause_between(repeats: u32, interval: Duration) {
    if repeats > 1 {
        tokio::time::sleep(interval * (repeats - 1)).await;
    }
}

#[async_trait::async_trait]
impl AutomationBackend for DryRunBackend {
    async fn click(
        &self,
        at: Point,
        clicks: u32,
        interval: Duration,
    ) -> Result<(), AutomationError> {
        self.record();
        info!(x = at.x, y = at.y, clicks, ?interval, "dry-run click");
        pause_between(clicks, interval).await;
        Ok(())
    }

    async fn locate_on_screen(
        &self,
        image: &Path,
        confidence: f64,
    ) -> Result<Option<Point>, AutomationError> {
        self.record();
        info!(image = %image.display(), confidence, "dry-run locate (no match)");
        Ok(None)
    }

    async fn press(
        &self,
        key: &str,
        presses: u32,
        interval: Duration,
    ) -> Result<(), AutomationError> {
        self.record();
        info!(key, presses, ?interval, "dry-run press");
        pause_between(presses, interval).await;
        Ok(())
    }

    async fn hotkey(&self, keys: &[String]) -> Result<(), AutomationError> {
        self.record();
        info!(keys = %keys.join("+"), "dry-run hotkey");
        Ok(())
    }

    async fn launch(&self, path: &Path) -> Result<(), AutomationError> {
        self.record();
        info!(path = %path.display(), "dry-run launch");
        Ok(())
    }
}

/// An in-process clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Mutex<String>,
}

impl MemoryClipboard {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(text.into()),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&self) -> Result<String, AutomationError> {
        self.text
            .lock()
            .map(|text| text.clone())
            .map_err(|e| AutomationError::Clipboard(format!("clipboard lock poisoned: {e}")))
    }

    fn write_text(&self, text: &str) -> Result<(), AutomationError> {
        let mut guard = self
            .text
            .lock()
            .map_err(|e| AutomationError::Clipboard(format!("clipboard lock poisoned: {e}")))?;
        *guard = text.to_string();
        Ok(())
    }
}
