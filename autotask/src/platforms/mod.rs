use crate::errors::AutomationError;
use crate::result::Point;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// The automation primitives nodes are built on.
///
/// Implementations perform the effect synchronously from the caller's
/// point of view; a node awaits each call before measuring its elapsed time.
#[async_trait::async_trait]
pub trait AutomationBackend: Send + Sync {
    /// Click `clicks` times at `at`, pausing `interval` between clicks
    async fn click(&self, at: Point, clicks: u32, interval: Duration)
        -> Result<(), AutomationError>;

    /// Center of the best on-screen match for the image, if any scores at
    /// least `confidence` (0..=1)
    async fn locate_on_screen(
        &self,
        image: &Path,
        confidence: f64,
    ) -> Result<Option<Point>, AutomationError>;

    /// Press and release a single key `presses` times
    async fn press(&self, key: &str, presses: u32, interval: Duration)
        -> Result<(), AutomationError>;

    /// Hold each key in order, then release them in reverse
    async fn hotkey(&self, keys: &[String]) -> Result<(), AutomationError>;

    /// Start the program or document at `path` without waiting for it
    async fn launch(&self, path: &Path) -> Result<(), AutomationError>;
}

/// Process-wide text clipboard.
pub trait Clipboard: Send + Sync {
    fn read_text(&self) -> Result<String, AutomationError>;

    fn write_text(&self, text: &str) -> Result<(), AutomationError>;
}

pub mod dry_run;
#[cfg(feature = "desktop")]
pub mod desktop;

pub use dry_run::{DryRunBackend, MemoryClipboard};
#[cfg(feature = "desktop")]
pub use desktop::{DesktopBackend, ImageMatcher, SystemClipboard};

/// Create the primitives for the current build.
///
/// With the `desktop` feature this drives the real mouse, keyboard and
/// clipboard unless `dry_run` is set; without it, only the dry-run
/// implementations exist.
pub fn create_backend(
    dry_run: bool,
) -> Result<(Arc<dyn AutomationBackend>, Arc<dyn Clipboard>), AutomationError> {
    #[cfg(feature = "desktop")]
    {
        if !dry_run {
            return Ok((
                Arc::new(DesktopBackend::new()),
                Arc::new(SystemClipboard::new()?),
            ));
        }
    }
    #[cfg(not(feature = "desktop"))]
    {
        if !dry_run {
            tracing::warn!("built without the `desktop` feature; using dry-run primitives");
        }
    }
    Ok((
        Arc::new(DryRunBackend::new()),
        Arc::new(MemoryClipboard::default()),
    ))
}
