#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use autotask::{AutomationBackend, AutomationError, Clipboard, Point};

/// Scripted backend that counts every primitive call.
#[derive(Default)]
pub struct FakeBackend {
    pub clicks: AtomicU32,
    pub locates: AtomicU32,
    pub presses: AtomicU32,
    pub hotkeys: AtomicU32,
    pub launches: AtomicU32,
    /// Locate succeeds on this attempt (1-based). `None` never matches.
    pub match_on_attempt: Option<u32>,
    pub match_at: Option<Point>,
    /// Every locate attempt reports an error instead.
    pub locate_errors: bool,
    pub fail_hotkey: bool,
    /// Time each primitive takes.
    pub delay: Duration,
    pub last_hotkey: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matching_on(attempt: u32, at: Point) -> Self {
        Self {
            match_on_attempt: Some(attempt),
            match_at: Some(at),
            ..Self::default()
        }
    }

    pub fn total_calls(&self) -> u32 {
        [
            &self.clicks,
            &self.locates,
            &self.presses,
            &self.hotkeys,
            &self.launches,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }

    async fn spend(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait::async_trait]
impl AutomationBackend for FakeBackend {
    async fn click(&self, _at: Point, _clicks: u32, _interval: Duration) -> Result<(), AutomationError> {
        self.clicks.fetch_add(1, Ordering::SeqCst);
        self.spend().await;
        Ok(())
    }

    async fn locate_on_screen(&self, _image: &Path, _confidence: f64) -> Result<Option<Point>, AutomationError> {
        let attempt = self.locates.fetch_add(1, Ordering::SeqCst) + 1;
        self.spend().await;
        if self.locate_errors {
            return Err(AutomationError::PlatformError("screen capture failed".into()));
        }
        match self.match_on_attempt {
            Some(n) if attempt >= n => Ok(self.match_at),
            _ => Ok(None),
        }
    }

    async fn press(&self, _key: &str, _presses: u32, _interval: Duration) -> Result<(), AutomationError> {
        self.presses.fetch_add(1, Ordering::SeqCst);
        self.spend().await;
        Ok(())
    }

    async fn hotkey(&self, keys: &[String]) -> Result<(), AutomationError> {
        self.hotkeys.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_hotkey.lock() {
            *last = keys.to_vec();
        }
        self.spend().await;
        if self.fail_hotkey {
            return Err(AutomationError::PlatformError("keyboard unavailable".into()));
        }
        Ok(())
    }

    async fn launch(&self, _path: &Path) -> Result<(), AutomationError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.spend().await;
        Ok(())
    }
}

/// Clipboard that remembers every write.
#[derive(Default)]
pub struct RecordingClipboard {
    text: Mutex<String>,
    pub writes: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Mutex::new(text.to_string()),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn text(&self) -> String {
        self.text.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn read_text(&self) -> Result<String, AutomationError> {
        Ok(self.text())
    }

    fn write_text(&self, text: &str) -> Result<(), AutomationError> {
        *self.text.lock().unwrap() = text.to_string();
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
