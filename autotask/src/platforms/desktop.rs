//! Real mouse, keyboard, clipboard and process primitives.

use super::{AutomationBackend, Clipboard};
use crate::errors::AutomationError;
use crate::result::Point;
use rdev::{simulate, Button, EventType, Key};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

// Some platforms drop synthetic events that arrive back to back.
const EVENT_SETTLE: Duration = Duration::from_millis(20);

/// Finds an image on the current screen.
///
/// Matching is not part of this crate; hosts plug in whatever recognizer
/// they use.
pub trait ImageMatcher: Send + Sync {
    fn locate(&self, image: &Path, confidence: f64) -> Result<Option<Point>, AutomationError>;
}

#[derive(Default, Clone)]
pub struct DesktopBackend {
    matcher: Option<Arc<dyn ImageMatcher>>,
}

impl DesktopBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn ImageMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    async fn send(&self, event: EventType) -> Result<(), AutomationError> {
        simulate(&event).map_err(|_| {
            AutomationError::PlatformError(format!("could not synthesize {event:?}"))
        })?;
        tokio::time::sleep(EVENT_SETTLE).await;
        Ok(())
    }

    async fn tap(&self, key: Key) -> Result<(), AutomationError> {
        self.send(EventType::KeyPress(key)).await?;
        self.send(EventType::KeyRelease(key)).await
    }
}

#[async_trait::async_trait]
impl AutomationBackend for DesktopBackend {
    async fn click(
        &self,
        at: Point,
        clicks: u32,
        interval: Duration,
    ) -> Result<(), AutomationError> {
        self.send(EventType::MouseMove {
            x: f64::from(at.x),
            y: f64::from(at.y),
        })
        .await?;
        for i in 0..clicks {
            if i > 0 {
                tokio::time::sleep(interval).await;
            }
            self.send(EventType::ButtonPress(Button::Left)).await?;
            self.send(EventType::ButtonRelease(Button::Left)).await?;
        }
        Ok(())
    }

    async fn locate_on_screen(
        &self,
        image: &Path,
        confidence: f64,
    ) -> Result<Option<Point>, AutomationError> {
        match &self.matcher {
            Some(matcher) => matcher.locate(image, confidence),
            None => Err(AutomationError::UnsupportedOperation(
                "no image matcher configured".to_string(),
            )),
        }
    }

    async fn press(
        &self,
        key: &str,
        presses: u32,
        interval: Duration,
    ) -> Result<(), AutomationError> {
        let key = parse_key(key)?;
        for i in 0..presses {
            if i > 0 {
                tokio::time::sleep(interval).await;
            }
            self.tap(key).await?;
        }
        Ok(())
    }

    async fn hotkey(&self, keys: &[String]) -> Result<(), AutomationError> {
        let keys = keys
            .iter()
            .map(|k| parse_key(k))
            .collect::<Result<Vec<_>, _>>()?;
        for key in &keys {
            self.send(EventType::KeyPress(*key)).await?;
        }
        for key in keys.iter().rev() {
            self.send(EventType::KeyRelease(*key)).await?;
        }
        Ok(())
    }

    async fn launch(&self, path: &Path) -> Result<(), AutomationError> {
        debug!(path = %path.display(), "launching");
        let mut child = open_command(path)
            .spawn()
            .map_err(|e| AutomationError::Launch {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        // Reap the opener once it exits.
        tokio::task::spawn_blocking(move || {
            if let Err(e) = child.wait() {
                debug!("opener did not exit cleanly: {e}");
            }
        });
        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
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

/// Map a key name (as used in chain files) to a physical key.
pub(crate) fn parse_key(name: &str) -> Result<Key, AutomationError> {
    let lower = name.trim().to_lowercase();
    let key = match lower.as_str() {
        "ctrl" | "control" | "ctrlleft" => Key::ControlLeft,
        "ctrlright" => Key::ControlRight,
        "shift" | "shiftleft" => Key::ShiftLeft,
        "shiftright" => Key::ShiftRight,
        "alt" | "altleft" | "option" => Key::Alt,
        "altgr" | "altright" => Key::AltGr,
        "command" | "cmd" | "win" | "super" | "meta" => Key::MetaLeft,
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "space" | " " => Key::Space,
        "esc" | "escape" => Key::Escape,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "insert" => Key::Insert,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" | "pgup" => Key::PageUp,
        "pagedown" | "pgdn" => Key::PageDown,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "capslock" => Key::CapsLock,
        "printscreen" => Key::PrintScreen,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        "-" => Key::Minus,
        "=" => Key::Equal,
        "," => Key::Comma,
        "." => Key::Dot,
        "/" => Key::Slash,
        ";" => Key::SemiColon,
        "'" => Key::Quote,
        "[" => Key::LeftBracket,
        "]" => Key::RightBracket,
        "\\" => Key::BackSlash,
        "`" => Key::BackQuote,
        other => return single_char_key(other),
    };
    Ok(key)
}

fn single_char_key(name: &str) -> Result<Key, AutomationError> {
    let mut chars = name.chars();
    let key = match (chars.next(), chars.next()) {
        (Some(c), None) => match c {
            'a' => Key::KeyA,
            'b' => Key::KeyB,
            'c' => Key::KeyC,
            'd' => Key::KeyD,
            'e' => Key::KeyE,
            'f' => Key::KeyF,
            'g' => Key::KeyG,
            'h' => Key::KeyH,
            'i' => Key::KeyI,
            'j' => Key::KeyJ,
            'k' => Key::KeyK,
            'l' => Key::KeyL,
            'm' => Key::KeyM,
            'n' => Key::KeyN,
            'o' => Key::KeyO,
            'p' => Key::KeyP,
            'q' => Key::KeyQ,
            'r' => Key::KeyR,
            's' => Key::KeyS,
            't' => Key::KeyT,
            'u' => Key::KeyU,
            'v' => Key::KeyV,
            'w' => Key::KeyW,
            'x' => Key::KeyX,
            'y' => Key::KeyY,
            'z' => Key::KeyZ,
            '0' => Key::Num0,
            '1' => Key::Num1,
            '2' => Key::Num2,
            '3' => Key::Num3,
            '4' => Key::Num4,
            '5' => Key::Num5,
            '6' => Key::Num6,
            '7' => Key::Num7,
            '8' => Key::Num8,
            '9' => Key::Num9,
            _ => return Err(unknown_key(name)),
        },
        _ => return Err(unknown_key(name)),
    };
    Ok(key)
}

fn unknown_key(name: &str) -> AutomationError {
    AutomationError::InvalidArgument(format!("unknown key '{name}'"))
}

/// The operating system clipboard.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Fails early when no clipboard is reachable (e.g. no display).
    pub fn new() -> Result<Self, AutomationError> {
        open_clipboard()?;
        Ok(Self)
    }
}

fn open_clipboard() -> Result<arboard::Clipboard, AutomationError> {
    arboard::Clipboard::new().map_err(|e| AutomationError::Clipboard(e.to_string()))
}

impl Clipboard for SystemClipboard {
    fn read_text(&self) -> Result<String, AutomationError> {
        match open_clipboard()?.get_text() {
            Ok(text) => Ok(text),
            // An empty or non-text clipboard reads as empty text.
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(AutomationError::Clipboard(e.to_string())),
        }
    }

    fn write_text(&self, text: &str) -> Result<(), AutomationError> {
        open_clipboard()?
            .set_text(text)
            .map_err(|e| AutomationError::Clipboard(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        assert_eq!(parse_key("Enter").unwrap(), Key::Return);
        assert_eq!(parse_key(" ctrl ").unwrap(), Key::ControlLeft);
        assert_eq!(parse_key("a").unwrap(), Key::KeyA);
        assert_eq!(parse_key("7").unwrap(), Key::Num7);
        assert!(parse_key("hyper").is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_opens_through_xdg_open() {
        let command = open_command(Path::new("/home/me/report.pdf"));
        assert_eq!(command.get_program(), "xdg-open");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["/home/me/report.pdf"]);
    }
}
