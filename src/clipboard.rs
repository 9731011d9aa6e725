//! Copying paths to the system clipboard.

use arboard::Clipboard;
use tracing::debug;

use crate::error::Result;

/// Destination of "copy path".
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard, connected on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new()?,
        };
        let clipboard = self.inner.insert(clipboard);
        clipboard.set_text(text.to_string())?;
        debug!(len = text.len(), "copied to clipboard");
        Ok(())
    }
}

/// Records copied text instead of touching the desktop.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub copied: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    pub unavailable: bool,
}

#[cfg(test)]
impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.unavailable {
            return Err(arboard::Error::ClipboardNotSupported.into());
        }
        self.copied.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
