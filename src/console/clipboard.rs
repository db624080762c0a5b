// Copyright (c) 2026 0xAditya

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no system clipboard available")]
    Unavailable,
    #[error(transparent)]
    Backend(#[from] arboard::Error),
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard. Headless sessions simply have none.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!("clipboard unavailable: {}", e);
                None
            }
        };
        Self { inner }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let cb = self.inner.as_mut().ok_or(ClipboardError::Unavailable)?;
        cb.set_text(text)?;
        Ok(())
    }
}

/// Keeps the last copied text in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    pub writes: usize,
}

#[cfg(test)]
impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        self.writes += 1;
        Ok(())
    }
}
