//! The text editing surface the session drives
//!
//! The surface renders text and reports edits. The session never reaches into
//! it beyond this trait: it pushes content in with `set_content` and may ask
//! for a formatting pass before saving. Edits come back as `SurfaceEvent`s.

use crate::error::{ExplorerError, Result};
use crate::primitives::language::Language;

/// Events the surface delivers to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The full text after an edit
    Changed(String),
    /// The surface's own save shortcut fired
    SaveIntent,
}

pub trait EditingSurface: Send {
    /// Replace the displayed text
    fn set_content(&mut self, text: &str, language: Language);

    /// Best-effort formatting pass over `text`
    ///
    /// `Ok(None)` means the text is already formatted. An error means
    /// formatting is unavailable for this content and the caller should carry
    /// on with the unformatted text.
    fn request_format(&mut self, text: &str, language: Language) -> Result<Option<String>>;
}

/// A plain in-memory surface
///
/// Formatting strips trailing whitespace and normalizes the final newline.
/// Plain text and unrecognized content is left alone.
#[derive(Debug, Default)]
pub struct BufferSurface {
    content: String,
    language: Option<Language>,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }
}

impl EditingSurface for BufferSurface {
    fn set_content(&mut self, text: &str, language: Language) {
        self.content = text.to_string();
        self.language = Some(language);
    }

    fn request_format(&mut self, text: &str, language: Language) -> Result<Option<String>> {
        if matches!(language, Language::PlainText | Language::Unknown) {
            return Err(ExplorerError::FormatUnsupported(language.to_string()));
        }

        let formatted = normalize_whitespace(text);
        if formatted == text {
            return Ok(None);
        }
        self.content = formatted.clone();
        Ok(Some(formatted))
    }
}

/// Trim trailing whitespace and blank trailing lines, keeping the line ending
fn normalize_whitespace(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let line_ending = if text.contains("\r\n") { "\r\n" } else { "\n" };

    let mut lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    let mut out = lines.join(line_ending);
    out.push_str(line_ending);
    out
}
