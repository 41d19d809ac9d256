use std::path::PathBuf;

use crate::OutputFormat;

/// Characters that are not allowed in file names on at least one common platform.
const ILLEGAL_FILENAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

const UNTITLED: &str = "untitled";

/// Strips filename-illegal characters from a page title, keeping everything else in order.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect()
}

/// What the loader captured from a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub title: String,
    pub safe_title: String,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(title: impl Into<String>, html: impl Into<String>) -> Self {
        let title = title.into();
        let safe_title = sanitize_title(&title);
        Self {
            title,
            safe_title,
            html: html.into(),
        }
    }

    /// `<safe_title>.<ext>` in the current directory, or `untitled.<ext>` for a blank title.
    pub fn default_output_path(&self, format: OutputFormat) -> PathBuf {
        let stem = if self.safe_title.trim().is_empty() {
            UNTITLED
        } else {
            self.safe_title.as_str()
        };
        PathBuf::from(format!("{}.{}", stem, format.extension()))
    }
}
