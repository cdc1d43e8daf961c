use std::path::Path;

use crate::error::{Error, Result};

/// Text of one schedule document, split into pages of trimmed, non-empty
/// lines. Page dumps separate pages with a form feed, as `pdftotext` does.
#[derive(Debug, Clone)]
pub struct Document {
    /// Short name used in source tags, usually the file name
    pub tag: String,
    pages: Vec<Vec<String>>,
}

impl Document {
    pub fn from_text(tag: impl Into<String>, text: &str) -> Self {
        let mut pages: Vec<Vec<String>> = text
            .split('\u{c}')
            .map(|page| {
                page.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        // pdftotext ends every page, the last one included, with a form feed
        if pages.len() > 1 && pages.last().is_some_and(Vec::is_empty) {
            pages.pop();
        }
        Self {
            tag: tag.into(),
            pages,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let tag = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_text(tag, &text))
    }

    pub fn pages(&self) -> &[Vec<String>] {
        &self.pages
    }

    /// True when no page has any text.
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(Vec::is_empty)
    }
}
