//! Document detection and embedded script extraction.

use regex::Regex;

use codepage_core::error::AppError;
use codepage_core::result::AppResult;

/// Recognises full markup documents and pulls out their inline scripts.
#[derive(Debug, Clone)]
pub struct ScriptExtractor {
    document: Regex,
    script: Regex,
}

impl ScriptExtractor {
    /// Compile the extraction patterns.
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            document: compile(r"(?is)^\s*(<!doctype\s+html|<html[\s>])")?,
            script: compile(r"(?is)<script\b([^>]*)>(.*?)</script\s*>")?,
        })
    }

    /// Whether `source` begins with a document-type or root element.
    pub fn is_document(&self, source: &str) -> bool {
        self.document.is_match(source)
    }

    /// Concatenated bodies of inline script blocks, newline separated.
    ///
    /// Blocks that only reference an external file (`src=`) contribute nothing.
    pub fn scripts(&self, source: &str) -> String {
        self.script
            .captures_iter(source)
            .filter_map(|caps| {
                let body = caps.get(2)?.as_str();
                (!body.trim().is_empty()).then_some(body)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub(crate) fn compile(pattern: &str) -> AppResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| AppError::internal(format!("Invalid validation pattern {pattern}: {e}")))
}
